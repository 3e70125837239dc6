#![forbid(unsafe_code)]

pub mod error;
pub mod morton;
pub mod normalize;
pub mod subsample;

pub use error::SubsampleError;
pub use morton::{
    morton_decode, morton_encode, morton_encode_bits, quantize, DEFAULT_BITS, MAX_BITS,
};
pub use normalize::{normalize_positions, NormalizedPositions};
pub use subsample::{morton_codes, morton_order, morton_subsample, stride_select, SubsampleParams};
