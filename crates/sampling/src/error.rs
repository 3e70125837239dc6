use splatprep_core::SchemaError;
use thiserror::Error;

use crate::morton::MAX_BITS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubsampleError {
    #[error("target count must be at least 1")]
    ZeroTarget,

    #[error("target count {target} exceeds the {total} points available")]
    TargetExceedsCloud { target: usize, total: usize },

    #[error("bits per axis must be between 1 and {max}, got {bits}", max = MAX_BITS)]
    InvalidBits { bits: u32 },

    #[error("invalid point cloud: {0}")]
    Schema(#[from] SchemaError),
}
