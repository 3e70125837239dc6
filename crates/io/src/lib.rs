#![forbid(unsafe_code)]

pub mod error;
pub mod ply;

pub use error::PlyError;
pub use ply::{read_ply, read_ply_bytes, write_ply, write_ply_binary, write_ply_to, PlyFormat};
