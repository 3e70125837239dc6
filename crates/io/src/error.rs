use splatprep_core::SchemaError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed PLY header: {0}")]
    Header(String),

    #[error("unsupported PLY feature: {0}")]
    Unsupported(String),

    #[error("PLY vertex element has no `{0}` property")]
    MissingProperty(&'static str),

    #[error("vertex {index}: {message}")]
    Parse { index: usize, message: String },

    #[error("PLY body too short: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("vertex {index}: value {value} of `{property}` does not fit in {target}")]
    Conversion {
        index: usize,
        property: &'static str,
        value: f64,
        target: &'static str,
    },

    #[error("cannot write point cloud: {0}")]
    Schema(#[from] SchemaError),
}
