use splatprep_core::SchemaError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid camera JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no *.json camera files in {0}")]
    NoCameraFiles(PathBuf),

    #[error("points3D.txt needs per-point colors, but the cloud has none")]
    MissingColors,

    #[error("invalid camera matrix: {0}")]
    InvalidMatrix(String),

    #[error("cannot write point cloud: {0}")]
    Schema(#[from] SchemaError),
}
