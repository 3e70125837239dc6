//! Exact-count Morton subsampling of point clouds, plus the PLY and COLMAP
//! plumbing needed to seed Gaussian-splat training.
//!
//! This crate re-exports the workspace libraries:
//!
//! - [`core`]: the struct-of-arrays [`PointCloud`]
//! - [`sampling`]: Morton codes and [`morton_subsample`]
//! - [`io`]: PLY reading and writing
//! - [`colmap`]: `points3D.txt`, `cameras.txt` and `images.txt` writers

pub use splatprep_colmap as colmap;
pub use splatprep_core as core;
pub use splatprep_io as io;
pub use splatprep_sampling as sampling;

pub use splatprep_core::{Colors, Normals, PointCloud};
pub use splatprep_io::{read_ply, write_ply, write_ply_binary};
pub use splatprep_sampling::{morton_subsample, SubsampleParams};
