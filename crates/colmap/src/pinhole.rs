//! Open3D `PinholeCameraParameters` JSON, as written by
//! `o3d.io.write_pinhole_camera_parameters`.

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ColmapError;

/// One camera view. Both matrices are stored column-major.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PinholeCameraParameters {
    /// 4x4 world-to-camera transform, 16 values.
    pub extrinsic: Vec<f64>,
    pub intrinsic: PinholeIntrinsic,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PinholeIntrinsic {
    pub width: u32,
    pub height: u32,
    /// 3x3 calibration matrix, 9 values.
    pub intrinsic_matrix: Vec<f64>,
}

fn check_entries(values: &[f64], expected: usize, what: &str) -> Result<(), ColmapError> {
    if values.len() != expected {
        return Err(ColmapError::InvalidMatrix(format!(
            "{} has {} entries, expected {}",
            what,
            values.len(),
            expected
        )));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(ColmapError::InvalidMatrix(format!(
            "{} entry {} is not finite",
            what, i
        )));
    }
    Ok(())
}

impl PinholeCameraParameters {
    /// Parse a JSON document. `path` only labels errors.
    pub fn from_json_str(json: &str, path: &Path) -> Result<Self, ColmapError> {
        serde_json::from_str(json).map_err(|source| ColmapError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ColmapError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json, path)
    }

    pub fn extrinsic_matrix(&self) -> Result<Matrix4<f64>, ColmapError> {
        check_entries(&self.extrinsic, 16, "extrinsic")?;
        Ok(Matrix4::from_column_slice(&self.extrinsic))
    }

    pub fn intrinsic_matrix(&self) -> Result<Matrix3<f64>, ColmapError> {
        check_entries(&self.intrinsic.intrinsic_matrix, 9, "intrinsic_matrix")?;
        Ok(Matrix3::from_column_slice(&self.intrinsic.intrinsic_matrix))
    }

    /// Upper-left 3x3 block of the extrinsic.
    pub fn rotation(&self) -> Result<Matrix3<f64>, ColmapError> {
        Ok(self.extrinsic_matrix()?.fixed_view::<3, 3>(0, 0).into_owned())
    }

    /// Last column of the extrinsic, rows 0..3.
    pub fn translation(&self) -> Result<Vector3<f64>, ColmapError> {
        Ok(self.extrinsic_matrix()?.fixed_view::<3, 1>(0, 3).into_owned())
    }

    /// `[fx, fy, cx, cy]` from the calibration matrix.
    pub fn focal_and_center(&self) -> Result<[f64; 4], ColmapError> {
        let k = self.intrinsic_matrix()?;
        Ok([k[(0, 0)], k[(1, 1)], k[(0, 2)], k[(1, 2)]])
    }
}
