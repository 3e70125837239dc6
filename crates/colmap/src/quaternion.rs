use nalgebra::Matrix3;

use crate::ColmapError;

/// Rotation quaternion in COLMAP's `QW QX QY QZ` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn normalized(self) -> Option<Self> {
        let n = self.norm();
        if !n.is_finite() || n == 0.0 {
            return None;
        }
        Some(Self {
            w: self.w / n,
            x: self.x / n,
            y: self.y / n,
            z: self.z / n,
        })
    }
}

/// Convert a 3x3 rotation matrix to a unit quaternion.
///
/// Uses the trace when it is positive and otherwise pivots on the largest
/// diagonal entry, so the square root never sees a value near zero. That keeps
/// rotations with trace ~0 and half turns accurate. The result is normalized,
/// which absorbs small drift in slightly non-orthogonal inputs.
pub fn rotation_to_quaternion(r: &Matrix3<f64>) -> Result<Quaternion, ColmapError> {
    if r.iter().any(|v| !v.is_finite()) {
        return Err(ColmapError::InvalidMatrix(
            "rotation has non-finite entries".to_string(),
        ));
    }

    let trace = r.trace();
    let q = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        Quaternion {
            w: 0.25 * s,
            x: (r[(2, 1)] - r[(1, 2)]) / s,
            y: (r[(0, 2)] - r[(2, 0)]) / s,
            z: (r[(1, 0)] - r[(0, 1)]) / s,
        }
    } else if r[(0, 0)] > r[(1, 1)] && r[(0, 0)] > r[(2, 2)] {
        let s = (1.0 + r[(0, 0)] - r[(1, 1)] - r[(2, 2)]).sqrt() * 2.0;
        Quaternion {
            w: (r[(2, 1)] - r[(1, 2)]) / s,
            x: 0.25 * s,
            y: (r[(0, 1)] + r[(1, 0)]) / s,
            z: (r[(0, 2)] + r[(2, 0)]) / s,
        }
    } else if r[(1, 1)] > r[(2, 2)] {
        let s = (1.0 + r[(1, 1)] - r[(0, 0)] - r[(2, 2)]).sqrt() * 2.0;
        Quaternion {
            w: (r[(0, 2)] - r[(2, 0)]) / s,
            x: (r[(0, 1)] + r[(1, 0)]) / s,
            y: 0.25 * s,
            z: (r[(1, 2)] + r[(2, 1)]) / s,
        }
    } else {
        let s = (1.0 + r[(2, 2)] - r[(0, 0)] - r[(1, 1)]).sqrt() * 2.0;
        Quaternion {
            w: (r[(1, 0)] - r[(0, 1)]) / s,
            x: (r[(0, 2)] + r[(2, 0)]) / s,
            y: (r[(1, 2)] + r[(2, 1)]) / s,
            z: 0.25 * s,
        }
    };

    q.normalized()
        .ok_or_else(|| ColmapError::InvalidMatrix("matrix is not a rotation".to_string()))
}
