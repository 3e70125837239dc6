use splatprep_core::{Aabb, PointCloud};
use tracing::debug;

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Positions mapped into the unit cube of the cloud's bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPositions {
    /// One `[x, y, z]` triple per input point, each component in `[0, 1]`.
    pub coords: Vec<[f64; 3]>,
    /// Bounding box the coordinates were normalized against.
    pub bounds: Aabb,
    /// Axes on which every point shares the same value. Those components are
    /// all `0.0` in `coords`.
    pub degenerate: [bool; 3],
}

/// Map every position linearly into `[0, 1]` per axis:
/// `(p - min) / (max - min)`.
///
/// The arithmetic runs in `f64`, so clouds far from the origin keep their
/// relative resolution. An axis with zero extent (a planar cloud, a single
/// point) normalizes to `0.0` for every point instead of dividing by zero.
///
/// Positions are expected to be finite, which [`PointCloud::validate`]
/// guarantees. The cloud is not modified.
pub fn normalize_positions(cloud: &PointCloud) -> NormalizedPositions {
    let bounds = cloud.aabb();
    let extent = bounds.extent();
    let min = [
        bounds.min[0] as f64,
        bounds.min[1] as f64,
        bounds.min[2] as f64,
    ];

    let mut degenerate = [false; 3];
    if !bounds.is_empty() {
        for axis in 0..3 {
            if extent[axis] == 0.0 {
                degenerate[axis] = true;
                debug!(
                    axis = %AXES[axis],
                    value = bounds.min[axis],
                    "axis has zero extent, normalizing it to 0"
                );
            }
        }
    }

    let coords = cloud
        .iter_points()
        .map(|p| {
            let mut out = [0.0f64; 3];
            for axis in 0..3 {
                if !degenerate[axis] && extent[axis] > 0.0 {
                    out[axis] = ((p[axis] as f64 - min[axis]) / extent[axis]).clamp(0.0, 1.0);
                }
            }
            out
        })
        .collect();

    NormalizedPositions {
        coords,
        bounds,
        degenerate,
    }
}
