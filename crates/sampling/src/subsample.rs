use rayon::prelude::*;
use splatprep_core::PointCloud;
use tracing::debug;

use crate::morton::{morton_encode_bits, quantize, DEFAULT_BITS, MAX_BITS};
use crate::normalize::{normalize_positions, NormalizedPositions};
use crate::SubsampleError;

/// What to keep from a cloud and how finely to grid it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsampleParams {
    /// Exact number of points in the output.
    pub target_count: usize,
    /// Grid resolution per axis, as a power of two.
    pub bits: u32,
}

impl SubsampleParams {
    pub fn new(target_count: usize) -> Self {
        Self {
            target_count,
            bits: DEFAULT_BITS,
        }
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Check the request against a cloud of `total` points.
    ///
    /// Asking for more points than the cloud holds is rejected rather than
    /// answered with a shorter cloud.
    pub fn validate(&self, total: usize) -> Result<(), SubsampleError> {
        check_bits(self.bits)?;
        if self.target_count == 0 {
            return Err(SubsampleError::ZeroTarget);
        }
        if self.target_count > total {
            return Err(SubsampleError::TargetExceedsCloud {
                target: self.target_count,
                total,
            });
        }
        Ok(())
    }
}

fn check_bits(bits: u32) -> Result<(), SubsampleError> {
    if (1..=MAX_BITS).contains(&bits) {
        Ok(())
    } else {
        Err(SubsampleError::InvalidBits { bits })
    }
}

fn encode_normalized(norm: &NormalizedPositions, bits: u32) -> Vec<u64> {
    norm.coords
        .par_iter()
        .map(|c| {
            morton_encode_bits(
                quantize(c[0], bits),
                quantize(c[1], bits),
                quantize(c[2], bits),
                bits,
            )
        })
        .collect()
}

/// Morton code of every point, in input order, on a `2^bits`-per-axis grid
/// spanning the cloud's bounding box.
pub fn morton_codes(cloud: &PointCloud, bits: u32) -> Result<Vec<u64>, SubsampleError> {
    check_bits(bits)?;
    cloud.validate()?;
    Ok(encode_normalized(&normalize_positions(cloud), bits))
}

/// Indices of `codes` sorted by ascending code. Equal codes keep their input
/// order, so the permutation is fully determined by the codes.
pub fn morton_order(codes: &[u64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..codes.len()).collect();
    // Stable sort: ties stay in index order.
    order.sort_by_key(|&i| codes[i]);
    order
}

/// Take every `len / target`-th entry of `order`, starting at the first, and
/// keep the first `target` of those.
///
/// Returns exactly `target` indices whenever `1 <= target <= order.len()`.
/// For a larger `target` every entry is returned once, so the result is
/// shorter than asked; [`morton_subsample`] rejects that case up front.
pub fn stride_select(order: &[usize], target: usize) -> Vec<usize> {
    if target == 0 {
        return Vec::new();
    }
    let step = (order.len() / target).max(1);
    order.iter().step_by(step).take(target).copied().collect()
}

/// Pick exactly `params.target_count` points spread evenly along the Morton
/// curve of `cloud`.
///
/// Points are normalized into the bounding box, quantized onto a
/// `2^bits`-per-axis grid, sorted by Morton code (ties by input order) and
/// strided through. Positions, colors and normals of the chosen points are
/// copied from `cloud` unchanged, in Morton order. All checks run before any
/// work is done; on error nothing is produced.
///
/// # Errors
///
/// - [`SubsampleError::Schema`] if attribute arrays disagree in length or a
///   position is not finite.
/// - [`SubsampleError::ZeroTarget`], [`SubsampleError::TargetExceedsCloud`]
///   and [`SubsampleError::InvalidBits`] for requests that cannot be met.
pub fn morton_subsample(
    cloud: &PointCloud,
    params: &SubsampleParams,
) -> Result<PointCloud, SubsampleError> {
    cloud.validate()?;
    params.validate(cloud.len())?;

    let norm = normalize_positions(cloud);
    let codes = encode_normalized(&norm, params.bits);
    let order = morton_order(&codes);
    let selected = stride_select(&order, params.target_count);

    debug!(
        total = cloud.len(),
        target = params.target_count,
        step = cloud.len() / params.target_count,
        bits = params.bits,
        "morton subsample"
    );

    Ok(cloud.select(&selected))
}
