//! COLMAP `points3D.txt` for seeding Gaussian-splat training with a sparse
//! cloud. Tracks are left empty.

use splatprep_core::PointCloud;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::ColmapError;

/// Write `cloud` as COLMAP text points with 1-based ids and zero error.
pub fn write_points3d_to<W: Write>(mut w: W, cloud: &PointCloud) -> Result<(), ColmapError> {
    cloud.check_lengths()?;
    let colors = cloud.colors.as_ref().ok_or(ColmapError::MissingColors)?;

    writeln!(w, "# 3D point list with one line of data per point:")?;
    writeln!(
        w,
        "#   POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[] as (IMAGE_ID, POINT2D_IDX)"
    )?;
    writeln!(
        w,
        "# Number of points: {}, mean track length: N/A",
        cloud.len()
    )?;

    for (i, p) in cloud.iter_points().enumerate() {
        let [r, g, b] = colors.color(i);
        writeln!(
            w,
            "{} {} {} {} {} {} {} 0",
            i + 1,
            p[0],
            p[1],
            p[2],
            r,
            g,
            b
        )?;
    }

    w.flush()?;
    Ok(())
}

pub fn write_points3d(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<(), ColmapError> {
    let path = path.as_ref();
    let file = fs::File::create(path)?;
    write_points3d_to(BufWriter::new(file), cloud)?;
    debug!(path = %path.display(), points = cloud.len(), "wrote points3D");
    Ok(())
}
