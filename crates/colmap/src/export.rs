//! COLMAP `cameras.txt` / `images.txt` from a directory of per-view Open3D
//! camera files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::pinhole::PinholeCameraParameters;
use crate::quaternion::rotation_to_quaternion;
use crate::ColmapError;

/// How exported cameras and images are labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraExportOptions {
    pub camera_id: u32,
    pub model: String,
    /// Overrides the width stored in the first camera file.
    pub width: Option<u32>,
    /// Overrides the height stored in the first camera file.
    pub height: Option<u32>,
    /// Extension of the rendered images, without the dot.
    pub image_extension: String,
}

impl Default for CameraExportOptions {
    fn default() -> Self {
        Self {
            camera_id: 1,
            model: "PINHOLE".to_string(),
            width: None,
            height: None,
            image_extension: "png".to_string(),
        }
    }
}

impl CameraExportOptions {
    /// Name of the image rendered for view `index` (0-based): `000.png`, ...
    pub fn image_name(&self, index: usize) -> String {
        format!("{:03}.{}", index, self.image_extension)
    }
}

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn list_camera_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ColmapError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every camera file in `dir` in file-name order.
pub fn load_camera_dir(
    dir: impl AsRef<Path>,
) -> Result<Vec<PinholeCameraParameters>, ColmapError> {
    let dir = dir.as_ref();
    let files = list_camera_files(dir)?;
    if files.is_empty() {
        return Err(ColmapError::NoCameraFiles(dir.to_path_buf()));
    }
    debug!(dir = %dir.display(), files = files.len(), "loading camera files");
    files.iter().map(PinholeCameraParameters::load).collect()
}

/// Write the single shared camera, with intrinsics taken from `first`.
pub fn write_cameras_txt_to<W: Write>(
    mut w: W,
    first: &PinholeCameraParameters,
    options: &CameraExportOptions,
) -> Result<(), ColmapError> {
    let [fx, fy, cx, cy] = first.focal_and_center()?;
    let width = options.width.unwrap_or(first.intrinsic.width);
    let height = options.height.unwrap_or(first.intrinsic.height);

    writeln!(w, "# Camera list with one line of data per camera:")?;
    writeln!(w, "#   CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[]")?;
    writeln!(
        w,
        "{} {} {} {} {} {} {} {}",
        options.camera_id, options.model, width, height, fx, fy, cx, cy
    )?;
    w.flush()?;
    Ok(())
}

/// Write one pose per camera, 1-based ids, each followed by an empty
/// 2-D point line.
pub fn write_images_txt_to<W: Write>(
    mut w: W,
    cameras: &[PinholeCameraParameters],
    options: &CameraExportOptions,
) -> Result<(), ColmapError> {
    writeln!(w, "# Image list with two lines of data per image:")?;
    writeln!(
        w,
        "#   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, IMAGE_NAME"
    )?;
    writeln!(w, "#   POINTS2D[] as (X, Y, POINT3D_ID)")?;

    for (index, camera) in cameras.iter().enumerate() {
        let q = rotation_to_quaternion(&camera.rotation()?)?;
        let t = camera.translation()?;
        writeln!(
            w,
            "{} {} {} {} {} {} {} {} {} {}",
            index + 1,
            q.w,
            q.x,
            q.y,
            q.z,
            t[0],
            t[1],
            t[2],
            options.camera_id,
            options.image_name(index)
        )?;
        writeln!(w)?;
    }

    w.flush()?;
    Ok(())
}

/// Convert every camera file in `dir` and write `cameras.txt` and
/// `images.txt`. Returns the number of images written.
///
/// Both outputs are rendered and staged next to their destinations before
/// either is moved into place, so a bad camera file or an unwritable output
/// location leaves neither output touched.
pub fn export_cameras(
    dir: impl AsRef<Path>,
    cameras_path: impl AsRef<Path>,
    images_path: impl AsRef<Path>,
    options: &CameraExportOptions,
) -> Result<usize, ColmapError> {
    let cameras = load_camera_dir(dir)?;

    let mut cameras_txt = Vec::new();
    write_cameras_txt_to(&mut cameras_txt, &cameras[0], options)?;
    let mut images_txt = Vec::new();
    write_images_txt_to(&mut images_txt, &cameras, options)?;

    let staged_cameras = stage(cameras_path.as_ref(), &cameras_txt)?;
    let staged_images = stage(images_path.as_ref(), &images_txt)?;
    staged_cameras
        .persist(cameras_path.as_ref())
        .map_err(|e| e.error)?;
    staged_images
        .persist(images_path.as_ref())
        .map_err(|e| e.error)?;

    info!(
        images = cameras.len(),
        cameras = %cameras_path.as_ref().display(),
        poses = %images_path.as_ref().display(),
        "exported COLMAP cameras"
    );
    Ok(cameras.len())
}

/// Write `contents` to a temporary file in the directory of `dest`. Dropping
/// the handle removes it.
fn stage(dest: &Path, contents: &[u8]) -> Result<NamedTempFile, ColmapError> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(file)
}
