#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod pinhole;
pub mod points3d;
pub mod quaternion;

pub use error::ColmapError;
pub use export::{
    export_cameras, list_camera_files, load_camera_dir, write_cameras_txt_to, write_images_txt_to,
    CameraExportOptions,
};
pub use pinhole::{PinholeCameraParameters, PinholeIntrinsic};
pub use points3d::{write_points3d, write_points3d_to};
pub use quaternion::{rotation_to_quaternion, Quaternion};
