use splatprep::colmap::{export_cameras, write_points3d, CameraExportOptions};
use splatprep::{morton_subsample, Colors, PointCloud, SubsampleParams};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::temp_dir().join("splatprep_colmap_demo");
    fs::create_dir_all(&out_dir)?;

    // Three cameras orbiting the origin, as a renderer would save them
    for (i, angle) in [0.0f64, 120.0, 240.0].iter().enumerate() {
        let (s, c) = angle.to_radians().sin_cos();
        let json = format!(
            r#"{{"class_name": "PinholeCameraParameters",
  "extrinsic": [{c}, 0, {ms}, 0, 0, 1, 0, 0, {s}, 0, {c}, 0, 0, 0, 3, 1],
  "intrinsic": {{"width": 1600, "height": 900,
    "intrinsic_matrix": [1386.0, 0, 0, 0, 1386.0, 0, 799.5, 449.5, 1]}},
  "version_major": 1, "version_minor": 0}}"#,
            c = c,
            s = s,
            ms = -s
        );
        fs::write(out_dir.join(format!("{i:03}.json")), json)?;
    }

    let n = 5_000;
    let cloud = PointCloud::from_xyz(
        (0..n).map(|i| ((i * 37) % 100) as f32 * 0.01).collect(),
        (0..n).map(|i| ((i * 59) % 100) as f32 * 0.01).collect(),
        (0..n).map(|i| ((i * 73) % 100) as f32 * 0.01).collect(),
    )
    .with_colors(Colors {
        r: vec![200; n],
        g: vec![180; n],
        b: vec![160; n],
    });
    let sparse = morton_subsample(&cloud, &SubsampleParams::new(500))?;

    write_points3d(out_dir.join("points3D.txt"), &sparse)?;
    let images = export_cameras(
        &out_dir,
        out_dir.join("cameras.txt"),
        out_dir.join("images.txt"),
        &CameraExportOptions::default(),
    )?;

    println!(
        "Wrote {} points and {} images to {}",
        sparse.len(),
        images,
        out_dir.display()
    );
    print!("{}", fs::read_to_string(out_dir.join("images.txt"))?);
    Ok(())
}
