use splatprep::{morton_subsample, Colors, PointCloud, SubsampleParams};

fn main() {
    // Synthetic dense cloud: 50k points on a twisted ribbon
    let n = 50_000;
    let t: Vec<f32> = (0..n).map(|i| i as f32 / n as f32).collect();
    let x: Vec<f32> = t.iter().map(|t| (t * 12.0).cos() * (1.0 + t)).collect();
    let y: Vec<f32> = t.iter().map(|t| (t * 12.0).sin() * (1.0 + t)).collect();
    let z: Vec<f32> = t.iter().map(|t| t * 4.0).collect();
    let colors = Colors {
        r: t.iter().map(|t| (t * 255.0) as u8).collect(),
        g: vec![128; n],
        b: t.iter().map(|t| ((1.0 - t) * 255.0) as u8).collect(),
    };
    let cloud = PointCloud::from_xyz(x, y, z).with_colors(colors);
    println!("Dense cloud: {} points", cloud.len());

    for target in [15_000, 1_000, 10] {
        match morton_subsample(&cloud, &SubsampleParams::new(target)) {
            Ok(sparse) => {
                let aabb = sparse.aabb();
                println!(
                    "Kept {} points, bounding box min={:?}, max={:?}",
                    sparse.len(),
                    aabb.min,
                    aabb.max
                );
            }
            Err(e) => println!("Cannot subsample to {}: {}", target, e),
        }
    }

    // Asking for more points than exist is an error, not a short result
    if let Err(e) = morton_subsample(&cloud, &SubsampleParams::new(n + 1)) {
        println!("Expected error: {}", e);
    }
}
