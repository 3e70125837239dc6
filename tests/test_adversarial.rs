//! Adversarial edge-case integration tests.
//!
//! Degenerate, boundary and malformed inputs across the crate stack: every
//! case must either succeed with a well-formed result or fail with a typed
//! error, never panic.

use splatprep::colmap::{write_points3d_to, ColmapError};
use splatprep::io::{read_ply_bytes, write_ply_to, PlyError, PlyFormat};
use splatprep::sampling::{morton_codes, morton_subsample, SubsampleError, SubsampleParams};
use splatprep::{Colors, PointCloud};

// ────────────────── subsampling ──────────────────

#[test]
fn empty_cloud_rejects_every_request() {
    let cloud = PointCloud::new();
    assert_eq!(
        morton_subsample(&cloud, &SubsampleParams::new(1)),
        Err(SubsampleError::TargetExceedsCloud { target: 1, total: 0 })
    );
    assert_eq!(
        morton_subsample(&cloud, &SubsampleParams::new(0)),
        Err(SubsampleError::ZeroTarget)
    );
    assert_eq!(morton_codes(&cloud, 10), Ok(vec![]));
}

#[test]
fn all_points_identical() {
    let n = 50;
    let cloud = PointCloud::from_xyz(vec![3.0; n], vec![3.0; n], vec![3.0; n]);
    let out = morton_subsample(&cloud, &SubsampleParams::new(7)).unwrap();
    assert_eq!(out.len(), 7);
    assert!(out.iter_points().all(|p| p == [3.0, 3.0, 3.0]));
}

#[test]
fn collinear_cloud() {
    let n = 1000;
    let x: Vec<f32> = (0..n).map(|i| i as f32).collect();
    let cloud = PointCloud::from_xyz(x, vec![0.0; n], vec![-1.0; n]);
    let out = morton_subsample(&cloud, &SubsampleParams::new(10)).unwrap();
    assert_eq!(out.x, vec![0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0]);
}

#[test]
fn extreme_coordinates() {
    let cloud = PointCloud::from_xyz(
        vec![f32::MIN, 0.0, f32::MAX],
        vec![-1e30, 1e-30, 1e30],
        vec![0.0, 0.0, 0.0],
    );
    let out = morton_subsample(&cloud, &SubsampleParams::new(3).with_bits(21)).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out.point(0), [f32::MIN, -1e30, 0.0]);
    assert_eq!(out.point(2), [f32::MAX, 1e30, 0.0]);
}

#[test]
fn non_finite_positions_are_rejected() {
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let cloud = PointCloud::from_xyz(vec![0.0, bad], vec![0.0, 1.0], vec![0.0, 1.0]);
        assert!(matches!(
            morton_subsample(&cloud, &SubsampleParams::new(1)),
            Err(SubsampleError::Schema(_))
        ));
    }
}

#[test]
fn mismatched_attribute_lengths_are_rejected() {
    let cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]).with_colors(
        Colors {
            r: vec![1],
            g: vec![1, 2],
            b: vec![1, 2],
        },
    );
    assert!(matches!(
        morton_subsample(&cloud, &SubsampleParams::new(1)),
        Err(SubsampleError::Schema(_))
    ));
}

#[test]
fn rejected_requests_leave_input_untouched() {
    let cloud = PointCloud::from_xyz(vec![2.0, 0.0, 1.0], vec![0.0, 1.0, 2.0], vec![5.0, 5.0, 5.0])
        .with_colors(Colors {
            r: vec![1, 2, 3],
            g: vec![4, 5, 6],
            b: vec![7, 8, 9],
        });
    let before = cloud.clone();
    assert!(matches!(
        morton_subsample(&cloud, &SubsampleParams::new(4)),
        Err(SubsampleError::TargetExceedsCloud { target: 4, total: 3 })
    ));
    assert_eq!(cloud, before);

    let mut broken = cloud.clone();
    broken.colors.as_mut().unwrap().r.pop();
    let broken_before = broken.clone();
    assert!(matches!(
        morton_subsample(&broken, &SubsampleParams::new(1)),
        Err(SubsampleError::Schema(_))
    ));
    assert_eq!(broken, broken_before);

    let mut non_finite = cloud.clone();
    non_finite.y[1] = f32::NAN;
    assert!(morton_subsample(&non_finite, &SubsampleParams::new(1)).is_err());
    assert!(non_finite.y[1].is_nan());
    assert_eq!(non_finite.x, before.x);
    assert_eq!(non_finite.colors, before.colors);
}

#[test]
fn bits_bounds() {
    let cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]);
    for bits in [0, 22, u32::MAX] {
        assert_eq!(
            morton_subsample(&cloud, &SubsampleParams::new(1).with_bits(bits)),
            Err(SubsampleError::InvalidBits { bits })
        );
    }
    for bits in [1, 21] {
        assert!(morton_subsample(&cloud, &SubsampleParams::new(2).with_bits(bits)).is_ok());
    }
}

// ────────────────── PLY ──────────────────

#[test]
fn ply_garbage_input() {
    let inputs: [&[u8]; 5] = [
        b"",
        b"ply",
        b"\xff\xfe\x00\x01",
        b"ply\nformat ascii 1.0\nelement vertex 18446744073709551615\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
        b"ply\nformat binary_little_endian 1.0\nelement vertex 4611686018427387904\nproperty double x\nproperty double y\nproperty double z\nend_header\n",
    ];
    for data in inputs {
        assert!(read_ply_bytes(data).is_err());
    }
}

#[test]
fn ply_ascii_with_bad_token() {
    let data = b"ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\n\
property float z\nend_header\n1 2 3\n4 five 6\n";
    assert!(matches!(
        read_ply_bytes(data),
        Err(PlyError::Parse { index: 1, .. })
    ));
}

#[test]
fn ply_nan_positions_survive_the_writer() {
    let cloud = PointCloud::from_xyz(vec![f32::NAN], vec![f32::INFINITY], vec![0.0]);
    let mut out = Vec::new();
    write_ply_to(&mut out, &cloud, PlyFormat::BinaryBigEndian).unwrap();
    let back = read_ply_bytes(&out).unwrap();
    assert!(back.x[0].is_nan());
    assert_eq!(back.y[0], f32::INFINITY);
    assert!(back.validate().is_err());
}

// ────────────────── COLMAP ──────────────────

#[test]
fn points3d_without_colors() {
    let cloud = PointCloud::from_xyz(vec![1.0], vec![2.0], vec![3.0]);
    let mut out = Vec::new();
    assert!(matches!(
        write_points3d_to(&mut out, &cloud),
        Err(ColmapError::MissingColors)
    ));
    assert!(out.is_empty());
}
