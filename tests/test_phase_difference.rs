use approx::assert_abs_diff_eq;
use ifgdiff::core::{to_complex_phase, wrapped_difference};
use ifgdiff::{phase_difference, phase_difference_masked, GeoTransform, PhaseRaster, SarError};
use ndarray::Array2;
use std::f32::consts::PI;

fn phase_ramp(rows: usize, cols: usize, slope: f32, offset: f32) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let raw = offset + slope * (i * cols + j) as f32;
        // wrap into [-π, π] the way an interferogram stores phase
        (raw + PI).rem_euclid(2.0 * PI) - PI
    })
}

#[test]
fn test_double_difference_of_ramps() {
    let reference = phase_ramp(64, 48, 0.37, 0.0);
    let secondary = phase_ramp(64, 48, 0.37, 1.0);

    let diff = phase_difference(&reference, &secondary).expect("Failed to compute difference");
    assert_eq!(diff.dim(), (64, 48));

    // A constant offset between the two ramps survives every wrap
    for &d in diff.iter() {
        assert_abs_diff_eq!(d, -1.0, epsilon = 1e-4);
    }
}

#[test]
fn test_difference_is_antisymmetric() {
    let a = phase_ramp(16, 16, 0.91, -2.0);
    let b = phase_ramp(16, 16, -0.43, 0.5);

    let ab = phase_difference(&a, &b).unwrap();
    let ba = phase_difference(&b, &a).unwrap();
    for (x, y) in ab.iter().zip(ba.iter()) {
        // ±π are the same angle, so compare through the wrap
        assert_abs_diff_eq!(wrapped_difference(*x, -*y), 0.0, epsilon = 1e-5);
    }
}

#[test]
fn test_matches_complex_product() {
    let a = phase_ramp(8, 8, 0.77, 0.3);
    let b = phase_ramp(8, 8, 0.21, -1.2);

    let za = to_complex_phase(&a);
    let zb = to_complex_phase(&b);
    let expected = Array2::from_shape_fn(a.dim(), |idx| (za[idx] * zb[idx].conj()).arg());

    let diff = phase_difference(&a, &b).unwrap();
    for (d, e) in diff.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*d, *e, epsilon = 1e-6);
    }
}

#[test]
fn test_works_on_views() {
    let a = phase_ramp(10, 10, 0.5, 0.0);
    let b = phase_ramp(10, 10, 0.5, 0.0);
    let diff = phase_difference(&a.slice(ndarray::s![2..6, ..]), &b.slice(ndarray::s![2..6, ..])).unwrap();
    assert_eq!(diff.dim(), (4, 10));
    assert!(diff.iter().all(|d| d.abs() < 1e-6));
}

#[test]
fn test_mismatched_rasters_fail() {
    let gt = GeoTransform::north_up(-150_000.0, -950_000.0, 5.0);
    let reference = PhaseRaster::new(Array2::zeros((10, 12)), gt);
    let secondary = PhaseRaster::new(Array2::zeros((10, 11)), gt);

    let err = phase_difference_masked(&reference, &secondary).unwrap_err();
    assert!(matches!(err, SarError::ShapeMismatch { .. }));
    println!("Shape mismatch reported as: {}", err);
}
