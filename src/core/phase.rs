use crate::types::{PhaseRaster, SarComplex, SarError, SarImage, SarRealImage, SarResult};
use ndarray::{ArrayBase, Data, Ix2, Zip};
use num_complex::Complex;
use num_traits::Float;

/// Wrap a phase value into [-π, π] through its complex phasor
pub fn wrap_phase<T: Float>(phase: T) -> T {
    Complex::from_polar(T::one(), phase).arg()
}

/// Wrapped difference of two phase samples: angle(e^{ia} · conj(e^{ib}))
#[inline]
pub fn wrapped_difference<T: Float>(a: T, b: T) -> T {
    let pa = Complex::from_polar(T::one(), a);
    let pb = Complex::from_polar(T::one(), b);
    (pa * pb.conj()).arg()
}

/// Convert interferometric phase [-π, π] to unit phasors (complex polar format)
pub fn to_complex_phase<S>(phase: &ArrayBase<S, Ix2>) -> SarImage
where
    S: Data<Elem = f32>,
{
    phase.mapv(|theta| SarComplex::from_polar(1.0, theta))
}

/// Compute the double-difference interferogram of two coregistered phase arrays
///
/// The difference is taken in the complex domain so that values crossing
/// the ±π branch cut wrap correctly instead of jumping by 2π.
pub fn phase_difference<S1, S2>(
    reference: &ArrayBase<S1, Ix2>,
    secondary: &ArrayBase<S2, Ix2>,
) -> SarResult<SarRealImage>
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    check_shape(reference.dim(), secondary.dim())?;

    let zip = Zip::from(reference).and(secondary);

    #[cfg(feature = "parallel")]
    let diff = zip.par_map_collect(|&a, &b| wrapped_difference(a, b));
    #[cfg(not(feature = "parallel"))]
    let diff = zip.map_collect(|&a, &b| wrapped_difference(a, b));

    Ok(diff)
}

/// Double difference of two rasters, with no-data pixels of either input set to NaN
pub fn phase_difference_masked(
    reference: &PhaseRaster,
    secondary: &PhaseRaster,
) -> SarResult<SarRealImage> {
    check_shape(reference.shape(), secondary.shape())?;

    if reference.geo_transform != secondary.geo_transform {
        log::warn!(
            "Interferograms are not on the same grid: {:?} vs {:?}",
            reference.geo_transform,
            secondary.geo_transform
        );
    }

    let mut diff = phase_difference(&reference.data, &secondary.data)?;

    let mut masked = 0usize;
    Zip::from(&mut diff)
        .and(&reference.data)
        .and(&secondary.data)
        .for_each(|d, &a, &b| {
            if reference.is_nodata(a) || secondary.is_nodata(b) {
                *d = f32::NAN;
                masked += 1;
            }
        });

    if masked > 0 {
        let total = diff.len();
        log::info!(
            "Masked {} no-data pixels ({:.2}%)",
            masked,
            100.0 * masked as f64 / total as f64
        );
    }

    Ok(diff)
}

fn check_shape(expected: (usize, usize), found: (usize, usize)) -> SarResult<()> {
    if expected != found {
        return Err(SarError::ShapeMismatch { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoTransform;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use std::f32::consts::PI;

    #[test]
    fn test_identical_inputs_give_zero() {
        let theta = array![[-3.0f32, -1.5, 0.0], [0.5, 2.0, 3.1]];
        let diff = phase_difference(&theta, &theta).unwrap();
        for &d in diff.iter() {
            assert_abs_diff_eq!(d, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_branch_cut_wraps() {
        let a = array![[PI - 0.01]];
        let b = array![[-PI + 0.01]];
        let diff = phase_difference(&a, &b).unwrap();
        // Naive subtraction gives ~2π - 0.02
        assert_abs_diff_eq!(diff[[0, 0]], -0.02, epsilon = 1e-5);

        let diff = phase_difference(&b, &a).unwrap();
        assert_abs_diff_eq!(diff[[0, 0]], 0.02, epsilon = 1e-5);
    }

    #[test]
    fn test_result_stays_in_range() {
        let n = 41;
        let step = 2.0 * PI / (n - 1) as f32;
        let a = Array2::from_shape_fn((n, n), |(i, _)| -PI + i as f32 * step);
        let b = Array2::from_shape_fn((n, n), |(_, j)| -PI + j as f32 * step);
        let diff = phase_difference(&a, &b).unwrap();
        for &d in diff.iter() {
            assert!(d >= -PI - 1e-6 && d <= PI + 1e-6, "out of range: {}", d);
        }
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let a = Array2::<f32>::zeros((3, 4));
        let b = Array2::<f32>::zeros((4, 3));
        match phase_difference(&a, &b) {
            Err(SarError::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, (3, 4));
                assert_eq!(found, (4, 3));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_complex_phase_is_unit() {
        let theta = array![[0.0f32, PI / 2.0], [PI, -PI / 2.0]];
        let phasors = to_complex_phase(&theta);
        for (z, &t) in phasors.iter().zip(theta.iter()) {
            assert_abs_diff_eq!(z.norm(), 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(wrap_phase(z.arg() - t), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_wrap_phase() {
        assert_abs_diff_eq!(wrap_phase(3.0 * std::f64::consts::PI / 2.0), -std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_phase(0.25f64), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_masked_difference_sets_nan() {
        let gt = GeoTransform::north_up(0.0, 0.0, 5.0);
        let mut reference = PhaseRaster::new(array![[0.5f32, -9999.0], [1.0, 1.0]], gt);
        reference.nodata = Some(-9999.0);
        let secondary = PhaseRaster::new(array![[0.25f32, 0.0], [f32::NAN, 0.5]], gt);

        let diff = phase_difference_masked(&reference, &secondary).unwrap();
        assert_abs_diff_eq!(diff[[0, 0]], 0.25, epsilon = 1e-6);
        assert!(diff[[0, 1]].is_nan());
        assert!(diff[[1, 0]].is_nan());
        assert_abs_diff_eq!(diff[[1, 1]], 0.5, epsilon = 1e-6);
    }
}
