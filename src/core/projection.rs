//! North polar stereographic projection on the WGS84 ellipsoid
//!
//! Formulas follow Snyder (1987), USGS Prof. Paper 1395, pp. 154-163,
//! using the "standard parallel" variant (true scale at `lat_ts`).

use crate::types::BoundingBox;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// WGS84 semi-major axis (m)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// North polar stereographic projection
#[derive(Debug, Clone, Copy)]
pub struct PolarStereographic {
    /// Central meridian (degrees)
    pub central_longitude: f64,
    /// Latitude of true scale (degrees)
    pub true_scale_latitude: f64,
    a: f64,
    e: f64,
    // a * m_c / t_c, precomputed
    rho_scale: f64,
}

impl PolarStereographic {
    pub fn new(central_longitude: f64, true_scale_latitude: f64) -> Self {
        let a = WGS84_A;
        let e = (WGS84_F * (2.0 - WGS84_F)).sqrt();
        let phi_c = true_scale_latitude.to_radians();
        let m_c = Self::m(phi_c, e);
        let t_c = Self::t(phi_c, e);
        Self {
            central_longitude,
            true_scale_latitude,
            a,
            e,
            rho_scale: a * m_c / t_c,
        }
    }

    /// NSIDC Sea Ice Polar Stereographic North (EPSG:3413)
    pub fn epsg_3413() -> Self {
        Self::new(-45.0, 70.0)
    }

    /// (lon, lat) in degrees to projected (x, y) in metres
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let dlambda = (lon - self.central_longitude).to_radians();
        let rho = self.rho_scale * Self::t(phi, self.e);
        (rho * dlambda.sin(), -rho * dlambda.cos())
    }

    /// Projected (x, y) in metres to (lon, lat) in degrees
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let rho = x.hypot(y);
        if rho == 0.0 {
            return (self.central_longitude, 90.0);
        }
        let t = rho / self.rho_scale;
        let chi = FRAC_PI_2 - 2.0 * t.atan();

        let e2 = self.e * self.e;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let e8 = e4 * e4;
        let phi = chi
            + (e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0) * (2.0 * chi).sin()
            + (7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0) * (4.0 * chi).sin()
            + (7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0) * (6.0 * chi).sin()
            + (4279.0 * e8 / 161_280.0) * (8.0 * chi).sin();

        let lambda = self.central_longitude.to_radians() + x.atan2(-y);
        (normalize_longitude(lambda.to_degrees()), phi.to_degrees())
    }

    /// Point scale factor at latitude `lat` (degrees)
    pub fn scale_factor(&self, lat: f64) -> f64 {
        let phi = lat.to_radians();
        let rho = self.rho_scale * Self::t(phi, self.e);
        rho / (self.a * Self::m(phi, self.e))
    }

    /// Projected extent (x_min, x_max, y_min, y_max) enclosing a lon/lat box
    ///
    /// The box edges are densified because meridians and parallels are curved
    /// in this projection.
    pub fn project_bbox(&self, bbox: &BoundingBox) -> (f64, f64, f64, f64) {
        const STEPS: usize = 64;
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for k in 0..=STEPS {
            let f = k as f64 / STEPS as f64;
            let lon = bbox.min_lon + f * (bbox.max_lon - bbox.min_lon);
            let lat = bbox.min_lat + f * (bbox.max_lat - bbox.min_lat);
            for (lo, la) in [
                (lon, bbox.min_lat),
                (lon, bbox.max_lat),
                (bbox.min_lon, lat),
                (bbox.max_lon, lat),
            ] {
                let (x, y) = self.forward(lo, la);
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }

        (x_min, x_max, y_min, y_max)
    }

    // Snyder eq. 14-15
    fn m(phi: f64, e: f64) -> f64 {
        let s = phi.sin();
        phi.cos() / (1.0 - e * e * s * s).sqrt()
    }

    // Snyder eq. 15-9
    fn t(phi: f64, e: f64) -> f64 {
        let s = phi.sin();
        (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - e * s) / (1.0 + e * s)).powf(e / 2.0)
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    let mut l = (lon + 180.0) % 360.0;
    if l < 0.0 {
        l += 360.0;
    }
    l - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pole_maps_to_origin() {
        let proj = PolarStereographic::epsg_3413();
        let (x, y) = proj.forward(10.0, 90.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);
        let (_, lat) = proj.inverse(0.0, 0.0);
        assert_eq!(lat, 90.0);
    }

    #[test]
    fn test_central_meridian_points_down() {
        let proj = PolarStereographic::epsg_3413();
        let (x, y) = proj.forward(-45.0, 75.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
        assert!(y < 0.0);

        // 45 degrees east of the central meridian lies on the x = -y diagonal
        let (x, y) = proj.forward(0.0, 75.0);
        assert_abs_diff_eq!(x, -y, epsilon = 1e-6);
    }

    #[test]
    fn test_true_scale_latitude() {
        let proj = PolarStereographic::epsg_3413();
        assert_abs_diff_eq!(proj.scale_factor(70.0), 1.0, epsilon = 1e-12);
        assert!(proj.scale_factor(85.0) < 1.0);
    }

    #[test]
    fn test_forward_inverse() {
        let proj = PolarStereographic::epsg_3413();
        for &(lon, lat) in &[(-60.5, 80.8), (-61.1, 80.4), (120.0, 65.0), (-179.0, 89.0)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert_abs_diff_eq!(lon2, lon, epsilon = 1e-8);
            assert_abs_diff_eq!(lat2, lat, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_bbox_contains_corners() {
        let proj = PolarStereographic::epsg_3413();
        let bbox = BoundingBox {
            min_lon: -61.1,
            max_lon: -59.9,
            min_lat: 80.4,
            max_lat: 81.2,
        };
        let (x_min, x_max, y_min, y_max) = proj.project_bbox(&bbox);
        let (x, y) = proj.forward(-60.5, 80.8);
        assert!(x > x_min && x < x_max);
        assert!(y > y_min && y < y_max);
    }
}
