use crate::types::CountyFeature;
use geo::CoordsIter;
use std::f64::consts::FRAC_PI_2;

/// Missouri Central State Plane rotation 92°30'W, 35°50'N (NAD83 / EPSG:26997
/// parameters, expressed as a spherical rotation).
pub const ROTATE_LON: f64 = 92.0 + 30.0 / 60.0;
pub const ROTATE_LAT: f64 = -(35.0 + 50.0 / 60.0);

/// The transverse Mercator family carries an implicit extra 90° gamma roll;
/// without it the state renders on its side.
const ROTATE_GAMMA: f64 = 90.0;

/// Transverse Mercator projection with a fixed rotation, fitted to the full
/// boundary collection extent so the state fills a given width x height
/// exactly, uniformly scaled and centered, origin at (0, 0). Rebuilt from
/// scratch on every resize.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    delta_lambda: f64,
    cos_dphi: f64,
    sin_dphi: f64,
    cos_dgamma: f64,
    sin_dgamma: f64,
    scale: f64,
    translate: (f64, f64),
}

impl Projection {
    pub fn fit_size(width: f64, height: f64, counties: &[CountyFeature]) -> Self {
        // A detached container yields zero or negative dimensions; clamp so
        // the fit stays finite instead of crashing.
        let width = width.max(1.0);
        let height = height.max(1.0);

        let mut projection = Projection {
            delta_lambda: ROTATE_LON.to_radians(),
            cos_dphi: ROTATE_LAT.to_radians().cos(),
            sin_dphi: ROTATE_LAT.to_radians().sin(),
            cos_dgamma: ROTATE_GAMMA.to_radians().cos(),
            sin_dgamma: ROTATE_GAMMA.to_radians().sin(),
            scale: 1.0,
            translate: (0.0, 0.0),
        };

        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for county in counties {
            for coord in county.geometry.coords_iter() {
                let (x, y) = projection.planar(coord.x, coord.y);
                min.0 = min.0.min(x);
                min.1 = min.1.min(y);
                max.0 = max.0.max(x);
                max.1 = max.1.max(y);
            }
        }
        if min.0 > max.0 {
            // No coordinates at all; identity fit.
            return projection;
        }

        let span_x = (max.0 - min.0).max(f64::EPSILON);
        let span_y = (max.1 - min.1).max(f64::EPSILON);
        let k = (width / span_x).min(height / span_y);
        projection.scale = k;
        projection.translate = (
            (width - k * (min.0 + max.0)) / 2.0,
            (height - k * (min.1 + max.1)) / 2.0,
        );
        projection
    }

    /// Geographic degrees to pixel coordinates in the draw area.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.planar(lon, lat);
        (
            self.scale * x + self.translate.0,
            self.scale * y + self.translate.1,
        )
    }

    /// Rotate then project, unscaled, with the y axis already flipped to
    /// screen orientation.
    fn planar(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (lambda, phi) = self.rotate(lon.to_radians(), lat.to_radians());
        let x = ((FRAC_PI_2 + phi) / 2.0).tan().ln();
        let y = -lambda;
        (x, -y)
    }

    /// Spherical rotation by (delta lambda, delta phi, delta gamma).
    fn rotate(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let lambda = lambda + self.delta_lambda;
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * self.cos_dphi + x * self.sin_dphi;
        let lambda2 =
            (y * self.cos_dgamma - k * self.sin_dgamma).atan2(x * self.cos_dphi - z * self.sin_dphi);
        let phi2 = (k * self.cos_dgamma + y * self.sin_dgamma).clamp(-1.0, 1.0).asin();
        (lambda2, phi2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square() -> Vec<CountyFeature> {
        // Roughly central Missouri.
        let geometry = MultiPolygon::new(vec![polygon![
            (x: -93.0, y: 38.0),
            (x: -92.0, y: 38.0),
            (x: -92.0, y: 39.0),
            (x: -93.0, y: 39.0),
            (x: -93.0, y: 38.0),
        ]]);
        vec![CountyFeature {
            code: "000".to_string(),
            geometry,
        }]
    }

    #[test]
    fn fitted_extent_stays_inside_the_draw_area() {
        let counties = square();
        let projection = Projection::fit_size(780.0, 580.0, &counties);
        for coord in counties[0].geometry.coords_iter() {
            let (x, y) = projection.project(coord.x, coord.y);
            assert!(x >= -1e-6 && x <= 780.0 + 1e-6, "x out of bounds: {x}");
            assert!(y >= -1e-6 && y <= 580.0 + 1e-6, "y out of bounds: {y}");
        }
    }

    #[test]
    fn fit_is_centered_on_the_shorter_axis() {
        let counties = square();
        let projection = Projection::fit_size(780.0, 580.0, &counties);
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for coord in counties[0].geometry.coords_iter() {
            let (x, y) = projection.project(coord.x, coord.y);
            min.0 = min.0.min(x);
            min.1 = min.1.min(y);
            max.0 = max.0.max(x);
            max.1 = max.1.max(y);
        }
        // One axis spans the draw area fully; the other is centered.
        let fills_x = (max.0 - min.0 - 780.0).abs() < 1e-6;
        let fills_y = (max.1 - min.1 - 580.0).abs() < 1e-6;
        assert!(fills_x || fills_y);
        if fills_x {
            assert!((min.1 + max.1 - 580.0).abs() < 1e-6);
        } else {
            assert!((min.0 + max.0 - 780.0).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_draw_area_does_not_panic() {
        let counties = square();
        let projection = Projection::fit_size(0.0, -20.0, &counties);
        let (x, y) = projection.project(-92.5, 38.5);
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn empty_collection_projects_finite_points() {
        let projection = Projection::fit_size(800.0, 600.0, &[]);
        let (x, y) = projection.project(-92.0, 38.0);
        assert!(x.is_finite() && y.is_finite());
    }
}
