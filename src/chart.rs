use crate::join::{full_fips, RateIndex};
use crate::projection::Projection;
use crate::render;
use crate::scale::QuantizeScale;
use crate::types::CountyFeature;
use rayon::prelude::*;

/// Symmetric margin around the draw area, in pixels.
pub const MARGIN: f64 = 10.0;

/// One drawable shape per county feature. Created once in the append phase
/// and mutated in place by every update; never recreated.
#[derive(Debug, Clone)]
pub struct CountyShape {
    pub code: String,
    pub fips: String,
    pub path_data: String,
    pub fill: &'static str,
}

/// All chart state in one place: loaded data, current viewport, and the
/// derived projection, scale and shapes. Mutated only by `resize`.
pub struct Chart {
    counties: Vec<CountyFeature>,
    rates: RateIndex,
    width: f64,
    height: f64,
    draw_width: f64,
    draw_height: f64,
    projection: Projection,
    scale: QuantizeScale,
    shapes: Vec<CountyShape>,
}

impl Chart {
    /// Append phase: bind one shape per feature, stable order, full FIPS
    /// derived up front. Then run the first update.
    pub fn new(counties: Vec<CountyFeature>, rates: RateIndex, width: f64, height: f64) -> Self {
        let shapes = counties
            .iter()
            .map(|county| CountyShape {
                code: county.code.clone(),
                fips: full_fips(&county.code),
                path_data: String::new(),
                fill: crate::scale::FALLBACK_FILL,
            })
            .collect();

        let mut chart = Chart {
            counties,
            rates,
            width,
            height,
            draw_width: 1.0,
            draw_height: 1.0,
            projection: Projection::fit_size(1.0, 1.0, &[]),
            scale: QuantizeScale::new(None),
            shapes,
        };
        chart.update();
        chart
    }

    /// One resize event: re-run layout then the update phase, synchronously.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.update();
    }

    /// Update phase: recompute dimensions, projection and scale, then reflow
    /// every shape's path data and fill. Idempotent for a fixed viewport.
    fn update(&mut self) {
        self.set_dimensions();
        self.set_scales();
        self.update_shapes();
    }

    fn set_dimensions(&mut self) {
        self.draw_width = (self.width - 2.0 * MARGIN).max(1.0);
        self.draw_height = (self.height - 2.0 * MARGIN).max(1.0);
    }

    fn set_scales(&mut self) {
        self.projection = Projection::fit_size(self.draw_width, self.draw_height, &self.counties);
        self.scale = QuantizeScale::new(self.rates.domain());
    }

    fn update_shapes(&mut self) {
        let projection = &self.projection;
        let scale = &self.scale;
        let rates = &self.rates;
        let counties = &self.counties;
        self.shapes
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, shape)| {
                shape.path_data = render::path_data(projection, &counties[i].geometry);
                shape.fill = scale.fill(rates.rate(&shape.fips));
            });
    }

    pub fn shapes(&self) -> &[CountyShape] {
        &self.shapes
    }

    pub fn counties(&self) -> &[CountyFeature] {
        &self.counties
    }

    pub fn rates(&self) -> &RateIndex {
        &self.rates
    }

    /// Full surface size: draw area plus margins on all sides.
    pub fn surface_size(&self) -> (f64, f64) {
        (
            self.draw_width + 2.0 * MARGIN,
            self.draw_height + 2.0 * MARGIN,
        )
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{FALLBACK_FILL, SCHEME_BLUES_9};
    use crate::types::RateRecord;
    use geo::{polygon, MultiPolygon};

    fn county(code: &str, origin: f64) -> CountyFeature {
        let geometry = MultiPolygon::new(vec![polygon![
            (x: -93.0 + origin, y: 38.0),
            (x: -92.5 + origin, y: 38.0),
            (x: -92.5 + origin, y: 38.5),
            (x: -93.0 + origin, y: 38.5),
            (x: -93.0 + origin, y: 38.0),
        ]]);
        CountyFeature {
            code: code.to_string(),
            geometry,
        }
    }

    fn record(fips: &str, rate_text: &str) -> RateRecord {
        RateRecord {
            fips: fips.to_string(),
            rate_text: rate_text.to_string(),
        }
    }

    fn sample_chart() -> Chart {
        let counties = vec![county("003", 0.0), county("510", 1.0)];
        let rates = RateIndex::build(&[record("29003", "12.5"), record("29510", "abc")]);
        Chart::new(counties, rates, 800.0, 600.0)
    }

    #[test]
    fn joined_county_gets_a_blue_shade_and_malformed_gets_fallback() {
        let chart = sample_chart();
        let by_code = |code: &str| chart.shapes().iter().find(|s| s.code == code).unwrap();
        assert!(SCHEME_BLUES_9.contains(&by_code("003").fill));
        assert_eq!(by_code("510").fill, FALLBACK_FILL);
    }

    #[test]
    fn absent_identifier_gets_fallback() {
        let counties = vec![county("003", 0.0), county("777", 1.0)];
        let rates = RateIndex::build(&[record("29003", "12.5")]);
        let chart = Chart::new(counties, rates, 800.0, 600.0);
        let orphan = chart.shapes().iter().find(|s| s.code == "777").unwrap();
        assert_eq!(orphan.fips, "29777");
        assert_eq!(orphan.fill, FALLBACK_FILL);
    }

    #[test]
    fn resize_reflows_shapes_without_recreating_them() {
        let mut chart = sample_chart();
        let before: Vec<(String, String)> = chart
            .shapes()
            .iter()
            .map(|s| (s.code.clone(), s.path_data.clone()))
            .collect();

        chart.resize(400.0, 300.0);

        assert_eq!(chart.shapes().len(), before.len());
        for (shape, (code, old_path)) in chart.shapes().iter().zip(&before) {
            // Same binding order, new projected coordinates.
            assert_eq!(&shape.code, code);
            assert_ne!(&shape.path_data, old_path);
        }
        assert_eq!(chart.surface_size(), (400.0, 300.0));
    }

    #[test]
    fn surface_size_is_draw_area_plus_margins() {
        let chart = sample_chart();
        assert_eq!(chart.surface_size(), (800.0, 600.0));
    }

    #[test]
    fn degenerate_viewport_clamps_instead_of_panicking() {
        let mut chart = sample_chart();
        chart.resize(0.0, 0.0);
        assert_eq!(chart.surface_size(), (1.0 + 2.0 * MARGIN, 1.0 + 2.0 * MARGIN));
        for shape in chart.shapes() {
            assert!(!shape.path_data.is_empty());
        }
    }

    #[test]
    fn update_is_idempotent_for_a_fixed_viewport() {
        let mut chart = sample_chart();
        let first = crate::render::svg_document(&chart);
        chart.resize(800.0, 600.0);
        let second = crate::render::svg_document(&chart);
        assert_eq!(first, second);
    }
}
