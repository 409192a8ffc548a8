/// ColorBrewer sequential Blues, 9 classes, lightest to darkest.
pub const SCHEME_BLUES_9: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

/// Neutral fill for counties whose identifier misses the rate index or whose
/// rate text was not numeric. Lookup misses must paint this, never throw.
pub const FALLBACK_FILL: &str = "#cccccc";

/// Quantized color scale: partitions [min, max] into 9 equal-width buckets
/// over `SCHEME_BLUES_9`. Darkest color = highest rate. Cheap to rebuild, so
/// the layout pass reconstructs it on every update.
#[derive(Debug, Clone, Copy)]
pub struct QuantizeScale {
    min: f64,
    max: f64,
}

impl QuantizeScale {
    /// Domain comes from `RateIndex::domain`. With no finite rates at all
    /// there is nothing meaningful to quantize; a degenerate [0, 1] domain
    /// keeps the scale total while every real lookup falls back anyway.
    pub fn new(domain: Option<(f64, f64)>) -> Self {
        let (min, max) = domain.unwrap_or((0.0, 1.0));
        QuantizeScale { min, max }
    }

    /// Map a lookup result to a fill color. `None` (identifier missing) and
    /// non-finite (malformed rate text) both take the fallback branch.
    pub fn fill(&self, rate: Option<f64>) -> &'static str {
        match rate {
            Some(value) if value.is_finite() => SCHEME_BLUES_9[self.bucket(value)],
            _ => FALLBACK_FILL,
        }
    }

    fn bucket(&self, value: f64) -> usize {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0;
        }
        let t = (value - self.min) / span;
        // Out-of-domain values clamp to the end buckets.
        (t * SCHEME_BLUES_9.len() as f64)
            .floor()
            .clamp(0.0, (SCHEME_BLUES_9.len() - 1) as f64) as usize
    }
}
