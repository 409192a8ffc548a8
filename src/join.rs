use crate::types::RateRecord;
use std::collections::HashMap;

/// Missouri. Every county code in the boundary file is a 3-character suffix
/// of a FIPS identifier beginning with this prefix.
pub const STATE_FIPS: &str = "29";

/// Derive the full 5-digit FIPS identifier from a boundary feature's
/// 3-character county code.
pub fn full_fips(county_code: &str) -> String {
    format!("{}{}", STATE_FIPS, county_code)
}

/// Mapping from full FIPS identifier to food-insecurity rate. Built once
/// after both inputs load, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RateIndex {
    map: HashMap<String, f64>,
}

impl RateIndex {
    /// Numeric coercion of each record's rate text. Non-numeric text becomes
    /// NaN and is still inserted, so a malformed row is visible downstream as
    /// an invalid lookup rather than silently dropped. Duplicate identifiers
    /// overwrite: last record wins.
    pub fn build(records: &[RateRecord]) -> Self {
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            let rate: f64 = record.rate_text.trim().parse().unwrap_or(f64::NAN);
            map.insert(record.fips.clone(), rate);
        }
        RateIndex { map }
    }

    /// Lookup by full FIPS identifier. `None` means the identifier is absent;
    /// a present-but-NaN value (malformed source text) is returned as stored.
    pub fn rate(&self, fips: &str) -> Option<f64> {
        self.map.get(fips).copied()
    }

    /// (min, max) over the finite rates only. `None` if no rate is finite.
    pub fn domain(&self) -> Option<(f64, f64)> {
        let mut extent: Option<(f64, f64)> = None;
        for &rate in self.map.values() {
            if !rate.is_finite() {
                continue;
            }
            extent = Some(match extent {
                Some((min, max)) => (min.min(rate), max.max(rate)),
                None => (rate, rate),
            });
        }
        extent
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}
