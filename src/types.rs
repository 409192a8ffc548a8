use geo::MultiPolygon;

/// One county polygon from the boundary file, tagged with its 3-character
/// county code (e.g. "003"). Immutable after load.
#[derive(Debug, Clone)]
pub struct CountyFeature {
    pub code: String,
    pub geometry: MultiPolygon<f64>,
}

/// One row of the rate table: a full 5-digit FIPS identifier (e.g. "29003")
/// and the rate field as raw text. Numeric coercion belongs to the joiner,
/// so malformed text survives to that stage intact.
#[derive(Debug, Clone)]
pub struct RateRecord {
    pub fips: String,
    pub rate_text: String,
}
