use crate::config::AppConfig;
use crate::types::{CountyFeature, RateRecord};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use std::fs::File;
use std::io::BufReader;

/// Load both inputs concurrently; the first failure aborts the whole
/// initialization with no partial state and no retry.
pub async fn load_data(config: &AppConfig) -> Result<(Vec<CountyFeature>, Vec<RateRecord>)> {
    println!("Loading data...");

    let boundary_config = config.clone();
    let rates_config = config.clone();
    let (counties, rates) = tokio::try_join!(
        tokio::task::spawn_blocking(move || load_counties(&boundary_config)),
        tokio::task::spawn_blocking(move || load_rates(&rates_config)),
    )?;
    let counties = counties?;
    let rates = rates?;

    println!(
        "Loaded {} county features and {} rate records",
        counties.len(),
        rates.len()
    );
    Ok((counties, rates))
}

pub fn load_counties(config: &AppConfig) -> Result<Vec<CountyFeature>> {
    let extension = config
        .input
        .boundaries
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Boundary file has no extension"))?;

    match extension.as_str() {
        "json" | "geojson" => load_geojson_counties(config),
        "shp" => load_shapefile_counties(config),
        _ => Err(anyhow!("Unsupported boundary format: {}", extension)),
    }
}

fn load_geojson_counties(config: &AppConfig) -> Result<Vec<CountyFeature>> {
    use geojson::GeoJson;

    let file = File::open(&config.input.boundaries)
        .with_context(|| format!("Failed to open boundary file: {:?}", config.input.boundaries))?;
    let reader = BufReader::new(file);

    let geojson = GeoJson::from_reader(reader).context("Failed to parse boundary GeoJSON")?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Boundary GeoJSON must be a FeatureCollection")),
    };

    let mut counties = Vec::new();
    for feature in collection.features {
        let code_val = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(&config.input.code_property));
        let code = match code_val {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => continue, // Skip features with no usable code
        };

        let geometry = match feature.geometry {
            Some(geom) => {
                let valid_geo: geo::Geometry<f64> = geom
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;
                match valid_geo {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // Skip points/lines
                }
            }
            None => continue,
        };

        counties.push(CountyFeature { code, geometry });
    }

    Ok(counties)
}

fn load_shapefile_counties(config: &AppConfig) -> Result<Vec<CountyFeature>> {
    let mut reader = shapefile::Reader::from_path(&config.input.boundaries)
        .with_context(|| format!("Failed to open Shapefile: {:?}", config.input.boundaries))?;

    let mut counties = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let code_value = record.get(&config.input.code_property).ok_or_else(|| {
            anyhow!(
                "Code field '{}' not found in Shapefile",
                config.input.code_property
            )
        })?;
        let code = match code_value {
            shapefile::dbase::FieldValue::Character(Some(s)) => s.clone(),
            shapefile::dbase::FieldValue::Character(None) => continue,
            shapefile::dbase::FieldValue::Numeric(Some(n)) => format!("{:03}", *n as u32),
            _ => return Err(anyhow!("Shapefile code field must be a string or number")),
        };

        let geometry = match shape {
            shapefile::Shape::Polygon(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?;
                geo_polygon
            }
            shapefile::Shape::PolygonM(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?;
                geo_polygon
            }
            shapefile::Shape::PolygonZ(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?;
                geo_polygon
            }
            _ => continue, // Skip non-polygon shapes
        };

        counties.push(CountyFeature { code, geometry });
    }

    Ok(counties)
}

/// Read the rate table in row order, keeping the rate field as raw text.
pub fn load_rates(config: &AppConfig) -> Result<Vec<RateRecord>> {
    let file = File::open(&config.input.rates_csv)
        .with_context(|| format!("Failed to open CSV file: {:?}", config.input.rates_csv))?;
    let mut rdr = ReaderBuilder::new().from_reader(file);
    let headers = rdr.headers()?.clone();

    let fips_idx = headers
        .iter()
        .position(|h| h == config.input.fips_column)
        .ok_or_else(|| anyhow!("FIPS column '{}' not found in CSV", config.input.fips_column))?;
    let rate_idx = headers
        .iter()
        .position(|h| h == config.input.rate_column)
        .ok_or_else(|| anyhow!("Rate column '{}' not found in CSV", config.input.rate_column))?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let fips = record.get(fips_idx).unwrap_or("").to_string();
        if fips.is_empty() {
            continue;
        }
        let rate_text = record.get(rate_idx).unwrap_or("").to_string();
        records.push(RateRecord { fips, rate_text });
    }

    Ok(records)
}
