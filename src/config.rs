use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// County boundary file (.geojson/.json or .shp)
    pub boundaries: PathBuf,
    pub rates_csv: PathBuf,
    /// Feature property holding the 3-character county code
    pub code_property: String,
    /// CSV column holding the full 5-digit FIPS identifier
    pub fips_column: String,
    pub rate_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    /// Default viewport; the serve mode can override per request.
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub svg_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
