pub mod types;
pub mod config;
pub mod data;
pub mod join;
pub mod projection;
pub mod scale;
pub mod chart;
pub mod render;
pub mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the choropleth map to an SVG file
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the map over HTTP, re-rendering per requested viewport
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { config } => {
            println!("Rendering map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // 1. Load both inputs concurrently
            let (counties, rate_records) = data::load_data(&app_config).await?;

            // 2. Join rates onto the full FIPS identifiers
            let rates = join::RateIndex::build(&rate_records);
            println!("Indexed rates for {} counties", rates.len());

            // 3. Lay out and render
            let chart = chart::Chart::new(
                counties,
                rates,
                app_config.map.width,
                app_config.map.height,
            );
            render::write_svg(&app_config.output.svg_path, &chart)?;

            println!("Render complete!");
        }
        Commands::Serve { config } => {
            println!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let (counties, rate_records) = data::load_data(&app_config).await?;
            let rates = join::RateIndex::build(&rate_records);
            let chart = chart::Chart::new(
                counties,
                rates,
                app_config.map.width,
                app_config.map.height,
            );

            server::start_server(app_config, chart).await?;
        }
    }

    Ok(())
}
