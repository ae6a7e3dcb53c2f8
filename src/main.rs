use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gdp_atlas::{config, data, server, Dashboard};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the map (and optionally one region's trend chart) to SVG files
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Year to color the map by
        #[arg(short, long)]
        year: Option<String>,
        /// Color scheme, e.g. viridis or interpolateViridis
        #[arg(short, long)]
        scale: Option<String>,
        /// Region whose trend chart is also rendered
        #[arg(short, long)]
        region: Option<String>,
        /// Output directory, overrides [output].dir
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Serve the interactive map and chart
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            config,
            year,
            scale,
            region,
            out,
        } => {
            info!("Rendering with config: {:?}", config);
            let app_config = config::AtlasConfig::load_from_file(&config)?;
            let out_dir = out.unwrap_or_else(|| app_config.output.dir.clone());

            // Both inputs must load before anything is drawn.
            let dataset = data::load_dataset(&app_config).await?;
            let mut dashboard = Dashboard::new(dataset, app_config);

            if let Some(scale) = &scale {
                dashboard.set_scheme(scale)?;
            }
            if let Some(year) = &year {
                dashboard.set_year(year)?;
            } else {
                dashboard.redraw_map()?;
            }

            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;
            let map_path = out_dir.join("map.svg");
            fs::write(&map_path, dashboard.map_surface().to_svg())
                .with_context(|| format!("Failed to write {:?}", map_path))?;
            info!("Wrote {:?}", map_path);

            if let Some(region) = &region {
                dashboard.select_region(region)?;
                let chart_path = out_dir.join("linechart.svg");
                fs::write(&chart_path, dashboard.line_surface().to_svg())
                    .with_context(|| format!("Failed to write {:?}", chart_path))?;
                info!("Wrote {:?}", chart_path);
            }

            info!("Render complete");
        }
        Commands::Serve { config } => {
            info!("Serving with config: {:?}", config);
            let app_config = config::AtlasConfig::load_from_file(&config)?;
            let dataset = data::load_dataset(&app_config).await?;
            server::start_server(app_config, dataset).await?;
        }
    }

    Ok(())
}
