//! Georeferencing CLI.
//!
//! Fits a thin plate spline from the control points in a YAML config and:
//! - prints the fitted coefficients and diagnostics
//! - transforms map coordinates into image space
//! - evaluates the warp over a render window

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use georef_common::BoundingBox;
use tracing::{error, info};

use georef::{commands, config, logging};

#[derive(Parser, Debug)]
#[command(name = "georef")]
#[command(about = "Thin plate spline georeferencing for map overlays")]
struct Args {
    /// Georeference config file (YAML)
    #[arg(short, long, env = "GEOREF_CONFIG", default_value = "georef.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, env = "GEOREF_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the warp and print coefficients as JSON
    Fit,

    /// Transform `x,y` points (read from stdin when none are given)
    Transform {
        /// Map image coordinates back to the map (identity for now)
        #[arg(long)]
        inverse: bool,

        #[arg(allow_hyphen_values = true)]
        points: Vec<String>,
    },

    /// Evaluate the warp at every pixel of a map-space window
    Grid {
        /// Window as minx,miny,maxx,maxy
        #[arg(long, allow_hyphen_values = true)]
        bbox: String,

        #[arg(long, default_value = "256")]
        width: usize,

        #[arg(long, default_value = "256")]
        height: usize,

        /// Write valid cells to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init(&args.log_level, args.log_json)?;

    let config = config::load_config(&args.config)?;

    match args.command {
        Command::Fit => {
            let report = commands::fit(&config).inspect_err(|e| {
                error!(error = %e, "Fit failed");
            })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Transform { inverse, points } => {
            let queries = if points.is_empty() {
                commands::read_points(io::stdin().lock())?
            } else {
                commands::parse_points(&points)?
            };

            let warp = config.fit()?;
            let out = commands::transform(&warp, &queries, inverse);

            let mut stdout = io::stdout().lock();
            for p in out {
                writeln!(stdout, "{}", p)?;
            }
        }
        Command::Grid {
            bbox,
            width,
            height,
            output,
        } => {
            let bbox = BoundingBox::from_param_string(&bbox)
                .with_context(|| format!("Invalid bbox: {}", bbox))?;
            let report = commands::grid(&config, bbox, width, height, output.as_deref())?;
            info!(valid = report.valid_pixels, "Grid complete");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
