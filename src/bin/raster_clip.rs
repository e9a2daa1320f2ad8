//! Clip a raster to the polygons of a shapefile.

use anyhow::{Context, Result};
use clap::Parser;
use ifgdiff::cli::init_logging;
use ifgdiff::clip_raster;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Clip a raster with a cutline shapefile.", long_about = None)]
struct Args {
    /// Input raster
    src: PathBuf,

    /// Cutline shapefile
    cutline: PathBuf,

    /// Output raster
    out: PathBuf,

    /// No-data value outside the cutline
    #[arg(long, default_value_t = -9999.0, allow_hyphen_values = true)]
    dst_nodata: f64,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    clip_raster(&args.src, &args.cutline, &args.out, args.dst_nodata)
        .with_context(|| format!("Failed to clip {}", args.src.display()))?;
    Ok(())
}
