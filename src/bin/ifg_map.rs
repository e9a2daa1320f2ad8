//! Plot an interferogram on a polar stereographic map of the glacier.

use anyhow::{Context, Result};
use clap::Parser;
use ifgdiff::cli::{init_logging, make_dir, parse_directory, DEFAULT_DATA_DIR, DEFAULT_OUTDIR};
use ifgdiff::core::{interferogram_label, raster_file_name};
use ifgdiff::io::read_outlines;
use ifgdiff::{load_raster, save_interferogram_map, MapParams, RasterBackend};
use std::path::PathBuf;
use std::time::Instant;

const DEFAULT_GLACIER_MASK: &str = "./esri_shp/Petermann_Domain_glaciers_epsg3413.shp";

#[derive(Parser, Debug)]
#[command(author, version, about = "Plot an interferogram over the glacier outlines.", long_about = None)]
struct Args {
    /// Interferogram.
    interferogram: String,

    /// Project data directory.
    #[arg(long, short = 'D', default_value = DEFAULT_DATA_DIR, value_parser = parse_directory)]
    directory: PathBuf,

    /// Output directory.
    #[arg(long, short = 'O', default_value = DEFAULT_OUTDIR)]
    outdir: String,

    /// Glacier outlines shapefile (EPSG:3413)
    #[arg(long, default_value = DEFAULT_GLACIER_MASK)]
    glacier_mask: PathBuf,

    /// GeoTIFF backend (gdal or native)
    #[arg(long, default_value_t = RasterBackend::Gdal)]
    backend: RasterBackend,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let start_time = Instant::now();
    let file = raster_file_name(&args.interferogram);
    let name = interferogram_label(&file);

    let path = args.directory.join(&file);
    let raster = load_raster(&path, args.backend)
        .with_context(|| format!("Failed to load interferogram {}", path.display()))?;

    let params = MapParams::default();
    if raster.crs.is_some_and(|epsg| epsg != 3413) {
        log::warn!(
            "Interferogram CRS is EPSG:{:?}, the map expects EPSG:3413",
            raster.crs
        );
    }

    let outlines = if args.glacier_mask.exists() {
        read_outlines(&args.glacier_mask)
            .with_context(|| format!("Failed to read {}", args.glacier_mask.display()))?
    } else {
        log::warn!(
            "Glacier mask {} not found, drawing without outlines",
            args.glacier_mask.display()
        );
        Vec::new()
    };

    let out_dir = make_dir(&args.directory, &args.outdir)?;
    let output_path = out_dir.join(format!("{}_map.png", name));
    save_interferogram_map(&raster, &outlines, &output_path, &params)
        .with_context(|| format!("Failed to save map {}", output_path.display()))?;

    println!("# - Computation Time: {:?}", start_time.elapsed());
    Ok(())
}
