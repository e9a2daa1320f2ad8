//! Compute the complex difference between two coregistered interferograms
//! and plot both inputs next to the double difference.

use anyhow::{Context, Result};
use clap::Parser;
use ifgdiff::cli::{init_logging, make_dir, parse_directory, DEFAULT_DATA_DIR, DEFAULT_OUTDIR};
use ifgdiff::core::{interferogram_label, parse_acquisition_pair, phase_difference_masked, raster_file_name};
use ifgdiff::{load_raster, save_double_difference_figure, FigureParams, Panel, RasterBackend};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compute the complex difference between two coregistered interferograms.",
    long_about = None
)]
struct Args {
    /// Reference Interferogram.
    reference: String,

    /// Secondary Interferogram.
    secondary: String,

    /// Project data directory.
    #[arg(long, short = 'D', default_value = DEFAULT_DATA_DIR, value_parser = parse_directory)]
    directory: PathBuf,

    /// Output directory.
    #[arg(long, short = 'O', default_value = DEFAULT_OUTDIR)]
    outdir: String,

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
    run(&args)?;
    println!("# - Computation Time: {:?}", start_time.elapsed());
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let file_1 = raster_file_name(&args.reference);
    let file_2 = raster_file_name(&args.secondary);

    let name_1 = interferogram_label(&file_1);
    let name_2 = interferogram_label(&file_2);
    for name in [&name_1, &name_2] {
        if let Some(pair) = parse_acquisition_pair(name) {
            log::info!(
                "{}: {} -> {} ({} day baseline)",
                name,
                pair.reference,
                pair.secondary,
                pair.temporal_baseline_days()
            );
        }
    }

    let path_1 = args.directory.join(&file_1);
    let interf_1 = load_raster(&path_1, args.backend)
        .with_context(|| format!("Failed to load reference interferogram {}", path_1.display()))?;

    let path_2 = args.directory.join(&file_2);
    let interf_2 = load_raster(&path_2, args.backend)
        .with_context(|| format!("Failed to load secondary interferogram {}", path_2.display()))?;

    let dd_phase = phase_difference_masked(&interf_1, &interf_2)
        .context("Failed to compute the double difference")?;

    let out_dir = make_dir(&args.directory, &args.outdir)?;
    let params = FigureParams::default();
    let output_path = out_dir.join(format!("{}-{}.jpeg", name_1, name_2));

    let panels = [
        Panel {
            title: &name_1,
            data: &interf_1.data,
        },
        Panel {
            title: &name_2,
            data: &interf_2.data,
        },
        Panel {
            title: "Double Difference",
            data: &dd_phase,
        },
    ];
    save_double_difference_figure(&panels, &output_path, &params)
        .with_context(|| format!("Failed to save figure {}", output_path.display()))?;

    log::info!("Output: {}", output_path.display());
    Ok(())
}
