//! Helpers shared by the command-line tools

use crate::types::SarResult;
use std::path::{Path, PathBuf};

/// Default project data directory
pub const DEFAULT_DATA_DIR: &str = "/Volumes/Extreme Pro/Peterman_glacier_X7_subset";

/// Default output directory name, relative to the data directory
pub const DEFAULT_OUTDIR: &str = "output_test";

/// Expand a leading `~` and make the path absolute
pub fn expand_directory(path: &str) -> PathBuf {
    let expanded = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

/// clap value parser for directory arguments
pub fn parse_directory(s: &str) -> Result<PathBuf, String> {
    Ok(expand_directory(s))
}

/// Create `base/name` if it does not exist and return it
pub fn make_dir<P: AsRef<Path>>(base: P, name: &str) -> SarResult<PathBuf> {
    let dir = base.as_ref().join(name);
    if !dir.exists() {
        log::info!("Creating output directory: {}", dir.display());
    }
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Initialise env_logger; `RUST_LOG` wins over the verbosity flag
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
