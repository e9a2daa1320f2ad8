//! Raster and vector I/O
//!
//! Two interchangeable GeoTIFF backends sit behind [`load_raster`] and
//! [`save_raster`]: GDAL and a pure-Rust reader/writer built on `tiff`.

pub mod raster_gdal;
pub mod raster_native;
pub mod vector;

use crate::types::{CoordinateSystem, PhaseRaster, SarResult, SarRealImage};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use raster_gdal::clip_raster;
pub use vector::{read_outlines, Ring};

/// GeoTIFF implementation used for reading and writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterBackend {
    #[default]
    Gdal,
    Native,
}

impl fmt::Display for RasterBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterBackend::Gdal => write!(f, "gdal"),
            RasterBackend::Native => write!(f, "native"),
        }
    }
}

impl FromStr for RasterBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gdal" => Ok(RasterBackend::Gdal),
            "native" | "tiff" => Ok(RasterBackend::Native),
            _ => Err(format!("Invalid raster backend: {} (expected gdal or native)", s)),
        }
    }
}

/// Parameters for writing a GeoTIFF
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Square pixel size in CRS units
    pub pixel_size: f64,
    /// Output coordinate reference system
    pub epsg: u32,
    /// No-data sentinel recorded on the band
    pub nodata: f64,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pixel_size: 5.0,
            epsg: 3413, // NSIDC polar stereographic north
            nodata: -9999.0,
        }
    }
}

/// Load a phase raster with the chosen backend
pub fn load_raster<P: AsRef<Path>>(path: P, backend: RasterBackend) -> SarResult<PhaseRaster> {
    let raster = match backend {
        RasterBackend::Gdal => raster_gdal::read_geotiff(path.as_ref())?,
        RasterBackend::Native => raster_native::read_geotiff(path.as_ref())?,
    };
    let (rows, cols) = raster.shape();
    log::info!("Loaded {}x{} raster, {:?}", cols, rows, raster.coordinate_system());
    if raster.coordinate_system() == CoordinateSystem::Pixel {
        log::warn!("{} has no CRS, coordinates are in pixels", path.as_ref().display());
    }
    Ok(raster)
}

/// Save a phase array as GeoTIFF with the chosen backend
pub fn save_raster<P: AsRef<Path>>(
    data: &SarRealImage,
    x_min: f64,
    y_max: f64,
    path: P,
    options: &WriteOptions,
    backend: RasterBackend,
) -> SarResult<()> {
    match backend {
        RasterBackend::Gdal => raster_gdal::write_geotiff(data, x_min, y_max, path, options),
        RasterBackend::Native => raster_native::write_geotiff(data, x_min, y_max, path, options),
    }
}
