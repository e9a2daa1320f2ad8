//! ifgdiff: interferometric phase double differences for SAR glacier studies
//!
//! Loads coregistered GeoTIFF interferograms, differences their phase in the
//! complex domain and renders diagnostic figures and polar-stereographic maps.

pub mod cli;
pub mod core;
pub mod io;
pub mod plot;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    BoundingBox, CoordinateSystem, GeoTransform, PhaseRaster, SarComplex, SarError, SarImage,
    SarRealImage, SarResult,
};

pub use crate::core::{phase_difference, phase_difference_masked, PolarStereographic};
pub use io::{clip_raster, load_raster, save_raster, RasterBackend, WriteOptions};
pub use plot::{save_double_difference_figure, save_interferogram_map, FigureParams, MapParams, Panel};
