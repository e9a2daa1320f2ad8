//! Rendering of phase rasters

pub mod axes;
pub mod colormap;
pub mod figure;
pub mod map;

pub use colormap::{jet, Normalize};
pub use figure::{save_double_difference_figure, FigureParams, Panel};
pub use map::{save_interferogram_map, MapParams};
