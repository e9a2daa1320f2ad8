//! Core phase processing modules

pub mod naming;
pub mod phase;
pub mod projection;

// Re-export main types
pub use naming::{interferogram_label, parse_acquisition_pair, raster_file_name, AcquisitionPair};
pub use phase::{phase_difference, phase_difference_masked, to_complex_phase, wrap_phase, wrapped_difference};
pub use projection::PolarStereographic;
