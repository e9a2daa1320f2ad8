//! Interferogram labels derived from file names

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Prefix carried by ICEYE geocoded phase products
pub const ICEYE_PHASE_PREFIX: &str = "ICEYE-phase_geo-";

/// Number of characters kept for a label (`YYYYMMDD_YYYYMMDD`)
pub const LABEL_LEN: usize = 17;

/// Acquisition pair encoded in an interferogram label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionPair {
    pub reference: NaiveDate,
    pub secondary: NaiveDate,
}

impl AcquisitionPair {
    /// Temporal baseline in days (secondary minus reference)
    pub fn temporal_baseline_days(&self) -> i64 {
        (self.secondary - self.reference).num_days()
    }
}

/// Raster file name for a base name (`.tif` appended)
pub fn raster_file_name(base: &str) -> String {
    format!("{}.tif", base)
}

/// Short label for plot titles: product prefix removed, first 17 characters
pub fn interferogram_label(file_name: &str) -> String {
    file_name
        .replace(ICEYE_PHASE_PREFIX, "")
        .chars()
        .take(LABEL_LEN)
        .collect()
}

fn pair_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{8})_(\d{8})").expect("valid pair regex"))
}

/// Parse the acquisition dates from a `YYYYMMDD_YYYYMMDD` label
pub fn parse_acquisition_pair(label: &str) -> Option<AcquisitionPair> {
    let caps = pair_regex().captures(label)?;
    let reference = NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()?;
    let secondary = NaiveDate::parse_from_str(&caps[2], "%Y%m%d").ok()?;
    Some(AcquisitionPair {
        reference,
        secondary,
    })
}
