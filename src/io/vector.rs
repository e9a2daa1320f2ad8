use crate::types::SarResult;
use gdal::vector::{Geometry, LayerAccess};
use gdal::Dataset;
use std::path::Path;

/// Polyline in projected coordinates
pub type Ring = Vec<(f64, f64)>;

/// Read every ring/linestring of the first layer of a vector file
///
/// Polygons and multi-geometries are flattened into their component rings;
/// coordinates are returned in the layer's own CRS.
pub fn read_outlines<P: AsRef<Path>>(path: P) -> SarResult<Vec<Ring>> {
    log::info!("Reading outlines from: {}", path.as_ref().display());

    let dataset = Dataset::open(path.as_ref())?;
    let mut layer = dataset.layer(0)?;

    let mut rings = Vec::new();
    for feature in layer.features() {
        if let Some(geometry) = feature.geometry() {
            collect_rings(geometry, &mut rings);
        }
    }

    log::debug!("Loaded {} rings", rings.len());
    Ok(rings)
}

fn collect_rings(geometry: &Geometry, rings: &mut Vec<Ring>) {
    let count = geometry.geometry_count();
    if count == 0 {
        let points = geometry.get_point_vec();
        if points.len() > 1 {
            rings.push(points.into_iter().map(|(x, y, _)| (x, y)).collect());
        }
        return;
    }
    for i in 0..count {
        let part = geometry.get_geometry(i);
        collect_rings(&part, rings);
    }
}
