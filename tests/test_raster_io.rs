use approx::assert_abs_diff_eq;
use ifgdiff::{load_raster, save_raster, RasterBackend, SarError, WriteOptions};
use ndarray::Array2;
use std::f32::consts::PI;
use tempfile::NamedTempFile;

fn test_phase(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let v = 0.013 * (i * cols + j) as f32;
        (v + PI).rem_euclid(2.0 * PI) - PI
    })
}

fn roundtrip(write_backend: RasterBackend, read_backend: RasterBackend) {
    let data = test_phase(37, 53);
    let options = WriteOptions::default();
    let (x_min, y_max) = (-125_000.0, -940_000.0);

    let tmp = NamedTempFile::with_suffix(".tif").expect("Failed to create temp file");
    save_raster(&data, x_min, y_max, tmp.path(), &options, write_backend)
        .expect("Failed to write raster");

    let raster = load_raster(tmp.path(), read_backend).expect("Failed to read raster");

    assert_eq!(raster.shape(), data.dim());
    for (a, b) in raster.data.iter().zip(data.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-7);
    }

    assert_eq!(raster.ul_corner(), (x_min, y_max));
    assert_eq!(raster.lr_corner(), (x_min + 53.0 * 5.0, y_max - 37.0 * 5.0));
    assert_eq!(raster.xres(), 5.0);
    assert_eq!(raster.yres(), -5.0);
    assert_eq!(raster.crs, Some(3413));
    assert_eq!(raster.nodata, Some(-9999.0));
}

#[test]
fn test_gdal_roundtrip() {
    roundtrip(RasterBackend::Gdal, RasterBackend::Gdal);
}

#[test]
fn test_native_roundtrip() {
    roundtrip(RasterBackend::Native, RasterBackend::Native);
}

#[test]
fn test_gdal_written_native_read() {
    roundtrip(RasterBackend::Gdal, RasterBackend::Native);
}

#[test]
fn test_gdal_projection_is_reported() {
    let data = test_phase(4, 4);
    let tmp = NamedTempFile::with_suffix(".tif").unwrap();
    save_raster(&data, 0.0, 0.0, tmp.path(), &WriteOptions::default(), RasterBackend::Gdal).unwrap();

    let raster = load_raster(tmp.path(), RasterBackend::Gdal).unwrap();
    assert!(!raster.projection.is_empty());
    println!("Projection WKT starts with: {:.40}", raster.projection);
}

#[test]
fn test_unreadable_file_fails() {
    let tmp = NamedTempFile::with_suffix(".tif").unwrap();
    std::fs::write(tmp.path(), b"definitely not a tiff").unwrap();

    assert!(load_raster(tmp.path(), RasterBackend::Gdal).is_err());
    assert!(load_raster(tmp.path(), RasterBackend::Native).is_err());
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ICEYE-phase_geo-missing.tif");
    assert!(load_raster(&path, RasterBackend::Gdal).is_err());
    assert!(load_raster(&path, RasterBackend::Native).is_err());
}

fn ifd_entry(buf: &mut Vec<u8>, tag: u16, field_type: u16, value: u32) {
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&field_type.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Single-strip Float32 TIFF with the directory up front and half the strip missing
fn truncated_float_tiff(width: u16, height: u16) -> Vec<u8> {
    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    const ENTRIES: u16 = 10;
    let data_offset = 8 + 2 + u32::from(ENTRIES) * 12 + 4;
    let strip_bytes = u32::from(width) * u32::from(height) * 4;

    let mut buf = Vec::new();
    buf.extend_from_slice(b"II");
    buf.extend_from_slice(&42u16.to_le_bytes());
    buf.extend_from_slice(&8u32.to_le_bytes());
    buf.extend_from_slice(&ENTRIES.to_le_bytes());
    ifd_entry(&mut buf, 256, SHORT, u32::from(width));
    ifd_entry(&mut buf, 257, SHORT, u32::from(height));
    ifd_entry(&mut buf, 258, SHORT, 32); // BitsPerSample
    ifd_entry(&mut buf, 259, SHORT, 1); // no compression
    ifd_entry(&mut buf, 262, SHORT, 1); // BlackIsZero
    ifd_entry(&mut buf, 273, LONG, data_offset);
    ifd_entry(&mut buf, 277, SHORT, 1); // SamplesPerPixel
    ifd_entry(&mut buf, 278, SHORT, u32::from(height));
    ifd_entry(&mut buf, 279, LONG, strip_bytes);
    ifd_entry(&mut buf, 339, SHORT, 3); // IEEE float samples
    buf.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(buf.len() as u32, data_offset);

    let half: Vec<u8> = (0..strip_bytes / 8).flat_map(|i| (i as f32 * 0.001).to_le_bytes()).collect();
    buf.extend_from_slice(&half);
    buf
}

#[test]
fn test_truncated_strip_fails_checksum() {
    let tmp = NamedTempFile::with_suffix(".tif").unwrap();
    std::fs::write(tmp.path(), truncated_float_tiff(32, 32)).unwrap();

    // The header and directory are intact, so GDAL opens the file and only
    // the pixel pass hits the missing data
    let dataset = gdal::Dataset::open(tmp.path()).expect("Header should still open");
    assert_eq!(dataset.raster_size(), (32, 32));
    drop(dataset);

    let err = load_raster(tmp.path(), RasterBackend::Gdal).unwrap_err();
    println!("Truncated file reported as: {}", err);
    match err {
        SarError::Checksum(msg) => assert!(msg.contains(&tmp.path().display().to_string())),
        other => panic!("Expected a checksum error, got {}", other),
    }
}
