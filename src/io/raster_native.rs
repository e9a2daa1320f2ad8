//! GeoTIFF reading/writing without GDAL
//!
//! Uses the `tiff` crate and understands the subset of GeoTIFF needed for
//! north-up single-band rasters: pixel scale, tie point, the EPSG geokey and
//! GDAL's no-data tag.

use crate::io::WriteOptions;
use crate::types::{GeoTransform, PhaseRaster, SarError, SarResult, SarRealImage};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tiff::TiffError;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GT_MODEL_TYPE_KEY: u32 = 1024;
const GT_RASTER_TYPE_KEY: u32 = 1025;
const GEOGRAPHIC_TYPE_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_KEY: u32 = 3072;

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

fn tiff_err(e: TiffError) -> SarError {
    SarError::Tiff(e.to_string())
}

/// Read a single-band GeoTIFF without GDAL
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> SarResult<PhaseRaster> {
    log::info!("Reading GeoTIFF natively: {}", path.as_ref().display());
    let file = File::open(path.as_ref())?;
    decode_geotiff(BufReader::new(file))
}

fn decode_geotiff<R: Read + Seek>(reader: R) -> SarResult<PhaseRaster> {
    let mut decoder = Decoder::new(reader).map_err(tiff_err)?;
    let (width, height) = decoder.dimensions().map_err(tiff_err)?;
    let (rows, cols) = (height as usize, width as usize);

    let data: Vec<f32> = match decoder.read_image().map_err(tiff_err)? {
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::U8(buf) => buf.into_iter().map(f32::from).collect(),
        _ => {
            return Err(SarError::InvalidFormat(
                "Unsupported TIFF sample format for phase data".to_string(),
            ))
        }
    };

    let data = Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| SarError::Processing(format!("Failed to reshape raster data: {}", e)))?;

    let geo_transform = read_geotransform(&mut decoder).unwrap_or_else(|| {
        log::warn!("No georeferencing tags found, using pixel coordinates");
        GeoTransform::default()
    });
    let crs = read_epsg(&mut decoder);
    let nodata = decoder
        .get_tag_ascii_string(tag(GDAL_NODATA))
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f64>().ok());

    log::debug!("Raster size: {}x{}", cols, rows);
    log::debug!("Geotransform: {:?}", geo_transform);

    Ok(PhaseRaster {
        data,
        nodata,
        projection: String::new(),
        crs,
        geo_transform,
    })
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT)).ok()?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }
    // tiepoint: [I, J, K, X, Y, Z]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform {
        top_left_x: origin_x,
        pixel_width: scale[0],
        rotation_x: 0.0,
        top_left_y: origin_y,
        rotation_y: 0.0,
        pixel_height: -scale[1],
    })
}

fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<u32> {
    let keys = decoder.get_tag_u32_vec(tag(GEO_KEY_DIRECTORY)).ok()?;
    // Header: version, revision, minor, number of keys; then 4 values per key
    keys.get(4..)?
        .chunks_exact(4)
        .find(|entry| {
            (entry[0] == PROJECTED_CS_TYPE_KEY || entry[0] == GEOGRAPHIC_TYPE_KEY) && entry[1] == 0
        })
        .map(|entry| entry[3])
}

/// Write a phase array as a single-band Float32 GeoTIFF without GDAL
pub fn write_geotiff<P: AsRef<Path>>(
    data: &SarRealImage,
    x_min: f64,
    y_max: f64,
    path: P,
    options: &WriteOptions,
) -> SarResult<()> {
    log::info!("Writing GeoTIFF natively: {}", path.as_ref().display());
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(data, x_min, y_max, options, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn encode_geotiff<W: Write + Seek>(
    data: &SarRealImage,
    x_min: f64,
    y_max: f64,
    options: &WriteOptions,
    writer: W,
) -> SarResult<()> {
    let (rows, cols) = data.dim();
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_err)?;
    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(tiff_err)?;

    let scale = [options.pixel_size, options.pixel_size, 0.0];
    image
        .encoder()
        .write_tag(tag(MODEL_PIXEL_SCALE), &scale[..])
        .map_err(tiff_err)?;

    let tiepoint = [0.0, 0.0, 0.0, x_min, y_max, 0.0];
    image
        .encoder()
        .write_tag(tag(MODEL_TIEPOINT), &tiepoint[..])
        .map_err(tiff_err)?;

    let geokeys = geokey_directory(options.epsg);
    image
        .encoder()
        .write_tag(tag(GEO_KEY_DIRECTORY), &geokeys[..])
        .map_err(tiff_err)?;

    let nodata = format!("{}", options.nodata);
    image
        .encoder()
        .write_tag(tag(GDAL_NODATA), nodata.as_str())
        .map_err(tiff_err)?;

    let flat: Vec<f32> = data.iter().copied().collect();
    image.write_data(&flat).map_err(tiff_err)?;
    Ok(())
}

fn geokey_directory(epsg: u32) -> Vec<u16> {
    let mut keys: Vec<u16> = vec![
        1, 1, 0, 2, // version 1.1.0, key count patched below
        GT_MODEL_TYPE_KEY as u16, 0, 1, if epsg == 4326 { 2 } else { 1 },
        GT_RASTER_TYPE_KEY as u16, 0, 1, 1, // RasterPixelIsArea
    ];
    if let Ok(code) = u16::try_from(epsg) {
        let key = if epsg == 4326 { GEOGRAPHIC_TYPE_KEY } else { PROJECTED_CS_TYPE_KEY };
        keys.extend_from_slice(&[key as u16, 0, 1, code]);
        keys[3] = 3;
    } else {
        log::warn!("EPSG:{} does not fit a GeoTIFF key, CRS not recorded", epsg);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Cursor;

    #[test]
    fn test_in_memory_roundtrip() {
        let data = array![[0.1f32, -0.2, 3.0], [-3.1, 0.0, -9999.0]];
        let options = WriteOptions::default();

        let mut buf = Vec::new();
        encode_geotiff(&data, -120_000.0, -950_000.0, &options, Cursor::new(&mut buf)).unwrap();
        let raster = decode_geotiff(Cursor::new(&buf)).unwrap();

        assert_eq!(raster.data, data);
        assert_eq!(raster.crs, Some(3413));
        assert_eq!(raster.nodata, Some(-9999.0));
        assert_eq!(raster.ul_corner(), (-120_000.0, -950_000.0));
        assert_eq!(raster.lr_corner(), (-119_985.0, -950_010.0));
    }

    #[test]
    fn test_geokeys_record_epsg() {
        let keys = geokey_directory(3413);
        assert_eq!(keys[3], 3);
        assert_eq!(&keys[12..], &[3072, 0, 1, 3413]);

        let keys = geokey_directory(4326);
        assert_eq!(&keys[12..], &[2048, 0, 1, 4326]);
    }
}
