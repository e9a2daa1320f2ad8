use crate::io::WriteOptions;
use crate::types::{GeoTransform, PhaseRaster, SarError, SarResult, SarRealImage};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;

/// Read a single-band GeoTIFF with GDAL
///
/// The first band is checksummed before reading so that corrupt files fail
/// early instead of yielding partially decoded data.
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> SarResult<PhaseRaster> {
    log::info!("Reading GeoTIFF with GDAL: {}", path.as_ref().display());

    let dataset = Dataset::open(path.as_ref())?;
    let (cols, rows) = dataset.raster_size();
    let band = dataset.rasterband(1)?;

    verify_checksum(&band, cols, rows, path.as_ref())?;

    let projection = dataset.projection();
    let crs = dataset
        .spatial_ref()
        .ok()
        .and_then(|srs| srs.auth_code().ok())
        .and_then(|code| u32::try_from(code).ok());
    let nodata = band.no_data_value();
    let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);

    log::debug!("Raster size: {}x{}", cols, rows);
    log::debug!("Geotransform: {:?}", geo_transform);
    log::debug!("EPSG: {:?}, nodata: {:?}", crs, nodata);

    let buffer = band.read_as::<f32>((0, 0), (cols, rows), (cols, rows), None)?;
    let data = Array2::from_shape_vec((rows, cols), buffer.data)
        .map_err(|e| SarError::Processing(format!("Failed to reshape raster data: {}", e)))?;

    Ok(PhaseRaster {
        data,
        nodata,
        projection,
        crs,
        geo_transform,
    })
}

fn verify_checksum(
    band: &gdal::raster::RasterBand,
    cols: usize,
    rows: usize,
    path: &Path,
) -> SarResult<()> {
    let failure = unsafe {
        gdal_sys::CPLErrorReset();
        gdal_sys::GDALChecksumImage(band.c_rasterband(), 0, 0, cols as c_int, rows as c_int);
        if gdal_sys::CPLGetLastErrorType() == gdal_sys::CPLErr::CE_None {
            None
        } else {
            let msg = gdal_sys::CPLGetLastErrorMsg();
            Some(if msg.is_null() {
                String::new()
            } else {
                CStr::from_ptr(msg).to_string_lossy().into_owned()
            })
        }
    };
    if let Some(msg) = failure {
        log::error!("Checksum of {} failed: {}", path.display(), msg);
        return Err(SarError::Checksum(format!("{}: {}", path.display(), msg)));
    }
    Ok(())
}

/// Write a phase array as a single-band Float32 GeoTIFF
///
/// `x_min`/`y_max` locate the upper-left corner; pixels are square and
/// north-up.
pub fn write_geotiff<P: AsRef<Path>>(
    data: &SarRealImage,
    x_min: f64,
    y_max: f64,
    path: P,
    options: &WriteOptions,
) -> SarResult<()> {
    log::info!("Writing GeoTIFF with GDAL: {}", path.as_ref().display());

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let (rows, cols) = data.dim();

    let mut dataset = driver.create_with_band_type::<f32, _>(
        path.as_ref(),
        cols as isize,
        rows as isize,
        1,
    )?;

    let transform = GeoTransform::north_up(x_min, y_max, options.pixel_size);
    dataset.set_geo_transform(&transform.to_gdal())?;
    dataset.set_spatial_ref(&SpatialRef::from_epsg(options.epsg)?)?;

    let mut band = dataset.rasterband(1)?;
    let flat: Vec<f32> = data.iter().copied().collect();
    let buffer = Buffer::new((cols, rows), flat);
    band.write((0, 0), (cols, rows), &buffer)?;
    band.set_no_data_value(Some(options.nodata))?;

    log::debug!("Wrote {}x{} pixels, EPSG:{}", cols, rows, options.epsg);
    Ok(())
}

/// Clip a raster to the polygons of a shapefile (gdalwarp -cutline -crop_to_cutline)
pub fn clip_raster<P, Q, R>(src_file: P, ref_shp: Q, out_file: R, dst_nodata: f64) -> SarResult<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    log::info!(
        "Clipping {} with cutline {}",
        src_file.as_ref().display(),
        ref_shp.as_ref().display()
    );

    let src = Dataset::open(src_file.as_ref())?;

    let args = [
        "-cutline".to_string(),
        ref_shp.as_ref().display().to_string(),
        "-crop_to_cutline".to_string(),
        "-dstnodata".to_string(),
        dst_nodata.to_string(),
    ];
    let c_args = args
        .iter()
        .map(|a| to_cstring(a))
        .collect::<SarResult<Vec<_>>>()?;
    let mut argv: Vec<*mut c_char> = c_args.iter().map(|a| a.as_ptr() as *mut c_char).collect();
    argv.push(std::ptr::null_mut());

    let c_out = to_cstring(&out_file.as_ref().display().to_string())?;

    unsafe {
        let options = gdal_sys::GDALWarpAppOptionsNew(argv.as_mut_ptr(), std::ptr::null_mut());
        if options.is_null() {
            return Err(SarError::Processing("Invalid gdalwarp options".to_string()));
        }

        let mut src_handle = src.c_dataset();
        let mut usage_error: c_int = 0;
        let out = gdal_sys::GDALWarp(
            c_out.as_ptr(),
            std::ptr::null_mut(),
            1,
            &mut src_handle,
            options,
            &mut usage_error,
        );
        gdal_sys::GDALWarpAppOptionsFree(options);

        if out.is_null() || usage_error != 0 {
            return Err(SarError::Processing(format!(
                "gdalwarp failed for {}",
                src_file.as_ref().display()
            )));
        }
        gdal_sys::GDALClose(out);
    }

    log::info!("Clipped raster written to {}", out_file.as_ref().display());
    Ok(())
}

fn to_cstring(s: &str) -> SarResult<CString> {
    CString::new(s).map_err(|e| SarError::InvalidFormat(format!("Invalid argument '{}': {}", s, e)))
}
