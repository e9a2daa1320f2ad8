use ndarray::{Array1, Array2};
use num_complex::Complex;
use plotters::drawing::DrawingAreaErrorKind;

/// Complex-valued phasor (cos θ + j sin θ)
pub type SarComplex = Complex<f32>;

/// Real-valued phase sample in radians
pub type SarReal = f32;

/// 2D complex phasor array (rows x cols)
pub type SarImage = Array2<SarComplex>;

/// 2D real phase array (rows x cols)
pub type SarRealImage = Array2<SarReal>;

/// Coordinate system enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateSystem {
    /// Pixel coordinates (column, row)
    Pixel,
    /// Geographic coordinates (latitude, longitude)
    Geographic,
    /// Projected coordinates (e.g., EPSG:3413)
    Projected { epsg: u32 },
}

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// Geospatial transformation parameters (GDAL affine coefficients)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform with square pixels
    pub fn north_up(x_min: f64, y_max: f64, pixel_size: f64) -> Self {
        Self {
            top_left_x: x_min,
            pixel_width: pixel_size,
            rotation_x: 0.0,
            top_left_y: y_max,
            rotation_y: 0.0,
            pixel_height: -pixel_size,
        }
    }

    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::north_up(0.0, 0.0, 1.0)
    }
}

/// A single-band phase raster with its georeferencing
#[derive(Debug, Clone)]
pub struct PhaseRaster {
    /// Phase values in radians (rows x cols)
    pub data: SarRealImage,
    /// No-data sentinel stored in the file
    pub nodata: Option<f64>,
    /// Projection as WKT (empty when the file carries none)
    pub projection: String,
    /// EPSG authority code of the projection, if known
    pub crs: Option<u32>,
    pub geo_transform: GeoTransform,
}

impl PhaseRaster {
    pub fn new(data: SarRealImage, geo_transform: GeoTransform) -> Self {
        Self {
            data,
            nodata: None,
            projection: String::new(),
            crs: None,
            geo_transform,
        }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn xsize(&self) -> usize {
        self.data.ncols()
    }

    pub fn ysize(&self) -> usize {
        self.data.nrows()
    }

    pub fn xres(&self) -> f64 {
        self.geo_transform.pixel_width
    }

    pub fn yres(&self) -> f64 {
        self.geo_transform.pixel_height
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        match self.crs {
            Some(4326) => CoordinateSystem::Geographic,
            Some(epsg) => CoordinateSystem::Projected { epsg },
            None => CoordinateSystem::Pixel,
        }
    }

    /// Upper-left corner of the upper-left pixel
    pub fn ul_corner(&self) -> (f64, f64) {
        (self.geo_transform.top_left_x, self.geo_transform.top_left_y)
    }

    /// Lower-right corner of the lower-right pixel
    pub fn lr_corner(&self) -> (f64, f64) {
        let (rows, cols) = self.shape();
        (
            self.geo_transform.top_left_x + cols as f64 * self.xres(),
            self.geo_transform.top_left_y + rows as f64 * self.yres(),
        )
    }

    /// Pixel edge coordinates along x: origin + i * xres
    pub fn x_axis(&self) -> Array1<f64> {
        let origin = self.geo_transform.top_left_x;
        let step = self.xres();
        Array1::from_iter((0..self.xsize()).map(|i| origin + i as f64 * step))
    }

    /// Pixel edge coordinates along y: origin + j * yres
    pub fn y_axis(&self) -> Array1<f64> {
        let origin = self.geo_transform.top_left_y;
        let step = self.yres();
        Array1::from_iter((0..self.ysize()).map(|j| origin + j as f64 * step))
    }

    /// Pixel centre coordinates along x
    pub fn x_centroids(&self) -> Array1<f64> {
        self.x_axis() + self.xres() / 2.0
    }

    /// Pixel centre coordinates along y
    pub fn y_centroids(&self) -> Array1<f64> {
        self.y_axis() + self.yres() / 2.0
    }

    /// True if the sample is NaN or equals the no-data sentinel
    pub fn is_nodata(&self, value: SarReal) -> bool {
        if value.is_nan() {
            return true;
        }
        match self.nodata {
            // compare in the band's precision; the sentinel was stored as f32
            Some(nd) => value == nd as f32,
            None => false,
        }
    }
}

/// Error types for phase processing
#[derive(Debug, thiserror::Error)]
pub enum SarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Checksum failed for {0}")]
    Checksum(String),

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("Plotting error: {0}")]
    Plot(String),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

impl<E> From<DrawingAreaErrorKind<E>> for SarError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        SarError::Plot(err.to_string())
    }
}

/// Result type for phase processing operations
pub type SarResult<T> = Result<T, SarError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn test_raster() -> PhaseRaster {
        let data = Array2::<f32>::zeros((4, 3));
        PhaseRaster::new(data, GeoTransform::north_up(-100_000.0, -900_000.0, 5.0))
    }

    #[test]
    fn test_corners() {
        let raster = test_raster();
        assert_eq!(raster.ul_corner(), (-100_000.0, -900_000.0));
        assert_eq!(raster.lr_corner(), (-99_985.0, -900_020.0));
    }

    #[test]
    fn test_axes_and_centroids() {
        let raster = test_raster();
        let x = raster.x_axis();
        let y = raster.y_axis();
        assert_eq!(x.len(), 3);
        assert_eq!(y.len(), 4);
        // Last axis value plus one pixel lands on the lower-right corner
        assert_eq!((x[2] + raster.xres(), y[3] + raster.yres()), raster.lr_corner());
        assert_eq!(raster.x_centroids()[0], -99_997.5);
        assert_eq!(raster.y_centroids()[0], -900_002.5);
    }

    #[test]
    fn test_nodata_detection() {
        let mut raster = test_raster();
        assert!(!raster.is_nodata(-9999.0));
        raster.nodata = Some(-9999.0);
        assert!(raster.is_nodata(-9999.0));
        assert!(raster.is_nodata(f32::NAN));
        assert!(!raster.is_nodata(1.0));
    }

    #[test]
    fn test_nodata_not_representable_in_f32() {
        let mut raster = test_raster();
        raster.nodata = Some(0.1);
        assert!(raster.is_nodata(0.1f32));
        assert!(!raster.is_nodata(0.1f32 + f32::EPSILON));
    }

    #[test]
    fn test_coordinate_system() {
        let mut raster = test_raster();
        assert_eq!(raster.coordinate_system(), CoordinateSystem::Pixel);
        raster.crs = Some(3413);
        assert_eq!(raster.coordinate_system(), CoordinateSystem::Projected { epsg: 3413 });
    }
}
