//! Interferogram map in north polar stereographic coordinates

use crate::core::projection::PolarStereographic;
use crate::io::Ring;
use crate::plot::axes::{
    arange, clip_segment, draw_dotted_line, fit_aspect, format_latitude, format_longitude,
    points_to_pixels, Rect,
};
use crate::plot::colormap::{jet, Normalize};
use crate::types::{BoundingBox, PhaseRaster, SarError, SarResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Map figure parameters
#[derive(Debug, Clone)]
pub struct MapParams {
    /// Geographic extent shown on the map
    pub extent: BoundingBox,
    /// Figure size in inches (width, height)
    pub fig_size: (f64, f64),
    pub dpi: u32,
    /// Graticule label size in points
    pub label_size: f64,
    /// Meridian spacing in degrees
    pub lon_step: f64,
    /// Parallel spacing in degrees
    pub lat_step: f64,
    /// Glacier outline color
    pub outline_color: RGBColor,
    pub projection: PolarStereographic,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            // Petermann Glacier
            extent: BoundingBox {
                min_lon: -61.1,
                max_lon: -59.9,
                min_lat: 80.4,
                max_lat: 81.2,
            },
            fig_size: (6.0, 9.0),
            dpi: 200,
            label_size: 12.0,
            lon_step: 1.0,
            lat_step: 0.2,
            outline_color: BLACK,
            projection: PolarStereographic::epsg_3413(),
        }
    }
}

impl MapParams {
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.fig_size.0 * self.dpi as f64).round() as u32,
            (self.fig_size.1 * self.dpi as f64).round() as u32,
        )
    }

    /// Meridians drawn on the map
    pub fn meridians(&self) -> Vec<f64> {
        arange(
            self.extent.min_lon.floor() - 3.5,
            self.extent.max_lon.floor() + 3.0,
            self.lon_step,
        )
    }

    /// Parallels drawn on the map
    pub fn parallels(&self) -> Vec<f64> {
        arange(
            self.extent.min_lat.floor() - 5.0,
            self.extent.max_lat.floor() + 5.0,
            self.lat_step,
        )
    }
}

/// Mapping between projected coordinates and canvas pixels
#[derive(Debug, Clone, Copy)]
pub struct MapFrame {
    pub plot: Rect,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl MapFrame {
    pub fn to_pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let fx = (x - self.x_range.0) / (self.x_range.1 - self.x_range.0);
        let fy = (y - self.y_range.0) / (self.y_range.1 - self.y_range.0);
        (
            self.plot.x + (fx * self.plot.w as f64).round() as i32,
            self.plot.bottom() - (fy * self.plot.h as f64).round() as i32,
        )
    }

    /// Projected coordinates at the centre of a plot pixel
    pub fn from_pixel(&self, px: i32, py: i32) -> (f64, f64) {
        let fx = (px as f64 + 0.5) / self.plot.w as f64;
        let fy = (py as f64 + 0.5) / self.plot.h as f64;
        (
            self.x_range.0 + fx * (self.x_range.1 - self.x_range.0),
            self.y_range.1 - fy * (self.y_range.1 - self.y_range.0),
        )
    }

    fn clip(&self, a: (f64, f64), b: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
        clip_segment(a, b, self.x_range, self.y_range)
    }
}

/// Render an interferogram over the glacier outlines and save it (format from extension)
pub fn save_interferogram_map<P: AsRef<Path>>(
    raster: &PhaseRaster,
    outlines: &[Ring],
    output_path: P,
    params: &MapParams,
) -> SarResult<()> {
    log::info!("Rendering map: {}", output_path.as_ref().display());

    let size = params.pixel_size();
    let root = BitMapBackend::new(output_path.as_ref(), size).into_drawing_area();
    draw_map(&root, raster, outlines, params)?;
    root.present()?;

    log::info!("✅ Map saved: {}x{} px", size.0, size.1);
    Ok(())
}

/// Compute the plot frame for the configured extent inside a canvas
pub fn map_frame(canvas: (u32, u32), params: &MapParams) -> MapFrame {
    let (x_min, x_max, y_min, y_max) = params.projection.project_bbox(&params.extent);
    let label_px = points_to_pixels(params.label_size, params.dpi);
    let margin = (0.2 * params.dpi as f64).round() as i32;
    let colorbar_room = (canvas.0 as f64 * 0.15).round() as i32;

    let avail = Rect::new(
        margin + label_px * 5,
        margin,
        canvas.0 as i32 - margin * 2 - label_px * 5 - colorbar_room,
        canvas.1 as i32 - margin * 2 - label_px * 2,
    );
    let plot = fit_aspect(avail, (x_max - x_min) / (y_max - y_min));
    MapFrame {
        plot,
        x_range: (x_min, x_max),
        y_range: (y_min, y_max),
    }
}

/// Draw the map on any plotters backend
pub fn draw_map<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    raster: &PhaseRaster,
    outlines: &[Ring],
    params: &MapParams,
) -> SarResult<()> {
    let frame = map_frame(root.dim_in_pixel(), params);
    if frame.plot.w <= 0 || frame.plot.h <= 0 {
        return Err(SarError::Plot("Canvas too small for the map".to_string()));
    }
    log::debug!("Map frame: {:?}", frame);

    draw_layers(root, &frame, raster, outlines, params)
        .map_err(|e| SarError::Plot(e.to_string()))
}

fn draw_layers<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &MapFrame,
    raster: &PhaseRaster,
    outlines: &[Ring],
    params: &MapParams,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    draw_raster(root, frame, raster)?;
    draw_graticule(root, frame, params)?;
    draw_outlines(root, frame, outlines, params.outline_color)?;
    root.draw(&Rectangle::new(
        [(frame.plot.x, frame.plot.y), (frame.plot.right(), frame.plot.bottom())],
        BLACK.stroke_width(1),
    ))?;
    draw_vertical_colorbar(root, frame, params)
}

/// pcolormesh on pixel centres, rasterized at the canvas resolution
fn draw_raster<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &MapFrame,
    raster: &PhaseRaster,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 {
        return Ok(());
    }
    let norm = Normalize::phase();
    let x_centroids = raster.x_centroids();
    let y_centroids = raster.y_centroids();
    let (xres, yres) = (raster.xres(), raster.yres());

    for py in 0..frame.plot.h {
        for px in 0..frame.plot.w {
            let (x, y) = frame.from_pixel(px, py);
            let c = ((x - x_centroids[0]) / xres).round();
            let r = ((y - y_centroids[0]) / yres).round();
            if c < 0.0 || r < 0.0 || c >= cols as f64 || r >= rows as f64 {
                continue;
            }
            let value = raster.data[[r as usize, c as usize]];
            if raster.is_nodata(value) {
                continue;
            }
            if let Some(color) = norm.color(value) {
                root.draw_pixel((frame.plot.x + px, frame.plot.y + py), &color)?;
            }
        }
    }
    Ok(())
}

fn draw_graticule<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &MapFrame,
    params: &MapParams,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    const SAMPLE_DEG: f64 = 0.01;
    let proj = &params.projection;
    let meridians = params.meridians();
    let parallels = params.parallels();
    let (lat_lo, lat_hi) = match (parallels.first(), parallels.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return Ok(()),
    };
    let (lon_lo, lon_hi) = match (meridians.first(), meridians.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return Ok(()),
    };

    let grid_style = BLACK.mix(0.3).stroke_width(1);
    let label_font = ("sans-serif", points_to_pixels(params.label_size, params.dpi))
        .into_font()
        .style(FontStyle::Bold);
    let bottom_style = TextStyle::from(label_font.clone())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let left_style = TextStyle::from(label_font)
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    let offset = (0.05 * params.dpi as f64).round() as i32;

    for &lon in &meridians {
        let line: Vec<(f64, f64)> = arange(lat_lo, lat_hi + SAMPLE_DEG, SAMPLE_DEG)
            .into_iter()
            .map(|lat| proj.forward(lon, lat))
            .collect();
        draw_projected_polyline(root, frame, &line, grid_style)?;
        if let Some(x) = crossing(&line, frame.y_range.0, |p| p.1, |p| p.0) {
            if x >= frame.x_range.0 && x <= frame.x_range.1 {
                let (px, py) = frame.to_pixel(x, frame.y_range.0);
                root.draw_text(&format_longitude(lon), &bottom_style, (px, py + offset))?;
            }
        }
    }

    for &lat in &parallels {
        let line: Vec<(f64, f64)> = arange(lon_lo, lon_hi + SAMPLE_DEG, SAMPLE_DEG)
            .into_iter()
            .map(|lon| proj.forward(lon, lat))
            .collect();
        draw_projected_polyline(root, frame, &line, grid_style)?;
        if let Some(y) = crossing(&line, frame.x_range.0, |p| p.0, |p| p.1) {
            if y >= frame.y_range.0 && y <= frame.y_range.1 {
                let (px, py) = frame.to_pixel(frame.x_range.0, y);
                root.draw_text(&format_latitude(lat), &left_style, (px - offset, py))?;
            }
        }
    }
    Ok(())
}

/// First point where `along(p)` crosses `level`, returning `across(p)` there
fn crossing(
    line: &[(f64, f64)],
    level: f64,
    along: impl Fn(&(f64, f64)) -> f64,
    across: impl Fn(&(f64, f64)) -> f64,
) -> Option<f64> {
    line.windows(2).find_map(|w| {
        let (a0, a1) = (along(&w[0]) - level, along(&w[1]) - level);
        if a0 == a1 || a0 * a1 > 0.0 {
            return None;
        }
        let f = a0 / (a0 - a1);
        Some(across(&w[0]) + f * (across(&w[1]) - across(&w[0])))
    })
}

fn draw_projected_polyline<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &MapFrame,
    line: &[(f64, f64)],
    style: ShapeStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    for w in line.windows(2) {
        if let Some((a, b)) = frame.clip(w[0], w[1]) {
            draw_dotted_line(root, frame.to_pixel(a.0, a.1), frame.to_pixel(b.0, b.1), style)?;
        }
    }
    Ok(())
}

fn draw_outlines<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &MapFrame,
    outlines: &[Ring],
    color: RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let style = color.stroke_width(2);
    for ring in outlines {
        for w in ring.windows(2) {
            if let Some((a, b)) = frame.clip(w[0], w[1]) {
                root.draw(&PathElement::new(
                    vec![frame.to_pixel(a.0, a.1), frame.to_pixel(b.0, b.1)],
                    style,
                ))?;
            }
        }
    }
    Ok(())
}

fn draw_vertical_colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &MapFrame,
    params: &MapParams,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let pad = (0.1 * params.dpi as f64).round() as i32;
    let width = ((frame.plot.w as f64) * 0.05).round().max(4.0) as i32;
    let bar = Rect::new(frame.plot.right() + pad, frame.plot.y, width, frame.plot.h);
    if bar.h <= 1 {
        return Ok(());
    }

    for i in 0..bar.h {
        let t = 1.0 - i as f64 / (bar.h - 1) as f64;
        root.draw(&Rectangle::new(
            [(bar.x, bar.y + i), (bar.right(), bar.y + i + 1)],
            jet(t).filled(),
        ))?;
    }
    root.draw(&Rectangle::new(
        [(bar.x, bar.y), (bar.right(), bar.bottom())],
        BLACK.stroke_width(1),
    ))?;

    let norm = Normalize::phase();
    let tick_len = (0.05 * params.dpi as f64).round() as i32;
    let style = TextStyle::from(("sans-serif", points_to_pixels(10.0, params.dpi)).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for value in -3..=3 {
        let t = norm.apply(value as f64);
        let y = bar.bottom() - (t * (bar.h - 1) as f64).round() as i32;
        root.draw(&PathElement::new(vec![(bar.right(), y), (bar.right() + tick_len, y)], BLACK))?;
        root.draw_text(&format!("{}", value), &style, (bar.right() + tick_len * 2, y))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_graticule() {
        let params = MapParams::default();
        let meridians = params.meridians();
        assert_eq!(meridians.first(), Some(&-65.5));
        assert_eq!(meridians.last(), Some(&-57.5));

        let parallels = params.parallels();
        assert!((parallels[0] - 75.0).abs() < 1e-9);
        assert!((parallels.last().unwrap() - 85.8).abs() < 1e-9);
    }

    #[test]
    fn test_frame_roundtrip() {
        let params = MapParams::default();
        let frame = map_frame(params.pixel_size(), &params);
        assert!(frame.plot.w > 0 && frame.plot.h > 0);

        // A projected point in the middle of the extent maps inside the plot
        let (x, y) = params.projection.forward(-60.5, 80.8);
        let (px, py) = frame.to_pixel(x, y);
        assert!(px > frame.plot.x && px < frame.plot.right());
        assert!(py > frame.plot.y && py < frame.plot.bottom());

        let (x2, y2) = frame.from_pixel(px - frame.plot.x, py - frame.plot.y);
        let pixel_m = (frame.x_range.1 - frame.x_range.0) / frame.plot.w as f64;
        assert!((x2 - x).abs() <= pixel_m * 1.5);
        assert!((y2 - y).abs() <= pixel_m * 1.5);
    }

    #[test]
    fn test_crossing() {
        let line = vec![(0.0, 2.0), (1.0, 1.0), (2.0, -1.0)];
        let x = crossing(&line, 0.0, |p| p.1, |p| p.0).unwrap();
        assert!((x - 1.5).abs() < 1e-12);
        assert!(crossing(&line, 5.0, |p| p.1, |p| p.0).is_none());
    }
}
