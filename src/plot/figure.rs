//! Three-panel double-difference figure (reference, secondary, difference)

use crate::plot::axes::{draw_dotted_line, fit_aspect, points_to_pixels, ticks, Rect};
use crate::plot::colormap::{jet, Normalize};
use crate::types::{SarError, SarResult, SarRealImage};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Output figure parameters
#[derive(Debug, Clone)]
pub struct FigureParams {
    /// Figure size in inches (width, height)
    pub fig_size: (f64, f64),
    /// Resolution in dots per inch
    pub dpi: u32,
    /// Fixed color range for every panel
    pub vmin: f64,
    pub vmax: f64,
    /// Colorbar axis label
    pub colorbar_label: String,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for FigureParams {
    fn default() -> Self {
        Self {
            fig_size: (15.0, 5.0),
            dpi: 200,
            vmin: -std::f64::consts::PI,
            vmax: std::f64::consts::PI,
            colorbar_label: "Rad".to_string(),
            jpeg_quality: 95,
        }
    }
}

impl FigureParams {
    /// Canvas size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.fig_size.0 * self.dpi as f64).round() as u32,
            (self.fig_size.1 * self.dpi as f64).round() as u32,
        )
    }

    fn normalize(&self) -> Normalize {
        Normalize::new(self.vmin, self.vmax)
    }
}

/// A titled image panel
pub struct Panel<'a> {
    pub title: &'a str,
    pub data: &'a SarRealImage,
}

/// Pixel layout of one panel: title, image axes and horizontal colorbar
#[derive(Debug, Clone, Copy)]
pub struct PanelLayout {
    pub frame: Rect,
    pub plot: Rect,
    pub colorbar: Rect,
    pub title_anchor: (i32, i32),
}

impl PanelLayout {
    /// Lay out a panel of `frame` for an image of `rows` x `cols`
    pub fn compute(frame: Rect, rows: usize, cols: usize, dpi: u32) -> Self {
        let title_px = points_to_pixels(12.0, dpi);
        let tick_px = points_to_pixels(10.0, dpi);
        // colorbar pad of 0.6 inch below the image, as make_axes_locatable does
        let pad = (0.6 * dpi as f64).round() as i32;
        let margin = (0.1 * dpi as f64).round() as i32;

        let top = margin + title_px * 2;
        let left = tick_px * 3;
        let right = margin * 2;
        let bar_budget = (frame.h as f64 * 0.05).round() as i32;
        let bottom = pad + bar_budget + tick_px * 2 + title_px * 2;

        let avail = Rect::new(
            frame.x + left,
            frame.y + top,
            frame.w - left - right,
            frame.h - top - bottom,
        );
        let aspect = cols.max(1) as f64 / rows.max(1) as f64;
        let plot = fit_aspect(avail, aspect);

        let bar_h = ((plot.h as f64) * 0.05).round().max(4.0) as i32;
        let colorbar = Rect::new(plot.x, plot.bottom() + pad, plot.w, bar_h.min(bar_budget.max(4)));

        Self {
            frame,
            plot,
            colorbar,
            title_anchor: (plot.x + plot.w / 2, plot.y - title_px / 2),
        }
    }
}

/// Render the three-panel figure and save it as a JPEG
pub fn save_double_difference_figure<P: AsRef<Path>>(
    panels: &[Panel<'_>],
    output_path: P,
    params: &FigureParams,
) -> SarResult<()> {
    log::info!("Rendering figure: {}", output_path.as_ref().display());

    let (width, height) = params.pixel_size();
    let mut buffer = vec![255u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_panels(&root, panels, params)?;
        root.present()?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| SarError::Plot("Figure buffer has the wrong size".to_string()))?;
    write_jpeg(&image, output_path.as_ref(), params)?;

    log::info!("✅ Figure saved: {}x{} px at {} dpi", width, height, params.dpi);
    Ok(())
}

fn write_jpeg(image: &RgbImage, path: &Path, params: &FigureParams) -> SarResult<()> {
    let file = File::create(path)?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), params.jpeg_quality);
    encoder.set_pixel_density(PixelDensity::dpi(params.dpi as u16));
    encoder.encode_image(image)?;
    Ok(())
}

/// Draw panels side by side on the canvas
pub fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panels: &[Panel<'_>],
    params: &FigureParams,
) -> SarResult<()> {
    if panels.is_empty() {
        return Err(SarError::Plot("No panels to draw".to_string()));
    }
    root.fill(&WHITE).map_err(plot_err)?;

    let (width, height) = root.dim_in_pixel();
    let panel_w = width as i32 / panels.len() as i32;

    for (i, panel) in panels.iter().enumerate() {
        let frame = Rect::new(i as i32 * panel_w, 0, panel_w, height as i32);
        let (rows, cols) = panel.data.dim();
        let layout = PanelLayout::compute(frame, rows, cols, params.dpi);
        log::debug!("Panel '{}' layout: {:?}", panel.title, layout);
        draw_panel(root, panel, &layout, params).map_err(plot_err)?;
    }
    Ok(())
}

fn plot_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> SarError {
    SarError::Plot(e.to_string())
}

fn draw_panel<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panel: &Panel<'_>,
    layout: &PanelLayout,
    params: &FigureParams,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let dpi = params.dpi;
    let norm = params.normalize();
    let plot = layout.plot;
    let (rows, cols) = panel.data.dim();

    let title_font = ("sans-serif", points_to_pixels(12.0, dpi))
        .into_font()
        .style(FontStyle::Bold);
    let tick_font = ("sans-serif", points_to_pixels(10.0, dpi)).into_font();

    root.draw_text(
        panel.title,
        &TextStyle::from(title_font.clone())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom)),
        layout.title_anchor,
    )?;

    // Nearest-neighbour resampling onto the plot pixels (imshow)
    if rows > 0 && cols > 0 {
        for py in 0..plot.h {
            let r = (((py as f64 + 0.5) * rows as f64 / plot.h as f64) as usize).min(rows - 1);
            for px in 0..plot.w {
                let c = (((px as f64 + 0.5) * cols as f64 / plot.w as f64) as usize).min(cols - 1);
                if let Some(color) = norm.color(panel.data[[r, c]]) {
                    root.draw_pixel((plot.x + px, plot.y + py), &color)?;
                }
            }
        }
    }

    // Grid and tick labels in pixel-index units, origin at the top-left
    let grid_style = BLACK.mix(0.3).stroke_width(1);
    let x_label_style = TextStyle::from(tick_font.clone())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let y_label_style = TextStyle::from(tick_font.clone())
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    let tick_len = (0.05 * dpi as f64).round() as i32;

    for t in ticks(cols as f64, 5) {
        let x = plot.x + (t / cols.max(1) as f64 * plot.w as f64).round() as i32;
        draw_dotted_line(root, (x, plot.y), (x, plot.bottom()), grid_style)?;
        root.draw(&PathElement::new(vec![(x, plot.bottom()), (x, plot.bottom() + tick_len)], BLACK))?;
        root.draw_text(&format!("{}", t), &x_label_style, (x, plot.bottom() + tick_len * 2))?;
    }
    for t in ticks(rows as f64, 5) {
        let y = plot.y + (t / rows.max(1) as f64 * plot.h as f64).round() as i32;
        draw_dotted_line(root, (plot.x, y), (plot.right(), y), grid_style)?;
        root.draw(&PathElement::new(vec![(plot.x - tick_len, y), (plot.x, y)], BLACK))?;
        root.draw_text(&format!("{}", t), &y_label_style, (plot.x - tick_len * 2, y))?;
    }

    root.draw(&Rectangle::new(
        [(plot.x, plot.y), (plot.right(), plot.bottom())],
        BLACK.stroke_width(1),
    ))?;

    draw_horizontal_colorbar(root, layout.colorbar, params, &tick_font, &title_font)
}

fn draw_horizontal_colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    bar: Rect,
    params: &FigureParams,
    tick_font: &FontDesc<'_>,
    label_font: &FontDesc<'_>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if bar.w <= 1 {
        return Ok(());
    }
    for i in 0..bar.w {
        let t = i as f64 / (bar.w - 1) as f64;
        root.draw(&Rectangle::new(
            [(bar.x + i, bar.y), (bar.x + i + 1, bar.bottom())],
            jet(t).filled(),
        ))?;
    }
    root.draw(&Rectangle::new(
        [(bar.x, bar.y), (bar.right(), bar.bottom())],
        BLACK.stroke_width(1),
    ))?;

    let norm = params.normalize();
    let tick_len = (0.05 * params.dpi as f64).round() as i32;
    let tick_style = TextStyle::from(tick_font.clone())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let pi = std::f64::consts::PI;
    for (value, label) in [(-pi, "-π"), (0.0, "0"), (pi, "π")] {
        let x = bar.x + (norm.apply(value) * (bar.w - 1) as f64).round() as i32;
        root.draw(&PathElement::new(vec![(x, bar.bottom()), (x, bar.bottom() + tick_len)], BLACK))?;
        root.draw_text(label, &tick_style, (x, bar.bottom() + tick_len * 2))?;
    }

    let label_y = bar.bottom() + tick_len * 2 + points_to_pixels(10.0, params.dpi) * 3 / 2;
    root.draw_text(
        &params.colorbar_label,
        &TextStyle::from(label_font.clone())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top)),
        (bar.x + bar.w / 2, label_y),
    )?;
    Ok(())
}
