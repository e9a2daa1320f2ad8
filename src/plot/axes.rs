//! Layout and axis helpers shared by the figure and map renderers

use plotters::coord::Shift;
use plotters::prelude::*;

/// Pixel rectangle on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Largest rectangle with the given aspect (width / height) centred in `avail`
pub fn fit_aspect(avail: Rect, aspect: f64) -> Rect {
    if avail.w <= 0 || avail.h <= 0 || !aspect.is_finite() || aspect <= 0.0 {
        return Rect::new(avail.x, avail.y, avail.w.max(0), avail.h.max(0));
    }
    let (w, h) = if (avail.w as f64) / (avail.h as f64) > aspect {
        (((avail.h as f64) * aspect).round() as i32, avail.h)
    } else {
        (avail.w, ((avail.w as f64) / aspect).round() as i32)
    };
    Rect::new(avail.x + (avail.w - w) / 2, avail.y + (avail.h - h) / 2, w, h)
}

/// Round tick step (1, 2 or 5 times a power of ten) giving about `target` ticks
pub fn nice_step(extent: f64, target: usize) -> f64 {
    if extent <= 0.0 || target == 0 {
        return 1.0;
    }
    let raw = extent / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let factor = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Tick positions `0, step, 2*step, ...` not exceeding `extent`
pub fn ticks(extent: f64, target: usize) -> Vec<f64> {
    let step = nice_step(extent, target);
    let mut out = Vec::new();
    let mut k = 0usize;
    loop {
        let v = k as f64 * step;
        if v > extent + step * 1e-9 {
            break;
        }
        out.push(v);
        k += 1;
    }
    out
}

/// Values `start, start + step, ...` strictly below `end` (numpy.arange)
pub fn arange(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || end <= start {
        return Vec::new();
    }
    let n = ((end - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Dotted line between two canvas points
pub fn draw_dotted_line<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    from: (i32, i32),
    to: (i32, i32),
    style: ShapeStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    const DOT: f64 = 2.0;
    const GAP: f64 = 6.0;
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    let len = dx.hypot(dy);
    if len < 1.0 {
        return Ok(());
    }
    let (ux, uy) = (dx / len, dy / len);
    let mut s = 0.0;
    while s < len {
        let e = (s + DOT).min(len);
        let p0 = (from.0 + (ux * s).round() as i32, from.1 + (uy * s).round() as i32);
        let p1 = (from.0 + (ux * e).round() as i32, from.1 + (uy * e).round() as i32);
        area.draw(&PathElement::new(vec![p0, p1], style))?;
        s += DOT + GAP;
    }
    Ok(())
}

/// Clip the segment p0-p1 to an axis-aligned box (Liang-Barsky)
pub fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    for (p, q) in [
        (-dx, p0.0 - x_range.0),
        (dx, x_range.1 - p0.0),
        (-dy, p0.1 - y_range.0),
        (dy, y_range.1 - p0.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }

    if t0 > t1 {
        return None;
    }
    Some((
        (p0.0 + t0 * dx, p0.1 + t0 * dy),
        (p0.0 + t1 * dx, p0.1 + t1 * dy),
    ))
}

/// Degree-minute label, e.g. `60°30'W` (minutes omitted when zero)
pub fn format_dms(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let total_minutes = (value.abs() * 60.0).round() as i64;
    let degrees = total_minutes / 60;
    let minutes = total_minutes % 60;
    if minutes == 0 {
        format!("{}°{}", degrees, hemisphere)
    } else {
        format!("{}°{}'{}", degrees, minutes, hemisphere)
    }
}

pub fn format_longitude(lon: f64) -> String {
    if lon.abs() < 1e-9 || (lon.abs() - 180.0).abs() < 1e-9 {
        return format!("{}°", lon.abs().round());
    }
    format_dms(lon, 'E', 'W')
}

pub fn format_latitude(lat: f64) -> String {
    if lat.abs() < 1e-9 {
        return "0°".to_string();
    }
    format_dms(lat, 'N', 'S')
}

/// Font size in pixels for a size in points at the given resolution
pub fn points_to_pixels(points: f64, dpi: u32) -> i32 {
    (points * dpi as f64 / 72.0).round() as i32
}
