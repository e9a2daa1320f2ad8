use plotters::style::RGBColor;

/// Piecewise-linear channel: (position, value) pairs
type Segments = &'static [(f64, f64)];

// matplotlib "jet" segment data
const JET_RED: Segments = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: Segments = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: Segments = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

fn interpolate(segments: Segments, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    for pair in segments.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            if x1 <= x0 {
                return y1;
            }
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    segments.last().map_or(0.0, |&(_, y)| y)
}

fn to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Jet colormap evaluated at t in [0, 1]
pub fn jet(t: f64) -> RGBColor {
    RGBColor(
        to_u8(interpolate(JET_RED, t)),
        to_u8(interpolate(JET_GREEN, t)),
        to_u8(interpolate(JET_BLUE, t)),
    )
}

/// Linear mapping of data values onto [0, 1], clipped at the ends
#[derive(Debug, Clone, Copy)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Symmetric phase range [-π, π]
    pub fn phase() -> Self {
        Self::new(-std::f64::consts::PI, std::f64::consts::PI)
    }

    pub fn apply(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span.abs() < 1e-12 {
            return 0.5;
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }

    /// Color for a data value, or `None` for NaN (left blank)
    pub fn color(&self, value: f32) -> Option<RGBColor> {
        if value.is_nan() {
            None
        } else {
            Some(jet(self.apply(value as f64)))
        }
    }
}
