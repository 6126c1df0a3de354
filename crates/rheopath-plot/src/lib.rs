#![warn(missing_docs)]

//! SVG rendering of a toolpath's planar projection.
//!
//! Points are drawn as one connected line with a marker at every move,
//! on axes padded by a fixed number of data units beyond the bounding box.
//!
//! # Example
//!
//! ```
//! use nalgebra::Point2;
//! use rheopath_plot::{render_svg, PlotSettings};
//!
//! let points = vec![Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(5.0, 5.0)];
//! let svg = render_svg(&points, &PlotSettings::default()).unwrap();
//! assert!(svg.contains("<polyline"));
//! ```

pub mod error;

pub use error::{PlotError, Result};

use std::fmt::Write as _;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parameters for SVG rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Width of the SVG in pixels.
    pub width: u32,
    /// Height of the SVG in pixels.
    pub height: u32,
    /// Pixel margin reserved for the title, labels and tick text.
    pub margin: u32,
    /// Axis padding beyond the data bounding box, in data units.
    pub padding: f64,
    /// Plot title.
    pub title: String,
    /// X axis label.
    pub x_label: String,
    /// Y axis label.
    pub y_label: String,
    /// Line color (CSS color string).
    pub line_color: String,
    /// Marker radius in pixels; 0 disables markers.
    pub marker_radius: f64,
    /// Background color.
    pub background_color: String,
    /// Draw grid lines at the tick positions.
    pub grid: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            margin: 60,
            padding: 10.0,
            title: "2D Printing Pattern".to_string(),
            x_label: "X (mm)".to_string(),
            y_label: "Y (mm)".to_string(),
            line_color: "#1f3fbf".to_string(),
            marker_radius: 3.0,
            background_color: "#ffffff".to_string(),
            grid: true,
        }
    }
}

impl PlotSettings {
    /// Create settings with a custom size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Axis limits of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBounds {
    /// Minimum X.
    pub min_x: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl PlotBounds {
    /// Bounding box of `points` grown by `padding` on every side.
    pub fn from_points(points: &[Point2<f64>], padding: f64) -> Result<Self> {
        if points.is_empty() {
            return Err(PlotError::Empty);
        }
        if let Some(idx) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(PlotError::NonFinite(idx));
        }

        let mut bounds = Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for p in points {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
        }

        bounds.min_x -= padding;
        bounds.max_x += padding;
        bounds.min_y -= padding;
        bounds.max_y += padding;
        Ok(bounds)
    }

    /// Width in data units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in data units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Tick spacing of 1, 2 or 5 times a power of ten giving about `target` ticks.
fn nice_step(range: f64, target: f64) -> f64 {
    if range <= 0.0 {
        return 1.0;
    }
    let raw = range / target;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let factor = if residual < 1.5 {
        1.0
    } else if residual < 3.5 {
        2.0
    } else if residual < 7.5 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

fn tick_label(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn ticks(min: f64, max: f64) -> Vec<f64> {
    let step = nice_step(max - min, 8.0);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Render points as an SVG line plot.
pub fn render_svg(points: &[Point2<f64>], settings: &PlotSettings) -> Result<String> {
    let bounds = PlotBounds::from_points(points, settings.padding)?;

    let margin = f64::from(settings.margin);
    let left = margin;
    let top = margin;
    let plot_w = (f64::from(settings.width) - 2.0 * margin).max(1.0);
    let plot_h = (f64::from(settings.height) - 2.0 * margin).max(1.0);

    // Degenerate extents only happen with zero padding.
    let sx = if bounds.width() > 0.0 { plot_w / bounds.width() } else { 1.0 };
    let sy = if bounds.height() > 0.0 { plot_h / bounds.height() } else { 1.0 };
    let px = |x: f64| left + (x - bounds.min_x) * sx;
    // SVG Y is inverted
    let py = |y: f64| top + (bounds.max_y - y) * sy;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <rect width="100%" height="100%" fill="{bg}"/>
"#,
        w = settings.width,
        h = settings.height,
        bg = settings.background_color
    );

    // Grid and ticks
    let _ = writeln!(svg, r##"  <g font-family="sans-serif" font-size="11" fill="#444444">"##);
    for x in ticks(bounds.min_x, bounds.max_x) {
        let gx = px(x);
        if settings.grid {
            let _ = writeln!(
                svg,
                r##"    <line x1="{gx:.2}" y1="{top:.2}" x2="{gx:.2}" y2="{:.2}" stroke="#dddddd" stroke-width="1"/>"##,
                top + plot_h
            );
        }
        let _ = writeln!(
            svg,
            r#"    <text x="{gx:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            top + plot_h + 16.0,
            tick_label(x)
        );
    }
    for y in ticks(bounds.min_y, bounds.max_y) {
        let gy = py(y);
        if settings.grid {
            let _ = writeln!(
                svg,
                r##"    <line x1="{left:.2}" y1="{gy:.2}" x2="{:.2}" y2="{gy:.2}" stroke="#dddddd" stroke-width="1"/>"##,
                left + plot_w
            );
        }
        let _ = writeln!(
            svg,
            r#"    <text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            left - 6.0,
            gy + 4.0,
            tick_label(y)
        );
    }
    svg.push_str("  </g>\n");

    // Frame
    let _ = writeln!(
        svg,
        r##"  <rect x="{left:.2}" y="{top:.2}" width="{plot_w:.2}" height="{plot_h:.2}" fill="none" stroke="#333333" stroke-width="1"/>"##
    );

    // Path
    let mut coords = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            coords.push(' ');
        }
        let _ = write!(coords, "{:.2},{:.2}", px(p.x), py(p.y));
    }
    let _ = writeln!(
        svg,
        r#"  <polyline points="{coords}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
        settings.line_color
    );

    if settings.marker_radius > 0.0 {
        let _ = writeln!(svg, r#"  <g fill="{}">"#, settings.line_color);
        for p in points {
            let _ = writeln!(
                svg,
                r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}"/>"#,
                px(p.x),
                py(p.y),
                settings.marker_radius
            );
        }
        svg.push_str("  </g>\n");
    }

    // Labels
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="16" text-anchor="middle">{}</text>"#,
        left + plot_w / 2.0,
        top / 2.0,
        escape(&settings.title)
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="13" text-anchor="middle">{}</text>"#,
        left + plot_w / 2.0,
        f64::from(settings.height) - 12.0,
        escape(&settings.x_label)
    );
    let _ = writeln!(
        svg,
        r#"  <text x="16" y="{:.2}" font-family="sans-serif" font-size="13" text-anchor="middle" transform="rotate(-90 16 {:.2})">{}</text>"#,
        top + plot_h / 2.0,
        top + plot_h / 2.0,
        escape(&settings.y_label)
    );

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render points and write the SVG to `dest`.
pub fn write_svg(
    dest: impl AsRef<std::path::Path>,
    points: &[Point2<f64>],
    settings: &PlotSettings,
) -> Result<()> {
    let dest = dest.as_ref();
    let svg = render_svg(points, settings)?;
    std::fs::write(dest, svg).map_err(|source| PlotError::IoWrite {
        path: dest.to_path_buf(),
        source,
    })?;
    info!(path = %dest.display(), points = points.len(), "Wrote plot");
    Ok(())
}
