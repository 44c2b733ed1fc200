//! Declarative description of a sensor chart and its rendering with plotters.
//!
//! Every program builds a [`ChartSpec`] from its csv log and hands it to
//! [`save_chart`]. The x axis is always f64: seconds from the unix epoch for
//! clock axes, elapsed seconds otherwise. Ticks go exactly at
//! `ChartSpec::x_ticks`, with no padding around the x range.

use crate::timeaxis::{format_clock, format_seconds};
use crate::{min_and_max, PlotError};
use log::debug;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::ops::Range;
use std::path::Path;

/// matplotlib's first cycle color, used when no color is asked for
pub const DEFAULT_BLUE: RGBColor = RGBColor(31, 119, 180);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const ORANGE_RED: RGBColor = RGBColor(255, 69, 0);

/// base font size, points
const FONT_PT: f64 = 10.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    Left,
    Right,
}

/// how the x tick labels are written
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XFormat {
    /// HH:MM of the epoch seconds
    Clock,
    /// plain elapsed seconds
    Seconds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YAxis {
    pub desc: String,
    pub range: Range<f64>,
}

impl YAxis {
    pub fn new(desc: &str, range: Range<f64>) -> YAxis {
        YAxis {
            desc: desc.to_string(),
            range,
        }
    }
}

/// One line of the chart; NAN values leave a gap
#[derive(Clone)]
pub struct Trace {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: RGBColor,
    /// line width, points
    pub width: f64,
    pub dashed: bool,
    pub axis: Axis,
}

impl Trace {
    pub fn new(label: &str, x: Vec<f64>, y: Vec<f64>, color: RGBColor, width: f64) -> Trace {
        Trace {
            label: label.to_string(),
            x,
            y,
            color,
            width,
            dashed: false,
            axis: Axis::Left,
        }
    }

    pub fn dashed(mut self) -> Trace {
        self.dashed = true;
        self
    }

    pub fn on_right(mut self) -> Trace {
        self.axis = Axis::Right;
        self
    }
}

/// Marks the first and last valid values of a trace: a shaded band between
/// the two levels, a marker on each end, a dotted line, and a text at the end.
#[derive(Clone)]
pub struct Highlight {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub color: RGBColor,
    pub text: String,
}

#[derive(Clone)]
pub struct ChartSpec {
    /// width and height in inches
    pub figsize: (f64, f64),
    pub dpi: u32,
    pub x_range: Range<f64>,
    pub x_ticks: Vec<f64>,
    pub x_format: XFormat,
    pub x_desc: Option<String>,
    pub left: YAxis,
    pub right: Option<YAxis>,
    pub traces: Vec<Trace>,
    pub highlight: Option<Highlight>,
}

impl ChartSpec {
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.figsize.0 * dpi).round() as u32,
            (self.figsize.1 * dpi).round() as u32,
        )
    }

    /// pixels per point
    fn scale(&self) -> f64 {
        self.dpi as f64 / 72.
    }

    fn axis_range(&self, axis: Axis) -> Range<f64> {
        match (axis, &self.right) {
            (Axis::Right, Some(r)) => r.range.clone(),
            _ => self.left.range.clone(),
        }
    }

    /// all the finite points, normalized to the unit square of their own axis
    fn normalized_points(&self) -> Vec<(f64, f64)> {
        let xr = &self.x_range;
        let xspan = xr.end - xr.start;
        let mut points = Vec::new();
        for trace in self.traces.iter() {
            let yr = self.axis_range(trace.axis);
            let yspan = yr.end - yr.start;
            if xspan == 0. || yspan == 0. {
                continue;
            }
            for (&x, &y) in trace.x.iter().zip(trace.y.iter()) {
                if x.is_finite() && y.is_finite() {
                    points.push(((x - xr.start) / xspan, (y - yr.start) / yspan));
                }
            }
        }
        points
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendCorner {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl From<LegendCorner> for SeriesLabelPosition {
    fn from(c: LegendCorner) -> SeriesLabelPosition {
        match c {
            LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
            LegendCorner::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendCorner::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendCorner::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

/// The corner whose box covers the fewest data points, with points given in
/// unit coordinates (0,0 lower left). Ties keep the first corner in the order
/// upper right, upper left, lower left, lower right.
pub fn best_legend_corner(points: &[(f64, f64)]) -> LegendCorner {
    const BOX: f64 = 0.4;
    let corners = [
        LegendCorner::UpperRight,
        LegendCorner::UpperLeft,
        LegendCorner::LowerLeft,
        LegendCorner::LowerRight,
    ];
    let inside = |c: LegendCorner, (x, y): (f64, f64)| {
        let right = x >= 1. - BOX;
        let left = x <= BOX;
        let upper = y >= 1. - BOX;
        let lower = y <= BOX;
        match c {
            LegendCorner::UpperRight => right && upper,
            LegendCorner::UpperLeft => left && upper,
            LegendCorner::LowerLeft => left && lower,
            LegendCorner::LowerRight => right && lower,
        }
    };
    let mut best = corners[0];
    let mut best_count = usize::MAX;
    for &c in corners.iter() {
        let n = points.iter().filter(|&&p| inside(c, p)).count();
        if n < best_count {
            best = c;
            best_count = n;
        }
    }
    best
}

/// finite data range with a 5% margin on both sides
pub fn auto_range(values: &[f64]) -> Range<f64> {
    match min_and_max(values) {
        None => 0.0..1.0,
        Some((min, max)) if min == max => {
            let delta = if min == 0. { 1. } else { min.abs() * 0.1 };
            (min - delta)..(max + delta)
        }
        Some((min, max)) => {
            let margin = (max - min) * 0.05;
            (min - margin)..(max + margin)
        }
    }
}

/// first to last value, no padding; falls back to min..max when the values
/// are not increasing and widens a single instant by one second each side
pub fn x_limits(xs: &[f64]) -> Range<f64> {
    let (first, last) = match (xs.first(), xs.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return 0.0..1.0,
    };
    let (lo, hi) = if first < last {
        (first, last)
    } else {
        min_and_max(xs).unwrap_or((first, last))
    };
    if lo == hi {
        (lo - 1.)..(hi + 1.)
    } else {
        lo..hi
    }
}

/// the continuous runs of finite points, the pieces of a line with gaps
pub fn segments(x: &[f64], y: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (&xv, &yv) in x.iter().zip(y.iter()) {
        if xv.is_finite() && yv.is_finite() {
            current.push((xv, yv));
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// short tick label: at most three decimals, no trailing zeros
pub fn format_value(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Linear f64 axis whose grid and labels sit exactly at the given ticks
struct TickedAxis {
    linear: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(range: Range<f64>, ticks: &[f64]) -> TickedAxis {
        TickedAxis {
            ticks: ticks
                .iter()
                .copied()
                .filter(|t| range.start <= *t && *t <= range.end)
                .collect(),
            linear: range.into(),
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.linear.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.linear.range()
    }
}

/// Renders the chart to the image file, the extension selects the backend
pub fn save_chart(spec: &ChartSpec, fout: &Path) -> Result<(), Box<dyn Error>> {
    let ext = fout
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let size = spec.pixel_size();
    debug!("rendering {}x{} px to {}", size.0, size.1, fout.display());
    match ext.as_str() {
        "svg" => {
            let root = SVGBackend::new(fout, size).into_drawing_area();
            draw_chart(&root, spec)?;
            root.present()?;
        }
        "png" | "jpg" | "jpeg" | "bmp" => {
            let root = BitMapBackend::new(fout, size).into_drawing_area();
            draw_chart(&root, spec)?;
            root.present()?;
        }
        other => return Err(PlotError::UnsupportedFormat(other.to_string()).into()),
    }
    Ok(())
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let px = spec.scale();
    let font_px = FONT_PT * px;
    let font = FontDesc::new(FontFamily::SansSerif, font_px, FontStyle::Normal);
    let x_format = spec.x_format;
    let x_fmt = move |v: &f64| match x_format {
        XFormat::Clock => format_clock(*v),
        XFormat::Seconds => format_seconds(*v),
    };
    let y_fmt = |v: &f64| format_value(*v);

    root.fill(&WHITE)?;

    let (x0, x1) = (spec.x_range.start, spec.x_range.end);
    let right_range = spec
        .right
        .as_ref()
        .map(|r| r.range.clone())
        .unwrap_or(0.0..1.0);
    let mut builder = ChartBuilder::on(root);
    builder
        .margin((8. * px) as u32)
        .x_label_area_size((5. * font_px) as u32)
        .y_label_area_size((6. * font_px) as u32);
    if spec.right.is_some() {
        builder.right_y_label_area_size((6. * font_px) as u32);
    }
    let mut chart = builder
        .build_cartesian_2d(
            TickedAxis::new(x0..x1, &spec.x_ticks),
            spec.left.range.clone(),
        )?
        .set_secondary_coord(x0..x1, right_range);

    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(&TRANSPARENT)
        .bold_line_style(BLACK.mix(0.3).stroke_width(1))
        .set_all_tick_mark_size((3. * px) as u32)
        .label_style(font.clone())
        .x_label_style(font.clone().transform(FontTransform::Rotate270))
        .axis_desc_style(font.clone())
        .x_labels(spec.x_ticks.len().max(1))
        .y_labels(10)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .y_desc(spec.left.desc.as_str());
    if let Some(desc) = &spec.x_desc {
        mesh.x_desc(desc.as_str());
    }
    mesh.draw()?;

    if let Some(right) = &spec.right {
        chart
            .configure_secondary_axes()
            .label_style(font.clone())
            .axis_desc_style(font.clone())
            .y_labels(10)
            .y_label_formatter(&y_fmt)
            .y_desc(right.desc.as_str())
            .draw()?;
    }

    if let Some(h) = &spec.highlight {
        let (ylo, yhi) = if h.start.1 <= h.end.1 {
            (h.start.1, h.end.1)
        } else {
            (h.end.1, h.start.1)
        };
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x0, ylo), (x1, yhi)],
            h.color.mix(0.12).filled(),
        )))?;
    }

    for trace in spec.traces.iter() {
        let line_px = ((trace.width * px).round() as u32).max(1);
        let style = trace.color.stroke_width(line_px);
        let dash = 4 * line_px;
        let gap = 2 * line_px;
        let mut pieces = segments(&trace.x, &trace.y);
        if pieces.is_empty() {
            // nothing to draw, the legend still lists the trace
            pieces.push(Vec::new());
        }
        for (k, seg) in pieces.into_iter().enumerate() {
            let anno = match (trace.axis, trace.dashed) {
                (Axis::Left, false) => chart.draw_series(LineSeries::new(seg, style))?,
                (Axis::Left, true) => {
                    chart.draw_series(DashedLineSeries::new(seg, dash, gap, style))?
                }
                (Axis::Right, false) => chart.draw_secondary_series(LineSeries::new(seg, style))?,
                (Axis::Right, true) => {
                    chart.draw_secondary_series(DashedLineSeries::new(seg, dash, gap, style))?
                }
            };
            if k > 0 {
                continue;
            }
            let sample = (2. * font_px) as i32;
            anno.label(trace.label.as_str());
            if trace.dashed {
                let d = sample * 2 / 5;
                anno.legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (d, 0)], style)
                        + PathElement::new(vec![(sample - d, 0), (sample, 0)], style)
                });
            } else {
                anno.legend(move |(x, y)| PathElement::new(vec![(x, y), (x + sample, y)], style));
            }
        }
    }

    if let Some(h) = &spec.highlight {
        let marker = (3. * px) as u32;
        chart.draw_series(
            [h.start, h.end]
                .iter()
                .map(|&p| Circle::new(p, marker, h.color.filled())),
        )?;
        chart.draw_series(DashedLineSeries::new(
            vec![h.start, h.end],
            (2. * px) as u32,
            (2. * px) as u32,
            h.color.stroke_width(px.round().max(1.) as u32),
        ))?;
        let offset = (10. * px) as i32;
        let text_style = font
            .clone()
            .color(&h.color)
            .pos(Pos::new(HPos::Right, VPos::Bottom));
        chart.draw_series(std::iter::once(
            EmptyElement::at(h.end) + Text::new(h.text.clone(), (-offset, -offset), text_style),
        ))?;
    }

    let corner = best_legend_corner(&spec.normalized_points());
    chart
        .configure_series_labels()
        .position(corner.into())
        .margin((6. * px) as u32)
        .legend_area_size((2.5 * font_px) as u32)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .label_font(font)
        .draw()?;
    Ok(())
}
