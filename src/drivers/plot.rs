use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use log::warn;
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::ScopeError;
use crate::drivers::figure::{Axis, Figure};
/// Canvas size and the palette used when a trace color cannot be parsed.
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub fallback_palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            fallback_palette: vec![BLUE, RED, GREEN, CYAN, MAGENTA, YELLOW, WHITE],
        }
    }
}
/// Parses `#rrggbb`, `#rgb` or a basic color name.
pub fn parse_color(token: &str) -> Result<RGBColor, ScopeError> {
    let invalid = || ScopeError::InvalidColor(token.to_owned());
    let token = token.trim();
    if let Some(hex) = token.strip_prefix('#') {
        let digits = match hex.len() {
            6 => hex.to_owned(),
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(invalid()),
        };
        let value = u32::from_str_radix(&digits, 16).map_err(|_| invalid())?;
        return Ok(RGBColor(
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ));
    }
    match token.to_ascii_lowercase().as_str() {
        "black" => Ok(BLACK),
        "white" => Ok(WHITE),
        "red" => Ok(RED),
        "green" => Ok(GREEN),
        "blue" => Ok(BLUE),
        "cyan" => Ok(CYAN),
        "magenta" => Ok(MAGENTA),
        "yellow" => Ok(YELLOW),
        "teal" => Ok(RGBColor(0, 128, 128)),
        "gray" | "grey" => Ok(RGBColor(128, 128, 128)),
        _ => Err(invalid()),
    }
}
/// Draws `figure` onto a bitmap and returns it PNG-encoded.
///
/// Axes without an explicit range are fitted to the data; an empty figure
/// renders just the frame.
pub fn render_figure_png(figure: &Figure, style: &PlotStyle) -> Result<Vec<u8>, ScopeError> {
    let layout = &figure.layout;
    let background = color_or(&layout.plot_bgcolor, BLACK);
    let font_color = color_or(&layout.font.color, WHITE);
    let grid_color = color_or(&layout.x_axis.grid_color, RGBColor(60, 60, 60));
    let x_bounds = axis_bounds(
        &layout.x_axis,
        figure.traces.iter().flat_map(|t| t.x.iter().copied()),
    );
    let y_bounds = axis_bounds(
        &layout.y_axis,
        figure.traces.iter().flat_map(|t| t.y.iter().copied()),
    );
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&background)?;
        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 45)
            .set_label_area_size(LabelAreaPosition::Bottom, 40);
        if let Some(title) = &layout.title {
            builder.caption(title, ("sans-serif", 20).into_font().color(&font_color));
        }
        let mut chart =
            builder.build_cartesian_2d(x_bounds.0..x_bounds.1, y_bounds.0..y_bounds.1)?;
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(layout.x_axis.title.as_str())
            .y_desc(layout.y_axis.title.as_str())
            .label_style(("sans-serif", 12).into_font().color(&font_color))
            .axis_style(&grid_color)
            .bold_line_style(&grid_color)
            .light_line_style(&grid_color.mix(0.3));
        if !layout.x_axis.show_grid {
            mesh.disable_x_mesh();
        }
        if !layout.y_axis.show_grid {
            mesh.disable_y_mesh();
        }
        mesh.draw()?;
        for (idx, trace) in figure.traces.iter().enumerate() {
            if trace.y.is_empty() {
                continue;
            }
            let color = match parse_color(trace.color()) {
                Ok(color) => color,
                Err(err) => {
                    warn!("{err}; using fallback palette for {}", trace.name);
                    fallback(style, idx)
                }
            };
            let width = trace.line.width.round().max(1.0) as u32;
            let series = trace.x.iter().copied().zip(trace.y.iter().copied());
            let drawn = chart.draw_series(LineSeries::new(series, color.stroke_width(width)))?;
            if layout.show_legend {
                drawn
                    .label(trace.name.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            }
        }
        if layout.show_legend && !figure.traces.is_empty() {
            chart
                .configure_series_labels()
                .label_font(("sans-serif", 12).into_font().color(&font_color))
                .border_style(&grid_color)
                .background_style(&background)
                .draw()?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn color_or(token: &str, default: RGBColor) -> RGBColor {
    parse_color(token).unwrap_or(default)
}
fn fallback(style: &PlotStyle, idx: usize) -> RGBColor {
    if style.fallback_palette.is_empty() {
        BLUE
    } else {
        style.fallback_palette[idx % style.fallback_palette.len()]
    }
}
/// Explicit range when present, otherwise the data extent. Never returns an empty span.
fn axis_bounds(axis: &Axis, values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = match axis.range {
        Some([a, b]) => (a.min(b), a.max(b)),
        None => values
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .unwrap_or((-1.0, 1.0)),
    };
    if (hi - lo).abs() < f64::EPSILON {
        let pad = (lo.abs() * 0.1).max(1.0);
        (lo - pad, hi + pad)
    } else {
        (lo, hi)
    }
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScopeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ScopeError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
