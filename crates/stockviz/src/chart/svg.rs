//! Static SVG output drawn with plotters

use crate::chart::{BarPanel, ChartRenderer, ComparisonChart, LinePanel, OutputFormat};
use crate::error::{Result, StockError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, FontTransform, register_font};
use std::fmt::Display;
use std::ops::Range;
use std::sync::OnceLock;

/// Face used for every label, so output does not depend on host fonts
static SANS_SERIF: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Draws both panels side by side on one SVG canvas
pub struct SvgRenderer {
    width: u32,
    height: u32,
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ChartRenderer for SvgRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Svg
    }

    fn render(&self, chart: &ComparisonChart) -> Result<String> {
        register_fonts()?;
        let mut svg = String::new();

        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;
            let body = root
                .titled(&chart.title, ("sans-serif", 28).into_font())
                .map_err(draw_error)?;

            let split = split_at(self.width, chart.column_widths);
            let (daily_area, overall_area) = body.split_horizontally(split);

            draw_daily(&daily_area, &chart.daily)?;
            draw_overall(&overall_area, &chart.overall)?;

            root.present().map_err(draw_error)?;
        }

        Ok(svg)
    }
}

fn draw_daily<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &LinePanel) -> Result<()> {
    let dates: Vec<NaiveDate> = panel
        .traces
        .iter()
        .flat_map(|t| t.points.iter().map(|p| p.date))
        .collect();
    let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) else {
        return Err(StockError::RenderError(
            "daily panel has no points to draw".to_string(),
        ));
    };
    let x_range = (midnight(*first) - Duration::days(1))..(midnight(*last) + Duration::days(1));
    let y_range = padded_range(
        panel
            .traces
            .iter()
            .flat_map(|t| t.points.iter().map(|p| p.pct_change)),
    );

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .x_desc(panel.x_title.as_str())
        .y_desc(panel.y_title.as_str())
        .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
        .draw()
        .map_err(draw_error)?;

    for (idx, trace) in panel.traces.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points: Vec<(DateTime<Utc>, f64)> = trace
            .points
            .iter()
            .map(|p| (midnight(p.date), p.pct_change))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(draw_error)?
            .label(trace.ticker.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
            .map_err(draw_error)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_error)?;

    Ok(())
}

fn draw_overall<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &BarPanel) -> Result<()> {
    let labels: Vec<&str> = panel.bars.iter().map(|b| b.ticker.as_str()).collect();
    let x_range = -0.5..(labels.len() as f64 - 0.5);
    let y_range = padded_range(panel.bars.iter().map(|b| b.value).chain(std::iter::once(0.0)));
    let fill = RGBAColor(panel.color.r, panel.color.g, panel.color.b, panel.color.a);

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20).into_font())
        .margin(15)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_error)?;

    // Only right-angle text rotation is available, so tick labels run vertically.
    let label_style = ("sans-serif", 14)
        .into_font()
        .transform(FontTransform::Rotate270);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(panel.x_title.as_str())
        .y_desc(panel.y_title.as_str())
        .x_labels(labels.len().max(1))
        .x_label_style(label_style)
        .x_label_formatter(&|x: &f64| tick_label(&labels, *x))
        .draw()
        .map_err(draw_error)?;

    chart
        .draw_series(panel.bars.iter().enumerate().map(|(i, bar)| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, bar.value)], fill.filled())
        }))
        .map_err(draw_error)?
        .label(panel.series_name.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], fill.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_error)?;

    Ok(())
}

fn register_fonts() -> Result<()> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font("sans-serif", FontStyle::Normal, SANS_SERIF)
                .map_err(|_| "embedded sans-serif font could not be loaded".to_string())
        })
        .clone()
        .map_err(StockError::RenderError)
}

/// Pixel column where the daily panel ends and the overall panel begins
fn split_at(width: u32, column_widths: [f64; 2]) -> i32 {
    let [left, right] = column_widths;
    (f64::from(width) * left / (left + right)).round() as i32
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Ticker at bar position `x`, blank between bars
fn tick_label(labels: &[&str], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels
        .get(nearest as usize)
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Value range padded by 10% on both sides, never zero-width
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return -1.0..1.0;
    }
    let span = max - min;
    let padding = if span < 1e-8 { 1.0 } else { span * 0.1 };
    (min - padding)..(max + padding)
}

fn draw_error<E: Display>(err: E) -> StockError {
    StockError::RenderError(err.to_string())
}
