use chrono::NaiveDate;
use error_stack::{Report, bail};
use plotters::prelude::*;

use crate::error::RenderError;
use crate::model::{Bar, PriceTable};
use crate::presenter::{ChartMeta, Presenter};

// Line colors for the indicator panel, cycled per column.
const LINE_COLORS: [RGBColor; 4] = [BLUE, MAGENTA, CYAN, BLACK];

/// Two-panel SVG chart: candlesticks above, indicator line(s) below,
/// sharing the date axis.
pub struct ChartPresenter {
    width: u32,
    height: u32,
}

impl ChartPresenter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ChartPresenter {
    fn default() -> Self {
        Self::new(1280, 960)
    }
}

fn draw_err(e: impl std::fmt::Display) -> Report<RenderError> {
    Report::new(RenderError::Draw {
        reason: e.to_string(),
    })
}

/// Pad a value range so flat series do not collapse the axis.
fn padded(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let mut pad = (max - min) * 0.05;
    if pad == 0.0 {
        pad = if max == 0.0 { 1.0 } else { max.abs() * 0.05 };
    }
    (min - pad, max + pad)
}

/// Split an optional series into contiguous defined runs for line drawing.
fn segments(bars: &[Bar], values: &[Option<f64>]) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (bar, value) in bars.iter().zip(values) {
        match value {
            Some(v) => current.push((bar.date, *v)),
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn candle_width(bar_count: usize, chart_width: u32) -> u32 {
    (chart_width / (bar_count.max(1) as u32 * 2)).clamp(1, 8)
}

impl Presenter for ChartPresenter {
    fn present(
        &self,
        table: &PriceTable,
        series: &[String],
        meta: &ChartMeta,
    ) -> Result<(), Report<RenderError>> {
        if table.is_empty() {
            bail!(RenderError::EmptyTable);
        }
        let bars = table.bars();

        let columns = series
            .iter()
            .map(|name| {
                table.column(name).ok_or_else(|| {
                    Report::new(RenderError::MissingColumn { name: name.clone() })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let start = bars[0].date;
        let mut end = bars[bars.len() - 1].date;
        if start == end {
            // A single bar still needs a non-degenerate axis.
            if let Some(next) = end.succ_opt() {
                end = next;
            }
        }

        let (price_min, price_max) = padded(
            bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
            bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
        );

        let defined: Vec<f64> = columns
            .iter()
            .flat_map(|c| c.values.iter().flatten().copied())
            .collect();
        let (indicator_min, indicator_max) = padded(
            defined.iter().copied().fold(f64::INFINITY, f64::min),
            defined.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        );

        let root = SVGBackend::new(&meta.output, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let (upper, lower) = root.split_vertically((self.height as f32 * 0.58) as i32);

        // ── Candlestick panel ────────────────────────────────────────────────
        let mut price_chart = ChartBuilder::on(&upper)
            .caption(&meta.title, ("sans-serif", 22))
            .margin(8)
            .x_label_area_size(28)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end, price_min..price_max)
            .map_err(draw_err)?;
        price_chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .y_desc("Price, USD")
            .draw()
            .map_err(draw_err)?;
        let width = candle_width(bars.len(), self.width);
        price_chart
            .draw_series(bars.iter().map(|b| {
                CandleStick::new(
                    b.date,
                    b.open,
                    b.high,
                    b.low,
                    b.close,
                    GREEN.filled(),
                    RED.filled(),
                    width,
                )
            }))
            .map_err(draw_err)?;

        // ── Indicator panel ──────────────────────────────────────────────────
        let mut indicator_chart = ChartBuilder::on(&lower)
            .caption(&meta.subtitle, ("sans-serif", 18))
            .margin(8)
            .x_label_area_size(34)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end, indicator_min..indicator_max)
            .map_err(draw_err)?;
        indicator_chart
            .configure_mesh()
            .x_labels(8)
            .y_labels(12)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .x_desc("Date")
            .draw()
            .map_err(draw_err)?;

        for (idx, column) in columns.iter().enumerate() {
            let color = LINE_COLORS[idx % LINE_COLORS.len()];
            let mut labeled = false;
            for run in segments(bars, &column.values) {
                let drawn = indicator_chart
                    .draw_series(LineSeries::new(run, color))
                    .map_err(draw_err)?;
                if !labeled {
                    drawn.label(&column.name).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 16, y)], color)
                    });
                    labeled = true;
                }
            }
        }
        if columns.len() > 1 {
            indicator_chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .draw()
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        Ok(())
    }
}
