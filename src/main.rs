mod config;
mod error;
mod indicator;
mod loader;
mod model;
mod presenter;

use std::path::Path;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{AppConfig, ChartConfig, GeneralConfig};
use error::IndicatorError;
use indicator::Indicator;
use indicator::aroon::{self, Aroon};
use indicator::ulcer::UlcerIndex;
use loader::Loader;
use loader::csv::CsvLoader;
use model::{Column, IndicatorKind, PriceTable};
use presenter::chart::ChartPresenter;
use presenter::{ChartMeta, Presenter};

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("failed to load {symbol}")]
    Load { symbol: String },
    #[display("failed to compute {indicator} for {symbol}")]
    Compute { symbol: String, indicator: String },
    #[display("failed to render chart for {symbol}")]
    Render { symbol: String },
    #[display("{failed} of {total} chart jobs failed")]
    Jobs { failed: usize, total: usize },
}

#[derive(Parser)]
#[command(
    name = "indicator-charter",
    about = "Candlestick charts with Ulcer Index and Aroon indicators"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

fn main() {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    if config.charts.is_empty() {
        tracing::warn!("no charts configured; nothing to do");
        return Ok(());
    }

    let output_dir = &config.general.output_dir;
    std::fs::create_dir_all(output_dir)
        .change_context(AppError::Config)
        .attach_with(|| format!("output_dir: {output_dir}"))?;

    let loader = CsvLoader::new();
    let presenter = ChartPresenter::new(config.general.chart_width, config.general.chart_height);

    // ── Chart jobs ────────────────────────────────────────────────────────────
    // Each job is an independent load -> compute -> present pipeline; one
    // failing symbol does not stop the rest.
    let total = config.charts.len();
    let mut failed = 0;
    for chart in &config.charts {
        if let Err(report) = run_chart(chart, &config.general, &loader, &presenter) {
            tracing::error!(symbol = %chart.symbol, error = ?report, "chart job failed");
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(Report::new(AppError::Jobs { failed, total }));
    }

    info!(charts = total, "all chart jobs complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

/// Run one symbol's pipeline with explicit parameters; no state is shared
/// across invocations.
fn run_chart(
    chart: &ChartConfig,
    general: &GeneralConfig,
    loader: &dyn Loader,
    presenter: &dyn Presenter,
) -> Result<(), Report<AppError>> {
    // Validation guarantees the indicator name parses.
    let kind = chart
        .kind()
        .ok_or_else(|| Report::new(AppError::Config))?;
    let period = chart.resolved_period(kind);
    let columns = chart.resolved_columns(kind);

    let bars = loader
        .load(Path::new(&chart.input))
        .change_context_lazy(|| AppError::Load {
            symbol: chart.symbol.clone(),
        })?;
    info!(symbol = %chart.symbol, bars = bars.len(), "loaded price history");

    let mut table =
        PriceTable::new(&chart.symbol, bars).change_context_lazy(|| AppError::Load {
            symbol: chart.symbol.clone(),
        })?;

    let plotted = compute_columns(&mut table, kind, period, &columns).change_context_lazy(|| {
        AppError::Compute {
            symbol: chart.symbol.clone(),
            indicator: kind.to_string(),
        }
    })?;

    let meta = ChartMeta {
        title: chart.resolved_title(),
        subtitle: subtitle(kind),
        output: chart.resolved_output(&general.output_dir),
    };
    presenter
        .present(&table, &plotted, &meta)
        .change_context_lazy(|| AppError::Render {
            symbol: chart.symbol.clone(),
        })?;

    info!(
        symbol = %chart.symbol,
        indicator = %kind,
        period,
        output = %meta.output.display(),
        "chart written"
    );
    Ok(())
}

/// Add the indicator's derived columns to the table and return the names to
/// plot in the companion panel.
///
/// The oscillator is derived from the Aroon columns already added to the
/// same table, so indicators are always computed before it (add-only column
/// mutation, never recomputation).
fn compute_columns(
    table: &mut PriceTable,
    kind: IndicatorKind,
    period: usize,
    columns: &[String],
) -> Result<Vec<String>, Report<IndicatorError>> {
    match kind {
        IndicatorKind::Ulcer => {
            let ulcer = UlcerIndex::new(period)?.with_column(&columns[0]);
            let derived = ulcer.calculate(table.bars())?;
            add_columns(table, derived)?;
            Ok(vec![columns[0].clone()])
        }
        IndicatorKind::Aroon => {
            let aroon = Aroon::new(period)?.with_columns(&columns[0], &columns[1]);
            let derived = aroon.calculate(table.bars())?;
            add_columns(table, derived)?;
            Ok(columns.to_vec())
        }
        IndicatorKind::AroonOsc => {
            let aroon = Aroon::new(period)?.with_columns(&columns[0], &columns[1]);
            let derived = aroon.calculate(table.bars())?;
            add_columns(table, derived)?;
            let osc = {
                let up = lookup(table, &columns[0])?;
                let down = lookup(table, &columns[1])?;
                aroon::oscillator(&up.values, &down.values)
            };
            add_columns(
                table,
                vec![Column {
                    name: columns[2].clone(),
                    values: osc,
                }],
            )?;
            Ok(vec![columns[2].clone()])
        }
    }
}

fn add_columns(
    table: &mut PriceTable,
    columns: Vec<Column>,
) -> Result<(), Report<IndicatorError>> {
    for column in columns {
        let name = column.name.clone();
        table
            .add_column(column)
            .change_context(IndicatorError::AddColumn { name })?;
    }
    Ok(())
}

fn lookup<'a>(table: &'a PriceTable, name: &str) -> Result<&'a Column, Report<IndicatorError>> {
    table.column(name).ok_or_else(|| {
        Report::new(IndicatorError::MissingColumn {
            name: name.to_string(),
        })
    })
}

fn subtitle(kind: IndicatorKind) -> String {
    match kind {
        IndicatorKind::Ulcer => "Ulcer Index".into(),
        IndicatorKind::Aroon => "Aroon Indicator".into(),
        IndicatorKind::AroonOsc => "Aroon Osc".into(),
    }
}
