use std::collections::HashSet;
use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::IndicatorKind;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_output_dir() -> String {
    "./charts".into()
}

fn default_chart_width() -> u32 {
    1280
}

fn default_chart_height() -> u32 {
    960
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_chart_width")]
    pub chart_width: u32,
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChartConfig {
    pub symbol: String,
    /// Path to the CSV price history for this symbol.
    pub input: String,
    /// One of `"ulcer"`, `"aroon"`, `"aroon_osc"`.
    pub indicator: String,
    /// Rolling-window length; defaults per indicator (14 / 25 / 25).
    pub period: Option<usize>,
    /// Derived column names; arity must match the indicator.
    pub columns: Option<Vec<String>>,
    /// Candlestick panel caption; defaults to "{symbol} Daily".
    pub title: Option<String>,
    /// Output file name under `output_dir`; defaults to
    /// "{symbol}_{indicator}.svg".
    pub output: Option<String>,
}

impl ChartConfig {
    pub fn kind(&self) -> Option<IndicatorKind> {
        IndicatorKind::from_str(&self.indicator)
    }

    pub fn resolved_period(&self, kind: IndicatorKind) -> usize {
        self.period.unwrap_or_else(|| kind.default_period())
    }

    pub fn resolved_columns(&self, kind: IndicatorKind) -> Vec<String> {
        match &self.columns {
            Some(columns) => columns.clone(),
            None => kind
                .default_columns()
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn resolved_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} Daily", self.symbol))
    }

    pub fn resolved_output(&self, output_dir: &str) -> PathBuf {
        let file = self
            .output
            .clone()
            .unwrap_or_else(|| format!("{}_{}.svg", self.symbol, self.indicator));
        Path::new(output_dir).join(file)
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_chart_fields(config)?;
    validate_indicators(config)?;
    validate_outputs_unique(config)?;
    Ok(())
}

fn validate_chart_fields(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    for chart in &config.charts {
        if chart.symbol.is_empty() {
            return Err(Report::new(ConfigError::Validation {
                field: "charts[].symbol must not be empty".into(),
            }));
        }
        if chart.input.is_empty() {
            return Err(Report::new(ConfigError::Validation {
                field: format!("charts[symbol={}].input must not be empty", chart.symbol),
            }));
        }
    }
    Ok(())
}

fn validate_indicators(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    for chart in &config.charts {
        let Some(kind) = chart.kind() else {
            return Err(Report::new(ConfigError::Validation {
                field: format!(
                    "charts[symbol={}].indicator: unknown indicator \"{}\"",
                    chart.symbol, chart.indicator
                ),
            }));
        };

        if chart.period == Some(0) {
            return Err(Report::new(ConfigError::Validation {
                field: format!("charts[symbol={}].period must be > 0", chart.symbol),
            }));
        }

        if let Some(columns) = &chart.columns {
            if columns.len() != kind.column_arity() {
                return Err(Report::new(ConfigError::Validation {
                    field: format!(
                        "charts[symbol={}].columns: {} expects {} names, got {}",
                        chart.symbol,
                        kind,
                        kind.column_arity(),
                        columns.len()
                    ),
                }));
            }
        }
    }
    Ok(())
}

fn validate_outputs_unique(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = HashSet::new();
    for chart in &config.charts {
        let output = chart.resolved_output(&config.general.output_dir);
        if !seen.insert(output.clone()) {
            return Err(Report::new(ConfigError::Validation {
                field: format!("charts: duplicate output path {}", output.display()),
            }));
        }
    }
    Ok(())
}
