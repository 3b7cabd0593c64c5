use std::fmt;

use chrono::NaiveDate;
use error_stack::{Report, bail};

use crate::error::TableError;

/// Indicator supported by the application.
///
/// String representations match the config file format (e.g. `"ulcer"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Ulcer,
    Aroon,
    AroonOsc,
}

impl IndicatorKind {
    /// Parse a config-format string into an `IndicatorKind`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ulcer" => Some(Self::Ulcer),
            "aroon" => Some(Self::Aroon),
            "aroon_osc" => Some(Self::AroonOsc),
            _ => None,
        }
    }

    /// Return the config-format string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ulcer => "ulcer",
            Self::Aroon => "aroon",
            Self::AroonOsc => "aroon_osc",
        }
    }

    /// Default rolling-window length when the config does not set one.
    pub fn default_period(self) -> usize {
        match self {
            Self::Ulcer => 14,
            Self::Aroon | Self::AroonOsc => 25,
        }
    }

    /// Default derived-column names, in the order they are added to the table.
    pub fn default_columns(self) -> &'static [&'static str] {
        match self {
            Self::Ulcer => &["UlcerIndex"],
            Self::Aroon => &["Aroon_Up", "Aroon_Dn"],
            Self::AroonOsc => &["Aroon_Up", "Aroon_Dn", "Aroon_Osc"],
        }
    }

    /// Number of derived columns this indicator produces.
    pub fn column_arity(self) -> usize {
        self.default_columns().len()
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One trading period, keyed by date.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// A named derived series aligned to a bar table.
///
/// `None` marks positions where the rolling window has not filled yet
/// (insufficient history), so "no value" is never confused with an actual
/// zero reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Date-indexed, chronologically ordered table of bars plus derived columns.
///
/// Bars are immutable after construction; the only permitted mutation is
/// add-only column insertion. Columns are never updated or removed.
pub struct PriceTable {
    symbol: String,
    bars: Vec<Bar>,
    columns: Vec<Column>,
}

impl PriceTable {
    /// Build a table from bars already sorted by date.
    ///
    /// Rejects out-of-order and duplicate dates so the strictly-increasing
    /// index invariant holds for every downstream consumer.
    pub fn new(symbol: &str, bars: Vec<Bar>) -> Result<Self, Report<TableError>> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                bail!(TableError::UnsortedBars);
            }
        }
        Ok(Self {
            symbol: symbol.to_string(),
            bars,
            columns: Vec::new(),
        })
    }

    #[allow(dead_code)]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Add a derived column. Rejects duplicate names and length mismatches.
    pub fn add_column(&mut self, column: Column) -> Result<(), Report<TableError>> {
        if self.columns.iter().any(|c| c.name == column.name) {
            bail!(TableError::DuplicateColumn { name: column.name });
        }
        if column.values.len() != self.bars.len() {
            bail!(TableError::LengthMismatch {
                name: column.name,
                expected: self.bars.len(),
                actual: column.values.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[allow(dead_code)]
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
