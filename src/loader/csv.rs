use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use error_stack::{Report, ResultExt, bail};

use crate::error::LoaderError;
use crate::loader::Loader;
use crate::model::Bar;

const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// One row of the input table. Unknown columns are ignored; `Volume` is
/// optional.
#[derive(Debug, serde::Deserialize)]
struct CsvRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume", default)]
    volume: Option<f64>,
}

/// Reads OHLC bars from a column-delimited file with at least
/// `Date, Open, High, Low, Close` headers, in any row order.
///
/// Rows are sorted ascending by date after parsing; duplicate dates are
/// rejected so the table's strictly-increasing index invariant holds.
pub struct CsvLoader {
    date_format: String,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.into(),
        }
    }

    #[allow(dead_code)]
    pub fn with_date_format(format: &str) -> Self {
        Self {
            date_format: format.into(),
        }
    }

    /// Parse bars from any reader (internal helper, also used by tests).
    fn read_bars<R: Read>(&self, reader: R) -> Result<Vec<Bar>, Report<LoaderError>> {
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_reader(reader);

        let mut bars = Vec::new();
        for result in csv_reader.deserialize::<CsvRecord>() {
            let record = result.change_context(LoaderError::Record)?;
            let date = NaiveDate::parse_from_str(&record.date, &self.date_format)
                .change_context_lazy(|| LoaderError::InvalidDate {
                    value: record.date.clone(),
                })?;
            bars.push(Bar {
                date,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }

        if bars.is_empty() {
            bail!(LoaderError::Empty);
        }

        bars.sort_by_key(|b| b.date);
        for pair in bars.windows(2) {
            if pair[0].date == pair[1].date {
                bail!(LoaderError::DuplicateDate { date: pair[0].date });
            }
        }

        Ok(bars)
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader for CsvLoader {
    fn load(&self, path: &Path) -> Result<Vec<Bar>, Report<LoaderError>> {
        let file = std::fs::File::open(path)
            .change_context(LoaderError::ReadFile)
            .attach_with(|| format!("path: {}", path.display()))?;
        self.read_bars(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(input: &str) -> Result<Vec<Bar>, Report<LoaderError>> {
        CsvLoader::new().read_bars(input.as_bytes())
    }

    #[test]
    fn parses_basic_rows() {
        let bars = load(
            "Date,Open,High,Low,Close,Volume\n\
             01/02/2024,10.0,11.0,9.5,10.5,1000\n\
             01/03/2024,10.5,12.0,10.0,11.5,1500\n",
        )
        .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].volume, Some(1500.0));
    }

    #[test]
    fn sorts_rows_by_date() {
        let bars = load(
            "Date,Open,High,Low,Close\n\
             01/03/2024,1.0,1.0,1.0,2.0\n\
             01/02/2024,1.0,1.0,1.0,1.0\n",
        )
        .unwrap();
        assert!(bars[0].date < bars[1].date);
        assert_eq!(bars[0].close, 1.0);
    }

    #[test]
    fn tolerates_extra_columns_and_missing_volume() {
        let bars = load(
            "Date,Open,High,Low,Close,OpenInt\n\
             01/02/2024,1.0,2.0,0.5,1.5,0\n",
        )
        .unwrap();
        assert_eq!(bars[0].volume, None);
    }

    #[test]
    fn tolerates_reordered_columns() {
        let bars = load(
            "Close,Date,Low,High,Open\n\
             1.5,01/02/2024,0.5,2.0,1.0\n",
        )
        .unwrap();
        assert_eq!(bars[0].open, 1.0);
        assert_eq!(bars[0].close, 1.5);
    }

    #[test]
    fn rejects_bad_date_format() {
        let result = load(
            "Date,Open,High,Low,Close\n\
             2024-01-02,1.0,1.0,1.0,1.0\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_duplicate_dates() {
        let result = load(
            "Date,Open,High,Low,Close\n\
             01/02/2024,1.0,1.0,1.0,1.0\n\
             01/02/2024,2.0,2.0,2.0,2.0\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_price_column() {
        let result = load(
            "Date,Open,High,Low\n\
             01/02/2024,1.0,1.0,1.0\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(load("Date,Open,High,Low,Close\n").is_err());
    }
}
