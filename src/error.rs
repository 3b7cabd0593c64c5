use chrono::NaiveDate;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum LoaderError {
    #[display("failed to read input file")]
    ReadFile,
    #[display("malformed CSV record")]
    Record,
    #[display("invalid date \"{value}\" (expected MM/DD/YYYY)")]
    InvalidDate { value: String },
    #[display("duplicate date {date}")]
    DuplicateDate { date: NaiveDate },
    #[display("input contains no data rows")]
    Empty,
}

#[derive(Debug, Display, Error)]
pub enum TableError {
    #[display("bars are not in strictly ascending date order")]
    UnsortedBars,
    #[display("column \"{name}\" already exists")]
    DuplicateColumn { name: String },
    #[display("column \"{name}\" has {actual} values, table has {expected} bars")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
    #[display("missing column \"{name}\"")]
    MissingColumn { name: String },
    #[display("failed to add column \"{name}\" to table")]
    AddColumn { name: String },
}

#[derive(Debug, Display, Error)]
pub enum RenderError {
    #[display("chart has no bars to draw")]
    EmptyTable,
    #[display("column \"{name}\" not present in table")]
    MissingColumn { name: String },
    #[display("failed to render chart: {reason}")]
    Draw { reason: String },
}
