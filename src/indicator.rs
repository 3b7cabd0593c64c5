pub mod aroon;
pub mod rolling;
pub mod ulcer;

use error_stack::Report;

use crate::error::IndicatorError;
use crate::model::{Bar, Column};

/// A technical analysis indicator that operates on a slice of bars.
///
/// Bars must be in ascending chronological order (oldest first). Output
/// columns are always the same length as the input and aligned to it;
/// positions without enough trailing history are `None`. A derived value at
/// position `i` depends only on bars at positions `i - N ..= i` (no
/// look-ahead).
pub trait Indicator: Send {
    /// Unique name of this indicator (e.g., "ulcer", "aroon").
    #[allow(dead_code)]
    fn name(&self) -> &str;

    /// Minimum number of bars required to produce at least one defined value.
    fn min_bars(&self) -> usize;

    /// Calculate derived columns from bars.
    ///
    /// A table shorter than the rolling window is not an error: the result
    /// is all-`None` columns (insufficient history yields placeholders, not
    /// failures).
    fn calculate(&self, bars: &[Bar]) -> Result<Vec<Column>, Report<IndicatorError>>;
}

/// Extract close prices from a slice of bars.
pub fn close_prices(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Extract high prices from a slice of bars.
pub fn high_prices(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.high).collect()
}

/// Extract low prices from a slice of bars.
pub fn low_prices(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.low).collect()
}
