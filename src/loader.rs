pub mod csv;

use std::path::Path;

use error_stack::Report;

use crate::error::LoaderError;
use crate::model::Bar;

/// Source of historical OHLC bars.
///
/// Implementations must return bars in ascending date order with unique
/// dates, ready for `PriceTable::new`.
pub trait Loader {
    fn load(&self, path: &Path) -> Result<Vec<Bar>, Report<LoaderError>>;
}
