pub mod chart;

use std::path::PathBuf;

use error_stack::Report;

use crate::error::RenderError;
use crate::model::PriceTable;

/// Display metadata for a rendered chart.
pub struct ChartMeta {
    /// Caption of the candlestick panel (e.g. "TSLA Daily").
    pub title: String,
    /// Caption of the indicator panel (e.g. "Ulcer Index").
    pub subtitle: String,
    /// Where the rendered chart is written.
    pub output: PathBuf,
}

/// Sink for rendered charts.
///
/// Accepts the bar table (candlestick panel) and the names of the derived
/// columns to draw in the companion panel. Nothing is returned to the
/// pipeline beyond error propagation.
pub trait Presenter {
    fn present(
        &self,
        table: &PriceTable,
        series: &[String],
        meta: &ChartMeta,
    ) -> Result<(), Report<RenderError>>;
}
