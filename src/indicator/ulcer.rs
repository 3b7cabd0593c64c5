use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices, rolling};
use crate::model::{Bar, Column};

/// Ulcer Index: root-mean-square of trailing percentage drawdowns.
///
/// Per position `i` (window = positions `i - N ..= i`, size N+1):
/// 1. periodHigh = maximum close in the window;
/// 2. drawdownPct = (close[i] - periodHigh) / periodHigh * 100, clipped to
///    at most 0;
/// 3. squared, summed over the trailing N+1 positions (positions before the
///    first full window contribute 0), divided by N;
/// 4. the squared average is rounded to 2 decimals, then its square root is
///    rounded to 2 decimals again. Both roundings are load-bearing: output
///    values depend on them.
///
/// The first N output positions are `None`. Positions N..2N-1 still include
/// zero-filled drawdown terms in their sum, so the earliest defined values
/// understate drawdowns until a full window of real history exists.
pub struct UlcerIndex {
    period: usize,
    column: String,
}

impl UlcerIndex {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self {
            period,
            column: "UlcerIndex".into(),
        })
    }

    /// Rename the output column (default `UlcerIndex`).
    pub fn with_column(mut self, name: &str) -> Self {
        self.column = name.to_string();
        self
    }

    /// Calculate Ulcer values from a close-price slice (internal helper).
    pub fn calculate_closes(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let window = self.period + 1;
        let period_high = rolling::rolling_max(closes, window);

        // Squared percentage drawdowns, zero where the window has not filled.
        let mut squared = vec![0.0; closes.len()];
        for (i, high) in period_high.iter().enumerate() {
            if let Some(high) = high {
                let drawdown = ((closes[i] - high) / high * 100.0).min(0.0);
                squared[i] = drawdown * drawdown;
            }
        }

        rolling::rolling_sum(&squared, window)
            .into_iter()
            .map(|sum| {
                sum.map(|sum| {
                    let squared_average = round2(sum / self.period as f64);
                    round2(squared_average.sqrt())
                })
            })
            .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Indicator for UlcerIndex {
    fn name(&self) -> &str {
        "ulcer"
    }

    fn min_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Result<Vec<Column>, Report<IndicatorError>> {
        if bars.len() < self.min_bars() {
            tracing::debug!(
                required = self.min_bars(),
                available = bars.len(),
                "not enough history for any defined ulcer value"
            );
        }
        Ok(vec![Column {
            name: self.column.clone(),
            values: self.calculate_closes(&close_prices(bars)),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn period_zero_invalid() {
        assert!(UlcerIndex::new(0).is_err());
    }

    #[test]
    fn leading_positions_are_none() {
        let ulcer = UlcerIndex::new(14).unwrap();
        let values = ulcer.calculate_closes(&[10.0; 20]);
        assert_eq!(values.len(), 20);
        for v in &values[..14] {
            assert!(v.is_none());
        }
        for v in &values[14..] {
            assert!(v.is_some());
        }
    }

    #[test]
    fn short_history_yields_all_none() {
        let ulcer = UlcerIndex::new(14).unwrap();
        let columns = ulcer.calculate(&bars_from_closes(&[10.0; 14])).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].values.len(), 14);
        assert!(columns[0].values.iter().all(Option::is_none));
    }

    #[test]
    fn flat_closes_give_zero() {
        // 15 flat bars, N=14: last value must be exactly 0.00.
        let ulcer = UlcerIndex::new(14).unwrap();
        let values = ulcer.calculate_closes(&[10.0; 15]);
        assert_eq!(values[14], Some(0.0));
    }

    #[test]
    fn non_decreasing_closes_give_zero() {
        let ulcer = UlcerIndex::new(4).unwrap();
        let closes: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let values = ulcer.calculate_closes(&closes);
        for v in values.into_iter().flatten() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn strictly_decreasing_closes_known_values() {
        // Closes 100, 99, ..., 86 over 15 bars, N=14. The only defined
        // drawdown in the first full window is (86-100)/100*100 = -14:
        // 196 / 14 = 14.00, sqrt = 3.7416.. -> 3.74.
        let ulcer = UlcerIndex::new(14).unwrap();
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let values = ulcer.calculate_closes(&closes);
        assert_eq!(values[14], Some(3.74));

        // One more bar (close 85): second window adds the drawdown from 99,
        // (85-99)/99*100 squared = 199.9795..; (196 + 199.9795..) / 14
        // rounds to 28.28, sqrt rounds to 5.32.
        let closes: Vec<f64> = (0..16).map(|i| 100.0 - i as f64).collect();
        let values = ulcer.calculate_closes(&closes);
        assert_eq!(values[15], Some(5.32));
    }

    #[test]
    fn values_are_non_negative() {
        let ulcer = UlcerIndex::new(5).unwrap();
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 15.0)
            .collect();
        for v in ulcer.calculate_closes(&closes).into_iter().flatten() {
            assert!(v >= 0.0);
        }
    }

    #[test]
    fn deterministic_on_unmutated_input() {
        let ulcer = UlcerIndex::new(14).unwrap();
        let bars = bars_from_closes(
            &(0..30)
                .map(|i| 50.0 + (i as f64 * 1.3).cos() * 8.0)
                .collect::<Vec<_>>(),
        );
        let first = ulcer.calculate(&bars).unwrap();
        let second = ulcer.calculate(&bars).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn column_name_configurable() {
        let ulcer = UlcerIndex::new(14).unwrap().with_column("UI_14");
        let columns = ulcer.calculate(&bars_from_closes(&[10.0; 15])).unwrap();
        assert_eq!(columns[0].name, "UI_14");
    }
}
