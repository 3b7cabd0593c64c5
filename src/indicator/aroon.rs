use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, high_prices, low_prices, rolling};
use crate::model::{Bar, Column};

/// Aroon Indicator: how recently the trailing window's high/low occurred.
///
/// Per position `i` (window = positions `i - N ..= i`, size N+1):
/// Aroon-Up = offsetOfMax / N * 100, where offsetOfMax (0..=N, counted from
/// the oldest bar in the window) locates the maximum `high`; equivalently
/// (N - periodsSinceHigh) / N * 100, so the value is 100 when the high is
/// the newest bar and 0 when it is the oldest. Aroon-Down is symmetric over
/// the minimum of `low`. Ties resolve to the earliest bar in the window.
///
/// Both outputs are in [0, 100]; the first N positions are `None`.
pub struct Aroon {
    period: usize,
    up_column: String,
    down_column: String,
}

impl Aroon {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self {
            period,
            up_column: "Aroon_Up".into(),
            down_column: "Aroon_Dn".into(),
        })
    }

    /// Rename the output columns (defaults `Aroon_Up` / `Aroon_Dn`).
    pub fn with_columns(mut self, up: &str, down: &str) -> Self {
        self.up_column = up.to_string();
        self.down_column = down.to_string();
        self
    }

    /// Calculate (up, down) series from price slices (internal helper).
    pub fn calculate_highs_lows(
        &self,
        highs: &[f64],
        lows: &[f64],
    ) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let window = self.period + 1;
        let up = self.offsets_to_values(rolling::rolling_argmax(highs, window));
        let down = self.offsets_to_values(rolling::rolling_argmin(lows, window));
        (up, down)
    }

    fn offsets_to_values(&self, extremum_idx: Vec<Option<usize>>) -> Vec<Option<f64>> {
        let window = self.period + 1;
        extremum_idx
            .into_iter()
            .enumerate()
            .map(|(i, idx)| {
                idx.map(|idx| {
                    // Offset of the extremum from the oldest bar in the window.
                    let offset = idx - (i + 1 - window);
                    offset as f64 / self.period as f64 * 100.0
                })
            })
            .collect()
    }
}

/// Aroon Oscillator: elementwise Up - Down over two aligned series,
/// `None` where either input is undefined. Range [-100, 100], no windowing.
pub fn oscillator(up: &[Option<f64>], down: &[Option<f64>]) -> Vec<Option<f64>> {
    debug_assert_eq!(up.len(), down.len());
    up.iter()
        .zip(down)
        .map(|(up, down)| match (up, down) {
            (Some(up), Some(down)) => Some(up - down),
            _ => None,
        })
        .collect()
}

impl Indicator for Aroon {
    fn name(&self) -> &str {
        "aroon"
    }

    fn min_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Result<Vec<Column>, Report<IndicatorError>> {
        if bars.len() < self.min_bars() {
            tracing::debug!(
                required = self.min_bars(),
                available = bars.len(),
                "not enough history for any defined aroon value"
            );
        }
        let (up, down) = self.calculate_highs_lows(&high_prices(bars), &low_prices(bars));
        Ok(vec![
            Column {
                name: self.up_column.clone(),
                values: up,
            },
            Column {
                name: self.down_column.clone(),
                values: down,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_highs_lows(highs: &[f64], lows: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        highs
            .iter()
            .zip(lows)
            .enumerate()
            .map(|(i, (&high, &low))| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: (high + low) / 2.0,
                high,
                low,
                close: (high + low) / 2.0,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn period_zero_invalid() {
        assert!(Aroon::new(0).is_err());
    }

    #[test]
    fn leading_positions_are_none() {
        let aroon = Aroon::new(25).unwrap();
        let highs: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 1.0).collect();
        let (up, down) = aroon.calculate_highs_lows(&highs, &lows);
        for i in 0..25 {
            assert!(up[i].is_none());
            assert!(down[i].is_none());
        }
        assert!(up[25].is_some());
        assert!(down[25].is_some());
    }

    #[test]
    fn max_at_newest_bar_gives_100() {
        // 26-bar window, N=25, maximum high on the very last bar.
        let aroon = Aroon::new(25).unwrap();
        let highs: Vec<f64> = (0..26).map(|i| 10.0 + i as f64).collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 1.0).collect();
        let (up, down) = aroon.calculate_highs_lows(&highs, &lows);
        assert_eq!(up[25], Some(100.0));
        // Lowest low sits at the oldest bar.
        assert_eq!(down[25], Some(0.0));
    }

    #[test]
    fn max_at_oldest_bar_gives_0() {
        let aroon = Aroon::new(25).unwrap();
        let highs: Vec<f64> = (0..26).map(|i| 50.0 - i as f64).collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 1.0).collect();
        let (up, down) = aroon.calculate_highs_lows(&highs, &lows);
        assert_eq!(up[25], Some(0.0));
        assert_eq!(down[25], Some(100.0));
    }

    #[test]
    fn tie_resolves_to_earliest_bar() {
        // Highs tie at offsets 1 and 3 of the window; the earlier bar wins,
        // so Aroon-Up reads 1/5 * 100, not 3/5 * 100.
        let aroon = Aroon::new(5).unwrap();
        let highs = [10.0, 15.0, 12.0, 15.0, 11.0, 9.0];
        let lows = [8.0, 9.0, 7.0, 8.0, 6.0, 5.0];
        let (up, _) = aroon.calculate_highs_lows(&highs, &lows);
        assert_eq!(up[5], Some(20.0));
    }

    #[test]
    fn values_stay_in_range() {
        let aroon = Aroon::new(7).unwrap();
        let highs: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.9).sin() * 12.0)
            .collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 3.0).collect();
        let (up, down) = aroon.calculate_highs_lows(&highs, &lows);
        for v in up.into_iter().chain(down).flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn oscillator_is_exact_elementwise_difference() {
        let aroon = Aroon::new(5).unwrap();
        let highs: Vec<f64> = (0..20)
            .map(|i| 50.0 + (i as f64 * 1.7).sin() * 10.0)
            .collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 4.0).collect();
        let (up, down) = aroon.calculate_highs_lows(&highs, &lows);
        let osc = oscillator(&up, &down);
        assert_eq!(osc.len(), up.len());
        for i in 0..osc.len() {
            match (up[i], down[i]) {
                (Some(u), Some(d)) => {
                    assert_eq!(osc[i], Some(u - d));
                    assert!((-100.0..=100.0).contains(&osc[i].unwrap()));
                }
                _ => assert!(osc[i].is_none()),
            }
        }
    }

    #[test]
    fn calculate_emits_both_columns() {
        let aroon = Aroon::new(3).unwrap().with_columns("Up", "Down");
        let highs: Vec<f64> = (0..6).map(|i| 10.0 + i as f64).collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 1.0).collect();
        let bars = bars_from_highs_lows(&highs, &lows);
        let columns = aroon.calculate(&bars).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "Up");
        assert_eq!(columns[1].name, "Down");
        assert_eq!(columns[0].values.len(), bars.len());
    }

    #[test]
    fn deterministic_on_unmutated_input() {
        let aroon = Aroon::new(5).unwrap();
        let highs: Vec<f64> = (0..15)
            .map(|i| 30.0 + (i as f64 * 2.1).cos() * 5.0)
            .collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 2.0).collect();
        let bars = bars_from_highs_lows(&highs, &lows);
        assert_eq!(
            aroon.calculate(&bars).unwrap(),
            aroon.calculate(&bars).unwrap()
        );
    }
}
