//! Moving Average Convergence Divergence.
//!
//! MACD line = EMA(fast) - EMA(slow)
//! Signal line = EMA(signal) of the MACD line
//! Histogram = MACD line - signal line
//!
//! Defaults 12/26/9. Warmup: slow - 1 + signal - 1 points.

use crate::domain::indicator::ema::ema_of;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::series::HistoricalPoint;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    points: &[HistoricalPoint],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    let mut values: Vec<IndicatorPoint> = points
        .iter()
        .map(|p| IndicatorPoint {
            date: p.date,
            value: None,
        })
        .collect();

    if fast == 0 || slow == 0 || signal_period == 0 || points.len() < slow {
        return IndicatorSeries::new(indicator_type, values);
    }

    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    let ema_fast = ema_of(&closes, fast);
    let ema_slow = ema_of(&closes, slow);

    let line_start = fast.max(slow) - 1;
    let line: Vec<f64> = (line_start..closes.len())
        .filter_map(|i| Some(ema_fast[i]? - ema_slow[i]?))
        .collect();
    let signal = ema_of(&line, signal_period);

    for (offset, (&macd, signal)) in line.iter().zip(signal).enumerate() {
        if let Some(signal) = signal {
            values[line_start + offset].value = Some(IndicatorValue::Macd {
                line: macd,
                signal,
                histogram: macd - signal,
            });
        }
    }

    IndicatorSeries::new(indicator_type, values)
}

pub fn calculate_macd_default(points: &[HistoricalPoint]) -> IndicatorSeries {
    calculate_macd(points, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
