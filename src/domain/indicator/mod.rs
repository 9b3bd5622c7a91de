//! Technical indicators computed over a historical series.
//!
//! - `IndicatorPoint`: one dated value, `None` during warmup
//! - `IndicatorValue`: the output shape of an indicator
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a dated sequence of indicator values
//!
//! `summary` turns the latest values into dashboard readings with signals.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod summary;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

impl IndicatorValue {
    pub fn simple(&self) -> Option<f64> {
        match self {
            IndicatorValue::Simple(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn new(indicator_type: IndicatorType, values: Vec<IndicatorPoint>) -> Self {
        Self {
            indicator_type,
            values,
        }
    }

    /// Value on the most recent date, if it is past warmup.
    pub fn latest(&self) -> Option<IndicatorValue> {
        self.values.last().and_then(|p| p.value)
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }
}

/// Dashboard label, e.g. `MA(50)` for a 50-day simple average.
impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "MA({period})"),
            IndicatorType::Ema(period) => write!(f, "EMA({period})"),
            IndicatorType::Rsi(period) => write!(f, "RSI({period})"),
            IndicatorType::Macd { fast, slow, signal } => write!(f, "MACD({fast},{slow},{signal})"),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => write!(f, "Bollinger({period},{})", *stddev_mult_x100 as f64 / 100.0),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::series::HistoricalPoint;
    use chrono::NaiveDate;

    pub fn points(closes: &[f64]) -> Vec<HistoricalPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| HistoricalPoint {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
            })
            .collect()
    }

    pub fn simple_at(series: &super::IndicatorSeries, i: usize) -> f64 {
        series.values[i]
            .value
            .and_then(|v| v.simple())
            .expect("expected a simple value")
    }
}
