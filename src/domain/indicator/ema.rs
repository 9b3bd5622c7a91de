//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). First (n-1) points are warmup.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::series::HistoricalPoint;

pub fn calculate_ema(points: &[HistoricalPoint], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    let values = ema_of(&closes, period)
        .into_iter()
        .zip(points)
        .map(|(ema, point)| IndicatorPoint {
            date: point.date,
            value: ema.map(IndicatorValue::Simple),
        })
        .collect();

    IndicatorSeries::new(IndicatorType::Ema(period), values)
}

/// EMA over a raw value slice; `None` during warmup.
pub(crate) fn ema_of(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;
    let mut seed_sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i + 1 < period {
            seed_sum += value;
            out.push(None);
        } else if i + 1 == period {
            seed_sum += value;
            ema = seed_sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = value * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }
    out
}
