//! Simple Moving Average over closing prices.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]); first (n-1) points are warmup.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::series::HistoricalPoint;

pub fn calculate_sma(points: &[HistoricalPoint], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(points.len());
    let mut window_sum = 0.0;

    for (i, point) in points.iter().enumerate() {
        window_sum += point.close;
        if period > 0 && i >= period {
            window_sum -= points[i - period].close;
        }
        let value = (period > 0 && i + 1 >= period)
            .then(|| IndicatorValue::Simple(window_sum / period as f64));
        values.push(IndicatorPoint {
            date: point.date,
            value,
        });
    }

    IndicatorSeries::new(IndicatorType::Sma(period), values)
}
