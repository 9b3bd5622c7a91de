//! Relative Strength Index with Wilder smoothing.
//!
//! First average: mean of the first n gains/losses; afterwards
//! avg = (prev_avg * (n-1) + current) / n.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), or 100 when avg_loss == 0.
//! The first n points are warmup.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::series::HistoricalPoint;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(points: &[HistoricalPoint], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = points
        .iter()
        .map(|p| IndicatorPoint {
            date: p.date,
            value: None,
        })
        .collect();

    if period == 0 || points.len() <= period {
        return IndicatorSeries::new(IndicatorType::Rsi(period), values);
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = points
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    values[period].value = Some(IndicatorValue::Simple(rsi_value(avg_gain, avg_loss)));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        values[i + 1].value = Some(IndicatorValue::Simple(rsi_value(avg_gain, avg_loss)));
    }

    IndicatorSeries::new(IndicatorType::Rsi(period), values)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::{points, simple_at};
    use approx::assert_relative_eq;

    #[test]
    fn rsi_warmup() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + (i % 5) as f64 * 2.0).collect();
        let series = calculate_rsi(&points(&closes), 14);
        assert_eq!(series.values.len(), 15);
        for i in 0..14 {
            assert!(series.values[i].value.is_none(), "point {} should be warmup", i);
        }
        assert!(series.values[14].value.is_some());
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&points(&closes), 14);
        assert_relative_eq!(simple_at(&series, 14), 100.0);
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&points(&closes), 14);
        assert_relative_eq!(simple_at(&series, 14), 0.0);
    }

    #[test]
    fn rsi_stays_in_range() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + ((i % 7) as f64 - 3.0) * 2.0).collect();
        let series = calculate_rsi(&points(&closes), 14);
        for point in &series.values {
            if let Some(IndicatorValue::Simple(rsi)) = point.value {
                assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
            }
        }
    }

    #[test]
    fn rsi_short_series_is_all_warmup() {
        let series = calculate_rsi(&points(&[1.0, 2.0, 3.0]), 14);
        assert_eq!(series.values.len(), 3);
        assert_eq!(series.valid_count(), 0);
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&points(&[1.0, 2.0]), 0);
        assert_eq!(series.valid_count(), 0);
    }
}
