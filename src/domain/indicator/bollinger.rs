//! Bollinger Bands.
//!
//! Middle = SMA(n), Upper/Lower = Middle ± multiplier × population stddev.
//! Defaults 20 / 2.0. First (n-1) points are warmup.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::series::HistoricalPoint;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    points: &[HistoricalPoint],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mult = stddev_mult_x100 as f64 / 100.0;

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = (period > 0 && i + 1 >= period).then(|| {
                let window = &points[i + 1 - period..=i];
                let middle = window.iter().map(|p| p.close).sum::<f64>() / period as f64;
                let variance = window
                    .iter()
                    .map(|p| (p.close - middle).powi(2))
                    .sum::<f64>()
                    / period as f64;
                let band = mult * variance.sqrt();
                IndicatorValue::Bollinger {
                    upper: middle + band,
                    middle,
                    lower: middle - band,
                }
            });
            IndicatorPoint {
                date: point.date,
                value,
            }
        })
        .collect();

    IndicatorSeries::new(
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::points;
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_known_window() {
        // closes 2,4,4,4,5,5,7,9: mean 5, population stddev 2
        let series = calculate_bollinger(&points(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8, 200);
        match series.latest() {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => {
                assert_relative_eq!(middle, 5.0);
                assert_relative_eq!(upper, 9.0);
                assert_relative_eq!(lower, 1.0);
            }
            other => panic!("expected bands, got {:?}", other),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let series = calculate_bollinger(&points(&[1.0, 2.0, 3.0, 4.0]), 3, 200);
        assert!(series.values[0].value.is_none());
        assert!(series.values[1].value.is_none());
        assert!(series.values[2].value.is_some());
        assert_eq!(series.valid_count(), 2);
    }

    #[test]
    fn bollinger_flat_prices_collapse() {
        let series = calculate_bollinger(&points(&[10.0; 5]), 5, 200);
        match series.latest() {
            Some(IndicatorValue::Bollinger { upper, lower, .. }) => {
                assert_relative_eq!(upper, lower);
            }
            other => panic!("expected bands, got {:?}", other),
        }
    }
}
