//! Trend-continuation forecast with widening uncertainty bands.
//!
//! trend = (C[last] - C[last-5]) / 5
//! predicted(i) = C[last] + trend * i + noise, noise ~ U[-2%, +2%] of C[last]
//! confidence(i) = max(0.4, 0.9 - 0.05 * i)
//! uncertainty(i) = C[last] * (1 - confidence(i)) * 0.15
//!
//! Noise is drawn independently per step and never feeds back into C[last].

use crate::domain::error::StockcastError;
use crate::domain::series::{round2, ForecastPoint, ForecastSeries, HistoricalSeries};
use rand::Rng;

pub const TREND_WINDOW: usize = 5;
pub const MIN_HISTORY: usize = TREND_WINDOW + 1;
pub const NOISE_PCT: f64 = 0.02;
pub const MAX_CONFIDENCE: f64 = 0.9;
pub const MIN_CONFIDENCE: f64 = 0.4;
pub const CONFIDENCE_DECAY: f64 = 0.05;
pub const BAND_SCALE: f64 = 0.15;

/// Average daily drift over the trailing five-day window.
pub fn trend(history: &HistoricalSeries) -> Result<f64, StockcastError> {
    let points = history.points();
    if points.len() < MIN_HISTORY {
        return Err(StockcastError::InsufficientHistory {
            points: points.len(),
            minimum: MIN_HISTORY,
        });
    }
    let last = points[points.len() - 1].close;
    let earlier = points[points.len() - 1 - TREND_WINDOW].close;
    Ok((last - earlier) / TREND_WINDOW as f64)
}

pub fn confidence(step: usize) -> f64 {
    (MAX_CONFIDENCE - CONFIDENCE_DECAY * step as f64).max(MIN_CONFIDENCE)
}

pub fn uncertainty(last_close: f64, step: usize) -> f64 {
    last_close * (1.0 - confidence(step)) * BAND_SCALE
}

/// Project `horizon` daily points past the end of `history`.
pub fn generate_forecast<R: Rng + ?Sized>(
    history: &HistoricalSeries,
    horizon: usize,
    rng: &mut R,
) -> Result<ForecastSeries, StockcastError> {
    if horizon < 1 {
        return Err(StockcastError::invalid_input(
            "forecast horizon must be at least 1 day",
        ));
    }
    let drift = trend(history)?;
    let last = history
        .last()
        .ok_or(StockcastError::InsufficientHistory {
            points: 0,
            minimum: MIN_HISTORY,
        })?;
    let last_close = last.close;

    let points = (1..=horizon)
        .map(|step| {
            let noise = last_close * rng.gen_range(-NOISE_PCT..=NOISE_PCT);
            let predicted = last_close + drift * step as f64 + noise;
            let band = uncertainty(last_close, step);
            ForecastPoint {
                date: last.date + chrono::Duration::days(step as i64),
                predicted: round2(predicted),
                upper: round2(predicted + band),
                lower: round2(predicted - band),
                confidence: round2(confidence(step)),
            }
        })
        .collect();

    Ok(ForecastSeries { points })
}
