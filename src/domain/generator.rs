//! Synthetic historical series generation.
//!
//! Random walk: each day draws a return uniformly from [-3%, +3%] of the
//! running close. open = prior close, high/low extend past the body by a
//! random excursion bounded by |change|. Only the running close carries
//! between iterations; stored values are rounded to cents.

use crate::domain::error::StockcastError;
use crate::domain::series::{round2, HistoricalPoint, HistoricalSeries};
use chrono::NaiveDate;
use rand::Rng;

pub const MAX_DAILY_RETURN: f64 = 0.03;
pub const MIN_VOLUME: u64 = 10_000_000;
pub const MAX_VOLUME: u64 = 110_000_000;

/// Generate `days + 1` daily bars ending on `today`, seeded at `start_price`.
pub fn generate_history<R: Rng + ?Sized>(
    symbol: &str,
    days: usize,
    start_price: f64,
    today: NaiveDate,
    rng: &mut R,
) -> Result<HistoricalSeries, StockcastError> {
    if days < 1 {
        return Err(StockcastError::invalid_input(
            "history length must be at least 1 day",
        ));
    }
    if !start_price.is_finite() || start_price <= 0.0 {
        return Err(StockcastError::invalid_input(format!(
            "start price must be positive, got {start_price}"
        )));
    }

    let mut series = HistoricalSeries::with_capacity(symbol, days + 1);
    let mut current = start_price;

    for offset in (0..=days).rev() {
        let date = today - chrono::Duration::days(offset as i64);
        let change = current * rng.gen_range(-MAX_DAILY_RETURN..=MAX_DAILY_RETURN);
        let open = current;
        let close = current + change;
        let high = open.max(close) + rng.gen_range(0.0..=1.0) * change.abs();
        let low = open.min(close) - rng.gen_range(0.0..=1.0) * change.abs();
        let volume = rng.gen_range(MIN_VOLUME..MAX_VOLUME);

        series.push(HistoricalPoint {
            date,
            open: round2(open),
            high: round2(high),
            low: round2(low),
            close: round2(close),
            volume,
        })?;

        current = close;
    }

    log::debug!(
        "generated {} bars for {} from seed {:.2}",
        series.len(),
        symbol,
        start_price
    );
    Ok(series)
}
