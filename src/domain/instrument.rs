//! Instrument snapshot quotes.

use serde::Serialize;

/// A tradable security and its latest quote.
///
/// Snapshots are immutable; a re-selection replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    pub volume: u64,
    pub market_cap: f64,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        previous_close: f64,
        volume: u64,
        market_cap: f64,
    ) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            name: name.into(),
            price,
            previous_close,
            volume,
            market_cap,
        }
    }

    /// price - previous_close
    pub fn change(&self) -> f64 {
        self.price - self.previous_close
    }

    /// change / previous_close * 100, or 0 when there is no previous close.
    pub fn change_percent(&self) -> f64 {
        if self.previous_close == 0.0 {
            0.0
        } else {
            self.change() / self.previous_close * 100.0
        }
    }

    /// Case-insensitive substring match on symbol or name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.symbol.to_lowercase().contains(&query) || self.name.to_lowercase().contains(&query)
    }
}
