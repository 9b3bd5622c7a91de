//! Daily price series: historical OHLCV bars and forecast points.

use crate::domain::error::StockcastError;
use chrono::NaiveDate;
use serde::Serialize;

/// Round a monetary value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 4 decimal places (error metrics).
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl HistoricalPoint {
    /// high >= max(open, close) and low <= min(open, close)
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// Ordered daily bars for one instrument, oldest first.
///
/// Dates are strictly ascending. The series is only extended while it is
/// being generated; afterwards it is read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSeries {
    symbol: String,
    points: Vec<HistoricalPoint>,
}

impl HistoricalSeries {
    pub(crate) fn with_capacity(symbol: &str, capacity: usize) -> Self {
        Self {
            symbol: symbol.to_string(),
            points: Vec::with_capacity(capacity),
        }
    }

    /// Build a series from existing bars, rejecting unordered dates or
    /// inconsistent high/low values.
    pub fn from_points(
        symbol: &str,
        points: Vec<HistoricalPoint>,
    ) -> Result<Self, StockcastError> {
        let mut series = Self::with_capacity(symbol, points.len());
        for point in points {
            series.push(point)?;
        }
        Ok(series)
    }

    pub(crate) fn push(&mut self, point: HistoricalPoint) -> Result<(), StockcastError> {
        if let Some(last) = self.points.last() {
            if point.date <= last.date {
                return Err(StockcastError::invalid_input(format!(
                    "date {} does not follow {}",
                    point.date, last.date
                )));
            }
        }
        if !point.is_consistent() {
            return Err(StockcastError::invalid_input(format!(
                "bar on {} has high/low outside open/close",
                point.date
            )));
        }
        self.points.push(point);
        Ok(())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[HistoricalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&HistoricalPoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub upper: f64,
    pub lower: f64,
    /// Fraction in [0, 1].
    pub confidence: f64,
}

/// Projected daily values following a historical series.
///
/// Regenerated wholesale on every forecast run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub(crate) points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ForecastPoint> {
        self.points.first()
    }
}
