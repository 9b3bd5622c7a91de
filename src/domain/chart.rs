//! Chart assembly: window filtering, forecast merge and Y-axis bounds.
//!
//! [`assemble`] is a pure function of its inputs so the presentation layer
//! can call it whenever the window or the series change.

use crate::domain::error::StockcastError;
use crate::domain::series::{ForecastPoint, ForecastSeries, HistoricalPoint, HistoricalSeries};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Fraction of the value range added above and below the data.
pub const DOMAIN_PADDING: f64 = 0.1;
/// Padding used when every value in view is identical.
pub const FLAT_DOMAIN_PADDING: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeWindow {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    YearToDate,
    All,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 8] = [
        TimeWindow::OneDay,
        TimeWindow::OneWeek,
        TimeWindow::OneMonth,
        TimeWindow::ThreeMonths,
        TimeWindow::SixMonths,
        TimeWindow::OneYear,
        TimeWindow::YearToDate,
        TimeWindow::All,
    ];

    pub fn code(self) -> &'static str {
        match self {
            TimeWindow::OneDay => "1D",
            TimeWindow::OneWeek => "1W",
            TimeWindow::OneMonth => "1M",
            TimeWindow::ThreeMonths => "3M",
            TimeWindow::SixMonths => "6M",
            TimeWindow::OneYear => "1Y",
            TimeWindow::YearToDate => "YTD",
            TimeWindow::All => "ALL",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TimeWindow::OneDay => "last 2 points",
            TimeWindow::OneWeek => "last 7 points",
            TimeWindow::OneMonth => "last 30 points",
            TimeWindow::ThreeMonths => "last 90 points",
            TimeWindow::SixMonths => "last 180 points",
            TimeWindow::OneYear => "last 365 points",
            TimeWindow::YearToDate => "since January 1st",
            TimeWindow::All => "full series",
        }
    }

    /// Trailing point count for count-based windows.
    pub fn trailing_points(self) -> Option<usize> {
        match self {
            TimeWindow::OneDay => Some(2),
            TimeWindow::OneWeek => Some(7),
            TimeWindow::OneMonth => Some(30),
            TimeWindow::ThreeMonths => Some(90),
            TimeWindow::SixMonths => Some(180),
            TimeWindow::OneYear => Some(365),
            TimeWindow::YearToDate | TimeWindow::All => None,
        }
    }

    pub fn shows_forecast(self) -> bool {
        self != TimeWindow::All
    }

    /// Historical points visible in this window.
    pub fn filter<'a>(self, points: &'a [HistoricalPoint], today: NaiveDate) -> &'a [HistoricalPoint] {
        match self {
            TimeWindow::All => points,
            TimeWindow::YearToDate => {
                // Dates are ascending, so the in-year points are a suffix.
                let start = points.partition_point(|p| p.date.year() < today.year());
                &points[start..]
            }
            window => {
                let keep = window.trailing_points().unwrap_or(points.len());
                &points[points.len().saturating_sub(keep)..]
            }
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for TimeWindow {
    type Err = StockcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                StockcastError::invalid_input(format!(
                    "unknown time window '{}' (expected one of 1D, 1W, 1M, 3M, 6M, 1Y, YTD, ALL)",
                    wanted
                ))
            })
    }
}

impl Serialize for TimeWindow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A point on the combined chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartPoint {
    Historical(HistoricalPoint),
    Forecast(ForecastPoint),
}

impl ChartPoint {
    pub fn date(&self) -> NaiveDate {
        match self {
            ChartPoint::Historical(p) => p.date,
            ChartPoint::Forecast(p) => p.date,
        }
    }

    /// (low, high) extent used for the Y domain.
    pub fn extent(&self) -> (f64, f64) {
        match self {
            ChartPoint::Historical(p) => (p.low, p.high),
            ChartPoint::Forecast(p) => (p.lower, p.upper),
        }
    }

    pub fn is_forecast(&self) -> bool {
        matches!(self, ChartPoint::Forecast(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YDomain {
    pub min: f64,
    pub max: f64,
}

impl YDomain {
    fn around(points: &[ChartPoint]) -> Option<YDomain> {
        let (low, high) = points
            .iter()
            .map(ChartPoint::extent)
            .filter(|(lo, hi)| lo.is_finite() && hi.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((min, max)) => Some((min.min(lo), max.max(hi))),
            })?;

        let range = high - low;
        let pad = if range > 0.0 {
            range * DOMAIN_PADDING
        } else {
            FLAT_DOMAIN_PADDING
        };
        Some(YDomain {
            min: low - pad,
            max: high + pad,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub window: TimeWindow,
    pub points: Vec<ChartPoint>,
    /// `None` when nothing is in view.
    pub domain: Option<YDomain>,
    /// Last historical date; separates history from forecast.
    pub marker: Option<NaiveDate>,
}

impl ChartView {
    pub fn historical_count(&self) -> usize {
        self.points.iter().filter(|p| !p.is_forecast()).count()
    }

    pub fn forecast_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_forecast()).count()
    }
}

/// Filter the history by `window`, append the forecast where the window
/// allows it, and compute the padded Y domain of everything in view.
pub fn assemble(
    history: &HistoricalSeries,
    forecast: Option<&ForecastSeries>,
    window: TimeWindow,
    today: NaiveDate,
) -> ChartView {
    let visible = window.filter(history.points(), today);
    let mut points: Vec<ChartPoint> = visible.iter().cloned().map(ChartPoint::Historical).collect();

    if window.shows_forecast() {
        if let Some(forecast) = forecast {
            points.extend(forecast.points().iter().cloned().map(ChartPoint::Forecast));
        }
    }

    ChartView {
        window,
        domain: YDomain::around(&points),
        marker: history.last().map(|p| p.date),
        points,
    }
}
