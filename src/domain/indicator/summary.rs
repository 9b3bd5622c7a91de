//! Dashboard readings derived from the latest indicator values.

use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, macd, rsi,
    IndicatorValue,
};
use crate::domain::series::{round2, HistoricalSeries};
use serde::Serialize;
use std::fmt;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Close must sit this far (fractionally) from a moving average to signal.
pub const MA_BAND: f64 = 0.01;
pub const BOLLINGER_EDGE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "buy"),
            Signal::Sell => write!(f, "sell"),
            Signal::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalIndicator {
    pub name: String,
    pub value: f64,
    pub description: String,
    pub signal: Signal,
}

impl TechnicalIndicator {
    fn new(name: &str, value: f64, description: &str, signal: Signal) -> Self {
        Self {
            name: name.to_string(),
            value: round2(value),
            description: description.to_string(),
            signal,
        }
    }
}

/// RSI(14), MACD histogram, MA(50), MA(200) and Bollinger position, in that
/// order. Readings without enough history are left out.
pub fn summarize(history: &HistoricalSeries) -> Vec<TechnicalIndicator> {
    let points = history.points();
    let Some(last_close) = history.last().map(|p| p.close) else {
        return Vec::new();
    };
    let mut readings = Vec::with_capacity(5);

    if let Some(value) = calculate_rsi(points, rsi::DEFAULT_PERIOD)
        .latest()
        .and_then(|v| v.simple())
    {
        readings.push(TechnicalIndicator::new(
            "RSI",
            value,
            "Relative Strength Index",
            rsi_signal(value),
        ));
    }

    if let Some(IndicatorValue::Macd { histogram, .. }) =
        calculate_macd(points, macd::DEFAULT_FAST, macd::DEFAULT_SLOW, macd::DEFAULT_SIGNAL)
            .latest()
    {
        readings.push(TechnicalIndicator::new(
            "MACD",
            histogram,
            "Moving Average Convergence Divergence",
            sign_signal(histogram),
        ));
    }

    for (period, description) in [(50, "50-day Moving Average"), (200, "200-day Moving Average")] {
        let sma = calculate_sma(points, period);
        if let Some(average) = sma.latest().and_then(|v| v.simple()) {
            readings.push(TechnicalIndicator::new(
                &sma.indicator_type.to_string(),
                average,
                description,
                moving_average_signal(last_close, average),
            ));
        }
    }

    if let Some(IndicatorValue::Bollinger { upper, middle, .. }) =
        calculate_bollinger(points, bollinger::DEFAULT_PERIOD, bollinger::DEFAULT_MULT_X100)
            .latest()
    {
        let half_width = upper - middle;
        let position = if half_width > 0.0 {
            (last_close - middle) / half_width
        } else {
            0.0
        };
        readings.push(TechnicalIndicator::new(
            "Bollinger",
            position,
            "Bollinger Bands Position",
            bollinger_signal(position),
        ));
    }

    readings
}

fn rsi_signal(value: f64) -> Signal {
    if value < RSI_OVERSOLD {
        Signal::Buy
    } else if value > RSI_OVERBOUGHT {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

fn sign_signal(value: f64) -> Signal {
    if value > 0.0 {
        Signal::Buy
    } else if value < 0.0 {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

fn moving_average_signal(close: f64, average: f64) -> Signal {
    if average <= 0.0 {
        return Signal::Neutral;
    }
    let distance = (close - average) / average;
    if distance > MA_BAND {
        Signal::Buy
    } else if distance < -MA_BAND {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

fn bollinger_signal(position: f64) -> Signal {
    if position <= -BOLLINGER_EDGE {
        Signal::Buy
    } else if position >= BOLLINGER_EDGE {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}
