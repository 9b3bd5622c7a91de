//! Hold-out metrics: score each variant by one-step-ahead predictions over
//! the most recent closes.
//!
//! - baseline-linear: least-squares line through the prior 10 closes
//! - ensemble-trees: mean of the prior 5 closes
//! - margin-based: the prior close
//! - blended-ensemble: mean of the three above
//!
//! accuracy = 100 - MAPE, floored at zero.

use crate::domain::comparator::{AlgorithmMetrics, AlgorithmVariant, ComparisonSet};
use crate::domain::error::StockcastError;
use crate::domain::instrument::Instrument;
use crate::domain::series::{round2, round4, HistoricalSeries};
use crate::ports::metrics_port::MetricsPort;
use rand::RngCore;

pub const LINEAR_LOOKBACK: usize = 10;
pub const MEAN_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct HoldoutMetrics {
    holdout_days: usize,
}

impl HoldoutMetrics {
    pub fn new(holdout_days: usize) -> Result<Self, StockcastError> {
        if holdout_days == 0 {
            return Err(StockcastError::invalid_input(
                "hold-out window must contain at least one day",
            ));
        }
        Ok(Self { holdout_days })
    }

    pub fn holdout_days(&self) -> usize {
        self.holdout_days
    }

    pub fn minimum_history(&self) -> usize {
        self.holdout_days + LINEAR_LOOKBACK
    }

    pub fn evaluate(&self, closes: &[f64]) -> Result<ComparisonSet, StockcastError> {
        let minimum = self.minimum_history();
        if closes.len() < minimum {
            return Err(StockcastError::InsufficientHistory {
                points: closes.len(),
                minimum,
            });
        }

        let mut errors: [Vec<(f64, f64)>; 4] = Default::default();
        for t in closes.len() - self.holdout_days..closes.len() {
            let prior = &closes[..t];
            let actual = closes[t];
            for (slot, predicted) in errors.iter_mut().zip(predict_next(prior)) {
                slot.push((actual, predicted));
            }
        }

        ComparisonSet::new(
            AlgorithmVariant::ALL
                .into_iter()
                .zip(errors.iter().map(|pairs| score(pairs))),
        )
    }
}

/// Next-value predictions in variant order.
fn predict_next(prior: &[f64]) -> [f64; 4] {
    let linear = linear_next(&prior[prior.len() - LINEAR_LOOKBACK..]);
    let mean = mean(&prior[prior.len() - MEAN_LOOKBACK..]);
    let last = prior[prior.len() - 1];
    let blended = (linear + mean + last) / 3.0;
    [linear, mean, last, blended]
}

/// Least-squares fit over x = 0..n, evaluated at x = n.
fn linear_next(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });
    let slope = if den > 0.0 { num / den } else { 0.0 };
    y_mean + slope * (n - x_mean)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn score(pairs: &[(f64, f64)]) -> AlgorithmMetrics {
    let n = pairs.len() as f64;
    let mae = pairs.iter().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
    let rmse = (pairs.iter().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n).sqrt();

    let pct: Vec<f64> = pairs
        .iter()
        .filter(|(a, _)| *a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs() * 100.0)
        .collect();
    let mape = (!pct.is_empty()).then(|| mean(&pct));

    AlgorithmMetrics {
        mae: Some(round4(mae)),
        rmse: Some(round4(rmse)),
        mape: mape.map(round4),
        accuracy: mape.map(|m| round2((100.0 - m).max(0.0))),
    }
}

impl MetricsPort for HoldoutMetrics {
    fn name(&self) -> &'static str {
        "holdout"
    }

    fn compare(
        &mut self,
        instrument: &Instrument,
        history: &HistoricalSeries,
        _rng: &mut dyn RngCore,
    ) -> Result<ComparisonSet, StockcastError> {
        log::debug!(
            "scoring {} variants over the last {} closes of {}",
            AlgorithmVariant::ALL.len(),
            self.holdout_days,
            instrument.symbol
        );
        self.evaluate(&history.closes())
    }
}
