//! Algorithm comparison: per-variant error metrics and best-per-metric
//! ranking.
//!
//! Metrics come from a [`MetricsPort`]. [`SimulatedMetrics`] draws them from
//! fixed per-variant ranges; `holdout::HoldoutMetrics` measures them on the
//! series itself.

use crate::domain::error::StockcastError;
use crate::domain::instrument::Instrument;
use crate::domain::series::{round2, round4, HistoricalSeries};
use crate::ports::metrics_port::MetricsPort;
use rand::{Rng, RngCore};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmVariant {
    BaselineLinear,
    EnsembleTrees,
    MarginBased,
    BlendedEnsemble,
}

impl AlgorithmVariant {
    pub const ALL: [AlgorithmVariant; 4] = [
        AlgorithmVariant::BaselineLinear,
        AlgorithmVariant::EnsembleTrees,
        AlgorithmVariant::MarginBased,
        AlgorithmVariant::BlendedEnsemble,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AlgorithmVariant::BaselineLinear => "baseline-linear",
            AlgorithmVariant::EnsembleTrees => "ensemble-trees",
            AlgorithmVariant::MarginBased => "margin-based",
            AlgorithmVariant::BlendedEnsemble => "blended-ensemble",
        }
    }
}

impl fmt::Display for AlgorithmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for AlgorithmVariant {
    type Err = StockcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmVariant::ALL
            .into_iter()
            .find(|v| v.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StockcastError::invalid_input(format!("unknown algorithm '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Mae,
    Rmse,
    Mape,
    Accuracy,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Mae, Metric::Rmse, Metric::Mape, Metric::Accuracy];

    pub fn higher_is_better(self) -> bool {
        self == Metric::Accuracy
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Mae => "MAE",
            Metric::Rmse => "RMSE",
            Metric::Mape => "MAPE",
            Metric::Accuracy => "Accuracy",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Quality figures for one variant. A `None` metric is left out of the
/// ranking for that metric only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AlgorithmMetrics {
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    pub mape: Option<f64>,
    pub accuracy: Option<f64>,
}

impl AlgorithmMetrics {
    pub fn new(mae: f64, rmse: f64, mape: f64, accuracy: f64) -> Self {
        Self {
            mae: Some(mae),
            rmse: Some(rmse),
            mape: Some(mape),
            accuracy: Some(accuracy),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mae => self.mae,
            Metric::Rmse => self.rmse,
            Metric::Mape => self.mape,
            Metric::Accuracy => self.accuracy,
        }
    }

    pub fn is_complete(&self) -> bool {
        Metric::ALL.into_iter().all(|m| self.get(m).is_some())
    }
}

/// Metrics for every variant from one run. Replaced wholesale, never
/// patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComparisonSet {
    entries: BTreeMap<AlgorithmVariant, AlgorithmMetrics>,
}

impl ComparisonSet {
    /// Build a set; every variant must be present.
    pub fn new(
        entries: impl IntoIterator<Item = (AlgorithmVariant, AlgorithmMetrics)>,
    ) -> Result<Self, StockcastError> {
        let entries: BTreeMap<_, _> = entries.into_iter().collect();
        if let Some(missing) = AlgorithmVariant::ALL
            .into_iter()
            .find(|v| !entries.contains_key(v))
        {
            return Err(StockcastError::invalid_input(format!(
                "comparison set is missing {}",
                missing
            )));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, variant: AlgorithmVariant) -> Option<&AlgorithmMetrics> {
        self.entries.get(&variant)
    }

    /// Variants in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (AlgorithmVariant, &AlgorithmMetrics)> {
        self.entries.iter().map(|(v, m)| (*v, m))
    }

    pub fn is_complete(&self) -> bool {
        self.entries.len() == AlgorithmVariant::ALL.len()
            && self.entries.values().all(AlgorithmMetrics::is_complete)
    }

    /// Winner for `metric`: highest accuracy, lowest error. Variants with
    /// a missing or non-finite value are skipped; ties go to the variant
    /// that comes first.
    pub fn best(&self, metric: Metric) -> Option<AlgorithmVariant> {
        let mut best: Option<(AlgorithmVariant, f64)> = None;
        for (variant, metrics) in self.iter() {
            let Some(value) = metrics.get(metric).filter(|v| v.is_finite()) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, current)) if metric.higher_is_better() => value > current,
                Some((_, current)) => value < current,
            };
            if better {
                best = Some((variant, value));
            }
        }
        best.map(|(variant, _)| variant)
    }
}

/// Per-variant ranges the simulated generator draws from.
struct VariantProfile {
    accuracy_offset: RangeInclusive<f64>,
    mae: RangeInclusive<f64>,
    rmse: RangeInclusive<f64>,
    mape: RangeInclusive<f64>,
}

fn profile(variant: AlgorithmVariant) -> VariantProfile {
    match variant {
        AlgorithmVariant::BaselineLinear => VariantProfile {
            accuracy_offset: 0.0..=2.0,
            mae: 2.0..=4.0,
            rmse: 2.8..=5.5,
            mape: 1.5..=3.5,
        },
        AlgorithmVariant::EnsembleTrees => VariantProfile {
            accuracy_offset: 2.0..=6.0,
            mae: 1.2..=2.6,
            rmse: 1.6..=3.4,
            mape: 0.9..=2.2,
        },
        AlgorithmVariant::MarginBased => VariantProfile {
            accuracy_offset: 1.0..=4.0,
            mae: 1.5..=3.2,
            rmse: 2.0..=4.2,
            mape: 1.2..=2.8,
        },
        AlgorithmVariant::BlendedEnsemble => VariantProfile {
            accuracy_offset: 4.0..=9.0,
            mae: 0.9..=2.0,
            rmse: 1.2..=2.7,
            mape: 0.6..=1.6,
        },
    }
}

pub const BASE_ACCURACY: RangeInclusive<f64> = 75.0..=85.0;

/// Random metrics in fixed per-variant ranges. The blended ensemble is
/// best on average, not always.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedMetrics;

impl SimulatedMetrics {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> ComparisonSet {
        let base = rng.gen_range(BASE_ACCURACY);
        let entries = AlgorithmVariant::ALL.map(|variant| {
            let p = profile(variant);
            let accuracy = base + rng.gen_range(p.accuracy_offset);
            let metrics = AlgorithmMetrics::new(
                round4(rng.gen_range(p.mae)),
                round4(rng.gen_range(p.rmse)),
                round4(rng.gen_range(p.mape)),
                round2(accuracy),
            );
            (variant, metrics)
        });
        ComparisonSet {
            entries: entries.into_iter().collect(),
        }
    }
}

impl MetricsPort for SimulatedMetrics {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn compare(
        &mut self,
        instrument: &Instrument,
        _history: &HistoricalSeries,
        rng: &mut dyn RngCore,
    ) -> Result<ComparisonSet, StockcastError> {
        log::debug!("simulating algorithm metrics for {}", instrument.symbol);
        Ok(self.generate(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn set(rows: [(f64, f64, f64, f64); 4]) -> ComparisonSet {
        ComparisonSet::new(
            AlgorithmVariant::ALL
                .into_iter()
                .zip(rows)
                .map(|(v, (mae, rmse, mape, acc))| (v, AlgorithmMetrics::new(mae, rmse, mape, acc))),
        )
        .unwrap()
    }

    #[test]
    fn variant_keys() {
        let keys: Vec<_> = AlgorithmVariant::ALL.iter().map(|v| v.key()).collect();
        assert_eq!(
            keys,
            vec!["baseline-linear", "ensemble-trees", "margin-based", "blended-ensemble"]
        );
        assert_eq!(
            "Margin-Based".parse::<AlgorithmVariant>().unwrap(),
            AlgorithmVariant::MarginBased
        );
    }

    #[test]
    fn best_picks_max_accuracy_and_min_errors() {
        let comparison = set([
            (3.0, 4.0, 2.0, 80.0),
            (1.5, 2.0, 1.0, 84.0),
            (2.0, 1.9, 1.8, 82.0),
            (1.0, 2.5, 1.2, 83.0),
        ]);
        assert_eq!(comparison.best(Metric::Accuracy), Some(AlgorithmVariant::EnsembleTrees));
        assert_eq!(comparison.best(Metric::Mae), Some(AlgorithmVariant::BlendedEnsemble));
        assert_eq!(comparison.best(Metric::Rmse), Some(AlgorithmVariant::MarginBased));
        assert_eq!(comparison.best(Metric::Mape), Some(AlgorithmVariant::EnsembleTrees));
    }

    #[test]
    fn ties_go_to_first_variant() {
        let comparison = set([
            (2.0, 2.0, 2.0, 80.0),
            (2.0, 2.0, 2.0, 80.0),
            (2.0, 2.0, 2.0, 80.0),
            (2.0, 2.0, 2.0, 80.0),
        ]);
        for metric in Metric::ALL {
            assert_eq!(comparison.best(metric), Some(AlgorithmVariant::BaselineLinear));
        }
    }

    #[test]
    fn missing_metric_excludes_only_that_metric() {
        let mut entries: Vec<_> = AlgorithmVariant::ALL
            .into_iter()
            .map(|v| (v, AlgorithmMetrics::new(2.0, 2.0, 2.0, 80.0)))
            .collect();
        entries[3].1 = AlgorithmMetrics {
            mae: None,
            rmse: Some(f64::NAN),
            mape: Some(0.5),
            accuracy: Some(90.0),
        };
        let comparison = ComparisonSet::new(entries).unwrap();

        assert_eq!(comparison.best(Metric::Mae), Some(AlgorithmVariant::BaselineLinear));
        assert_eq!(comparison.best(Metric::Rmse), Some(AlgorithmVariant::BaselineLinear));
        assert_eq!(comparison.best(Metric::Mape), Some(AlgorithmVariant::BlendedEnsemble));
        assert_eq!(comparison.best(Metric::Accuracy), Some(AlgorithmVariant::BlendedEnsemble));
        assert!(!comparison.is_complete());
    }

    #[test]
    fn partial_sets_are_rejected() {
        let result = ComparisonSet::new([(
            AlgorithmVariant::BaselineLinear,
            AlgorithmMetrics::default(),
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn simulated_sets_are_complete_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let comparison = SimulatedMetrics.generate(&mut rng);
            assert!(comparison.is_complete());
            for (variant, metrics) in comparison.iter() {
                let p = profile(variant);
                let mae = metrics.mae.unwrap();
                assert!(mae >= *p.mae.start() - 1e-4 && mae <= *p.mae.end() + 1e-4);
                let accuracy = metrics.accuracy.unwrap();
                assert!((75.0..=94.01).contains(&accuracy), "accuracy {}", accuracy);
            }
        }
    }

    #[test]
    fn blended_ensemble_wins_accuracy_most_often() {
        let mut rng = StdRng::seed_from_u64(11);
        let wins = (0..500)
            .filter(|_| {
                SimulatedMetrics.generate(&mut rng).best(Metric::Accuracy)
                    == Some(AlgorithmVariant::BlendedEnsemble)
            })
            .count();
        assert!(wins > 250, "blended ensemble won {} of 500", wins);
    }

    #[test]
    fn comparison_serializes_by_key() {
        let comparison = set([(1.0, 1.0, 1.0, 80.0); 4]);
        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["blended-ensemble"]["accuracy"], 80.0);
    }
}
