//! Run identifiers and the timed steps that drive a pipeline run.
//!
//! Every continuation carries the id of the run that scheduled it. A session
//! only has one current run; continuations from any other run are stale and
//! get dropped when they come due.

use crate::domain::pipeline::StageId;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(u64);

impl RunId {
    pub fn new(id: u64) -> Self {
        RunId(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        RunId(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run #{}", self.0)
    }
}

/// Whether a run starts from a fresh instrument selection or re-forecasts
/// the instrument already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Selection,
    Rerun,
}

/// One timed transition. Each step completes the stage returned by
/// [`PipelineStep::completes`] and starts the following one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    SeriesLoaded,
    FeaturesReady,
    TrainingComplete,
    ForecastPublished,
}

impl PipelineStep {
    pub fn completes(self) -> StageId {
        match self {
            PipelineStep::SeriesLoaded => StageId::DataIngestion,
            PipelineStep::FeaturesReady => StageId::FeatureEngineering,
            PipelineStep::TrainingComplete => StageId::ModelTraining,
            PipelineStep::ForecastPublished => StageId::Forecasting,
        }
    }

    pub fn next(self) -> Option<PipelineStep> {
        match self {
            PipelineStep::SeriesLoaded => Some(PipelineStep::FeaturesReady),
            PipelineStep::FeaturesReady => Some(PipelineStep::TrainingComplete),
            PipelineStep::TrainingComplete => Some(PipelineStep::ForecastPublished),
            PipelineStep::ForecastPublished => None,
        }
    }

    /// First step a run of the given kind schedules.
    pub fn first(kind: RunKind) -> PipelineStep {
        match kind {
            RunKind::Selection => PipelineStep::SeriesLoaded,
            RunKind::Rerun => PipelineStep::FeaturesReady,
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStep::SeriesLoaded => "series loaded",
            PipelineStep::FeaturesReady => "features ready",
            PipelineStep::TrainingComplete => "training complete",
            PipelineStep::ForecastPublished => "forecast published",
        };
        write!(f, "{}", name)
    }
}

/// A continuation waiting in a scheduler. `due` is measured from the
/// scheduler's own epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStep {
    pub run: RunId,
    pub step: PipelineStep,
    pub due: Duration,
}

/// Delay before each step fires, measured from the previous step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimings {
    pub load: Duration,
    pub features: Duration,
    pub training: Duration,
    pub forecast: Duration,
}

impl StageTimings {
    pub fn delay_before(&self, step: PipelineStep) -> Duration {
        match step {
            PipelineStep::SeriesLoaded => self.load,
            PipelineStep::FeaturesReady => self.features,
            PipelineStep::TrainingComplete => self.training,
            PipelineStep::ForecastPublished => self.forecast,
        }
    }

    /// Sum of the delays a run of `kind` waits through.
    pub fn total(&self, kind: RunKind) -> Duration {
        let mut step = Some(PipelineStep::first(kind));
        let mut total = Duration::ZERO;
        while let Some(s) = step {
            total += self.delay_before(s);
            step = s.next();
        }
        total
    }
}

impl Default for StageTimings {
    fn default() -> Self {
        Self {
            load: Duration::from_millis(1000),
            features: Duration::from_millis(2000),
            training: Duration::from_millis(2000),
            forecast: Duration::from_millis(1500),
        }
    }
}
