//! The four-stage processing pipeline shown alongside the chart.
//!
//! Stages move `idle -> processing -> complete`, with `error` reachable from
//! `processing`. Stage identity and order are fixed; only status, progress
//! and the current task label change. A stage may only complete once the
//! stage before it has completed.

use crate::domain::error::StockcastError;
use crate::domain::schedule::{PipelineStep, RunKind};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    DataIngestion,
    FeatureEngineering,
    ModelTraining,
    Forecasting,
}

impl StageId {
    pub const ALL: [StageId; 4] = [
        StageId::DataIngestion,
        StageId::FeatureEngineering,
        StageId::ModelTraining,
        StageId::Forecasting,
    ];

    /// 1-based position in the pipeline.
    pub fn ordinal(self) -> u8 {
        self.index() as u8 + 1
    }

    fn index(self) -> usize {
        match self {
            StageId::DataIngestion => 0,
            StageId::FeatureEngineering => 1,
            StageId::ModelTraining => 2,
            StageId::Forecasting => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StageId::DataIngestion => "Data Ingestion",
            StageId::FeatureEngineering => "Feature Engineering",
            StageId::ModelTraining => "Model Training",
            StageId::Forecasting => "Forecasting",
        }
    }

    /// Task label shown while the stage is processing.
    pub fn task(self) -> &'static str {
        match self {
            StageId::DataIngestion => "Historical data collection",
            StageId::FeatureEngineering => "Processing technical indicators",
            StageId::ModelTraining => "Training models",
            StageId::Forecasting => "Generating forecast",
        }
    }

    pub fn previous(self) -> Option<StageId> {
        self.index().checked_sub(1).map(|i| StageId::ALL[i])
    }

    pub fn following(self) -> Option<StageId> {
        StageId::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ordinal(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Idle,
    Processing,
    Complete,
    Error,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Idle => write!(f, "idle"),
            StageStatus::Processing => write!(f, "processing"),
            StageStatus::Complete => write!(f, "complete"),
            StageStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    pub id: StageId,
    pub status: StageStatus,
    /// 0..=100
    pub progress: u8,
    pub task: Option<String>,
}

impl PipelineStage {
    fn idle(id: StageId) -> Self {
        Self {
            id,
            status: StageStatus::Idle,
            progress: 0,
            task: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.id.label()
    }
}

/// Starting progress of a stage when the step before it hands over.
fn handover_progress(stage: StageId) -> u8 {
    match stage {
        StageId::DataIngestion | StageId::FeatureEngineering => 0,
        StageId::ModelTraining => 20,
        StageId::Forecasting => 50,
    }
}

const RERUN_FEATURE_PROGRESS: u8 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    stages: [PipelineStage; 4],
    halted: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            stages: StageId::ALL.map(PipelineStage::idle),
            halted: false,
        }
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn stage(&self, id: StageId) -> &PipelineStage {
        &self.stages[id.index()]
    }

    fn stage_mut(&mut self, id: StageId) -> &mut PipelineStage {
        &mut self.stages[id.index()]
    }

    /// A stage failed and nothing else may advance until the next run.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_finished(&self) -> bool {
        self.stages.iter().all(|s| s.status == StageStatus::Complete)
    }

    /// Reset the stages for a new run and return the stages that changed.
    ///
    /// A selection run restarts ingestion; a rerun leaves stage 1 as it is
    /// and starts feature engineering directly.
    pub fn begin_run(&mut self, kind: RunKind) -> Vec<StageId> {
        let before = self.stages.clone();
        self.halted = false;

        let first = match kind {
            RunKind::Selection => StageId::DataIngestion,
            RunKind::Rerun => StageId::FeatureEngineering,
        };
        for id in StageId::ALL.into_iter().filter(|id| *id >= first) {
            *self.stage_mut(id) = PipelineStage::idle(id);
        }

        let progress = match kind {
            RunKind::Selection => 0,
            RunKind::Rerun => RERUN_FEATURE_PROGRESS,
        };
        self.start(first, progress);

        self.changed_since(&before)
    }

    /// Complete the stage `step` finishes and start the one after it.
    /// Returns the stages that changed.
    pub fn advance(&mut self, step: PipelineStep) -> Result<Vec<StageId>, StockcastError> {
        let before = self.stages.clone();
        let id = step.completes();
        self.complete(id)?;
        if let Some(next) = id.following() {
            self.start(next, handover_progress(next));
        }
        Ok(self.changed_since(&before))
    }

    /// Mark a processing stage as failed. Progress is left where it was.
    pub fn fail(&mut self, id: StageId) -> Result<(), StockcastError> {
        let stage = self.stage_mut(id);
        if stage.status != StageStatus::Processing {
            return Err(StockcastError::InvalidTransition {
                stage: id,
                from: stage.status,
                to: StageStatus::Error,
            });
        }
        stage.status = StageStatus::Error;
        self.halted = true;
        Ok(())
    }

    fn start(&mut self, id: StageId, progress: u8) {
        let stage = self.stage_mut(id);
        stage.status = StageStatus::Processing;
        stage.progress = progress;
        stage.task = Some(id.task().to_string());
    }

    fn complete(&mut self, id: StageId) -> Result<(), StockcastError> {
        let current = self.stage(id).status;
        let reject = || StockcastError::InvalidTransition {
            stage: id,
            from: current,
            to: StageStatus::Complete,
        };
        if self.halted || current != StageStatus::Processing {
            return Err(reject());
        }
        if let Some(prev) = id.previous() {
            if self.stage(prev).status != StageStatus::Complete {
                return Err(reject());
            }
        }

        let stage = self.stage_mut(id);
        stage.status = StageStatus::Complete;
        stage.progress = 100;
        stage.task = None;
        Ok(())
    }

    fn changed_since(&self, before: &[PipelineStage; 4]) -> Vec<StageId> {
        self.stages
            .iter()
            .zip(before)
            .filter(|(now, was)| now != was)
            .map(|(now, _)| now.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(pipeline: &Pipeline) -> Vec<(StageStatus, u8)> {
        pipeline
            .stages()
            .iter()
            .map(|s| (s.status, s.progress))
            .collect()
    }

    #[test]
    fn stage_identity() {
        assert_eq!(StageId::DataIngestion.ordinal(), 1);
        assert_eq!(StageId::Forecasting.ordinal(), 4);
        assert_eq!(StageId::ModelTraining.to_string(), "3 (Model Training)");
        assert_eq!(StageId::DataIngestion.previous(), None);
        assert_eq!(StageId::Forecasting.following(), None);
        assert_eq!(
            StageId::FeatureEngineering.previous(),
            Some(StageId::DataIngestion)
        );
    }

    #[test]
    fn new_pipeline_is_idle() {
        let pipeline = Pipeline::new();
        assert!(pipeline
            .stages()
            .iter()
            .all(|s| s.status == StageStatus::Idle && s.progress == 0));
        assert!(!pipeline.is_finished());
    }

    #[test]
    fn selection_run_walks_all_stages() {
        use StageStatus::*;
        let mut pipeline = Pipeline::new();
        pipeline.begin_run(RunKind::Selection);
        assert_eq!(
            statuses(&pipeline),
            vec![(Processing, 0), (Idle, 0), (Idle, 0), (Idle, 0)]
        );

        pipeline.advance(PipelineStep::SeriesLoaded).unwrap();
        assert_eq!(
            statuses(&pipeline),
            vec![(Complete, 100), (Processing, 0), (Idle, 0), (Idle, 0)]
        );

        pipeline.advance(PipelineStep::FeaturesReady).unwrap();
        assert_eq!(
            statuses(&pipeline),
            vec![(Complete, 100), (Complete, 100), (Processing, 20), (Idle, 0)]
        );

        pipeline.advance(PipelineStep::TrainingComplete).unwrap();
        assert_eq!(
            statuses(&pipeline),
            vec![(Complete, 100), (Complete, 100), (Complete, 100), (Processing, 50)]
        );

        let changed = pipeline.advance(PipelineStep::ForecastPublished).unwrap();
        assert_eq!(changed, vec![StageId::Forecasting]);
        assert!(pipeline.is_finished());
    }

    #[test]
    fn rerun_keeps_ingestion() {
        let mut pipeline = Pipeline::new();
        pipeline.begin_run(RunKind::Selection);
        for step in [
            PipelineStep::SeriesLoaded,
            PipelineStep::FeaturesReady,
            PipelineStep::TrainingComplete,
            PipelineStep::ForecastPublished,
        ] {
            pipeline.advance(step).unwrap();
        }

        let changed = pipeline.begin_run(RunKind::Rerun);
        assert_eq!(
            changed,
            vec![
                StageId::FeatureEngineering,
                StageId::ModelTraining,
                StageId::Forecasting
            ]
        );
        let stage2 = pipeline.stage(StageId::FeatureEngineering);
        assert_eq!(stage2.status, StageStatus::Processing);
        assert_eq!(stage2.progress, 30);
        assert_eq!(
            pipeline.stage(StageId::DataIngestion).status,
            StageStatus::Complete
        );
    }

    #[test]
    fn stage_cannot_complete_out_of_order() {
        let mut pipeline = Pipeline::new();
        pipeline.begin_run(RunKind::Selection);
        let err = pipeline.advance(PipelineStep::TrainingComplete).unwrap_err();
        assert!(matches!(
            err,
            StockcastError::InvalidTransition {
                stage: StageId::ModelTraining,
                from: StageStatus::Idle,
                to: StageStatus::Complete
            }
        ));
    }

    #[test]
    fn failure_freezes_progress_and_halts() {
        let mut pipeline = Pipeline::new();
        pipeline.begin_run(RunKind::Selection);
        pipeline.advance(PipelineStep::SeriesLoaded).unwrap();
        pipeline.advance(PipelineStep::FeaturesReady).unwrap();

        pipeline.fail(StageId::ModelTraining).unwrap();
        let stage = pipeline.stage(StageId::ModelTraining);
        assert_eq!(stage.status, StageStatus::Error);
        assert_eq!(stage.progress, 20);
        assert!(pipeline.is_halted());
        assert!(pipeline.advance(PipelineStep::TrainingComplete).is_err());

        pipeline.begin_run(RunKind::Rerun);
        assert!(!pipeline.is_halted());
    }

    #[test]
    fn only_processing_stage_can_fail() {
        let mut pipeline = Pipeline::new();
        assert!(pipeline.fail(StageId::Forecasting).is_err());
        assert!(!pipeline.is_halted());
    }
}
