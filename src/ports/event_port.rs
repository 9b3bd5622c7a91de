//! Output events consumed by the presentation layer.

use crate::domain::comparator::ComparisonSet;
use crate::domain::indicator::summary::TechnicalIndicator;
use crate::domain::instrument::Instrument;
use crate::domain::pipeline::{PipelineStage, StageId, StageStatus};
use crate::domain::schedule::RunId;
use crate::domain::series::{ForecastSeries, HistoricalSeries};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    InstrumentSelected {
        run: RunId,
        instrument: Instrument,
    },
    StageUpdated {
        run: RunId,
        stage: StageId,
        status: StageStatus,
        progress: u8,
        task: Option<String>,
    },
    SeriesUpdated {
        run: RunId,
        series: HistoricalSeries,
    },
    IndicatorsUpdated {
        run: RunId,
        indicators: Vec<TechnicalIndicator>,
    },
    ForecastUpdated {
        run: RunId,
        forecast: ForecastSeries,
    },
    ComparisonUpdated {
        run: RunId,
        comparison: ComparisonSet,
    },
    RunSuperseded {
        previous: RunId,
        current: RunId,
    },
}

impl SessionEvent {
    pub fn stage_updated(run: RunId, stage: &PipelineStage) -> Self {
        SessionEvent::StageUpdated {
            run,
            stage: stage.id,
            status: stage.status,
            progress: stage.progress,
            task: stage.task.clone(),
        }
    }

    pub fn run(&self) -> RunId {
        match self {
            SessionEvent::InstrumentSelected { run, .. }
            | SessionEvent::StageUpdated { run, .. }
            | SessionEvent::SeriesUpdated { run, .. }
            | SessionEvent::IndicatorsUpdated { run, .. }
            | SessionEvent::ForecastUpdated { run, .. }
            | SessionEvent::ComparisonUpdated { run, .. } => *run,
            SessionEvent::RunSuperseded { current, .. } => *current,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::InstrumentSelected { .. } => "instrument_selected",
            SessionEvent::StageUpdated { .. } => "stage_updated",
            SessionEvent::SeriesUpdated { .. } => "series_updated",
            SessionEvent::IndicatorsUpdated { .. } => "indicators_updated",
            SessionEvent::ForecastUpdated { .. } => "forecast_updated",
            SessionEvent::ComparisonUpdated { .. } => "comparison_updated",
            SessionEvent::RunSuperseded { .. } => "run_superseded",
        }
    }
}

pub trait EventPort {
    fn publish(&mut self, event: &SessionEvent);
}

/// Publishes to several ports in order.
#[derive(Default)]
pub struct EventFanout {
    ports: Vec<Box<dyn EventPort>>,
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, port: Box<dyn EventPort>) -> Self {
        self.ports.push(port);
        self
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl EventPort for EventFanout {
    fn publish(&mut self, event: &SessionEvent) {
        for port in &mut self.ports {
            port.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<&'static str>>>);

    impl EventPort for Recorder {
        fn publish(&mut self, event: &SessionEvent) {
            self.0.borrow_mut().push(event.name());
        }
    }

    #[test]
    fn fanout_reaches_every_port() {
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let mut fanout = EventFanout::new()
            .with(Box::new(Recorder(first.clone())))
            .with(Box::new(Recorder(second.clone())));

        fanout.publish(&SessionEvent::RunSuperseded {
            previous: RunId::new(1),
            current: RunId::new(2),
        });

        assert_eq!(fanout.len(), 2);
        assert_eq!(*first.borrow(), vec!["run_superseded"]);
        assert_eq!(*second.borrow(), vec!["run_superseded"]);
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = SessionEvent::StageUpdated {
            run: RunId::new(3),
            stage: StageId::ModelTraining,
            status: StageStatus::Processing,
            progress: 20,
            task: Some("Training models".into()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "stage_updated");
        assert_eq!(json["run"], 3);
        assert_eq!(json["stage"], "model_training");
        assert_eq!(json["status"], "processing");
        assert_eq!(event.run(), RunId::new(3));
    }
}
