//! Session events rendered as log lines.

use crate::ports::event_port::{EventPort, SessionEvent};

#[derive(Debug, Default)]
pub struct LogEventAdapter;

impl LogEventAdapter {
    pub fn describe(event: &SessionEvent) -> String {
        match event {
            SessionEvent::InstrumentSelected { run, instrument } => format!(
                "{}: selected {} ({}) at {:.2}",
                run, instrument.symbol, instrument.name, instrument.price
            ),
            SessionEvent::StageUpdated {
                run,
                stage,
                status,
                progress,
                task,
            } => match task {
                Some(task) => format!("{}: stage {} {} {}% [{}]", run, stage, status, progress, task),
                None => format!("{}: stage {} {} {}%", run, stage, status, progress),
            },
            SessionEvent::SeriesUpdated { run, series } => format!(
                "{}: {} historical points for {}",
                run,
                series.len(),
                series.symbol()
            ),
            SessionEvent::IndicatorsUpdated { run, indicators } => {
                format!("{}: {} indicators recomputed", run, indicators.len())
            }
            SessionEvent::ForecastUpdated { run, forecast } => {
                format!("{}: {} forecast points published", run, forecast.len())
            }
            SessionEvent::ComparisonUpdated { run, comparison } => {
                let variants = comparison.iter().count();
                format!("{}: compared {} algorithm variants", run, variants)
            }
            SessionEvent::RunSuperseded { previous, current } => {
                format!("{} superseded by {}", previous, current)
            }
        }
    }
}

impl EventPort for LogEventAdapter {
    fn publish(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::StageUpdated { .. } | SessionEvent::RunSuperseded { .. } => {
                log::info!("{}", Self::describe(event))
            }
            _ => log::debug!("{}", Self::describe(event)),
        }
    }
}
