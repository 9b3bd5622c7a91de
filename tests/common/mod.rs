#![allow(dead_code)]

use chrono::NaiveDate;
use rand::RngCore;
use stockcast::adapters::virtual_scheduler::VirtualScheduler;
use stockcast::domain::comparator::{ComparisonSet, SimulatedMetrics};
use stockcast::domain::error::StockcastError;
use stockcast::domain::instrument::Instrument;
use stockcast::domain::session::{Session, SessionConfig};
use stockcast::domain::series::{HistoricalPoint, HistoricalSeries};
use stockcast::ports::event_port::{EventPort, SessionEvent};
use stockcast::ports::metrics_port::MetricsPort;
use std::cell::RefCell;
use std::rc::Rc;

/// Event port that keeps every event for later inspection.
#[derive(Clone, Default)]
pub struct RecordingEventPort {
    pub events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl RecordingEventPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.name()).collect()
    }

    pub fn snapshot(&self) -> Vec<SessionEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventPort for RecordingEventPort {
    fn publish(&mut self, event: &SessionEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Metrics port that always fails with the given error.
pub struct FailingMetrics {
    pub make_error: fn() -> StockcastError,
}

impl MetricsPort for FailingMetrics {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn compare(
        &mut self,
        _instrument: &Instrument,
        _history: &HistoricalSeries,
        _rng: &mut dyn RngCore,
    ) -> Result<ComparisonSet, StockcastError> {
        Err((self.make_error)())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2024, 6, 30)
}

pub fn apple() -> Instrument {
    Instrument::new("AAPL", "Apple Inc.", 182.63, 180.25, 63_492_387, 2.84e12)
}

pub fn nvidia() -> Instrument {
    Instrument::new("NVDA", "NVIDIA Corporation", 122.46, 118.20, 420_693_541, 3.02e12)
}

pub fn seeded_config(seed: u64) -> SessionConfig {
    SessionConfig {
        seed: Some(seed),
        ..SessionConfig::default()
    }
}

pub fn make_session(config: SessionConfig) -> (Session, RecordingEventPort) {
    make_session_with_metrics(config, Box::new(SimulatedMetrics))
}

pub fn make_session_with_metrics(
    config: SessionConfig,
    metrics: Box<dyn MetricsPort>,
) -> (Session, RecordingEventPort) {
    let recorder = RecordingEventPort::new();
    let session = Session::new(
        config,
        today(),
        metrics,
        Box::new(VirtualScheduler::new()),
        Box::new(recorder.clone()),
    );
    (session, recorder)
}

/// Flat bar at `close` with a one-unit range either side.
pub fn make_point(date: NaiveDate, close: f64) -> HistoricalPoint {
    HistoricalPoint {
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000_000,
    }
}

pub fn series_from_closes(start: NaiveDate, closes: &[f64]) -> HistoricalSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_point(start + chrono::Duration::days(i as i64), c))
        .collect();
    HistoricalSeries::from_points("TEST", points).unwrap()
}
