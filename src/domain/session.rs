//! The dashboard session: one selected instrument, its derived data, and
//! the pipeline run that produces them.
//!
//! All mutation goes through `&mut Session`, so there is a single writer.
//! Each run gets a fresh [`RunId`]; scheduled continuations are keyed by it
//! and anything left over from a superseded run is dropped as stale when it
//! comes due.

use crate::domain::chart::{self, ChartView, TimeWindow};
use crate::domain::comparator::{ComparisonSet, SimulatedMetrics};
use crate::domain::config_validation::{
    parse_optional, validate_session_config, DEFAULT_FORECAST_HORIZON, DEFAULT_HISTORY_DAYS,
    DEFAULT_HOLDOUT_DAYS, DEFAULT_SEED_PRICE_RATIO,
};
use crate::domain::error::StockcastError;
use crate::domain::forecast::generate_forecast;
use crate::domain::generator::generate_history;
use crate::domain::holdout::HoldoutMetrics;
use crate::domain::indicator::summary::{summarize, TechnicalIndicator};
use crate::domain::instrument::Instrument;
use crate::domain::pipeline::{Pipeline, StageId};
use crate::domain::schedule::{PipelineStep, RunId, RunKind, ScheduledStep, StageTimings};
use crate::domain::series::{ForecastSeries, HistoricalSeries};
use crate::ports::config_port::ConfigPort;
use crate::ports::event_port::{EventPort, SessionEvent};
use crate::ports::metrics_port::MetricsPort;
use crate::ports::scheduler_port::SchedulerPort;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparatorMode {
    #[default]
    Simulated,
    Holdout,
}

impl FromStr for ComparatorMode {
    type Err = StockcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulated" => Ok(ComparatorMode::Simulated),
            "holdout" => Ok(ComparatorMode::Holdout),
            other => Err(StockcastError::invalid_input(format!(
                "unknown comparator mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ComparatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparatorMode::Simulated => write!(f, "simulated"),
            ComparatorMode::Holdout => write!(f, "holdout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub history_days: usize,
    pub forecast_horizon: usize,
    /// Seed price = instrument price * ratio.
    pub seed_price_ratio: f64,
    pub seed: Option<u64>,
    pub window: TimeWindow,
    pub timings: StageTimings,
    pub comparator: ComparatorMode,
    pub holdout_days: usize,
    pub catalog_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_days: DEFAULT_HISTORY_DAYS,
            forecast_horizon: DEFAULT_FORECAST_HORIZON,
            seed_price_ratio: DEFAULT_SEED_PRICE_RATIO,
            seed: None,
            window: TimeWindow::default(),
            timings: StageTimings::default(),
            comparator: ComparatorMode::default(),
            holdout_days: DEFAULT_HOLDOUT_DAYS,
            catalog_path: None,
        }
    }
}

impl SessionConfig {
    /// Validate and read every key, falling back to defaults for the ones
    /// left out.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockcastError> {
        validate_session_config(config)?;
        let defaults = Self::default();

        let count = |section: &str, key: &str, default: usize| {
            usize::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
        };
        let millis = |key: &str, default| config.get_millis("pipeline", key, default);

        Ok(Self {
            history_days: count("session", "history_days", defaults.history_days),
            forecast_horizon: count("session", "forecast_horizon", defaults.forecast_horizon),
            seed_price_ratio: config.get_double(
                "session",
                "seed_price_ratio",
                defaults.seed_price_ratio,
            ),
            seed: parse_optional(config, "session", "seed", "a non-negative integer")?,
            window: parse_optional(config, "session", "window", "a time window")?
                .unwrap_or(defaults.window),
            timings: StageTimings {
                load: millis("load_delay_ms", defaults.timings.load),
                features: millis("feature_delay_ms", defaults.timings.features),
                training: millis("training_delay_ms", defaults.timings.training),
                forecast: millis("forecast_delay_ms", defaults.timings.forecast),
            },
            comparator: parse_optional(config, "comparator", "mode", "simulated or holdout")?
                .unwrap_or(defaults.comparator),
            holdout_days: count("comparator", "holdout_days", defaults.holdout_days),
            catalog_path: config
                .get_string("catalog", "path")
                .filter(|p| !p.trim().is_empty())
                .map(|p| PathBuf::from(p.trim())),
        })
    }

    /// The metrics generator selected by `[comparator] mode`.
    pub fn metrics_port(&self) -> Result<Box<dyn MetricsPort>, StockcastError> {
        Ok(match self.comparator {
            ComparatorMode::Simulated => Box::new(SimulatedMetrics),
            ComparatorMode::Holdout => Box::new(HoldoutMetrics::new(self.holdout_days)?),
        })
    }
}

struct ActiveRun {
    id: RunId,
    kind: RunKind,
    /// Generated at selection time, published when ingestion completes.
    pending_history: Option<HistoricalSeries>,
}

/// What a step produced, held back until the stage transition succeeds.
enum StepOutput {
    Series(HistoricalSeries),
    Indicators(Vec<TechnicalIndicator>),
    Comparison(ComparisonSet),
    Forecast(ForecastSeries),
}

pub struct Session {
    config: SessionConfig,
    today: NaiveDate,
    rng: StdRng,
    metrics: Box<dyn MetricsPort>,
    scheduler: Box<dyn SchedulerPort>,
    events: Box<dyn EventPort>,
    pipeline: Pipeline,
    window: TimeWindow,
    instrument: Option<Instrument>,
    history: Option<HistoricalSeries>,
    forecast: Option<ForecastSeries>,
    indicators: Vec<TechnicalIndicator>,
    comparison: Option<ComparisonSet>,
    last_run: RunId,
    active: Option<ActiveRun>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        today: NaiveDate,
        metrics: Box<dyn MetricsPort>,
        scheduler: Box<dyn SchedulerPort>,
        events: Box<dyn EventPort>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::debug!(
            "session created: {} days history, horizon {}, {} metrics",
            config.history_days,
            config.forecast_horizon,
            metrics.name()
        );
        Self {
            window: config.window,
            config,
            today,
            rng,
            metrics,
            scheduler,
            events,
            pipeline: Pipeline::new(),
            instrument: None,
            history: None,
            forecast: None,
            indicators: Vec::new(),
            comparison: None,
            last_run: RunId::new(0),
            active: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn instrument(&self) -> Option<&Instrument> {
        self.instrument.as_ref()
    }

    pub fn history(&self) -> Option<&HistoricalSeries> {
        self.history.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastSeries> {
        self.forecast.as_ref()
    }

    pub fn indicators(&self) -> &[TechnicalIndicator] {
        &self.indicators
    }

    pub fn comparison(&self) -> Option<&ComparisonSet> {
        self.comparison.as_ref()
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Id of the run in flight, if any.
    pub fn active_run(&self) -> Option<RunId> {
        self.active.as_ref().map(|run| run.id)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn pending_steps(&self) -> usize {
        self.scheduler.pending()
    }

    /// Switch to `instrument` and start a full run. The series is generated
    /// up front so bad parameters are rejected before anything is scheduled
    /// or any state changes.
    pub fn select_instrument(&mut self, instrument: Instrument) -> Result<RunId, StockcastError> {
        let seed_price = instrument.price * self.config.seed_price_ratio;
        let series = generate_history(
            &instrument.symbol,
            self.config.history_days,
            seed_price,
            self.today,
            &mut self.rng,
        )?;

        let run = self.supersede();
        log::info!("{}: selecting {}", run, instrument.symbol);
        self.instrument = Some(instrument.clone());
        self.history = None;
        self.forecast = None;
        self.indicators.clear();
        self.comparison = None;
        self.emit(SessionEvent::InstrumentSelected { run, instrument });

        self.launch(run, RunKind::Selection, Some(series));
        Ok(run)
    }

    /// Re-run features, training and forecasting for the current
    /// instrument. Ingestion is kept unless it never finished, in which
    /// case the selection starts over.
    pub fn request_forecast_run(&mut self) -> Result<RunId, StockcastError> {
        let instrument = self
            .instrument
            .clone()
            .ok_or(StockcastError::NoInstrumentSelected)?;
        if self.history.is_none() {
            return self.select_instrument(instrument);
        }

        let run = self.supersede();
        log::info!("{}: re-running forecast for {}", run, instrument.symbol);
        self.launch(run, RunKind::Rerun, None);
        Ok(run)
    }

    pub fn set_time_window(&mut self, window: TimeWindow) -> ChartView {
        self.window = window;
        self.chart_view()
    }

    /// Chart for the current window. Forecast points are held back while a
    /// run is in flight.
    pub fn chart_view(&self) -> ChartView {
        match &self.history {
            Some(history) => {
                let forecast = if self.is_running() {
                    None
                } else {
                    self.forecast.as_ref()
                };
                chart::assemble(history, forecast, self.window, self.today)
            }
            None => ChartView {
                window: self.window,
                points: Vec::new(),
                domain: None,
                marker: None,
            },
        }
    }

    /// Fire the next due continuation. Stale continuations are dropped
    /// quietly; a failing stage halts the run and is returned.
    pub fn step(&mut self) -> Result<Option<ScheduledStep>, StockcastError> {
        let Some(scheduled) = self.scheduler.next_due() else {
            return Ok(None);
        };
        match self.dispatch(scheduled) {
            Err(StockcastError::StaleRun { run }) => {
                log::debug!("dropping {} for {}: superseded", scheduled.step, run);
                Ok(Some(scheduled))
            }
            Err(e) => Err(e),
            Ok(()) => Ok(Some(scheduled)),
        }
    }

    /// Fire continuations until the queue is empty. Returns how many fired.
    pub fn run_until_idle(&mut self) -> Result<usize, StockcastError> {
        let mut fired = 0;
        while self.step()?.is_some() {
            fired += 1;
        }
        Ok(fired)
    }

    fn supersede(&mut self) -> RunId {
        let run = self.last_run.next();
        self.last_run = run;
        if let Some(previous) = self.active.take() {
            log::info!("{} superseded by {}", previous.id, run);
            self.emit(SessionEvent::RunSuperseded {
                previous: previous.id,
                current: run,
            });
        }
        run
    }

    fn launch(&mut self, run: RunId, kind: RunKind, pending_history: Option<HistoricalSeries>) {
        self.active = Some(ActiveRun {
            id: run,
            kind,
            pending_history,
        });
        let changed = self.pipeline.begin_run(kind);
        self.emit_stages(run, &changed);

        let first = PipelineStep::first(kind);
        self.scheduler
            .schedule(run, first, self.config.timings.delay_before(first));
    }

    fn dispatch(&mut self, scheduled: ScheduledStep) -> Result<(), StockcastError> {
        let ScheduledStep { run, step, .. } = scheduled;
        match &self.active {
            Some(active) if active.id == run => {}
            _ => return Err(StockcastError::StaleRun { run }),
        }
        log::info!("{}: {}", run, step);

        let outcome = self
            .perform(step)
            .and_then(|output| self.pipeline.advance(step).map(|changed| (output, changed)));

        match outcome {
            Ok((output, changed)) => {
                self.commit(run, output);
                self.emit_stages(run, &changed);
                match step.next() {
                    Some(next) => {
                        self.scheduler
                            .schedule(run, next, self.config.timings.delay_before(next));
                    }
                    None => {
                        if let Some(finished) = self.active.take() {
                            log::info!("{}: {:?} run finished", run, finished.kind);
                        }
                    }
                }
                Ok(())
            }
            Err(source) => Err(self.halt(run, step.completes(), source)),
        }
    }

    fn perform(&mut self, step: PipelineStep) -> Result<StepOutput, StockcastError> {
        match step {
            PipelineStep::SeriesLoaded => self
                .active
                .as_mut()
                .and_then(|active| active.pending_history.take())
                .map(StepOutput::Series)
                .ok_or_else(|| StockcastError::invalid_input("no generated series to publish")),
            PipelineStep::FeaturesReady => {
                let history = self.history.as_ref().ok_or(StockcastError::NoInstrumentSelected)?;
                Ok(StepOutput::Indicators(summarize(history)))
            }
            PipelineStep::TrainingComplete => {
                let instrument = self
                    .instrument
                    .as_ref()
                    .ok_or(StockcastError::NoInstrumentSelected)?;
                let history = self.history.as_ref().ok_or(StockcastError::NoInstrumentSelected)?;
                let comparison = self.metrics.compare(instrument, history, &mut self.rng)?;
                Ok(StepOutput::Comparison(comparison))
            }
            PipelineStep::ForecastPublished => {
                let history = self.history.as_ref().ok_or(StockcastError::NoInstrumentSelected)?;
                let forecast =
                    generate_forecast(history, self.config.forecast_horizon, &mut self.rng)?;
                Ok(StepOutput::Forecast(forecast))
            }
        }
    }

    fn commit(&mut self, run: RunId, output: StepOutput) {
        let event = match output {
            StepOutput::Series(series) => {
                self.history = Some(series.clone());
                SessionEvent::SeriesUpdated { run, series }
            }
            StepOutput::Indicators(indicators) => {
                self.indicators = indicators.clone();
                SessionEvent::IndicatorsUpdated { run, indicators }
            }
            StepOutput::Comparison(comparison) => {
                self.comparison = Some(comparison.clone());
                SessionEvent::ComparisonUpdated { run, comparison }
            }
            StepOutput::Forecast(forecast) => {
                self.forecast = Some(forecast.clone());
                SessionEvent::ForecastUpdated { run, forecast }
            }
        };
        self.emit(event);
    }

    fn halt(&mut self, run: RunId, stage: StageId, source: StockcastError) -> StockcastError {
        log::error!("{}: stage {} failed: {}", run, stage, source);
        if let Err(e) = self.pipeline.fail(stage) {
            log::warn!("{}: {}", run, e);
        }
        self.emit_stages(run, &[stage]);
        self.active = None;
        StockcastError::StageFailed {
            stage,
            source: Box::new(source),
        }
    }

    fn emit_stages(&mut self, run: RunId, stages: &[StageId]) {
        for &id in stages {
            let event = SessionEvent::stage_updated(run, self.pipeline.stage(id));
            self.events.publish(&event);
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.events.publish(&event);
    }
}
