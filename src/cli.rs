//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_catalog_adapter::CsvCatalogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_event_adapter::LogEventAdapter;
use crate::adapters::realtime_scheduler::RealtimeScheduler;
use crate::adapters::sample_catalog::SampleCatalog;
use crate::adapters::virtual_scheduler::VirtualScheduler;
use crate::domain::chart::{ChartView, TimeWindow};
use crate::domain::comparator::{ComparisonSet, Metric};
use crate::domain::error::StockcastError;
use crate::domain::session::{Session, SessionConfig};
use crate::ports::catalog_port::CatalogPort;
use crate::ports::event_port::{EventFanout, EventPort};
use crate::ports::scheduler_port::SchedulerPort;

#[derive(Parser, Debug)]
#[command(name = "stockcast", about = "Simulated stock forecasting pipeline")]
pub struct Cli {
    /// Log debug output from stockcast
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select an instrument and drive the forecasting pipeline to completion
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        symbol: Option<String>,
        /// Chart window: 1D, 1W, 1M, 3M, 6M, 1Y, YTD or ALL
        #[arg(short, long)]
        window: Option<String>,
        /// Override the configured RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Wait out the stage delays on the wall clock
        #[arg(long)]
        realtime: bool,
        /// Stream session events to stdout as JSON lines
        #[arg(long)]
        json: bool,
        /// Request a second forecast run after the first completes
        #[arg(long)]
        rerun: bool,
    },
    /// Search the instrument catalog by symbol or name
    Search {
        query: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file and print the resolved values
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the chart time windows
    Windows,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            symbol,
            window,
            seed,
            realtime,
            json,
            rerun,
        } => run_simulate(&SimulateOptions {
            config,
            symbol,
            window,
            seed,
            realtime,
            json,
            rerun,
        }),
        Command::Search { query, config } => run_search(&query, config.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Windows => run_windows(),
    }
}

fn report(err: StockcastError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

pub fn load_session_config(path: Option<&Path>) -> Result<SessionConfig, StockcastError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            SessionConfig::from_config(&adapter)
        }
        None => Ok(SessionConfig::default()),
    }
}

pub fn build_catalog(config: &SessionConfig) -> Result<Box<dyn CatalogPort>, StockcastError> {
    Ok(match &config.catalog_path {
        Some(path) => Box::new(CsvCatalogAdapter::from_file(path)?),
        None => Box::new(SampleCatalog),
    })
}

struct SimulateOptions {
    config: Option<PathBuf>,
    symbol: Option<String>,
    window: Option<String>,
    seed: Option<u64>,
    realtime: bool,
    json: bool,
    rerun: bool,
}

fn run_simulate(opts: &SimulateOptions) -> ExitCode {
    match simulate(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn simulate(opts: &SimulateOptions) -> Result<(), StockcastError> {
    let mut config = load_session_config(opts.config.as_deref())?;
    if let Some(window) = &opts.window {
        config.window = window.parse()?;
    }
    if opts.seed.is_some() {
        config.seed = opts.seed;
    }

    let catalog = build_catalog(&config)?;
    let instrument = match &opts.symbol {
        Some(symbol) => catalog
            .find(symbol)
            .ok_or_else(|| StockcastError::UnknownSymbol {
                symbol: symbol.clone(),
            })?,
        None => catalog
            .all()
            .into_iter()
            .next()
            .ok_or(StockcastError::NoInstrumentSelected)?,
    };

    let scheduler: Box<dyn SchedulerPort> = if opts.realtime {
        Box::new(RealtimeScheduler::new())
    } else {
        Box::new(VirtualScheduler::new())
    };
    let events = event_ports(opts.json)?;
    let metrics = config.metrics_port()?;
    let today = chrono::Local::now().date_naive();

    let mut session = Session::new(config, today, metrics, scheduler, events);
    session.select_instrument(instrument)?;
    session.run_until_idle()?;
    if opts.rerun {
        session.request_forecast_run()?;
        session.run_until_idle()?;
    }

    if !opts.json {
        print_summary(&session, today);
    }
    Ok(())
}

fn event_ports(json: bool) -> Result<Box<dyn EventPort>, StockcastError> {
    let fanout = EventFanout::new().with(Box::new(LogEventAdapter));
    if !json {
        return Ok(Box::new(fanout));
    }

    #[cfg(feature = "json")]
    {
        use crate::adapters::json_event_adapter::JsonEventAdapter;
        Ok(Box::new(fanout.with(Box::new(JsonEventAdapter::stdout()))))
    }

    #[cfg(not(feature = "json"))]
    {
        let _ = fanout;
        Err(StockcastError::invalid_input(
            "--json needs stockcast built with the json feature",
        ))
    }
}

fn print_summary(session: &Session, today: NaiveDate) {
    if let Some(instrument) = session.instrument() {
        let sign = if instrument.change() >= 0.0 { "+" } else { "" };
        println!(
            "{} ({})  {:.2}  {}{:.2} ({}{:.2}%)",
            instrument.symbol,
            instrument.name,
            instrument.price,
            sign,
            instrument.change(),
            sign,
            instrument.change_percent()
        );
    }

    println!("\n=== Pipeline ===");
    for stage in session.pipeline().stages() {
        println!(
            "  {}. {:<20} {:<10} {:>3}%",
            stage.id.ordinal(),
            stage.label(),
            stage.status.to_string(),
            stage.progress
        );
    }

    print_chart(&session.chart_view(), today);

    if !session.indicators().is_empty() {
        println!("\n=== Technical Indicators ===");
        for indicator in session.indicators() {
            println!(
                "  {:<10} {:>10.2}  {:<8} {}",
                indicator.name,
                indicator.value,
                indicator.signal.to_string(),
                indicator.description
            );
        }
    }

    if let Some(comparison) = session.comparison() {
        print_comparison(comparison);
    }
}

fn print_chart(view: &ChartView, today: NaiveDate) {
    println!("\n=== Chart ({}, {}) ===", view.window, view.window.description());
    println!("  As of:       {}", today);
    println!("  Historical:  {} points", view.historical_count());
    println!("  Forecast:    {} points", view.forecast_count());
    match view.domain {
        Some(domain) => println!("  Y domain:    {:.2} .. {:.2}", domain.min, domain.max),
        None => println!("  Y domain:    (empty)"),
    }
    if let Some(marker) = view.marker {
        println!("  Marker:      {}", marker);
    }
}

fn print_comparison(comparison: &ComparisonSet) {
    println!("\n=== Algorithm Comparison ===");
    println!(
        "  {:<18} {:>8} {:>8} {:>8} {:>9}",
        "variant", "MAE", "RMSE", "MAPE", "Accuracy"
    );
    let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
    for (variant, metrics) in comparison.iter() {
        println!(
            "  {:<18} {:>8} {:>8} {:>8} {:>9}",
            variant.key(),
            cell(metrics.mae),
            cell(metrics.rmse),
            cell(metrics.mape),
            metrics
                .accuracy
                .map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v))
        );
    }
    println!();
    for metric in Metric::ALL {
        match comparison.best(metric) {
            Some(variant) => println!("  Best {:<9} {}", metric.label(), variant),
            None => println!("  Best {:<9} -", metric.label()),
        }
    }
}

fn run_search(query: &str, config_path: Option<&Path>) -> ExitCode {
    let catalog = match load_session_config(config_path).and_then(|c| build_catalog(&c)) {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    let hits = catalog.search(query);
    if hits.is_empty() {
        eprintln!("No instruments match '{}'", query);
    } else {
        for instrument in &hits {
            println!(
                "{:<6} {:<28} {:>10.2} {:>+7.2}%",
                instrument.symbol,
                instrument.name,
                instrument.price,
                instrument.change_percent()
            );
        }
        eprintln!("{} instruments found", hits.len());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_session_config(Some(config_path)) {
        Ok(c) => c,
        Err(e) => return report(e),
    };
    if let Err(e) = config.metrics_port() {
        return report(e);
    }

    eprintln!("Config validated successfully");
    println!("[session]");
    println!("  history_days      = {}", config.history_days);
    println!("  forecast_horizon  = {}", config.forecast_horizon);
    println!("  seed_price_ratio  = {}", config.seed_price_ratio);
    match config.seed {
        Some(seed) => println!("  seed              = {}", seed),
        None => println!("  seed              = (random)"),
    }
    println!("  window            = {}", config.window);
    println!("[pipeline]");
    println!("  load_delay_ms     = {}", config.timings.load.as_millis());
    println!("  feature_delay_ms  = {}", config.timings.features.as_millis());
    println!("  training_delay_ms = {}", config.timings.training.as_millis());
    println!("  forecast_delay_ms = {}", config.timings.forecast.as_millis());
    println!("[comparator]");
    println!("  mode              = {}", config.comparator);
    println!("  holdout_days      = {}", config.holdout_days);
    println!("[catalog]");
    match &config.catalog_path {
        Some(path) => println!("  path              = {}", path.display()),
        None => println!("  path              = (built-in sample)"),
    }
    ExitCode::SUCCESS
}

fn run_windows() -> ExitCode {
    for window in TimeWindow::ALL {
        println!("{:<4} {}", window.code(), window.description());
    }
    ExitCode::SUCCESS
}
