//! CLI integration tests for config loading, catalog selection and the
//! subcommands.
//!
//! Tests cover:
//! - Session config from real INI files on disk
//! - Catalog selection (built-in sample vs CSV file)
//! - Simulate, search, validate and windows commands end to end
//! - Exit codes for config, catalog and lookup failures

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use stockcast::cli::{self, Cli, Command};
use stockcast::domain::chart::TimeWindow;
use stockcast::domain::error::StockcastError;
use stockcast::domain::session::ComparatorMode;

fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    write_temp_file(content, ".ini")
}

fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{:?}", actual) == format!("{:?}", expected)
}

const CATALOG_CSV: &str = "\
symbol,name,price,previous_close,volume,market_cap
BHP,BHP Group,45.10,44.80,8200000,2.28e11
CBA,Commonwealth Bank,118.40,119.02,2100000,1.98e11
";

const FAST_INI: &str = r#"
[session]
history_days = 120
forecast_horizon = 14
seed = 42
window = 3M

[pipeline]
load_delay_ms = 0
feature_delay_ms = 0
training_delay_ms = 0
forecast_delay_ms = 0

[comparator]
mode = holdout
holdout_days = 20
"#;

fn simulate(config: Option<PathBuf>, symbol: Option<&str>) -> Cli {
    Cli {
        verbose: false,
        command: Command::Simulate {
            config,
            symbol: symbol.map(str::to_string),
            window: None,
            seed: None,
            realtime: false,
            json: false,
            rerun: false,
        },
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn no_path_gives_defaults() {
        let config = cli::load_session_config(None).unwrap();
        assert_eq!(config.history_days, 365);
        assert_eq!(config.window, TimeWindow::OneMonth);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn reads_ini_from_disk() {
        let file = write_temp_ini(FAST_INI);
        let config = cli::load_session_config(Some(file.path())).unwrap();

        assert_eq!(config.history_days, 120);
        assert_eq!(config.forecast_horizon, 14);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.window, TimeWindow::ThreeMonths);
        assert_eq!(config.timings.load, Duration::ZERO);
        assert_eq!(config.comparator, ComparatorMode::Holdout);
        assert_eq!(config.holdout_days, 20);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = cli::load_session_config(Some(Path::new("/nonexistent/stockcast.ini")))
            .unwrap_err();
        assert!(matches!(err, StockcastError::Io(_)));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let file = write_temp_ini("[session]\nforecast_horizon = 0\n");
        let err = cli::load_session_config(Some(file.path())).unwrap_err();
        assert!(
            matches!(err, StockcastError::ConfigInvalid { ref key, .. } if key == "forecast_horizon")
        );
    }
}

mod catalog_selection {
    use super::*;

    #[test]
    fn default_catalog_is_the_sample() {
        let config = cli::load_session_config(None).unwrap();
        let catalog = cli::build_catalog(&config).unwrap();
        assert_eq!(catalog.all().len(), 5);
        assert!(catalog.find("aapl").is_some());
    }

    #[test]
    fn csv_catalog_from_config() {
        let csv = write_temp_file(CATALOG_CSV, ".csv");
        let ini = write_temp_ini(&format!("[catalog]\npath = {}\n", csv.path().display()));
        let config = cli::load_session_config(Some(ini.path())).unwrap();
        let catalog = cli::build_catalog(&config).unwrap();

        let symbols: Vec<String> = catalog.all().into_iter().map(|i| i.symbol).collect();
        assert_eq!(symbols, vec!["BHP", "CBA"]);
        assert!(catalog.find("AAPL").is_none());
        assert_eq!(catalog.search("bank").len(), 1);
    }

    #[test]
    fn missing_csv_is_catalog_error() {
        let ini = write_temp_ini("[catalog]\npath = /nonexistent/instruments.csv\n");
        let config = cli::load_session_config(Some(ini.path())).unwrap();
        let err = cli::build_catalog(&config).err().unwrap();
        assert!(matches!(err, StockcastError::Catalog { .. }));
    }
}

mod commands {
    use super::*;

    #[test]
    fn simulate_with_defaults_succeeds() {
        let code = cli::run(simulate(None, Some("MSFT")));
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn simulate_with_fast_config_and_rerun() {
        let ini = write_temp_ini(FAST_INI);
        let code = cli::run(Cli {
            verbose: false,
            command: Command::Simulate {
                config: Some(ini.path().to_path_buf()),
                symbol: None,
                window: Some("ytd".into()),
                seed: Some(7),
                realtime: true,
                json: false,
                rerun: true,
            },
        });
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn simulate_against_csv_catalog() {
        let csv = write_temp_file(CATALOG_CSV, ".csv");
        let ini = write_temp_ini(&format!("{}\n[catalog]\npath = {}\n", FAST_INI, csv.path().display()));
        let code = cli::run(simulate(Some(ini.path().to_path_buf()), Some("cba")));
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn unknown_symbol_exits_3() {
        let code = cli::run(simulate(None, Some("ZZZZ")));
        assert!(same_code(code, ExitCode::from(3)));
    }

    #[test]
    fn unknown_window_fails() {
        let code = cli::run(Cli {
            verbose: false,
            command: Command::Simulate {
                config: None,
                symbol: None,
                window: Some("2Y".into()),
                seed: None,
                realtime: false,
                json: false,
                rerun: false,
            },
        });
        assert!(!same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn short_history_for_holdout_fails_validation() {
        let ini = write_temp_ini(
            "[session]\nhistory_days = 10\n\n[comparator]\nmode = holdout\nholdout_days = 30\n",
        );
        let code = cli::run(Cli {
            verbose: false,
            command: Command::Validate {
                config: ini.path().to_path_buf(),
            },
        });
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn validate_accepts_good_config() {
        let ini = write_temp_ini(FAST_INI);
        let code = cli::run(Cli {
            verbose: false,
            command: Command::Validate {
                config: ini.path().to_path_buf(),
            },
        });
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn search_without_hits_still_succeeds() {
        let code = cli::run(Cli {
            verbose: false,
            command: Command::Search {
                query: "nothing-matches".into(),
                config: None,
            },
        });
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn windows_lists_all() {
        let code = cli::run(Cli {
            verbose: false,
            command: Command::Windows,
        });
        assert!(same_code(code, ExitCode::SUCCESS));
    }
}
