use clap::Parser;
use stockcast::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (global_level, my_code_level) = if cli.verbose {
        (log::LevelFilter::Warn, log::LevelFilter::Debug)
    } else if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("stockcast"), my_code_level)
        .parse_default_env()
        .init();

    run(cli)
}
