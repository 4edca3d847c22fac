use cashflow::args::{Args, Command};
use cashflow::{commands, Config, Mode, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cashflow_home().path();

    // This allows for running the program without a network connection. When
    // CASHFLOW_IN_TEST_MODE is set and non-empty, then the mode will be Mode::Test, otherwise it
    // will be Mode::Live.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::Types => {
            let config = Config::load(home).await?;
            commands::types(&config, mode).await?.print()
        }

        Command::Periods => {
            let config = Config::load(home).await?;
            commands::periods(&config, mode).await?.print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            let out = commands::report(&config, mode, report_args).await?;
            out.print();
            if let Some(rendered) = out.structure() {
                println!("{rendered}");
            }
        }

        Command::Investments(investments_args) => {
            let config = Config::load(home).await?;
            let out = commands::investments(&config, investments_args)?;
            out.print();
            if let Some(rendered) = out.structure() {
                println!("{rendered}");
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
