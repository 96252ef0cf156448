//! SignalKit CLI — replay a bar feed through a signal session.
//!
//! Commands:
//! - `replay` — run every bar of a CSV feed through a configured session and
//!   print one JSON line per bar, then a summary
//! - `check` — validate a session config and print it with defaults filled in

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use signalkit_core::config::SessionConfig;
use signalkit_core::consumers::PaperGateway;
use signalkit_core::feed::read_bars_csv;

#[derive(Parser)]
#[command(
    name = "signalkit",
    about = "SignalKit CLI — bar-driven signal rules and their consumers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV bar feed through a session built from a TOML config.
    Replay {
        /// Path to the session TOML config.
        #[arg(long)]
        config: PathBuf,

        /// CSV feed with header `symbol,timestamp,open,high,low,close`.
        #[arg(long)]
        bars: PathBuf,

        /// Log output format (logs go to stderr).
        #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
        log_format: LogFormat,
    },
    /// Validate a session config and print it back as TOML.
    Check {
        /// Path to the session TOML config.
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            config,
            bars,
            log_format,
        } => {
            init_logging(log_format);
            run_replay(&config, &bars)
        }
        Commands::Check { config } => {
            init_logging(LogFormat::Pretty);
            run_check(&config)
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn run_replay(config_path: &Path, bars_path: &Path) -> Result<()> {
    let config = SessionConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let bars = read_bars_csv(bars_path)
        .with_context(|| format!("reading bars from {}", bars_path.display()))?;

    let gateway = PaperGateway::new();
    let mut session = config.build_session(Box::new(gateway.clone()))?;
    info!(
        session = session.name(),
        rule = session.rule().name(),
        periodicity = %session.periodicity(),
        bars = bars.len(),
        "replay started"
    );

    for bar in &bars {
        let ledger_before = session.orders().map_or(0, |o| o.ledger().len());
        let outcome = session.on_bar(bar);

        let display = session.display().and_then(|d| d.last_point()).copied();
        let condition = session.condition().and_then(|c| c.last_point()).copied();
        let new_orders = session
            .orders()
            .map(|o| o.ledger()[ledger_before..].to_vec())
            .unwrap_or_default();

        let line = json!({
            "timestamp": bar.timestamp,
            "symbol": bar.symbol,
            "close": bar.close,
            "outcome": outcome,
            "display": outcome.result().and(display),
            "condition": outcome.result().and(condition),
            "orders": new_orders,
        });
        println!("{}", serde_json::to_string(&line)?);
    }

    let stats = session.stats();
    let submitted = gateway.submitted();
    let summary = json!({
        "summary": {
            "session": session.name(),
            "bars": stats.bars,
            "evaluated": stats.evaluated,
            "skipped": stats.skipped,
            "entries": stats.entries,
            "exits": stats.exits,
            "orders_submitted": submitted,
            "diagnostics": session.diagnostics(),
        }
    });
    println!("{}", serde_json::to_string(&summary)?);
    info!(session = session.name(), orders = submitted, "replay finished");

    Ok(())
}

fn run_check(config_path: &Path) -> Result<()> {
    let config = SessionConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
