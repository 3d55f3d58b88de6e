//! tracing subscriber setup for binaries embedding the gateway

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "flight_gateway=info";
const LOG_FILE_PREFIX: &str = "flight-gateway.log";

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Human-readable lines on stderr
    Stderr,
    /// JSON lines in a daily-rolling file under this directory
    File(PathBuf),
}

/// Filter from `RUST_LOG` directives when given, else the crate default
fn build_filter(directives: Option<String>, verbose: bool) -> Result<EnvFilter> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)?,
        None if verbose => {
            EnvFilter::new("flight_gateway=debug").add_directive("reqwest=debug".parse()?)
        }
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    };
    Ok(filter)
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(target: LogTarget, verbose: bool) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok(), verbose)?;

    match &target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .try_init()?;
        }
        LogTarget::File(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .try_init()?;
        }
    }

    info!(?target, "Logging initialized");
    debug!("Debug logging is enabled");
    Ok(())
}
