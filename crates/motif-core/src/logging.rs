//! Tracing subscriber bootstrap.

use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{Error, Result};

/// Install the global tracing subscriber.
///
/// `level` is the default directive (`trace`, `debug`, `info`, ...);
/// `RUST_LOG` directives are honoured on top of it. With `json` set, events
/// are emitted as structured JSON lines.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let level = level
        .parse::<Level>()
        .map_err(|_| Error::config(format!("invalid log level: {level}")))?;

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let installed = if json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init()
    };

    installed.map_err(|e| Error::config(format!("failed to install subscriber: {e}")))?;
    info!("Logging initialized at level: {}", level);
    Ok(())
}
