//! Tracing subscriber setup
//!
//! Filter directives are built from the config unless `RUST_LOG` is set:
//!
//! ```text
//! info,sqlx=warn,money_transfer::ledger=debug
//! ^^^^ ^^^^^^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//! base  log_sql   module_levels
//! ```

use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// sqlx logs every statement at info
const SQLX_QUIET: &str = "sqlx=warn";

/// Build the `EnvFilter` directive string for `config`
pub fn filter_directives(config: &AppConfig) -> String {
    let mut directives = vec![config.log_level.clone()];
    if !config.log_sql {
        directives.push(SQLX_QUIET.to_string());
    }
    for (module, level) in &config.module_levels {
        directives.push(format!("{}={}", module, level));
    }
    directives.join(",")
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; hold it until exit.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        // Target kept for per-module queries
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false)
            .with_writer(file_writer)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(file_writer)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).compact();
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}
