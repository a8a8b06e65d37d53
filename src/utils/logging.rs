// file: src/utils/logging.rs
// description: tracing subscriber setup and colored console formatting for cli output

use crate::models::{DocumentStatus, Observable};
use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flag
/// when it is set.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

pub fn format_status(status: DocumentStatus) -> String {
    match status {
        DocumentStatus::Submitted => status.as_str().dimmed().to_string(),
        DocumentStatus::Analyzed => status.as_str().cyan().to_string(),
        DocumentStatus::Registered => status.as_str().green().bold().to_string(),
    }
}

/// One observable per line: type column, value, then any annotations.
pub fn format_observable(observable: &Observable) -> String {
    let kind = format!("{:<7}", observable.kind.as_str()).magenta();
    if observable.tags.is_empty() {
        return format!("  {} {}", kind, observable.value);
    }

    let tags: Vec<&str> = observable.tags.iter().map(String::as_str).collect();
    format!(
        "  {} {} {}",
        kind,
        observable.value,
        format!("[{}]", tags.join(", ")).dimmed()
    )
}
