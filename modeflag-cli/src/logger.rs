use std::io::{self, IsTerminal};

use chrono::{SecondsFormat, Utc};
use modeflag_lib::{LogMessage, Logger, Severity};
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing for the CLI. `level` is an `EnvFilter` directive such as
/// `warn` or `modeflag_lib=debug`.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Warning: invalid log level {:?}: {}", level, e);
        EnvFilter::new("warn")
    });

    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true),
            )
            .try_init()
    };
}

/// Writes gated messages to stderr, one line per message.
pub struct StderrLogger {
    json: bool,
    use_color: bool,
}

impl StderrLogger {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            use_color: io::stderr().is_terminal(),
        }
    }

    fn render(&self, message: &LogMessage) -> String {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if self.json {
            return json!({
                "timestamp": timestamp,
                "severity": message.severity.as_str(),
                "header": message.header,
                "subheader": message.subheader,
                "details": message.details,
            })
            .to_string();
        }
        let label = message.severity.as_str().to_uppercase();
        let label = if self.use_color {
            format!("\x1b[{}m{}\x1b[0m", color_code(message.severity), label)
        } else {
            label
        };
        format_line(&timestamp, &label, message)
    }
}

impl Logger for StderrLogger {
    fn log(&self, message: &LogMessage) {
        eprintln!("{}", self.render(message));
    }
}

fn color_code(severity: Severity) -> &'static str {
    match severity {
        Severity::Debug => "36",
        Severity::Info => "32",
        Severity::Warning => "33",
        Severity::Error => "31",
        Severity::Critical => "1;31",
    }
}

fn format_line(timestamp: &str, label: &str, message: &LogMessage) -> String {
    let mut line = format!("{} [{}] {}", timestamp, label, message.header);
    if let Some(ref sub) = message.subheader {
        line.push_str(&format!(" ({})", sub));
    }
    if !message.details.is_empty() {
        line.push_str(": ");
        line.push_str(&message.details.join(", "));
    }
    line
}
