//! Tracing setup shared by the server and CLI binaries.
//!
//! Every binary logs to stderr so stdout stays clean for piped output. The
//! format and level come from CLI flags or from `OMNIPOST_LOG_FORMAT` and
//! `OMNIPOST_LOG_LEVEL` when no flags are given.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text, suitable for piping
    Text,
    /// One JSON object per line, for log shippers
    Json,
    /// Colored multi-line output for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        f.write_str(name)
    }
}

pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Build a configuration from `OMNIPOST_LOG_FORMAT` and
    /// `OMNIPOST_LOG_LEVEL`, defaulting to text at info level.
    pub fn from_env() -> Self {
        let format = std::env::var("OMNIPOST_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);
        let level = std::env::var("OMNIPOST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        Self::new(format, level, false)
    }

    /// Install the global subscriber. Call once per process.
    ///
    /// # Panics
    ///
    /// Panics if a subscriber is already installed.
    pub fn init(&self) {
        let default_level = if self.verbose {
            "debug"
        } else {
            self.level.as_str()
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        match self.format {
            LogFormat::Json => builder
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .flatten_event(true)
                .with_file(true)
                .with_line_number(true)
                .init(),
            LogFormat::Pretty => builder
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .init(),
            LogFormat::Text => builder.with_target(false).init(),
        }
    }
}

/// Initialize logging from the environment.
pub fn init_default() {
    LoggingConfig::from_env().init();
}
