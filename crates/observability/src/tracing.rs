//! Tracing/logging initialization.
//!
//! Configured through the environment:
//! - `RUST_LOG`: filter directives (default `info`)
//! - `STOREFRONT_LOG_FORMAT`: `json` (default) or `pretty`

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const FILTER_ENV: &str = "RUST_LOG";
pub const FORMAT_ENV: &str = "STOREFRONT_LOG_FORMAT";
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output for local runs.
    Pretty,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => f.write_str("json"),
            LogFormat::Pretty => f.write_str("pretty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log format '{0}' (expected 'json' or 'pretty')")]
pub struct ParseLogFormatError(String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ParseLogFormatError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl TracingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values fall back to the
    /// defaults, and so does an unrecognized format.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let filter = present(FILTER_ENV).unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = present(FORMAT_ENV)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self { filter, format }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber described by `config`.
///
/// Returns `false` when a subscriber was already installed (the call is then a
/// no-op).
pub fn init_with(config: &TracingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let installed = match config.format {
        LogFormat::Json => builder.json().with_target(false).try_init().is_ok(),
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
    };

    if installed {
        ::tracing::debug!(filter = %config.filter, format = %config.format, "tracing initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_info_json() {
        let config = TracingConfig::from_lookup(lookup(&[]));
        assert_eq!(config, TracingConfig::default());
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn reads_filter_and_format() {
        let config = TracingConfig::from_lookup(lookup(&[
            (FILTER_ENV, "storefront_infra=debug"),
            (FORMAT_ENV, " Pretty "),
        ]));
        assert_eq!(config.filter, "storefront_infra=debug");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn blank_or_unknown_values_fall_back() {
        let config = TracingConfig::from_lookup(lookup(&[(FILTER_ENV, "  "), (FORMAT_ENV, "xml")]));
        assert_eq!(config, TracingConfig::default());
    }

    #[test]
    fn unknown_format_names_the_input() {
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown log format 'xml' (expected 'json' or 'pretty')"
        );
    }

    #[test]
    fn second_init_is_a_no_op() {
        let config = TracingConfig::default();
        init_with(&config);
        assert!(!init_with(&config));
    }
}
