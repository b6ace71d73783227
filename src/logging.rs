//! Logger initialization.
//!
//! Filters are layered: a `--log` flag beats the `[logging]` table of the
//! config file, which beats `RUST_LOG`; with none of them set the level is
//! `info`. Each line carries the name of the emitting thread, so messages
//! from blur workers show up as `blur-row-3` and the like.

use std::io::Write;
use std::sync::Once;
use std::thread;

use crate::config::LogConfig;

const DEFAULT_FILTER: &str = "info";

/// Filters use the `env_logger` syntax, e.g. `"warn"` or
/// `"blur_partition::dispatch=debug"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub cli_filter: Option<String>,
    pub file_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            cli_filter: None,
            file_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn new(cli_filter: Option<String>, file: &LogConfig) -> Self {
        Self {
            cli_filter,
            file_filter: file.filter.clone(),
            ..Self::default()
        }
    }

    /// Picks the winning filter; `env` is the value of `RUST_LOG`, if any.
    pub fn resolve_filter(&self, env: Option<String>) -> String {
        [&self.cli_filter, &self.file_filter, &env]
            .into_iter()
            .flatten()
            .find(|f| !f.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&filter)
            .write_style(config.write_style)
            .format(|buf, record| {
                let current = thread::current();
                writeln!(
                    buf,
                    "[{:<5} {}] {}",
                    record.level(),
                    current.name().unwrap_or("-"),
                    record.args()
                )
            });

        // Tests may have installed a logger already.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized with filter {filter:?}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layered(cli: Option<&str>, file: Option<&str>) -> LoggingConfig {
        LoggingConfig::new(
            cli.map(String::from),
            &LogConfig {
                filter: file.map(String::from),
            },
        )
    }

    #[test]
    fn test_cli_beats_file_beats_env() {
        let env = || Some("trace".to_string());
        assert_eq!(layered(Some("warn"), Some("debug")).resolve_filter(env()), "warn");
        assert_eq!(layered(None, Some("debug")).resolve_filter(env()), "debug");
        assert_eq!(layered(None, None).resolve_filter(env()), "trace");
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(layered(None, None).resolve_filter(None), "info");
        assert_eq!(layered(None, None).resolve_filter(Some("  ".into())), "info");
        assert_eq!(layered(Some(""), Some("debug")).resolve_filter(None), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging(layered(Some("warn"), None));
        init_logging(LoggingConfig::default());
        log::warn!("still works after a second init");
    }
}
