//! Tracing subscriber initialization.

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "RECON_LOG_FORMAT";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl LogFormat {
    /// Case-insensitive; `None` for anything other than `json` or `pretty`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

/// Initialize tracing/logging for the process with an explicit format.
///
/// Filtering comes from `RUST_LOG` (default `info`). Logs go to stderr so
/// stdout stays free for command output. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse(" pretty "), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("xml"), None);
        assert_eq!(LogFormat::default(), LogFormat::Json);

        for format in [LogFormat::Json, LogFormat::Pretty] {
            assert_eq!(LogFormat::parse(format.as_str()), Some(format));
        }
    }

    #[test]
    fn init_is_idempotent() {
        init_with(LogFormat::Json);
        init_with(LogFormat::Pretty);
    }
}
