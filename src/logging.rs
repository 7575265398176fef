//! Structured logging with `tracing`.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `PSEARCH_LOG` (an `EnvFilter` directive) overrides `[logging] level`.

use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "PSEARCH_LOG";

/// Install the global subscriber. Safe to call more than once; later
/// calls leave the first subscriber in place.
pub fn init_logging(level: &str) -> Result<()> {
    validate_level(level)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();

    Ok(())
}

fn validate_level(level: &str) -> Result<()> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
        other => bail!(
            "Invalid log level: {}. Use trace, debug, info, warn, error, or off",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_level() {
        assert!(validate_level("debug").is_ok());
        assert!(validate_level("WARN").is_ok());
        assert!(validate_level("loud").is_err());
    }

    #[test]
    fn test_init_twice() {
        init_logging("warn").unwrap();
        init_logging("debug").unwrap();
    }
}
