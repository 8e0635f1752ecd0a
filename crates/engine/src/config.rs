use recon_core::{DomainError, DomainResult};
use recon_observability::LogFormat;
use recon_tax::JurisdictionCode;

pub const HOME_JURISDICTION_ENV: &str = "RECON_HOME_JURISDICTION";
pub const LOW_STOCK_ALERTS_ENV: &str = "RECON_LOW_STOCK_ALERTS";
pub const LOG_FORMAT_ENV: &str = recon_observability::tracing::LOG_FORMAT_ENV;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Origin used when a transaction's route does not name one.
    pub home_jurisdiction: Option<JurisdictionCode>,
    /// Report low-stock warnings on invoice lines.
    pub low_stock_alerts: bool,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            home_jurisdiction: None,
            low_stock_alerts: true,
            log_format: LogFormat::Json,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> DomainResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let defaults = Self::default();

        let home_jurisdiction = match lookup(HOME_JURISDICTION_ENV) {
            Some(raw) if !raw.trim().is_empty() => Some(
                JurisdictionCode::new(&raw)
                    .map_err(|_| invalid(HOME_JURISDICTION_ENV, &raw))?,
            ),
            _ => defaults.home_jurisdiction,
        };

        let low_stock_alerts = match lookup(LOW_STOCK_ALERTS_ENV) {
            Some(raw) => raw
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|_| invalid(LOW_STOCK_ALERTS_ENV, &raw))?,
            None => defaults.low_stock_alerts,
        };

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => LogFormat::parse(&raw).ok_or_else(|| invalid(LOG_FORMAT_ENV, &raw))?,
            None => defaults.log_format,
        };

        Ok(Self {
            home_jurisdiction,
            low_stock_alerts,
            log_format,
        })
    }
}

fn invalid(key: &str, raw: &str) -> DomainError {
    DomainError::validation(format!("invalid {key}: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> DomainResult<EngineConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(load(&[]).unwrap(), EngineConfig::default());
    }

    #[test]
    fn all_variables_are_read() {
        let config = load(&[
            (HOME_JURISDICTION_ENV, " KA "),
            (LOW_STOCK_ALERTS_ENV, "FALSE"),
            (LOG_FORMAT_ENV, "pretty"),
        ])
        .unwrap();

        assert_eq!(config.home_jurisdiction, Some(JurisdictionCode::new("KA").unwrap()));
        assert!(!config.low_stock_alerts);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn invalid_values_are_validation_errors() {
        for vars in [
            [(LOW_STOCK_ALERTS_ENV, "sometimes")],
            [(LOG_FORMAT_ENV, "xml")],
        ] {
            assert!(matches!(load(&vars), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn blank_home_jurisdiction_is_unset() {
        let config = load(&[(HOME_JURISDICTION_ENV, "   ")]).unwrap();
        assert!(config.home_jurisdiction.is_none());
    }
}
