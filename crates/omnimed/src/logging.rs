use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::OmnimedError;

/// Installs the global tracing subscriber and bridges `log` records into it.
///
/// `RUST_LOG` takes priority over `config.filter`. Returns `Ok(false)` when a
/// global subscriber was already installed (e.g. by the embedding service).
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, OmnimedError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| OmnimedError::Logging(format!("invalid filter '{}': {}", config.filter, e)))?,
    };

    let json_layer = config.json.then(|| fmt::layer().json().with_target(true));
    let plain_layer = (!config.json).then(|| fmt::layer().with_target(true));

    let subscriber = Registry::default()
        .with(filter)
        .with(json_layer)
        .with(plain_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return Ok(false);
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("log bridge already installed: {}", e);
    }

    tracing::debug!(filter = %config.filter, json = config.json, "Tracing initialized");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_second_init_reports_already_installed() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig::default();

        // First call may find a subscriber from another test already set
        let _ = init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }

    #[test]
    #[serial]
    fn test_invalid_filter_is_rejected() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            filter: "omnimed=loudest".to_string(),
            json: false,
        };
        assert!(matches!(
            init_tracing(&config),
            Err(OmnimedError::Logging(_))
        ));
    }
}
