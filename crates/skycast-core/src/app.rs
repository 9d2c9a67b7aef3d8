use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::config::ValidationResult;
use crate::Config;

/// Application configuration and lifecycle
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Load and validate configuration, from `config_path` or the default location
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config, validation) = Config::load_validated(config_path)?;
        Ok(Self::with_config(config, &validation))
    }

    /// Build an application around an already-loaded configuration
    fn with_config(config: Config, validation: &ValidationResult) -> Self {
        tracing::info!(
            default_city = %config.weather.default_city,
            warnings = validation.warnings.len(),
            "Application configured"
        );
        Self {
            config: Arc::new(config),
        }
    }

    /// Shared handle to the application config
    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down SkyCast");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let app = App::new(Some(&path)).unwrap();
        assert_eq!(app.config().weather.default_city, "Bangalore");
        assert!(path.exists());
    }
}
