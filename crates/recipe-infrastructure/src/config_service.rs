//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `config.toml` in the platform config
//! directory, then applies environment overrides.

use recipe_core::config::ClientConfig;
use recipe_core::error::{RecipeError, Result};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::paths::RecipePaths;
use crate::storage::AtomicTomlFile;

/// Overrides `api_base_url`.
pub const ENV_API_URL: &str = "RECIPE_API_URL";
/// Overrides `request_timeout_secs`.
pub const ENV_TIMEOUT_SECS: &str = "RECIPE_TIMEOUT_SECS";

/// Loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Service reading the platform default `config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(RecipePaths::config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Returns the configuration, loading it on first access.
    ///
    /// A missing file yields the defaults. Environment overrides are applied
    /// on top and the result is validated.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = self.load(|name| std::env::var(name).ok())?;

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    /// Writes `config` to the file and replaces the cached copy.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        config.validate()?;
        AtomicTomlFile::new(self.path.clone()).save(config)?;
        tracing::info!("[ConfigService] Saved configuration to {}", self.path.display());

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(config.clone());
        Ok(())
    }

    fn load<F>(&self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = AtomicTomlFile::<ClientConfig>::new(self.path.clone());
        let mut config = match file.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.path.display()
                );
                ClientConfig::default()
            }
            Err(e) => {
                return Err(RecipeError::config(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        apply_env_overrides(&mut config, env)?;
        config.validate()?;
        Ok(config)
    }
}

/// Applies `RECIPE_API_URL` and `RECIPE_TIMEOUT_SECS` as resolved by `env`.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_API_URL).filter(|url| !url.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(raw) = env(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = raw.trim().parse().map_err(|_| {
            RecipeError::config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
        })?;
    }
    Ok(())
}
