//! Platform paths for the recipe client.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/recipe-client/       # Config directory
//! └── config.toml                # Client configuration
//!
//! ~/.local/share/recipe-client/  # Data directory
//! └── storage.toml               # Persisted key-value entries (search history)
//! ```

use recipe_core::error::{RecipeError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "recipe-client";

pub struct RecipePaths;

impl RecipePaths {
    /// Returns the client configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| RecipeError::config("Cannot find config directory"))
    }

    /// Returns the client data directory.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| RecipeError::config("Cannot find data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn storage_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("storage.toml"))
    }
}
