// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OcrProError, Result};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Languages requested from the recognition engine.
    pub languages: Vec<String>,
    /// Ask the engine for hardware acceleration (the engine may ignore it).
    pub use_accelerator: bool,
    /// Directory holding the recognition models; `None` uses the engine default.
    pub model_dir: Option<PathBuf>,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            languages: vec!["es".into(), "en".into()],
            use_accelerator: true,
            model_dir: None,
            log_filter: "info".into(),
        }
    }
}

impl AppConfig {
    /// Settings handed to recognition-engine initialisation.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            languages: self.languages.clone(),
            use_accelerator: self.use_accelerator,
            model_dir: self.model_dir.clone(),
        }
    }

    /// Read a JSON config file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON, replacing any existing file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(OcrProError::Config("at least one language is required".into()));
        }
        if self.languages.iter().any(|lang| lang.trim().is_empty()) {
            return Err(OcrProError::Config("language codes must not be blank".into()));
        }
        Ok(())
    }
}

/// Parameters for initialising the recognition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub languages: Vec<String>,
    pub use_accelerator: bool,
    pub model_dir: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        AppConfig::default().engine_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_request_spanish_and_english() {
        let config = AppConfig::default();
        assert_eq!(config.languages, vec!["es", "en"]);
        assert!(config.use_accelerator);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "use_accelerator": false }"#).expect("parse");
        assert!(!config.use_accelerator);
        assert_eq!(config.languages, vec!["es", "en"]);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn empty_language_list_is_rejected() {
        let config = AppConfig {
            languages: Vec::new(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(OcrProError::Config(_))));
    }

    #[test]
    fn engine_settings_mirror_config() {
        let config = AppConfig {
            use_accelerator: false,
            model_dir: Some(PathBuf::from("/models")),
            ..AppConfig::default()
        };
        let settings = config.engine_settings();
        assert!(!settings.use_accelerator);
        assert_eq!(settings.model_dir.as_deref(), Some(Path::new("/models")));
    }
}
