//! Runtime configuration
//!
//! API keys and endpoints are resolved once at startup into a `ChronosConfig`
//! that is handed to each client. Values come from the process environment,
//! optionally augmented by a `.env` file.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::constants;

/// Configuration errors that stop the program before any work is done
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is missing or empty
    #[error("{var} not found. Please create a .env file with {var}=your_key_here")]
    MissingVar { var: &'static str },

    /// An explicitly requested env file could not be read
    #[error("failed to read env file {}: {message}", path.display())]
    EnvFile { path: PathBuf, message: String },
}

/// Resolved configuration for one run
#[derive(Clone)]
pub struct ChronosConfig {
    /// Gemini API key (required)
    pub gemini_api_key: String,
    /// Custom Search API key (search fails without it)
    pub google_api_key: Option<String>,
    /// Custom Search engine identifier (search fails without it)
    pub google_cx_id: Option<String>,
    /// Gemini model name, with or without the `models/` prefix
    pub model: String,
    /// Gemini API host
    pub gemini_base_url: String,
    /// Custom Search endpoint
    pub search_url: String,
    /// Total timeout for one search request
    pub search_timeout: Duration,
}

impl fmt::Debug for ChronosConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChronosConfig")
            .field("gemini_api_key", &"<redacted>")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field("google_cx_id", &self.google_cx_id)
            .field("model", &self.model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("search_url", &self.search_url)
            .field("search_timeout", &self.search_timeout)
            .finish()
    }
}

impl ChronosConfig {
    /// Load configuration, reading `env_file` if given or `./.env` otherwise
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        match env_file {
            Some(path) => Self::from_env_file(path),
            None => Self::from_env(),
        }
    }

    /// Load from the process environment plus an optional `./.env`
    ///
    /// Variables already set in the environment win over `.env` entries.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenv::dotenv() {
            Ok(path) => debug!("Loaded environment from {:?}", path),
            Err(_) => debug!("No .env file found, using process environment"),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from a specific env file; its entries win over the process environment
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        // dotenv 0.15 marks the iterator deprecated; it is the only API that
        // reads a file without mutating the process environment
        #[allow(deprecated)]
        let iter = dotenv::from_path_iter(path).map_err(|e| ConfigError::EnvFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::EnvFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            values.insert(key, value);
        }
        info!("Loaded {} entries from {:?}", values.len(), path);

        Self::from_lookup(|key| values.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty or whitespace-only values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_api_key = get(constants::env::GEMINI_API_KEY).ok_or(ConfigError::MissingVar {
            var: constants::env::GEMINI_API_KEY,
        })?;

        Ok(Self {
            gemini_api_key,
            google_api_key: get(constants::env::GOOGLE_API_KEY),
            google_cx_id: get(constants::env::GOOGLE_CX_ID),
            model: get(constants::env::GEMINI_MODEL)
                .unwrap_or_else(|| constants::ai::DEFAULT_MODEL.to_string()),
            gemini_base_url: constants::ai::GEMINI_BASE_URL.to_string(),
            search_url: constants::search::CUSTOM_SEARCH_URL.to_string(),
            search_timeout: constants::http::SEARCH_TIMEOUT,
        })
    }

    /// Builder: override the Gemini model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: override the Gemini API host
    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into();
        self
    }

    /// Builder: override the Custom Search endpoint
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Builder: override the search request timeout
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// Whether both search credentials are present
    pub fn has_search_credentials(&self) -> bool {
        self.google_api_key.is_some() && self.google_cx_id.is_some()
    }
}
