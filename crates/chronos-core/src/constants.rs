//! Application constants and configuration defaults
//!
//! Centralized location for endpoints, timeouts and environment variable names

use std::time::Duration;

/// HTTP client configuration
pub mod http {
    use super::*;

    /// Connection timeout for HTTP requests
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Total timeout for a context search request
    pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

    /// User agent sent with every request
    pub const USER_AGENT: &str = "Chronos/0.1";
}

/// Gemini configuration
pub mod ai {
    /// Default model ID
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    /// Gemini REST API host
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

    /// Gemini REST API version segment
    pub const API_VERSION: &str = "v1beta";
}

/// Context search configuration
pub mod search {
    /// Google Custom Search JSON API endpoint
    pub const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

    /// Number of results requested and kept
    pub const RESULT_COUNT: usize = 5;
}

/// Environment variable names
pub mod env {
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const GOOGLE_CX_ID: &str = "GOOGLE_CX_ID";
}

/// Local directories
pub mod layout {
    /// Config directory name
    pub const CONFIG_DIR_NAME: &str = ".chronos";

    /// Logs subdirectory name
    pub const LOGS_DIR_NAME: &str = "logs";
}
