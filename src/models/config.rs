use serde::{Deserialize, Serialize};

use crate::models::ui_state::DEFAULT_SEED_QUERY;

/// Default catalog endpoint (Google Books v1)
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1/";

/// Application configuration from `Bookfinder Config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bounded per-request timeout applied by the HTTP client
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Forwarded as `maxResults` when set
    #[serde(default)]
    pub max_results: Option<u32>,

    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_results: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_seed_query")]
    pub seed_query: String,

    /// Delay before a search hits the network. 0 issues one request per edit.
    #[serde(default)]
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            seed_query: default_seed_query(),
            debounce_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_directory")]
    pub directory: String,

    #[serde(default = "default_log_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub debug: bool,

    /// Write the log file as JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,

    /// Mirror log output to stderr
    #[serde(default)]
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            prefix: default_log_prefix(),
            debug: false,
            json: false,
            console: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_seed_query() -> String {
    DEFAULT_SEED_QUERY.to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "bookfinder".to_string()
}
