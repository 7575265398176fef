use anyhow::{Context, Result};
use product_search_core::service::{DEFAULT_FIELDS, DEFAULT_PAGE_SIZE};
use product_search_core::SearchOptions;
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides `backend.password`.
pub const PASSWORD_ENV: &str = "PSEARCH_ES_PASSWORD";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// `memory` or `elasticsearch`.
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Accept self-signed certificates (local test clusters).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            url: None,
            username: None,
            password: None,
            accept_invalid_certs: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_kind() -> String {
    "memory".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index: default_index(),
            fields: default_fields(),
            page_size: default_page_size(),
        }
    }
}

fn default_index() -> String {
    "products".to_string()
}
fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

impl Config {
    /// In-memory backend with default search settings.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn is_elasticsearch(&self) -> bool {
        self.backend.kind == "elasticsearch"
    }

    /// Service options derived from the `[search]` table.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::new(self.search.index.clone())
            .with_fields(self.search.fields.iter().cloned())
            .with_page_size(self.search.page_size)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;

    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        config.backend.password = Some(password);
    }

    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    match config.backend.kind.as_str() {
        "memory" | "elasticsearch" => {}
        other => anyhow::bail!(
            "Unknown backend kind: '{}'. Must be memory or elasticsearch.",
            other
        ),
    }

    if config.is_elasticsearch() && config.backend.url.is_none() {
        anyhow::bail!("backend.url must be set when kind is 'elasticsearch'");
    }

    if config.search.index.trim().is_empty() {
        anyhow::bail!("search.index must not be empty");
    }

    if config.search.fields.is_empty() {
        anyhow::bail!("search.fields must list at least one field");
    }

    if config.search.page_size < 1 {
        anyhow::bail!("search.page_size must be >= 1");
    }

    Ok(config)
}
