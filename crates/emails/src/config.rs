//! Client configuration for the email service
//!
//! Loaded from (in order of priority):
//! 1. `inbox.json` in the config directory (~/.config/inbox/)
//! 2. Environment variables over built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::models::DEFAULT_PAGE_SIZE;
use crate::store::{DEFAULT_REFETCH_DELAY, StoreOptions};

/// Config filename in the inbox config directory
pub const CONFIG_FILE: &str = "inbox.json";

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Settings for talking to the email service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL of the REST API; emails live under `{api_url}/emails`
    pub api_url: String,
    pub page_size: usize,
    /// Wait between a delete and the re-fetch that follows it
    pub refetch_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Vec<String>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            refetch_delay_ms: DEFAULT_REFETCH_DELAY.as_millis() as u64,
            sort_by: None,
        }
    }
}

impl ClientConfig {
    /// Load from the config file if present, otherwise from the environment
    pub fn load() -> Result<Self> {
        if config::config_exists(CONFIG_FILE) {
            let cfg: ClientConfig = config::load_json(CONFIG_FILE)?;
            return cfg.validated();
        }

        Self::from_env()
    }

    /// Load from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg: ClientConfig = config::load_json_file(path)?;
        cfg.validated()
    }

    /// Parse from a JSON string; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: ClientConfig =
            serde_json::from_str(json).context("Failed to parse client config JSON")?;
        cfg.validated()
    }

    /// Defaults overridden by `INBOX_API_URL`, `INBOX_PAGE_SIZE` and
    /// `INBOX_REFETCH_DELAY_MS`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = var("INBOX_API_URL") {
            cfg.api_url = url;
        }
        if let Some(size) = var("INBOX_PAGE_SIZE") {
            cfg.page_size = size
                .parse()
                .with_context(|| format!("INBOX_PAGE_SIZE is not a number: {}", size))?;
        }
        if let Some(delay) = var("INBOX_REFETCH_DELAY_MS") {
            cfg.refetch_delay_ms = delay
                .parse()
                .with_context(|| format!("INBOX_REFETCH_DELAY_MS is not a number: {}", delay))?;
        }

        cfg.validated()
    }

    fn validated(self) -> Result<Self> {
        Url::parse(&self.api_url)
            .with_context(|| format!("Invalid apiUrl in client config: {}", self.api_url))?;
        if self.page_size == 0 {
            anyhow::bail!("pageSize must be at least 1");
        }
        Ok(self)
    }

    /// Write this config to the config directory, returning the path
    pub fn save(&self) -> Result<PathBuf> {
        config::save_json(CONFIG_FILE, self)
    }

    /// Default config file path (~/.config/inbox/inbox.json)
    pub fn default_config_path() -> Option<PathBuf> {
        config::config_path(CONFIG_FILE)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            page_size: self.page_size,
            sort_by: self.sort_by.clone(),
            refetch_delay: Duration::from_millis(self.refetch_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "apiUrl": "https://mail.example.com/api",
            "pageSize": 25,
            "refetchDelayMs": 250,
            "sortBy": ["-date", "from"]
        }"#;

        let cfg = ClientConfig::from_json(json).unwrap();
        assert_eq!(cfg.api_url, "https://mail.example.com/api");
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.refetch_delay_ms, 250);
        assert_eq!(cfg.sort_by, Some(vec!["-date".to_string(), "from".to_string()]));
    }

    #[test]
    fn test_missing_fields_default() {
        let cfg = ClientConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.refetch_delay_ms, 1000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ClientConfig::from_json(r#"{ "apiUrl": "nowhere" }"#).is_err());
        assert!(ClientConfig::from_json(r#"{ "pageSize": 0 }"#).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = ClientConfig::from_vars(vars(&[
            ("INBOX_API_URL", "http://10.0.0.2:8080/api"),
            ("INBOX_PAGE_SIZE", "10"),
            ("INBOX_REFETCH_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, "http://10.0.0.2:8080/api");
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.refetch_delay_ms, 0);
    }

    #[test]
    fn test_env_bad_number() {
        assert!(ClientConfig::from_vars(vars(&[("INBOX_PAGE_SIZE", "ten")])).is_err());
    }

    #[test]
    fn test_store_options() {
        let cfg = ClientConfig {
            refetch_delay_ms: 1500,
            page_size: 20,
            ..Default::default()
        };
        let opts = cfg.store_options();
        assert_eq!(opts.page_size, 20);
        assert_eq!(opts.refetch_delay, Duration::from_millis(1500));
    }
}
