use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::{ProgressConfig, WorkflowOptions};
use url::Url;

pub const SETTINGS_FILE: &str = "cvassess.toml";
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub progress_interval_ms: u64,
    pub results_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            progress_interval_ms: 500,
            results_delay_ms: 1_000,
        }
    }
}

impl Settings {
    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            progress: ProgressConfig {
                interval: Duration::from_millis(self.progress_interval_ms.max(1)),
                ..ProgressConfig::default()
            },
            results_delay: Duration::from_millis(self.results_delay_ms),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(Path::new(SETTINGS_FILE)) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(table) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unreadable settings file");
        return;
    };
    let file_cfg: HashMap<String, String> = table
        .into_iter()
        .filter_map(|(key, value)| match value {
            toml::Value::String(text) => Some((key, text)),
            toml::Value::Integer(number) => Some((key, number.to_string())),
            _ => None,
        })
        .collect();
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("progress_interval_ms").and_then(|v| v.parse().ok()) {
        settings.progress_interval_ms = v;
    }
    if let Some(v) = file_cfg.get("results_delay_ms").and_then(|v| v.parse().ok()) {
        settings.results_delay_ms = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CVASSESS_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__PROGRESS_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        settings.progress_interval_ms = v;
    }
    if let Some(v) = lookup("APP__RESULTS_DELAY_MS").and_then(|v| v.parse().ok()) {
        settings.results_delay_ms = v;
    }
}

pub fn normalize_server_url(raw_server_url: &str) -> anyhow::Result<String> {
    let raw_server_url = raw_server_url.trim();

    if raw_server_url.is_empty() {
        return Ok(DEFAULT_SERVER_URL.to_string());
    }

    let candidate = if raw_server_url.contains("://") {
        raw_server_url.to_string()
    } else {
        format!("http://{raw_server_url}")
    };

    let url = Url::parse(&candidate)
        .with_context(|| format!("invalid server url '{raw_server_url}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "unsupported scheme '{}' in server url '{raw_server_url}'",
            url.scheme()
        );
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
