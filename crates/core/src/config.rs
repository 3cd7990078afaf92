use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HtsError, Result};

pub const DEFAULT_API_ENDPOINT: &str = "https://api.honeycomb.io";
pub const DEFAULT_UI_ENDPOINT: &str = "https://ui.honeycomb.io";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub api_endpoint: String,
    pub ui_endpoint: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    api_endpoint: Option<String>,
    ui_endpoint: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::resolve(&config_file_path(), |key| env::var(key).ok())
    }

    fn resolve(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut cfg = Self {
            api_key: String::new(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            ui_endpoint: DEFAULT_UI_ENDPOINT.to_string(),
        };
        if let Some(file_overrides) = load_file_overrides(path)? {
            apply_overrides(&mut cfg, file_overrides);
        }
        apply_overrides(
            &mut cfg,
            ConfigOverrides {
                api_endpoint: lookup("HONEYCOMB_API_ENDPOINT"),
                ui_endpoint: lookup("HONEYCOMB_UI_ENDPOINT"),
            },
        );

        cfg.api_key = lookup("HONEYCOMB_API_KEY").ok_or_else(|| {
            HtsError::Config("HONEYCOMB_API_KEY environment variable is not set".to_string())
        })?;
        Ok(cfg)
    }
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("HTS_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("honeycomb-trace-spans/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| HtsError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| HtsError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides) {
    if let Some(v) = overrides.api_endpoint {
        cfg.api_endpoint = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = overrides.ui_endpoint {
        cfg.ui_endpoint = v.trim_end_matches('/').to_string();
    }
}
