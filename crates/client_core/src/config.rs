use std::{collections::HashMap, env, fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::protocol::DEFAULT_API_BASE;
use url::Url;

pub const SETTINGS_FILE: &str = "userdesk.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE))
}

/// Defaults, then `path` if it exists, then `API_BASE`, then `APP__API_BASE`.
pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        if let Some(v) = file_cfg.get("api_base") {
            settings.api_base = v.clone();
        }
    }

    if let Ok(v) = env::var("API_BASE") {
        settings.api_base = v;
    }
    if let Ok(v) = env::var("APP__API_BASE") {
        settings.api_base = v;
    }

    settings.api_base = normalize_api_base(&settings.api_base)?;
    Ok(settings)
}

pub fn normalize_api_base(raw_api_base: &str) -> anyhow::Result<String> {
    let api_base = raw_api_base.trim().trim_end_matches('/');

    if api_base.is_empty() {
        return Ok(Settings::default().api_base);
    }

    let parsed =
        Url::parse(api_base).with_context(|| format!("invalid api base url '{api_base}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "invalid api base url '{api_base}': unsupported scheme '{}'",
            parsed.scheme()
        );
    }

    Ok(api_base.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
