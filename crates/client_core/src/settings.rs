use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{default_catalog, Course};
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "classroom.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base: String,
    pub request_timeout: Option<Duration>,
    pub courses: Vec<Course>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:5000/api".into(),
            request_timeout: None,
            courses: default_catalog(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base: Option<String>,
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    courses: Vec<Course>,
}

impl Settings {
    pub fn api_base_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.api_base.trim())
            .with_context(|| format!("invalid api base url '{}'", self.api_base))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api base url must be http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }
}

/// Settings file at `path`, then `CLASSROOM_API_BASE` and `APP__*` from the
/// process environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = load_settings_from(path);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Reads the settings file over the defaults. A missing file is not an error;
/// an unreadable one is logged and ignored.
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    let Ok(raw) = fs::read_to_string(path) else {
        return settings;
    };

    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.api_base {
                settings.api_base = v;
            }
            if let Some(secs) = file_cfg.request_timeout_secs.filter(|secs| *secs > 0) {
                settings.request_timeout = Some(Duration::from_secs(secs));
            }
            if !file_cfg.courses.is_empty() {
                settings.courses = file_cfg.courses;
            }
        }
        Err(err) => {
            warn!(path = %path.display(), "settings: ignoring unparsable file: {err}");
        }
    }

    settings
}

pub fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("CLASSROOM_API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(0) => settings.request_timeout = None,
            Ok(secs) => settings.request_timeout = Some(Duration::from_secs(secs)),
            Err(_) => warn!(value = %v, "settings: APP__REQUEST_TIMEOUT_SECS is not a number"),
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
