//! Configuration loading and resolution.

use std::path::PathBuf;

use latex_image::{PreferenceOverrides, DEFAULT_ENDPOINT, DEFAULT_MAX_IMAGE_BYTES};

pub const CONFIG_ENV: &str = "LATEX_IMAGE_CONFIG";
pub const ENDPOINT_ENV: &str = "LATEX_IMAGE_ENDPOINT";

/// Everything the server needs, assembled once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub config_path: PathBuf,
    pub endpoint: String,
    pub max_image_bytes: usize,
    pub overrides: PreferenceOverrides,
}

impl ServerConfig {
    /// Resolve from CLI values, then environment, then defaults.
    pub fn resolve(
        config: Option<&str>,
        endpoint: Option<&str>,
        max_image_bytes: Option<usize>,
    ) -> Self {
        Self {
            config_path: resolve_config_path(config),
            endpoint: resolve_endpoint(endpoint),
            max_image_bytes: max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
            overrides: PreferenceOverrides::from_env(),
        }
    }
}

/// Resolve the preferences file path.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    resolve_default_config_path()
}

fn resolve_default_config_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(".latex-image").join("config.json")
}

/// Resolve the rendering endpoint.
pub fn resolve_endpoint(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(ENDPOINT_ENV).ok().filter(|e| !e.is_empty()))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
        .trim_end_matches('?')
        .to_string()
}
