use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dealscope_core::{TimeFilter, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 300;

const CONFIG_DIR_ENV: &str = "DEALSCOPE_CONFIG_DIR";
const API_URL_ENV: &str = "DEALSCOPE_API_URL";
const TIMEOUT_ENV: &str = "DEALSCOPE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub default_filter: TimeFilter,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            default_filter: TimeFilter::Week,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `$DEALSCOPE_CONFIG_DIR`, else `<config dir>/dealscope`.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    Ok(dirs::config_dir()
        .context("Could not find config directory")?
        .join("dealscope"))
}

impl Settings {
    fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Priority: environment > config.toml > defaults.
    pub fn load() -> Self {
        let mut settings = Self::config_path()
            .ok()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|content| Self::parse(&content))
            .unwrap_or_default();
        settings.apply_env();
        settings
    }

    fn parse(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("ignoring invalid config.toml: {}", e);
                Self::default()
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!("ignoring non-numeric {}={}", TIMEOUT_ENV, raw),
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    struct EnvGuard(Vec<(&'static str, Option<std::ffi::OsString>)>);

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let saved = vars
                .iter()
                .map(|(k, v)| {
                    let old = std::env::var_os(k);
                    std::env::set_var(k, v);
                    (*k, old)
                })
                .collect();
            Self(saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (k, old) in &self.0 {
                match old {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let settings = Settings::parse("default_filter = \"month\"\n");
        assert_eq!(settings.default_filter, TimeFilter::Month);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_invalid_config_falls_back_to_defaults() {
        assert_eq!(Settings::parse("default_filter = \"fortnight\""), Settings::default());
        assert_eq!(Settings::parse("not toml at all ["), Settings::default());
    }

    #[test]
    fn test_request_timeout_is_clamped() {
        let mut settings = Settings::default();
        settings.request_timeout_secs = 0;
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
        settings.request_timeout_secs = 10_000;
        assert_eq!(settings.request_timeout(), Duration::from_secs(300));
        settings.request_timeout_secs = 45;
        assert_eq!(settings.request_timeout(), Duration::from_secs(45));
    }

    #[test]
    #[serial]
    fn test_load_reads_config_file_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "api_url = \"https://staging.example.com\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();
        let dir = tmp.path().to_string_lossy().to_string();
        let _env = EnvGuard::set(&[(CONFIG_DIR_ENV, dir.as_str()), (API_URL_ENV, ""), (TIMEOUT_ENV, "")]);

        let settings = Settings::load();
        assert_eq!(settings.api_url, "https://staging.example.com");
        // empty/non-numeric env values don't override the file
        assert_eq!(settings.request_timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn test_env_overrides_config_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "api_url = \"https://file.example.com\"\n").unwrap();
        let dir = tmp.path().to_string_lossy().to_string();
        let _env = EnvGuard::set(&[
            (CONFIG_DIR_ENV, dir.as_str()),
            (API_URL_ENV, "http://localhost:4000"),
            (TIMEOUT_ENV, "12"),
        ]);

        let settings = Settings::load();
        assert_eq!(settings.api_url, "http://localhost:4000");
        assert_eq!(settings.request_timeout_secs, 12);
    }
}
