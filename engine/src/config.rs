use serde::Deserialize;
use std::{env, fs, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

use userdash_client::DEFAULT_BASE_URL;
use userdash_types::ui::UiOptions;

/// Overrides `backend.base_url` when set and non-empty.
pub const BACKEND_URL_ENV: &str = "USERDASH_BACKEND_URL";

/// Dashboard configuration, read from `~/.userdash/config.toml`.
///
/// ```toml
/// [backend]
/// base_url = "http://localhost:3000"
/// request_timeout_secs = 10
///
/// [app]
/// ascii_only = false
/// high_contrast = false
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct DashConfig {
    pub backend: Option<BackendConfig>,
    pub app: Option<AppConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BackendConfig {
    /// Base URL the `/api/...` paths are joined onto. `${VAR}` references are expanded.
    pub base_url: Option<String>,
    /// Per-request timeout. Absent means requests never time out.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for icons and the spinner.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

impl DashConfig {
    /// Load the config file. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Backend base URL: environment override, then config, then the default.
    #[must_use]
    pub fn backend_url(&self) -> String {
        resolve_backend_url(
            env::var(BACKEND_URL_ENV).ok(),
            self.backend.as_ref().and_then(|b| b.base_url.as_deref()),
        )
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend
            .as_ref()
            .and_then(|b| b.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
            })
            .unwrap_or_default()
    }
}

fn resolve_backend_url(env_value: Option<String>, configured: Option<&str>) -> String {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return value.trim().to_string();
    }
    configured
        .map(expand_env_vars)
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| DEFAULT_BASE_URL.to_string(), |v| v.trim().to_string())
}

/// Expand `${VAR}` references; unset variables expand to nothing.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".userdash").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = DashConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn parses_backend_and_app_sections() {
        let file = write_config(
            r#"
            [backend]
            base_url = "http://dash.internal:8080"
            request_timeout_secs = 5

            [app]
            ascii_only = true
            "#,
        );
        let config = DashConfig::load_from(file.path()).unwrap().unwrap();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(
            config.ui_options(),
            UiOptions {
                ascii_only: true,
                high_contrast: false
            }
        );
        assert_eq!(
            resolve_backend_url(None, config.backend.as_ref().and_then(|b| b.base_url.as_deref())),
            "http://dash.internal:8080"
        );
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let file = write_config("[backend\nbase_url = 1");
        let err = DashConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), &file.path().to_path_buf());
    }

    #[test]
    fn defaults_without_config() {
        let config = DashConfig::default();
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.ui_options(), UiOptions::default());
        assert_eq!(resolve_backend_url(None, None), DEFAULT_BASE_URL);
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let config = DashConfig {
            backend: Some(BackendConfig {
                base_url: None,
                request_timeout_secs: Some(0),
            }),
            app: None,
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn env_override_wins_over_config() {
        assert_eq!(
            resolve_backend_url(
                Some("http://override:1".to_string()),
                Some("http://configured:2")
            ),
            "http://override:1"
        );
        assert_eq!(
            resolve_backend_url(Some("   ".to_string()), Some("http://configured:2")),
            "http://configured:2"
        );
    }

    #[test]
    fn expand_env_vars_substitutes_and_drops_missing() {
        unsafe {
            std::env::set_var("USERDASH_TEST_HOST", "dash.local");
            std::env::remove_var("USERDASH_TEST_MISSING");
        }
        assert_eq!(
            expand_env_vars("http://${USERDASH_TEST_HOST}:3000"),
            "http://dash.local:3000"
        );
        assert_eq!(expand_env_vars("a${USERDASH_TEST_MISSING}b"), "ab");
        assert_eq!(expand_env_vars("no vars"), "no vars");
        assert_eq!(expand_env_vars("open ${brace"), "open ${brace");
        unsafe {
            std::env::remove_var("USERDASH_TEST_HOST");
        }
    }
}
