use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::ClientConfig;

/// Overrides the config directory outright
pub const CONFIG_DIR_ENV: &str = "DEVTRACKR_CONFIG_DIR";
/// Overrides `[api].base_url`
pub const BASE_URL_ENV: &str = "DEVTRACKR_API_BASE_URL";

const CONFIG_FILE: &str = "config.toml";

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not parse {path}: {source}")]
    EditError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("unknown config key: {0} (expected api.base_url, api.timeout_secs or ui.show_key_hints)")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Resolved client settings: where state lives plus the effective config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub config: ClientConfig,
}

impl Settings {
    /// Load settings from the environment and config.toml, applying the
    /// base URL precedence: flag > env > file > default.
    pub fn load(api_url_flag: Option<&str>) -> Result<Settings, ConfigError> {
        let config_dir = config_dir();
        let (mut config, _doc) = read_config(&config_dir)?;
        config.api.base_url = resolve_base_url(
            api_url_flag,
            std::env::var(BASE_URL_ENV).ok().as_deref(),
            &config,
        );
        Ok(Settings { config_dir, config })
    }

    pub fn log_path(&self) -> PathBuf {
        self.config_dir.join("devtrackr.log")
    }
}

/// The config directory, respecting DEVTRACKR_CONFIG_DIR and XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    config_dir_from(|name| std::env::var(name).ok())
}

fn config_dir_from(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = var(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let base = var("XDG_CONFIG_HOME")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/"))
                .join(".config")
        });
    base.join("devtrackr")
}

/// Pick the effective base URL. Empty values are ignored; the result never
/// ends in `/`.
pub fn resolve_base_url(flag: Option<&str>, env: Option<&str>, config: &ClientConfig) -> String {
    let chosen = [flag, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(config.api.base_url.trim());
    chosen.trim_end_matches('/').to_string()
}

/// Read config.toml, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing. A missing file yields
/// defaults and an empty document.
pub fn read_config(
    config_dir: &Path,
) -> Result<(ClientConfig, toml_edit::DocumentMut), ConfigError> {
    let path = config_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok((ClientConfig::default(), toml_edit::DocumentMut::new()));
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: ClientConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    let doc: toml_edit::DocumentMut = text
        .parse()
        .map_err(|e| ConfigError::EditError { path, source: e })?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(config_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_dir.join(CONFIG_FILE);
    fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    fs::write(&path, doc.to_string()).map_err(|e| ConfigError::WriteError { path, source: e })
}

/// Set a dotted key (`api.base_url`, `api.timeout_secs`, `ui.show_key_hints`)
/// in the config document, validating the value for its type.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    let (table, field, item) = match key {
        "api.base_url" => {
            let url = value.trim().trim_end_matches('/');
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid());
            }
            ("api", "base_url", toml_edit::value(url))
        }
        "api.timeout_secs" => {
            let secs: i64 = value.trim().parse().map_err(|_| invalid())?;
            if secs <= 0 {
                return Err(invalid());
            }
            ("api", "timeout_secs", toml_edit::value(secs))
        }
        "ui.show_key_hints" => {
            let flag: bool = value.trim().parse().map_err(|_| invalid())?;
            ("ui", "show_key_hints", toml_edit::value(flag))
        }
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    };

    if !doc.contains_key(table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[table][field] = item;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# DevTrackr client settings
[api]
base_url = "https://goals.example.com"  # production
timeout_secs = 10
"#
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(doc.to_string().is_empty());
    }

    #[test]
    fn test_round_trip_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), sample_config()).unwrap();

        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.api.base_url, "https://goals.example.com");
        write_config(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(tmp.path().join("config.toml")).unwrap();
        assert_eq!(written, sample_config());
    }

    #[test]
    fn test_malformed_file_names_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[api\nbase_url = 3").unwrap();
        let err = read_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_set_value_preserves_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "api.base_url", "http://127.0.0.1:9000/").unwrap();
        let result = doc.to_string();
        assert!(result.contains("# DevTrackr client settings"));
        assert!(result.contains("base_url = \"http://127.0.0.1:9000\""));

        let config: ClientConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_set_value_creates_table() {
        let mut doc = toml_edit::DocumentMut::new();
        set_value(&mut doc, "ui.show_key_hints", "false").unwrap();
        let config: ClientConfig = toml::from_str(&doc.to_string()).unwrap();
        assert!(!config.ui.show_key_hints);
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut doc = toml_edit::DocumentMut::new();
        assert!(matches!(
            set_value(&mut doc, "api.colour", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            set_value(&mut doc, "api.timeout_secs", "-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "api.base_url", "localhost:8000"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_base_url_precedence() {
        let mut config = ClientConfig::default();
        config.api.base_url = "http://from-file/".into();

        assert_eq!(
            resolve_base_url(Some("http://flag/"), Some("http://env"), &config),
            "http://flag"
        );
        assert_eq!(resolve_base_url(None, Some("http://env"), &config), "http://env");
        assert_eq!(resolve_base_url(Some(""), Some(" "), &config), "http://from-file");
        assert_eq!(
            resolve_base_url(None, None, &ClientConfig::default()),
            "http://localhost:8000"
        );
    }

    #[test]
    fn test_config_dir_resolution() {
        let dir = config_dir_from(|name| match name {
            CONFIG_DIR_ENV => Some("/tmp/dt".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/tmp/dt"));

        let dir = config_dir_from(|name| match name {
            "XDG_CONFIG_HOME" => Some("/xdg".into()),
            "HOME" => Some("/home/ada".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/xdg/devtrackr"));

        let dir = config_dir_from(|name| match name {
            "HOME" => Some("/home/ada".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/home/ada/.config/devtrackr"));
    }
}
