use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::Error;

const DEFAULT_CONFIG_NAME: &str = "wwx-robot.toml";

/// Base URL of the public WeCom API.
pub const DEFAULT_ENDPOINT: &str = "https://qyapi.weixin.qq.com";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Profile used when no `--robot` is given
    pub default_robot: Option<String>,
    #[serde(default)]
    pub robots: HashMap<String, RobotProfile>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RobotProfile {
    pub key: Option<String>,
    pub proxy: Option<String>,
    pub endpoint: Option<String>,
}

/// Everything a [`crate::Robot`] needs, fixed for the lifetime of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotSettings {
    pub key: String,
    pub proxy: Option<String>,
    pub endpoint: String,
}

impl RobotSettings {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            proxy: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub robot: Option<String>,
    pub key: Option<String>,
    pub proxy: Option<String>,
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration from an explicit path, or search upward from current dir
    /// and then the user config directory. Finding no file at all is not an error.
    pub fn load(path_override: Option<PathBuf>) -> Result<Option<Self>> {
        let path = match path_override {
            Some(p) => p,
            None => match find_upwards(DEFAULT_CONFIG_NAME).or_else(user_config_file) {
                Some(p) => p,
                None => return Ok(None),
            },
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Parsing TOML config {}", path.display()))?;
        tracing::debug!(path = %path.display(), robots = cfg.robots.len(), "loaded config");
        Ok(Some(cfg))
    }

    pub fn robot(&self, name: &str) -> crate::Result<&RobotProfile> {
        self.robots
            .get(name)
            .ok_or_else(|| Error::Config(format!("Robot '{}' not found in config", name)))
    }
}

/// Merge command-line overrides with the selected profile.
pub fn resolve_settings(config: Option<&Config>, overrides: Overrides) -> crate::Result<RobotSettings> {
    let selected = overrides
        .robot
        .clone()
        .or_else(|| config.and_then(|c| c.default_robot.clone()));

    let profile = match (&selected, config) {
        (Some(name), Some(cfg)) => cfg.robot(name)?.clone(),
        (Some(name), None) => {
            return Err(Error::Config(format!(
                "Robot '{}' requested but no {} was found",
                name, DEFAULT_CONFIG_NAME
            )))
        }
        (None, _) => RobotProfile::default(),
    };

    let key = overrides
        .key
        .or(profile.key)
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| Error::Config("robot key is required (-k or config)".to_string()))?;

    Ok(RobotSettings {
        key,
        proxy: overrides.proxy.or(profile.proxy),
        endpoint: overrides
            .endpoint
            .or(profile.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
    })
}

fn find_upwards(file_name: &str) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(file_name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn user_config_file() -> Option<PathBuf> {
    let candidate = dirs::config_dir()?.join("wwx-robot").join("config.toml");
    candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(toml: &str) -> Config {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        Config::load(Some(file.path().to_path_buf())).unwrap().unwrap()
    }

    #[test]
    fn load_config_success() {
        let cfg = load_str(
            r#"default_robot = "ops"

[robots.ops]
key = "ops-key"
proxy = "http://127.0.0.1:3128"

[robots.dev]
key = "dev-key"
endpoint = "http://localhost:8080"
"#,
        );
        assert_eq!(cfg.default_robot.as_deref(), Some("ops"));
        let ops = cfg.robot("ops").unwrap();
        assert_eq!(ops.key.as_deref(), Some("ops-key"));
        assert_eq!(ops.proxy.as_deref(), Some("http://127.0.0.1:3128"));
        assert!(ops.endpoint.is_none());
    }

    #[test]
    fn missing_robot_errors() {
        let cfg = load_str("[robots.dev]\nkey = \"k\"\n");
        assert_matches!(cfg.robot("does_not_exist"), Err(Error::Config(_)));
    }

    #[test]
    fn explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn default_robot_fills_settings() {
        let cfg = load_str(
            "default_robot = \"ops\"\n[robots.ops]\nkey = \"ops-key\"\nendpoint = \"http://127.0.0.1:9\"\n",
        );
        let settings = resolve_settings(Some(&cfg), Overrides::default()).unwrap();
        assert_eq!(
            settings,
            RobotSettings::new("ops-key").with_endpoint("http://127.0.0.1:9")
        );
    }

    #[test]
    fn command_line_overrides_profile() {
        let cfg = load_str("[robots.ops]\nkey = \"ops-key\"\nproxy = \"http://p:1\"\n");
        let overrides = Overrides {
            robot: Some("ops".into()),
            key: Some("cli-key".into()),
            ..Default::default()
        };
        let settings = resolve_settings(Some(&cfg), overrides).unwrap();
        assert_eq!(settings.key, "cli-key");
        assert_eq!(settings.proxy.as_deref(), Some("http://p:1"));
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn key_is_required() {
        assert_matches!(
            resolve_settings(None, Overrides::default()),
            Err(Error::Config(ref m)) if m.contains("key is required")
        );
        let overrides = Overrides {
            key: Some("  ".into()),
            ..Default::default()
        };
        assert_matches!(resolve_settings(None, overrides), Err(Error::Config(_)));
    }

    #[test]
    fn named_robot_without_config_errors() {
        let overrides = Overrides {
            robot: Some("ops".into()),
            key: Some("k".into()),
            ..Default::default()
        };
        assert_matches!(resolve_settings(None, overrides), Err(Error::Config(_)));
    }
}
