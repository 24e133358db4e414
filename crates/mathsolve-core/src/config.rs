use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MATHSOLVE_CONFIG";
/// Read from the working directory when `MATHSOLVE_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "mathsolve.toml";

const HOST_ENV: &str = "MATHSOLVE_HOST";
const PORT_ENV: &str = "MATHSOLVE_PORT";
const DEBUG_ENV: &str = "MATHSOLVE_DEBUG";

/// Where the HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Turns on debug-level logging.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            debug: false,
        }
    }
}

/// Limits and defaults for the problem dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Longest `expression` accepted, in characters.
    pub max_expression_len: usize,
    /// Number of points sampled for graphing requests.
    pub plot_samples: usize,
    /// Variable used for differentiation and integration.
    pub calculus_variable: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_expression_len: 2000,
            plot_samples: 201,
            calculus_variable: "x".into(),
        }
    }
}

/// Application configuration wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub solver: SolverConfig,
}

impl Config {
    /// Parse configuration from TOML. Missing tables and keys keep their
    /// defaults.
    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        toml::from_str(src).map_err(ConfigError::from)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&src)
    }

    /// Load from `MATHSOLVE_CONFIG`, else `mathsolve.toml` when present,
    /// else defaults; then apply the `MATHSOLVE_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV).map(PathBuf::from).or_else(|| {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.exists().then_some(fallback)
        });
        let mut cfg = match path {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Override server settings from `lookup`, which maps an environment
    /// variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid(PORT_ENV, &port))?;
        }
        if let Some(debug) = lookup(DEBUG_ENV) {
            self.server.debug =
                parse_flag(&debug).ok_or_else(|| ConfigError::invalid(DEBUG_ENV, &debug))?;
        }
        Ok(())
    }

    /// `host:port` as accepted by `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidOverride { key: String, value: String },
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        ConfigError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parse_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhost='0.0.0.0'\nport=8080\ndebug=true\n[solver]\nplot_samples=41"
        )
        .unwrap();
        let cfg = Config::from_path(file.path()).unwrap();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8080");
        assert!(cfg.server.debug);
        assert_eq!(cfg.solver.plot_samples, 41);
        assert_eq!(cfg.solver.max_expression_len, 2000);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.listen_addr(), "127.0.0.1:5000");
        assert_eq!(cfg.solver.calculus_variable, "x");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml("[server]\nport='many'").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn environment_overrides_server_settings() {
        let mut cfg = Config::default();
        cfg.apply_overrides(env(&[
            ("MATHSOLVE_HOST", "0.0.0.0"),
            ("MATHSOLVE_PORT", "9000"),
            ("MATHSOLVE_DEBUG", "yes"),
        ]))
        .unwrap();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:9000");
        assert!(cfg.server.debug);
    }

    #[test]
    fn rejects_invalid_overrides() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(env(&[("MATHSOLVE_PORT", "http")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid value \"http\" for MATHSOLVE_PORT");
        let err = cfg
            .apply_overrides(env(&[("MATHSOLVE_DEBUG", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { .. }));
    }
}
