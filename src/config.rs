use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;
use toml;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not open file: {file}. Reason: {source}")]
    Open { file: String, source: io::Error },
    #[error("Could not read the config file: {file}. Reason: {source}")]
    Read { file: String, source: io::Error },
    #[error("Unable to load config: {file}. Reason: {source}")]
    Parse {
        file: String,
        source: toml::de::Error,
    },
    #[error("Invalid config: {file}. Reason: {reason}")]
    Invalid { file: String, reason: String },
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        toml::ser::to_string_pretty(self)
            .map_err(|_| fmt::Error)
            .and_then(|value| write!(f, "{}", value))
    }
}

pub fn default_host() -> String {
    String::from("127.0.0.1")
}

pub fn default_port() -> u16 {
    5001
}

pub fn default_workers() -> usize {
    num_cpus::get()
}

pub fn default_max_body_bytes() -> usize {
    256 * 1024
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    // Host address to listen on
    #[serde(default = "default_host")]
    pub host: String,
    // Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    // Number of threadpool workers
    #[serde(default = "default_workers")]
    pub workers: usize,
    // Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err(String::from("server.workers must be at least 1"));
        }
        if self.max_body_bytes == 0 {
            return Err(String::from("server.max_body_bytes must be at least 1"));
        }
        Ok(())
    }
}

pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let mut file_str = String::new();
    let file_path = Path::new(config_path);
    let mut open_file = File::open(file_path).map_err(|source| ConfigError::Open {
        file: config_path.to_owned(),
        source,
    })?;
    open_file
        .read_to_string(&mut file_str)
        .map_err(|source| ConfigError::Read {
            file: config_path.to_owned(),
            source,
        })?;
    parse_config(config_path, &file_str)
}

fn parse_config(config_path: &str, contents: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        file: config_path.to_owned(),
        source,
    })?;
    config
        .server
        .validate()
        .map_err(|reason| ConfigError::Invalid {
            file: config_path.to_owned(),
            reason,
        })?;
    Ok(config)
}

/// Resolves the configuration to run with.
///
/// An explicitly requested file must load. Without one, `config.toml` is used
/// when it exists and the built-in defaults otherwise.
pub fn resolve_config(config_path: Option<&str>) -> Result<Config, ConfigError> {
    match config_path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_config(DEFAULT_CONFIG_FILE),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("empty.toml", "").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.max_body_bytes, 262_144);
        assert!(config.server.workers >= 1);
    }

    #[test]
    fn server_section_overrides_defaults() {
        let config = parse_config(
            "custom.toml",
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            workers = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.server.workers, 2);
        assert_eq!(config.server.max_body_bytes, default_max_body_bytes());
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let err = parse_config("broken.toml", "[server\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn wrongly_typed_port_is_rejected() {
        let err = parse_config("typed.toml", "[server]\nport = \"five\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = parse_config("workers.toml", "[server]\nworkers = 0").unwrap_err();
        match err {
            ConfigError::Invalid { ref file, ref reason } => {
                assert_eq!(file, "workers.toml");
                assert!(reason.contains("workers"));
            }
            ref other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn zero_body_limit_is_rejected() {
        let err = parse_config("limit.toml", "[server]\nmax_body_bytes = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("max_body_bytes"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = resolve_config(Some("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Open { .. }));
        assert!(err.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn display_renders_toml() {
        let rendered = Config::default().to_string();
        assert!(rendered.contains("[server]"));
        assert!(rendered.contains("port = 5001"));
    }
}
