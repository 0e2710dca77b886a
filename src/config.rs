//! Configuration management for the obesity level predictor

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Configuration file read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

/// Location of the training artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the artifact files
    pub dir: String,
    /// ONNX export of the fitted classifier
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// Name reported for the model in logs
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// JSON export of the fitted scaler
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// JSON array of training column names
    #[serde(default = "default_columns_file")]
    pub columns_file: String,
    /// JSON object mapping class id to label
    #[serde(default = "default_labels_file")]
    pub labels_file: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_file() -> String {
    "obesity_model.onnx".to_string()
}

fn default_model_name() -> String {
    "obesity_model".to_string()
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_columns_file() -> String {
    "columns.json".to_string()
}

fn default_labels_file() -> String {
    "target_mapping.json".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path, with `OBESITY__SECTION__KEY`
    /// environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("OBESITY").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8501,
            },
            artifacts: ArtifactsConfig {
                dir: "artifacts".to_string(),
                model_file: default_model_file(),
                model_name: default_model_name(),
                scaler_file: default_scaler_file(),
                columns_file: default_columns_file(),
                labels_file: default_labels_file(),
                onnx_threads: default_onnx_threads(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.artifacts.model_file, "obesity_model.onnx");
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "0.0.0.0:8501".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_load_with_defaults_for_optional_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 9000

[artifacts]
dir = "/srv/artifacts"
scaler_file = "std_scaler.json"

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.artifacts.dir, "/srv/artifacts");
        assert_eq!(config.artifacts.scaler_file, "std_scaler.json");
        assert_eq!(config.artifacts.columns_file, "columns.json");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_shipped_config_loads() {
        // Tests run from the package root, where the shipped config lives
        let config = AppConfig::load().unwrap();
        assert_eq!(config.artifacts.dir, "artifacts");

        let dir = Path::new(&config.artifacts.dir);
        assert!(dir.join(&config.artifacts.columns_file).is_file());
        assert!(dir.join(&config.artifacts.labels_file).is_file());
        assert!(dir.join("README.md").is_file());
    }

    #[test]
    fn test_invalid_address() {
        let server = ServerConfig {
            host: "not an address".to_string(),
            port: 80,
        };
        assert!(server.socket_addr().is_err());
    }
}
