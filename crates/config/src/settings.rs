//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model paths
    #[serde(default)]
    pub models: ModelPaths,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_models()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.host".to_string(),
                message: "Host cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Missing model artifacts are fatal only in strict environments; in
    /// development the engine falls back to the public baseline.
    fn validate_models(&self) -> Result<(), ConfigError> {
        if self.models.stt_fallback_repo.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "models.stt_fallback_repo".to_string(),
                message: "Fallback model identifier cannot be empty".to_string(),
            });
        }

        if self.models.stt_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "models.stt_dir".to_string(),
                message: "Model directory cannot be empty".to_string(),
            });
        }

        let model_dir = std::path::Path::new(&self.models.stt_dir);
        if !model_dir.exists() {
            if self.environment.is_strict() {
                return Err(ConfigError::InvalidValue {
                    field: "models.stt_dir".to_string(),
                    message: format!("model directory not found: {}", self.models.stt_dir),
                });
            }
            tracing::warn!(
                path = %self.models.stt_dir,
                "fine-tuned model directory not found, the engine will fall back to the baseline model"
            );
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (empty = allow all)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5005
}
fn default_true() -> bool {
    true
}
fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPaths {
    /// Directory holding the fine-tuned STT artifacts (model.onnx + vocab.json)
    #[serde(default = "default_stt_dir")]
    pub stt_dir: String,

    /// Public baseline model identifier used when the fine-tuned model
    /// cannot be loaded
    #[serde(default = "default_stt_fallback_repo")]
    pub stt_fallback_repo: String,

    /// ffmpeg binary used for audio normalization
    #[serde(default = "default_ffmpeg_program")]
    pub ffmpeg_program: String,
}

fn default_stt_dir() -> String {
    "models/stt/fine_tuned".to_string()
}
fn default_stt_fallback_repo() -> String {
    "facebook/wav2vec2-base-960h".to_string()
}
fn default_ffmpeg_program() -> String {
    "ffmpeg".to_string()
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            stt_dir: default_stt_dir(),
            stt_fallback_repo: default_stt_fallback_repo(),
            ffmpeg_program: default_ffmpeg_program(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (VAANI prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VAANI")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 5005);
        assert_eq!(settings.models.stt_fallback_repo, "facebook/wav2vec2-base-960h");
        assert_eq!(settings.models.ffmpeg_program, "ffmpeg");
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();

        settings.server.port = 0;
        assert!(settings.validate().is_err());
        settings.server.port = 5005;

        settings.server.host = String::new();
        assert!(settings.validate().is_err());
        settings.server.host = "127.0.0.1".to_string();

        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_model_validation() {
        let mut settings = Settings::default();

        settings.models.stt_fallback_repo = String::new();
        assert!(settings.validate().is_err());
        settings.models.stt_fallback_repo = default_stt_fallback_repo();

        // Missing model dir is tolerated in development (fallback path)
        settings.models.stt_dir = "does/not/exist".to_string();
        assert!(settings.validate().is_ok());

        // ...but fatal in production
        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate().is_err());
    }
}
