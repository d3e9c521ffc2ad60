use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    /// Limit on the whole request body, multipart framing included.
    pub max_upload_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./tmp"),
            max_upload_bytes: 2 * 1024 * 1024,
            allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/gif".to_string(),
                "image/png".to_string(),
                "application/pdf".to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"), Self::environment())
    }

    /// Defaults, then `config_file` if it exists, then `environment`.
    pub fn load_from(config_file: &Path, environment: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if config_file.exists() {
            builder = builder.add_source(File::from(config_file));
        }

        let app_config: AppConfig = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// `APP_` variables, `__` between nested keys, e.g. `APP_SERVER__PORT`.
    pub fn environment() -> Environment {
        Environment::with_prefix("APP")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("uploads.allowed_content_types")
            .try_parsing(true)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.uploads.max_upload_bytes == 0 {
            return Err(ConfigError::Message(
                "Max upload size must be greater than 0".to_string(),
            ));
        }

        if self.uploads.allowed_content_types.is_empty() {
            return Err(ConfigError::Message(
                "At least one content type must be allowed".to_string(),
            ));
        }

        if self.uploads.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "Upload directory cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn create_directories(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.uploads.upload_dir)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
