use serde::Deserialize;
use std::path::PathBuf;

pub const API_URL_ENV: &str = "MESHPORT_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub token_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_file_size: u64,  // 100MB in bytes
    pub allowed_extensions: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = Self::defaults()?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                // MESHPORT_UPLOAD__MAX_FILE_SIZE -> upload.max_file_size
                config::Environment::with_prefix("MESHPORT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("api.base_url", std::env::var(API_URL_ENV).ok())?;

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    // Builder pre-seeded with every default so that no config file is required
    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("api.base_url", DEFAULT_API_URL)?
            .set_default("api.connect_timeout_secs", 10)?
            .set_default(
                "session.token_file",
                default_token_file().to_string_lossy().into_owned(),
            )?
            .set_default("upload.max_file_size", 100 * 1024 * 1024)?
            .set_default(
                "upload.allowed_extensions",
                vec![".ply", ".las", ".laz", ".pcd", ".xyz"],
            )
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            config::ConfigError::Message(format!(
                "invalid api.base_url '{}': {}",
                self.api.base_url, e
            ))
        })?;
        Ok(())
    }

    /// Configuration pointing at `base_url` with every other value defaulted.
    pub fn with_base_url(base_url: &str, token_file: PathBuf) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.to_string(),
                connect_timeout_secs: 10,
            },
            session: SessionConfig { token_file },
            upload: UploadConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            allowed_extensions: [".ply", ".las", ".laz", ".pcd", ".xyz"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

fn default_token_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("meshport")
        .join("token")
}
