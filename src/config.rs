use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub models_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            models_dir: std::env::var("MODELS_DIR")
                .unwrap_or_else(|_| "models".to_string())
                .into(),
        };

        if config.models_dir.as_os_str().is_empty() {
            anyhow::bail!("MODELS_DIR cannot be empty");
        }

        tracing::debug!("Models directory: {}", config.models_dir.display());
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
