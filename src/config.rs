use serde::Deserialize;
use std::path::PathBuf;

use crate::encoder::UnknownLevelPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub model_path: PathBuf,
    /// How the encoder treats categorical values absent from the lookup
    /// tables. Defaults to the original pipeline's silent zero-fill.
    #[serde(skip)]
    pub unknown_level_policy: UnknownLevelPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "model/forest.json".to_string())
                .into(),
            unknown_level_policy: std::env::var("UNKNOWN_LEVEL_POLICY")
                .map(|raw| {
                    UnknownLevelPolicy::parse(&raw).ok_or_else(|| {
                        anyhow::anyhow!(
                            "UNKNOWN_LEVEL_POLICY must be 'zero-fill' or 'strict', got '{}'",
                            raw
                        )
                    })
                })
                .unwrap_or(Ok(UnknownLevelPolicy::default()))?,
        };

        // Log successful configuration load
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Model path: {}", config.model_path.display());
        tracing::debug!("Unknown level policy: {:?}", config.unknown_level_policy);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
