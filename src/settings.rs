use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::RwLock;

use crate::models::{AppConfig, PersistedAppConfig};

pub struct SettingsManager {
    path: PathBuf,
    data: RwLock<PersistedAppConfig>,
}

impl SettingsManager {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let initial = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => {
                serde_json::from_slice::<PersistedAppConfig>(&bytes).unwrap_or_else(|e| {
                    tracing::warn!("配置文件解析失败，使用默认配置: {}", e);
                    PersistedAppConfig::default()
                })
            }
            _ => {
                let default = PersistedAppConfig::default();
                let json = serde_json::to_string_pretty(&default)?;
                tokio::fs::write(&path, json).await?;
                default
            }
        };

        Ok(Self {
            path,
            data: RwLock::new(initial),
        })
    }

    pub async fn get(&self) -> PersistedAppConfig {
        self.data.read().await.clone()
    }

    pub async fn update(&self, update: AppConfig) -> Result<PersistedAppConfig> {
        let mut config = self.data.write().await;

        if let Some(url) = update.base_url {
            config.base_url = url;
        }
        if let Some(location) = update.location {
            config.location = location;
        }
        if let Some(secs) = update.weather_poll_secs {
            config.weather_poll_secs = secs;
        }
        if let Some(secs) = update.market_poll_secs {
            config.market_poll_secs = secs;
        }
        if let Some(secs) = update.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(ms) = update.chat_reply_delay_ms {
            config.chat_reply_delay_ms = ms;
        }
        if let Some(secs) = update.listening_indicator_secs {
            config.listening_indicator_secs = secs;
        }
        if let Some(locale) = update.recognition_locale {
            config.recognition_locale = locale;
        }
        if let Some(voice) = update.voice {
            config.voice = voice;
        }

        self.save(&config).await?;
        Ok(config.clone())
    }

    async fn save(&self, config: &PersistedAppConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
