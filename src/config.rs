use std::{fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;

/// 設定読み込みのエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// サーバーの設定
///
/// すべて環境変数から読み込み、未設定の項目は既定値を使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// DATABASE_URL
    pub database_url: String,
    /// PORT
    pub port: u16,
    /// DATABASE_MAX_CONNECTIONS
    pub max_connections: u32,
    /// NOTIFICATION_INTERVAL_SECS（0で通知ジョブを無効化）
    pub notification_interval: Option<Duration>,
    /// REBUILD_READ_MODELS（起動時にイベントログからRead Modelを再構築する）
    pub rebuild_read_models: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let notification_secs: u64 =
            try_load(&lookup, "NOTIFICATION_INTERVAL_SECS", "86400")?;

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/library".to_string()),
            port: try_load(&lookup, "PORT", "3000")?,
            max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
            notification_interval: (notification_secs > 0)
                .then(|| Duration::from_secs(notification_secs)),
            rebuild_read_models: try_load(&lookup, "REBUILD_READ_MODELS", "false")?,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
