use std::time::Duration;
use thiserror::Error;

/// 予約の有効期間（秒）のデフォルト値
pub const DEFAULT_RESERVATION_TTL_SECS: u64 = 5;

/// 予約の有効期間を指定する環境変数
pub const RESERVATION_TTL_ENV: &str = "RESERVATION_TTL_SECS";

/// 設定値のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// 貸出エンジンの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingConfig {
    /// 予約が受け取られないまま取り消されるまでの時間
    pub reservation_ttl: Duration,
}

impl LendingConfig {
    pub fn new(reservation_ttl: Duration) -> Self {
        Self { reservation_ttl }
    }

    /// 環境変数から設定を読み込む
    ///
    /// 未設定の項目はデフォルト値を使用する。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// 任意の値取得関数から設定を読み込む
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reservation_ttl = match lookup(RESERVATION_TTL_ENV) {
            None => Duration::from_secs(DEFAULT_RESERVATION_TTL_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: RESERVATION_TTL_ENV,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self { reservation_ttl })
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_RESERVATION_TTL_SECS))
    }
}
