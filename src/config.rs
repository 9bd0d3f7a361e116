//! アプリ設定
//!
//! 起動時に一度だけ組み立てて検証し、コンテキスト経由で各フックへ渡す。

use std::time::Duration;

use crate::error::ConfigError;
use crate::utils::gas;

pub const DEFAULT_CACHE_VERSION: &str = "v2";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// ビルド時に埋め込まれたGAS URL（build.rs 参照）
pub fn build_time_gas_url() -> Option<String> {
    option_env!("MANGA_NAVI_GAS_URL")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub gas_url: Option<String>,
    pub cache_version: String,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gas_url: build_time_gas_url(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// ブラウザ上の設定を解決する
    ///
    /// 優先順: `?gas=` パラメータ > 保存済みURL > ビルド時の既定値
    pub fn resolve() -> Self {
        let from_params = gas::init_gas_from_url_params();
        let saved = from_params.or_else(gas::get_gas_url);
        let config = match saved {
            Some(url) => Self::default().with_gas_url(url),
            None => Self::default(),
        };
        tracing::info!(
            gas_url = config.gas_url.as_deref().unwrap_or("(未設定)"),
            version = %config.cache_version,
            "config resolved"
        );
        config
    }

    pub fn with_gas_url(mut self, url: impl Into<String>) -> Self {
        self.gas_url = Some(url.into());
        self
    }

    pub fn without_gas_url(mut self) -> Self {
        self.gas_url = None;
        self
    }

    /// GAS URLを検証してエンドポイントを返す
    pub fn validate(&self) -> Result<GasEndpoint, ConfigError> {
        let url = self.gas_url.as_deref().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidEndpoint(url.to_string()));
        }
        Ok(GasEndpoint(url.to_string()))
    }
}

/// 検証済みのGAS WebアプリURL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEndpoint(String);

impl GasEndpoint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `{base}?type={tag}`
    pub fn collection_url(&self, tag: &str) -> String {
        let sep = if self.0.contains('?') { '&' } else { '?' };
        format!("{}{}type={}", self.0, sep, urlencoding::encode(tag))
    }
}
