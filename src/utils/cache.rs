//! コレクションのブラウザキャッシュ管理
//!
//! sessionStorage 優先、使えなければ localStorage。バージョン不一致・破損データは単にキャッシュ無し扱い。

use std::marker::PhantomData;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{decode_rows, Collection};
use crate::utils::storage::{FallbackStore, KeyValueStore};

const MISSING_ENDPOINT: &str = "missing_gas_url";

/// 現在時刻（UNIXミリ秒）
pub fn now_ms() -> i64 {
    Timestamp::now().as_millisecond()
}

/// 保存形式 `{ v, savedAt, data }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachePayload {
    pub v: String,
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
    pub data: Vec<Value>,
}

/// 読み出したキャッシュ
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCollection<T> {
    pub items: Vec<T>,
    pub saved_at: i64,
}

impl<T> CachedCollection<T> {
    /// TTL内か（新鮮ならフェッチを省略できる）
    ///
    /// 保存時刻が壊れている（桁あふれ・未来時刻）なら古い扱い。
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        match now_ms.checked_sub(self.saved_at) {
            Some(age) if age >= 0 => age < ttl_ms,
            _ => false,
        }
    }
}

/// `{tag}_cache_{version}_{encoded endpoint}`
///
/// エンドポイントを含めるので、GAS URLを差し替えても前のURLのデータは出ない。
pub fn make_cache_key(tag: &str, version: &str, endpoint: &str) -> String {
    let endpoint = if endpoint.trim().is_empty() { MISSING_ENDPOINT } else { endpoint.trim() };
    format!("{}_cache_{}_{}", tag, version, urlencoding::encode(endpoint))
}

/// 1コレクション分のキャッシュ
pub struct CollectionCache<T: Collection> {
    store: FallbackStore,
    key: String,
    version: String,
    _marker: PhantomData<T>,
}

impl<T: Collection> CollectionCache<T> {
    pub fn new(store: FallbackStore, version: &str, endpoint: &str) -> Self {
        Self {
            store,
            key: make_cache_key(T::TAG, version, endpoint),
            version: version.to_string(),
            _marker: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 優先順に探し、最初の正しい形式のペイロードを返す
    pub fn read(&self) -> Option<CachedCollection<T>> {
        self.store.get_all(&self.key).into_iter().find_map(|raw| {
            let payload = match serde_json::from_str::<CachePayload>(&raw) {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(key = %self.key, error = %e, "ignoring unreadable cache entry");
                    return None;
                }
            };
            if payload.v != self.version {
                tracing::debug!(key = %self.key, found = %payload.v, "ignoring cache with other version");
                return None;
            }
            Some(CachedCollection {
                items: decode_rows(Value::Array(payload.data)),
                saved_at: payload.saved_at,
            })
        })
    }

    /// 書き込み（失敗は握りつぶす）
    pub fn write(&self, items: &[T], saved_at: i64) {
        let data = match serde_json::to_value(items) {
            Ok(Value::Array(data)) => data,
            Ok(_) => return,
            Err(e) => {
                tracing::debug!(key = %self.key, error = %e, "cache serialize failed");
                return;
            }
        };
        let payload = CachePayload { v: self.version.clone(), saved_at, data };
        let json = match serde_json::to_string(&payload) {
            Ok(json) => json,
            Err(_) => return,
        };
        if let Err(e) = self.store.set(&self.key, &json) {
            tracing::debug!(key = %self.key, error = %e, "cache write skipped");
        }
    }
}
