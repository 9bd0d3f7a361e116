//! GAS (Google Apps Script) 連携
//!
//! 雑誌・懸賞・全プレの各シートは同じWebアプリから `?type=` で取り分ける。

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use gloo::timers::callback::Timeout;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestCache, RequestInit, RequestMode, Response};

use crate::error::FetchError;
use crate::utils::storage::{KeyValueStore, WebStorage};

const GAS_URL_KEY: &str = "manga_navi_gas_url";

// ============================================
// エンドポイント上書き（?gas=xxx / localStorage）
// ============================================

/// GAS URLを保存
pub fn save_gas_url(url: &str) {
    if let Err(e) = WebStorage::local().set(GAS_URL_KEY, url.trim()) {
        tracing::warn!(error = %e, "could not save gas url");
    }
}

/// 保存済みGAS URLを取得
pub fn get_gas_url() -> Option<String> {
    let url = WebStorage::local().get(GAS_URL_KEY).ok()??;
    let url = url.trim();
    if url.is_empty() { None } else { Some(url.to_string()) }
}

/// GAS URLをクリア
pub fn clear_gas_url() {
    let _ = WebStorage::local().remove(GAS_URL_KEY);
}

/// クエリ文字列から `gas` パラメータを取り出してデコード
pub fn gas_param(search: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| pair.strip_prefix("gas="))
        .and_then(|encoded| urlencoding::decode(encoded).ok())
        .map(|decoded| decoded.trim().to_string())
        .filter(|decoded| !decoded.is_empty())
}

/// URLパラメータからGAS URLを読み込む (?gas=xxx)
///
/// 見つかれば保存し、アドレスバーからパラメータを消す。
pub fn init_gas_from_url_params() -> Option<String> {
    let window = web_sys::window()?;
    let search = window.location().search().ok()?;
    let decoded = gas_param(&search)?;
    save_gas_url(&decoded);

    let pathname = window.location().pathname().ok()?;
    let hash = window.location().hash().ok().unwrap_or_default();
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&format!("{}{}", pathname, hash)));
    }
    tracing::info!("gas url loaded from query parameter");
    Some(decoded)
}

// ============================================
// キャンセル
// ============================================

/// フェッチ単位のキャンセルトークン
///
/// 完了後の `cancel()` は何もしない。キャンセル後は結果を状態に反映しない。
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
    on_cancel: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    pub fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        let callbacks: Vec<_> = self.on_cancel.borrow_mut().drain(..).collect();
        for cb in callbacks {
            cb();
        }
    }

    /// キャンセル時に呼ばれる処理を登録（既にキャンセル済みなら即実行）
    pub fn on_cancel(&self, f: impl FnOnce() + 'static) {
        if self.is_cancelled() {
            f();
        } else {
            self.on_cancel.borrow_mut().push(Box::new(f));
        }
    }
}

// ============================================
// フェッチャー
// ============================================

/// コレクションJSONの取得元
pub trait Fetcher {
    fn fetch(&self, url: &str, cancel: &CancelToken) -> LocalBoxFuture<'static, Result<Value, FetchError>>;
}

/// window.fetch によるGAS取得（キャッシュ無効・タイムアウト付き）
#[derive(Debug, Clone, Copy)]
pub struct GasFetcher {
    timeout: Duration,
}

impl GasFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Fetcher for GasFetcher {
    fn fetch(&self, url: &str, cancel: &CancelToken) -> LocalBoxFuture<'static, Result<Value, FetchError>> {
        let url = url.to_string();
        let cancel = cancel.clone();
        let timeout_ms = self.timeout.as_millis().min(u32::MAX as u128) as u32;
        Box::pin(async move { fetch_collection_json(&url, &cancel, timeout_ms).await })
    }
}

async fn fetch_collection_json(url: &str, cancel: &CancelToken, timeout_ms: u32) -> Result<Value, FetchError> {
    let controller = AbortController::new().map_err(|e| FetchError::Network(format!("{:?}", e)))?;
    let timed_out = Rc::new(Cell::new(false));

    {
        let controller = controller.clone();
        cancel.on_cancel(move || controller.abort());
    }
    // drop でタイマーも解除される
    let _timer = {
        let controller = controller.clone();
        let timed_out = timed_out.clone();
        Timeout::new(timeout_ms, move || {
            timed_out.set(true);
            controller.abort();
        })
    };

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);
    opts.set_cache(RequestCache::NoStore);
    opts.set_signal(Some(&controller.signal()));

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| FetchError::Network(format!("Request作成失敗: {:?}", e)))?;

    let window = web_sys::window().ok_or_else(|| FetchError::Network("windowがありません".to_string()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| interrupted(cancel, &timed_out, format!("fetch失敗: {:?}", e)))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| FetchError::Network("Responseへの変換失敗".to_string()))?;

    if !resp.ok() {
        return Err(FetchError::RequestFailed(resp.status()));
    }

    let json_promise = resp
        .json()
        .map_err(|e| FetchError::Network(format!("json()失敗: {:?}", e)))?;
    let json = match JsFuture::from(json_promise).await {
        Ok(json) => json,
        Err(e) => {
            if cancel.is_cancelled() || timed_out.get() {
                return Err(interrupted(cancel, &timed_out, String::new()));
            }
            // JSONでない本文は空扱い
            tracing::warn!(url, error = ?e, "response body is not json");
            return Ok(Value::Null);
        }
    };

    Ok(serde_wasm_bindgen::from_value::<Value>(json).unwrap_or(Value::Null))
}

/// 失敗理由の振り分け: 破棄 > タイムアウト > 通信エラー
fn interrupted(cancel: &CancelToken, timed_out: &Cell<bool>, message: String) -> FetchError {
    if cancel.is_cancelled() {
        FetchError::Aborted
    } else if timed_out.get() {
        FetchError::Timeout
    } else {
        FetchError::Network(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_param() {
        let encoded = "https%3A%2F%2Fscript.google.com%2Fmacros%2Fs%2Fabc%2Fexec";
        assert_eq!(
            gas_param(&format!("?gas={}", encoded)),
            Some("https://script.google.com/macros/s/abc/exec".to_string())
        );
        assert_eq!(
            gas_param(&format!("?utm=x&gas={}", encoded)),
            Some("https://script.google.com/macros/s/abc/exec".to_string())
        );
        assert_eq!(gas_param("?gas="), None);
        assert_eq!(gas_param(""), None);
        assert_eq!(gas_param("?other=1"), None);
    }

    #[test]
    fn test_cancel_token_runs_callbacks_once() {
        let token = CancelToken::new();
        let count = Rc::new(Cell::new(0));
        {
            let count = count.clone();
            token.on_cancel(move || count.set(count.get() + 1));
        }
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cancel_token_late_registration() {
        let token = CancelToken::new();
        token.cancel();
        let hit = Rc::new(Cell::new(false));
        {
            let hit = hit.clone();
            token.on_cancel(move || hit.set(true));
        }
        assert!(hit.get());
    }

    #[test]
    fn test_interrupted_precedence() {
        let token = CancelToken::new();
        let timed_out = Cell::new(true);
        assert_eq!(interrupted(&token, &timed_out, "x".into()), FetchError::Timeout);
        token.cancel();
        assert_eq!(interrupted(&token, &timed_out, "x".into()), FetchError::Aborted);
        let fresh = CancelToken::new();
        assert_eq!(
            interrupted(&fresh, &Cell::new(false), "x".into()),
            FetchError::Network("x".to_string())
        );
    }
}
