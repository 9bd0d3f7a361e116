//! ログ出力と時系列トレース
//!
//! tracing のイベントをブラウザコンソールへ出しつつ、直近分をリングバッファに残す。
//! バッファは localStorage に保存され、フッターからコピー・ダウンロードできる。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::{prelude::*, EnvFilter, Layer};
use tracing_web::MakeWebConsoleWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::utils::storage::{KeyValueStore, WebStorage};

const MAX_LOG_ENTRIES: usize = 1000;
const STORAGE_KEY: &str = "manga_navi_log_trace";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub category: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

pub struct LogTrace {
    logs: VecDeque<LogEntry>,
    store: Option<Rc<dyn KeyValueStore>>,
}

impl LogTrace {
    /// 保存先付き。前回までのログを読み込む
    pub fn with_store(store: Rc<dyn KeyValueStore>) -> Self {
        let logs = store
            .get(STORAGE_KEY)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str::<Vec<LogEntry>>(&json).ok())
            .map(VecDeque::from)
            .unwrap_or_default();
        Self { logs, store: Some(store) }
    }

    pub fn in_memory() -> Self {
        Self { logs: VecDeque::with_capacity(MAX_LOG_ENTRIES), store: None }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.logs.len() >= MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);
        self.save();
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn get_logs_json(&self) -> String {
        let logs: Vec<&LogEntry> = self.logs.iter().collect();
        serde_json::to_string_pretty(&logs).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn clear(&mut self) {
        self.logs.clear();
        self.save();
    }

    // ここでは tracing を呼ばない（レイヤーからの再入になる）
    fn save(&self) {
        if let Some(store) = &self.store {
            let logs: Vec<&LogEntry> = self.logs.iter().collect();
            let json = serde_json::to_string(&logs).unwrap_or_else(|_| "[]".to_string());
            let _ = store.set(STORAGE_KEY, &json);
        }
    }
}

// グローバルなログトレースインスタンス
thread_local! {
    static LOG_TRACE: RefCell<LogTrace> = RefCell::new(LogTrace::in_memory());
}

// ============================================
// tracing レイヤー
// ============================================

#[derive(Default)]
struct EntryVisitor {
    message: String,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.into());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.insert(field.name().to_string(), format!("{:?}", value).into());
        }
    }
}

fn entry_from_event(event: &Event<'_>) -> LogEntry {
    let mut visitor = EntryVisitor::default();
    event.record(&mut visitor);
    let meta = event.metadata();
    LogEntry {
        timestamp: Timestamp::now().to_string(),
        level: meta.level().as_str().to_lowercase(),
        category: meta.target().to_string(),
        message: visitor.message,
        data: (!visitor.fields.is_empty()).then_some(serde_json::Value::Object(visitor.fields)),
    }
}

/// イベントをリングバッファへ積むレイヤー
pub struct LogTraceLayer;

impl<S: Subscriber> Layer<S> for LogTraceLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let entry = entry_from_event(event);
        LOG_TRACE.with(|trace| {
            if let Ok(mut trace) = trace.try_borrow_mut() {
                trace.push(entry);
            }
        });
    }
}

/// ログ初期化（main から一度だけ）
pub fn init_logging() {
    LOG_TRACE.with(|trace| {
        *trace.borrow_mut() = LogTrace::with_store(Rc::new(WebStorage::local()));
    });

    let env_filter = EnvFilter::new("error,manga_release_navi=debug");

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false) // ブラウザごとに対応がまちまち
        .without_time() // std::time はブラウザで使えない
        .with_writer(MakeWebConsoleWriter::new().with_pretty_level())
        .with_level(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(LogTraceLayer)
        .init();

    tracing::info!("Initialized logs");
}

pub fn get_logs_json() -> String {
    LOG_TRACE.with(|trace| trace.borrow().get_logs_json())
}

pub fn clear_logs() {
    LOG_TRACE.with(|trace| trace.borrow_mut().clear());
}

pub fn download_logs() {
    let json_str = get_logs_json();
    let timestamp = Timestamp::now().to_string();
    let filename = format!("log_trace_{}.json", timestamp.replace([':', '.'], "-"));

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&JsValue::from_str(&json_str));

    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");

    if let Ok(blob) = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &options) {
        if let Ok(url) = web_sys::Url::create_object_url_with_blob(&blob) {
            if let Ok(a) = document.create_element("a") {
                let _ = a.set_attribute("href", &url);
                let _ = a.set_attribute("download", &filename);
                if let Some(element) = a.dyn_ref::<web_sys::HtmlElement>() {
                    element.click();
                }
                let _ = web_sys::Url::revoke_object_url(&url);
            }
        }
    }
}

pub async fn copy_logs_to_clipboard_async() -> Result<(), String> {
    let json_str = get_logs_json();
    let window = web_sys::window().ok_or("windowが利用できません")?;
    let promise = window.navigator().clipboard().write_text(&json_str);
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(_) => {
            tracing::info!("ログをクリップボードにコピーしました");
            Ok(())
        }
        Err(e) => {
            let error_msg = format!("クリップボードへのコピー失敗: {:?}", e);
            tracing::error!("{}", error_msg);
            Err(error_msg)
        }
    }
}
