//! データ構造体モジュール
//!
//! GASが返すスプレッドシート行。列名（日本語ヘッダー）をそのままJSONキーとして受け取る。
//! どの列も欠損・型違いがあり得るので、文字列列はすべて `de_clean` で受ける。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::text::{clean, de_adult, de_clean};

// ============================================
// コレクション共通
// ============================================

/// GASから取得するコレクション（magazines / prizes / services）
pub trait Collection: Clone + PartialEq + Serialize + DeserializeOwned + 'static {
    /// `?type=` に渡す値。キャッシュキーの接頭辞にも使う
    const TAG: &'static str;
    /// 取得失敗時にユーザーへ表示するメッセージ
    const FETCH_ERROR: &'static str;
}

/// レスポンス本文を行の配列に変換する
///
/// 配列でなければ空扱い（エラーにしない）。オブジェクトでない行は個別に捨てる。
pub fn decode_rows<T: Collection>(body: Value) -> Vec<T> {
    let rows = match body {
        Value::Array(rows) => rows,
        other => {
            tracing::warn!(
                collection = T::TAG,
                kind = json_kind(&other),
                "response is not an array; treating as empty"
            );
            return Vec::new();
        }
    };

    rows.into_iter()
        .enumerate()
        .filter_map(|(idx, row)| match serde_json::from_value::<T>(row) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(collection = T::TAG, idx, error = %e, "dropping malformed row");
                None
            }
        })
        .collect()
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================
// 雑誌
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Magazine {
    #[serde(default, deserialize_with = "de_clean")]
    pub magazine_id: String,
    #[serde(rename = "発売日", default, deserialize_with = "de_clean")]
    pub release_date: String,
    #[serde(rename = "タイトル", default, deserialize_with = "de_clean")]
    pub title: String,
    /// 表示専用（数値で来ることもある）
    #[serde(rename = "値段", default, deserialize_with = "de_clean")]
    pub price: String,
    #[serde(rename = "表紙画像", default, deserialize_with = "de_clean")]
    pub cover_image_url: String,
    #[serde(rename = "AmazonURL", default, deserialize_with = "de_clean")]
    pub purchase_url: String,
    #[serde(rename = "電子版URL", default, deserialize_with = "de_clean")]
    pub ebook_url: String,
    #[serde(rename = "R18", default, deserialize_with = "de_adult")]
    pub is_adult: bool,
}

impl Collection for Magazine {
    const TAG: &'static str = "magazines";
    const FETCH_ERROR: &'static str = "データ取得に失敗しました（GAS デプロイ/権限/URL を確認）";
}

// ============================================
// 懸賞
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prize {
    #[serde(default, deserialize_with = "de_clean")]
    pub prize_id: String,
    #[serde(default, deserialize_with = "de_clean")]
    pub magazine_id: String,
    #[serde(rename = "懸賞名", default, deserialize_with = "de_clean")]
    pub name: String,
    #[serde(rename = "内容", default, deserialize_with = "de_clean")]
    pub content: String,
    #[serde(rename = "応募方法", default, deserialize_with = "de_clean")]
    pub how_to_apply: String,
    #[serde(rename = "締切", default, deserialize_with = "de_clean")]
    pub deadline: String,
    #[serde(rename = "応募URL", default, deserialize_with = "de_clean")]
    pub apply_url: String,
}

impl Prize {
    /// 応募済み管理用のキー。prize_id が無ければ「雑誌ID_並び順」
    pub fn applied_key(&self, idx: usize) -> String {
        let id = clean(&self.prize_id);
        if id.is_empty() {
            format!("{}_{}", clean(&self.magazine_id), idx)
        } else {
            id
        }
    }
}

impl Collection for Prize {
    const TAG: &'static str = "prizes";
    const FETCH_ERROR: &'static str = "懸賞データ取得に失敗しました（GAS デプロイ/権限 を確認）";
}

// ============================================
// 全員サービス
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, deserialize_with = "de_clean")]
    pub service_id: String,
    #[serde(default, deserialize_with = "de_clean")]
    pub magazine_id: String,
    #[serde(rename = "内容", default, deserialize_with = "de_clean")]
    pub content: String,
    #[serde(rename = "応募方法", default, deserialize_with = "de_clean")]
    pub how_to_apply: String,
    #[serde(rename = "締切", default, deserialize_with = "de_clean")]
    pub deadline: String,
}

impl Collection for Service {
    const TAG: &'static str = "services";
    const FETCH_ERROR: &'static str = "全プレデータ取得に失敗しました（GAS デプロイ/権限 を確認）";
}
