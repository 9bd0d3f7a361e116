//! 文字列・日付の正規化ヘルパー
//!
//! スプレッドシート由来の値は型も書式もばらばらなので、表示や比較の前に必ずここを通す。

use jiff::civil::Date;
use jiff::tz::{self, TimeZone};
use jiff::Timestamp;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const WEEKDAYS_JP: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];
const ADULT_MARKERS: [&str; 4] = ["true", "1", "r18", "yes"];

/// 任意のJSON値を表示用文字列にする（null/配列/オブジェクトは空文字）
pub fn clean_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// 前後の空白を落とす
pub fn clean(s: &str) -> String {
    s.trim().to_string()
}

/// serde用: どんな型が来ても文字列として受け取る
pub fn de_clean<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().map(clean_value).unwrap_or_default())
}

/// serde用: R18フラグ
pub fn de_adult<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().map(is_adult).unwrap_or(false))
}

/// R18判定（true / 1 / "true" / "1" / "r18" / "yes"、大文字小文字無視）
pub fn is_adult(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            ADULT_MARKERS.contains(&s.as_str())
        }
        _ => false,
    }
}

/// 「、」「,」改行で分割して箇条書き用の断片にする
pub fn split_by_comma(text: &str) -> Vec<String> {
    let s = clean(text);
    if s.is_empty() {
        return Vec::new();
    }
    s.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split(['\n', '、', ','])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// "YYYY/MM/DD..." → "YYYY-MM-DD"（文字の切り出しのみ、暦の検証はしない）
pub fn normalize_date(v: &str) -> String {
    let s = clean(v);
    if s.is_empty() {
        return String::new();
    }
    s.replace('/', "-").chars().take(10).collect()
}

/// 正規化済み日付から "YYYY-MM"
pub fn month_key(ymd: &str) -> String {
    ymd.chars().take(7).collect()
}

/// "YYYY-MM" にNヶ月加算（年跨ぎを正規化）。年が読めなければそのまま返す
pub fn add_months(ym: &str, diff: i32) -> String {
    let mut parts = ym.split('-');
    let year: i32 = match parts.next().and_then(|y| y.trim().parse().ok()) {
        Some(y) => y,
        None => return ym.to_string(),
    };
    let month: i32 = parts
        .next()
        .and_then(|m| m.trim().parse().ok())
        .filter(|m| *m != 0)
        .unwrap_or(1);

    let total = year * 12 + (month - 1) + diff;
    format!("{:04}-{:02}", total.div_euclid(12), total.rem_euclid(12) + 1)
}

/// "2026-01" → "2026年1月"
pub fn format_month_jp(month_key: &str) -> String {
    let mut parts = month_key.split('-').map(|p| p.parse::<u32>().unwrap_or(0));
    match (parts.next(), parts.next()) {
        (Some(y), Some(m)) if y > 0 && m > 0 => format!("{}年{}月", y, m),
        _ => month_key.to_string(),
    }
}

/// "2026-01-05" → "2026年1月5日（月）"。日付として読めなければそのまま返す
pub fn format_date_jp(ymd: &str) -> String {
    match parse_date(ymd) {
        Some(d) => {
            let w = WEEKDAYS_JP[d.weekday().to_sunday_zero_offset() as usize];
            format!("{}年{}月{}日（{}）", d.year(), d.month(), d.day(), w)
        }
        None => ymd.to_string(),
    }
}

/// 暦として解釈できる日付のみ返す（並び替え・期限判定用）
pub fn parse_date(v: &str) -> Option<Date> {
    normalize_date(v).parse::<Date>().ok()
}

fn jst() -> TimeZone {
    TimeZone::fixed(tz::offset(9))
}

/// JSTでの今日
pub fn today_jst() -> Date {
    Timestamp::now().to_zoned(jst()).date()
}

/// JSTでの当月 "YYYY-MM"
pub fn current_month_jst() -> String {
    let today = today_jst();
    format!("{:04}-{:02}", today.year(), today.month())
}
