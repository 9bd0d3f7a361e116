//! ユーティリティモジュール

pub mod cache;
pub mod gas;
pub mod listing;
pub mod log_trace;
pub mod storage;
pub mod text;
