//! Leptos フック
//!
//! `store` のリソースをシグナルに載せ替えるだけの薄い層。

pub mod use_applied_prizes;
pub mod use_collection;

use std::rc::Rc;

use crate::config::AppConfig;
use crate::utils::gas::{Fetcher, GasFetcher};
use crate::utils::storage::{FallbackStore, KeyValueStore, WebStorage};

pub use use_applied_prizes::{use_applied_prizes, AppliedPrizesHandle};
pub use use_collection::{use_magazines, use_prizes, use_services, CollectionHandle};

/// データ層の依存一式（App でコンテキストとして提供）
#[derive(Clone)]
pub struct DataContext {
    pub config: AppConfig,
    /// コレクションキャッシュ（session → local）
    pub store: FallbackStore,
    /// 応募済みフラグ（local のみ）
    pub preferences: Rc<dyn KeyValueStore>,
    pub fetcher: Rc<dyn Fetcher>,
}

impl DataContext {
    pub fn browser(config: AppConfig) -> Self {
        let fetcher = Rc::new(GasFetcher::new(config.request_timeout));
        Self {
            config,
            store: FallbackStore::browser(),
            preferences: Rc::new(WebStorage::local()),
            fetcher,
        }
    }
}
