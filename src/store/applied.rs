//! 応募済み懸賞の記録（この端末だけのメモ）

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::utils::storage::KeyValueStore;
use crate::utils::text::clean;

pub const APPLIED_KEY: &str = "applied_prizes_v1";

#[derive(Clone)]
pub struct AppliedPrizes {
    store: Rc<dyn KeyValueStore>,
    ids: BTreeSet<String>,
    ready: bool,
}

impl AppliedPrizes {
    /// 永続化されたID配列を読み込む。壊れていれば空から始める
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let ids = match store.get(APPLIED_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
                Ok(values) => values
                    .iter()
                    .map(crate::utils::text::clean_value)
                    .filter(|id| !id.is_empty())
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "applied prize list unreadable; starting empty");
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::debug!(error = %e, "applied prize storage unavailable");
                BTreeSet::new()
            }
        };
        Self { store, ids, ready: true }
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(&clean(id))
    }

    /// 応募済み ⇔ 未応募 を切り替える。空IDは無視
    pub fn toggle(&mut self, id: &str) {
        let key = clean(id);
        if key.is_empty() {
            return;
        }
        if !self.ids.remove(&key) {
            self.ids.insert(key);
        }
        self.save();
    }

    pub fn clear_all(&mut self) {
        self.ids.clear();
        self.save();
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    // 保存失敗時もメモリ上の状態を正とする
    fn save(&self) {
        let json = match serde_json::to_string(&self.ids) {
            Ok(json) => json,
            Err(_) => return,
        };
        if let Err(e) = self.store.set(APPLIED_KEY, &json) {
            tracing::debug!(error = %e, "applied prize list not persisted");
        }
    }
}
