//! キー・バリューストレージ
//!
//! sessionStorage / localStorage を同じ抽象で扱い、優先順に試す。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ============================================
// Web Storage
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Session,
    Local,
}

/// window.sessionStorage / window.localStorage
#[derive(Debug, Clone, Copy)]
pub struct WebStorage {
    kind: StorageKind,
}

impl WebStorage {
    pub fn session() -> Self {
        Self { kind: StorageKind::Session }
    }

    pub fn local() -> Self {
        Self { kind: StorageKind::Local }
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match self.kind {
            StorageKind::Session => window.session_storage(),
            StorageKind::Local => window.local_storage(),
        };
        storage
            .map_err(|e| StorageError::Access(format!("{:?}", e)))?
            .ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Access(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // 容量超過(QuotaExceededError)もここでErrになる
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Access(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Access(format!("{:?}", e)))
    }
}

// ============================================
// メモリ（テスト・ストレージ無効環境用）
// ============================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全操作が失敗するストア（プライベートモード等の再現）
    pub fn unavailable() -> Self {
        Self { entries: RefCell::default(), unavailable: true }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// ============================================
// 優先順フォールバック
// ============================================

/// 先頭から順に試すストア列
#[derive(Clone)]
pub struct FallbackStore {
    stores: Vec<Rc<dyn KeyValueStore>>,
}

impl FallbackStore {
    pub fn new(stores: Vec<Rc<dyn KeyValueStore>>) -> Self {
        Self { stores }
    }

    /// session → local の順
    pub fn browser() -> Self {
        Self::new(vec![Rc::new(WebStorage::session()), Rc::new(WebStorage::local())])
    }

    /// 見つかった値を優先順にすべて返す（読めないストアは飛ばす）
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.stores
            .iter()
            .filter_map(|store| match store.get(key) {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!(key, error = %e, "storage read skipped");
                    None
                }
            })
            .collect()
    }
}

impl KeyValueStore for FallbackStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_all(key).into_iter().next())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut last_err = StorageError::Unavailable;
        for store in &self.stores {
            match store.set(key, value) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(key, error = %e, "storage write failed; trying next");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut result = Ok(());
        for store in &self.stores {
            if let Err(e) = store.remove(key) {
                result = Err(e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_fallback_write_goes_to_first_available() {
        let primary = Rc::new(MemoryStore::new());
        let secondary = Rc::new(MemoryStore::new());
        let store = FallbackStore::new(vec![primary.clone(), secondary.clone()]);
        store.set("k", "v").unwrap();
        assert_eq!(primary.len(), 1);
        assert!(secondary.is_empty());
    }

    #[test]
    fn test_fallback_when_primary_unavailable() {
        let secondary = Rc::new(MemoryStore::new());
        let store = FallbackStore::new(vec![Rc::new(MemoryStore::unavailable()), secondary.clone()]);
        store.set("k", "v").unwrap();
        assert_eq!(secondary.get("k").unwrap(), Some("v".to_string()));
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_fallback_read_order() {
        let primary = Rc::new(MemoryStore::new());
        let secondary = Rc::new(MemoryStore::new());
        primary.set("k", "session").unwrap();
        secondary.set("k", "local").unwrap();
        let store = FallbackStore::new(vec![primary, secondary]);
        assert_eq!(store.get_all("k"), vec!["session".to_string(), "local".to_string()]);
        assert_eq!(store.get("k").unwrap(), Some("session".to_string()));
    }

    #[test]
    fn test_all_unavailable() {
        let store = FallbackStore::new(vec![
            Rc::new(MemoryStore::unavailable()),
            Rc::new(MemoryStore::unavailable()),
        ]);
        assert!(store.set("k", "v").is_err());
        assert_eq!(store.get("k").unwrap(), None);
    }
}
