//! Connection Cache
//!
//! A keyed store of opaque values living exactly as long as its connection.
//! No TTL, no eviction. The lock is never held across an await.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ConnectionCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value under `key`, if present and of type `T`
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key)?.downcast_ref::<T>().cloned()
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set<T>(&self, key: &str, value: T)
    where
        T: Send + Sync + 'static,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), Arc::new(value));
    }

    /// Store `value` unless a `T` is already cached, returning the cached one.
    ///
    /// Concurrent builders race on this; whichever writes first wins and the
    /// others adopt its value.
    pub fn set_if_absent<T>(&self, key: &str, value: T) -> T
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(key).and_then(|e| e.downcast_ref::<T>()) {
            return existing.clone();
        }
        entries.insert(key.to_string(), Arc::new(value.clone()));
        value
    }

    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let cache = ConnectionCache::new();
        assert!(cache.get::<String>("missing").is_none());

        cache.set("key", "value".to_string());
        assert_eq!(cache.get::<String>("key").as_deref(), Some("value"));
        // wrong type reads as absent
        assert!(cache.get::<u32>("key").is_none());
        assert!(cache.contains("key"));
    }

    #[test]
    fn test_set_if_absent_keeps_first_writer() {
        let cache = ConnectionCache::new();
        assert_eq!(cache.set_if_absent("matrix", vec![1, 2]), vec![1, 2]);
        assert_eq!(cache.set_if_absent("matrix", vec![3]), vec![1, 2]);
        assert_eq!(cache.get::<Vec<i32>>("matrix"), Some(vec![1, 2]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_caches_are_independent() {
        let a = ConnectionCache::new();
        let b = ConnectionCache::new();
        a.set("ApigeeOrganization", 1u8);
        assert!(b.is_empty());
    }
}
