//! The raw key/value map behind a [`Configuration`](crate::Configuration).

use dashmap::DashMap;
use std::collections::BTreeMap;

/// Concurrent map from property key to raw (unresolved) value.
///
/// Each read and each write is atomic on its own. Nothing groups several writes together:
/// a reader running alongside a multi-key update can see some keys updated and others not.
#[derive(Debug, Default)]
pub struct PropertyStore {
    map: DashMap<String, String>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for `key`, cloned out so no shard lock outlives the call.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.map.get(key).map(|v| v.value().clone())
    }

    /// Insert or overwrite, returning the previous raw value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.map.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Point-in-time copy of every entry, sorted by key. Writers are not blocked beyond
    /// the shard currently being read.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_overwrites() {
        let store = PropertyStore::new();
        assert_eq!(store.insert("keel.master.rpc.port", "19998"), None);
        assert_eq!(
            store.insert("keel.master.rpc.port", "20000"),
            Some("19998".to_string())
        );
        assert_eq!(store.get_raw("keel.master.rpc.port").as_deref(), Some("20000"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = PropertyStore::new();
        store.insert("b", "2");
        store.insert("a", "1");
        let snap = store.snapshot();
        store.insert("c", "3");

        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(PropertyStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..100 {
                        store.insert(format!("k{}", i), format!("{}", t));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.len(), 100);
        for i in 0..100 {
            let v: u32 = store.get_raw(&format!("k{}", i)).unwrap().parse().unwrap();
            assert!(v < 8);
        }
    }
}
