//! In-process key-value backend
//!
//! Used by tests and by callers that want a conversation log without an
//! external server. Clones share the same map.

use crate::StoreError;
use intake_domain::traits::KeyValueStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Slot {
    Text(String),
    // Stands in for bytes or a key type the backend cannot hand back as text
    Unreadable,
}

/// `KeyValueStore` over a shared `HashMap`
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, Slot>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryBackend {
    /// Create an empty, reachable backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose every operation fails, health check included
    pub fn unreachable() -> Self {
        let backend = Self::default();
        backend.set_failing(true);
        backend
    }

    /// Toggle failure of every operation
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Store a raw value, bypassing any encoding
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), Slot::Text(value.to_string()));
    }

    /// Store a value that `get` cannot decode, until the next `set`
    pub fn insert_unreadable(&self, key: &str) {
        self.lock().insert(key.to_string(), Slot::Unreadable);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no key is stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        // A poisoned map is still structurally valid
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory backend set to fail".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryBackend {
    type Error = StoreError;

    fn ping(&self) -> Result<(), Self::Error> {
        self.check()
    }

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        self.check()?;
        match self.lock().get(key) {
            Some(Slot::Text(value)) => Ok(Some(value.clone())),
            Some(Slot::Unreadable) => Err(StoreError::CorruptValue(format!(
                "{}: value is not UTF-8 text",
                key
            ))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.check()?;
        self.lock().insert(key.to_string(), Slot::Text(value.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let backend = MemoryBackend::new();
        assert!(backend.ping().is_ok());
        assert_eq!(backend.get("k").unwrap(), None);

        backend.set("k", "v1").unwrap();
        backend.set("k", "v2").unwrap();
        assert_eq!(backend.get("k").unwrap(), Some("v2".to_string()));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let a = MemoryBackend::new();
        let b = a.clone();
        a.set("shared", "yes").unwrap();
        assert_eq!(b.get("shared").unwrap(), Some("yes".to_string()));
    }

    #[test]
    fn test_unreadable_value() {
        let backend = MemoryBackend::new();
        backend.insert_unreadable("k");

        let err = backend.get("k").unwrap_err();
        assert!(err.is_corrupt_value());

        backend.set("k", "[]").unwrap();
        assert_eq!(backend.get("k").unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_unreachable() {
        let backend = MemoryBackend::unreachable();
        assert!(matches!(backend.ping(), Err(StoreError::Unavailable(_))));
        assert!(backend.get("k").is_err());
        assert!(backend.set("k", "v").is_err());
        assert!(backend.is_empty());
    }
}
