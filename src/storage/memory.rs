//! Volatile paste storage. Everything is lost on restart, and the purge
//! workers wipe whole namespaces on a fixed schedule.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::backend::{GuardedInsert, PasteBackend};
use super::error::StorageError;
use super::types::Namespace;

#[derive(Debug, Default)]
struct Namespaces {
    public: BTreeMap<String, String>,
    private: BTreeMap<String, String>,
    files: BTreeMap<String, String>,
}

impl Namespaces {
    fn map(&self, ns: Namespace) -> &BTreeMap<String, String> {
        match ns {
            Namespace::Public => &self.public,
            Namespace::Private => &self.private,
            Namespace::Files => &self.files,
        }
    }

    fn map_mut(&mut self, ns: Namespace) -> &mut BTreeMap<String, String> {
        match ns {
            Namespace::Public => &mut self.public,
            Namespace::Private => &mut self.private,
            Namespace::Files => &mut self.files,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: RwLock<Namespaces>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, ns: Namespace) -> usize {
        self.inner.read().map(ns).len()
    }
}

impl PasteBackend for MemoryBackend {
    fn get(&self, ns: Namespace, id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.read().map(ns).get(id).cloned())
    }

    fn put(&self, ns: Namespace, id: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .write()
            .map_mut(ns)
            .insert(id.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, ns: Namespace, id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.write().map_mut(ns).remove(id))
    }

    fn list(&self, ns: Namespace) -> Result<Vec<(String, String)>, StorageError> {
        let inner = self.inner.read();
        Ok(inner
            .map(ns)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn clear(&self, ns: Namespace) -> Result<(), StorageError> {
        self.inner.write().map_mut(ns).clear();
        Ok(())
    }

    fn insert_guarded(
        &self,
        target: Namespace,
        guard: &[Namespace],
        id: &str,
        value: &str,
    ) -> Result<GuardedInsert, StorageError> {
        let mut inner = self.inner.write();
        if guard.iter().any(|ns| inner.map(*ns).contains_key(id)) {
            return Ok(GuardedInsert::Blocked);
        }
        let previous = inner
            .map_mut(target)
            .insert(id.to_string(), value.to_string());
        Ok(GuardedInsert::Inserted { previous })
    }

    fn update_existing(
        &self,
        candidates: &[Namespace],
        id: &str,
        value: &str,
    ) -> Result<Option<Namespace>, StorageError> {
        let mut inner = self.inner.write();
        let Some(ns) = candidates
            .iter()
            .copied()
            .find(|ns| inner.map(*ns).contains_key(id))
        else {
            return Ok(None);
        };
        inner.map_mut(ns).insert(id.to_string(), value.to_string());
        Ok(Some(ns))
    }

    fn supports_attachments(&self) -> bool {
        false
    }
}
