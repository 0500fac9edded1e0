use super::error::StorageError;
use super::types::Namespace;

/// Result of [`PasteBackend::insert_guarded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedInsert {
    /// A guard namespace already held the id; nothing was written.
    Blocked,
    /// Written. Carries the value `target` held before, if any.
    Inserted { previous: Option<String> },
}

impl GuardedInsert {
    pub fn is_inserted(&self) -> bool {
        matches!(self, GuardedInsert::Inserted { .. })
    }
}

/// Key-value storage for pastes, partitioned into namespaces.
///
/// Single-key operations are atomic. `insert_guarded` and `update_existing`
/// are atomic across every namespace they touch, so an id check and the
/// write that depends on it can never interleave with another writer.
pub trait PasteBackend: Send + Sync {
    fn get(&self, ns: Namespace, id: &str) -> Result<Option<String>, StorageError>;

    fn has(&self, ns: Namespace, id: &str) -> Result<bool, StorageError> {
        Ok(self.get(ns, id)?.is_some())
    }

    /// Unconditional insert/overwrite.
    fn put(&self, ns: Namespace, id: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `id` from `ns`, returning the previous value.
    fn remove(&self, ns: Namespace, id: &str) -> Result<Option<String>, StorageError>;

    /// All entries of `ns` in key order.
    fn list(&self, ns: Namespace) -> Result<Vec<(String, String)>, StorageError>;

    /// Drops every entry of `ns`.
    fn clear(&self, ns: Namespace) -> Result<(), StorageError>;

    /// Writes `value` under `id` in `target` unless `id` is present in any of
    /// `guard`. The target may be left out of `guard`, in which case an
    /// existing entry is replaced and handed back.
    fn insert_guarded(
        &self,
        target: Namespace,
        guard: &[Namespace],
        id: &str,
        value: &str,
    ) -> Result<GuardedInsert, StorageError>;

    /// Overwrites `id` in the first namespace of `candidates` that holds it.
    /// Returns the namespace written, or `None` if no candidate holds `id`.
    fn update_existing(
        &self,
        candidates: &[Namespace],
        id: &str,
        value: &str,
    ) -> Result<Option<Namespace>, StorageError>;

    /// Whether the `Files` namespace is backed by durable blob storage.
    fn supports_attachments(&self) -> bool {
        true
    }
}
