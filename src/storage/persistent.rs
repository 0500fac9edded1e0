//! Durable paste storage backed by a single redb database.

use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

use super::backend::{GuardedInsert, PasteBackend};
use super::error::StorageError;
use super::types::Namespace;

const PUBLIC_PASTES: TableDefinition<&str, &str> = TableDefinition::new("publicPastes");
const PRIVATE_PASTES: TableDefinition<&str, &str> = TableDefinition::new("privatePastes");
/// Paste id → blob filename inside the files directory.
const FILE_PASTES: TableDefinition<&str, &str> = TableDefinition::new("filePastes");

fn table(ns: Namespace) -> TableDefinition<'static, &'static str, &'static str> {
    match ns {
        Namespace::Public => PUBLIC_PASTES,
        Namespace::Private => PRIVATE_PASTES,
        Namespace::Files => FILE_PASTES,
    }
}

pub struct RedbBackend {
    db: redb::Database,
}

impl RedbBackend {
    /// Creates or opens the database at `path` and makes sure every table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = redb::Database::create(path)?;

        let write_txn = db.begin_write()?;
        for ns in Namespace::ALL {
            let _ = write_txn.open_table(table(ns))?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Opened paste database");

        Ok(Self { db })
    }

    fn contains(txn: &redb::WriteTransaction, ns: Namespace, id: &str) -> Result<bool, StorageError> {
        let table = txn.open_table(table(ns))?;
        let found = table.get(id)?.is_some();
        Ok(found)
    }
}

impl PasteBackend for RedbBackend {
    fn get(&self, ns: Namespace, id: &str) -> Result<Option<String>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table(ns))?;
        let value = table.get(id)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn put(&self, ns: Namespace, id: &str, value: &str) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table(ns))?;
            table.insert(id, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, ns: Namespace, id: &str) -> Result<Option<String>, StorageError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(table(ns))?;
            let previous = table.remove(id)?.map(|guard| guard.value().to_string());
            previous
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn list(&self, ns: Namespace) -> Result<Vec<(String, String)>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table(ns))?;
        let mut entries = Vec::new();
        for row in table.iter()? {
            let (key, value) = row?;
            entries.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(entries)
    }

    fn clear(&self, ns: Namespace) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(table(ns))?;
        let _ = write_txn.open_table(table(ns))?;
        write_txn.commit()?;
        Ok(())
    }

    fn insert_guarded(
        &self,
        target: Namespace,
        guard: &[Namespace],
        id: &str,
        value: &str,
    ) -> Result<GuardedInsert, StorageError> {
        let write_txn = self.db.begin_write()?;

        for ns in guard {
            if Self::contains(&write_txn, *ns, id)? {
                write_txn.abort()?;
                return Ok(GuardedInsert::Blocked);
            }
        }

        let previous = {
            let mut table = write_txn.open_table(table(target))?;
            let previous = table.insert(id, value)?.map(|guard| guard.value().to_string());
            previous
        };
        write_txn.commit()?;
        Ok(GuardedInsert::Inserted { previous })
    }

    fn update_existing(
        &self,
        candidates: &[Namespace],
        id: &str,
        value: &str,
    ) -> Result<Option<Namespace>, StorageError> {
        let write_txn = self.db.begin_write()?;

        let mut found = None;
        for ns in candidates {
            if Self::contains(&write_txn, *ns, id)? {
                found = Some(*ns);
                break;
            }
        }

        let Some(ns) = found else {
            write_txn.abort()?;
            return Ok(None);
        };

        {
            let mut table = write_txn.open_table(table(ns))?;
            table.insert(id, value)?;
        }
        write_txn.commit()?;
        Ok(Some(ns))
    }
}
