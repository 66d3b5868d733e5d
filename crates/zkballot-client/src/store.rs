use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};
use tracing::debug;
use zkballot_types::{BallotError, BallotResult, SecretRecord};

/// Durable, per-identity storage of secret material and the registry-assigned
/// leaf index. Scoped to one device profile; not a distributed store.
pub trait SecretRecordStore: Send + Sync {
    /// Fetch the record for a username, `NotRegistered` if absent.
    fn get(&self, username: &str) -> BallotResult<SecretRecord>;

    /// Persist the whole record in one write. A crash can lose the record but
    /// never split the secret material from its leaf index. Refuses to
    /// replace a record that already carries a leaf index; registered secret
    /// material is immutable.
    fn put(&self, record: &SecretRecord) -> BallotResult<()>;

    /// Record the leaf index the registry assigned. The assignment is final:
    /// a second call with a differing value fails with `AlreadySet`, an equal
    /// value is a no-op.
    fn set_leaf_index(&self, username: &str, index: u64) -> BallotResult<()>;

    fn contains(&self, username: &str) -> bool;
}

/// sled-backed store. A single mutex serializes read-modify-write sequences
/// so a `put` and `set_leaf_index` race on the same username cannot
/// interleave into a corrupt record.
pub struct SledRecordStore {
    db: sled::Db,
    write_lock: Mutex<()>,
}

impl SledRecordStore {
    pub fn open(path: impl AsRef<Path>) -> BallotResult<Self> {
        let db = sled::open(path).map_err(|e| BallotError::Storage(e.to_string()))?;
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn read(&self, username: &str) -> BallotResult<Option<SecretRecord>> {
        let value = self
            .db
            .get(username.as_bytes())
            .map_err(|e| BallotError::Storage(e.to_string()))?;

        match value {
            Some(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .map_err(|e| BallotError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn write(&self, record: &SecretRecord) -> BallotResult<()> {
        let bytes = serde_json::to_vec(record)
            .map_err(|e| BallotError::Serialization(e.to_string()))?;
        self.db
            .insert(record.username.as_bytes(), bytes)
            .map_err(|e| BallotError::Storage(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| BallotError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl SecretRecordStore for SledRecordStore {
    fn get(&self, username: &str) -> BallotResult<SecretRecord> {
        self.read(username)?.ok_or(BallotError::NotRegistered)
    }

    fn put(&self, record: &SecretRecord) -> BallotResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BallotError::Storage("Write lock poisoned".into()))?;

        if let Some(existing) = self.read(&record.username)? {
            if existing.is_registered() {
                return Err(BallotError::Protocol(format!(
                    "Record for '{}' is already registered, refusing overwrite",
                    record.username
                )));
            }
        }

        self.write(record)?;
        debug!(username = %record.username, "Secret record persisted");
        Ok(())
    }

    fn set_leaf_index(&self, username: &str, index: u64) -> BallotResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BallotError::Storage("Write lock poisoned".into()))?;

        let mut record = self.read(username)?.ok_or(BallotError::NotRegistered)?;

        match record.leaf_index {
            Some(current) if current == index => Ok(()),
            Some(current) => Err(BallotError::AlreadySet {
                current,
                requested: index,
            }),
            None => {
                record.leaf_index = Some(index);
                self.write(&record)?;
                debug!(username = %username, index, "Leaf index recorded");
                Ok(())
            }
        }
    }

    fn contains(&self, username: &str) -> bool {
        self.db.contains_key(username.as_bytes()).unwrap_or(false)
    }
}

/// In-memory store for tests and ephemeral sessions.
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, SecretRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretRecordStore for MemoryRecordStore {
    fn get(&self, username: &str) -> BallotResult<SecretRecord> {
        let records = self
            .records
            .read()
            .map_err(|_| BallotError::Storage("Lock poisoned".into()))?;
        records.get(username).cloned().ok_or(BallotError::NotRegistered)
    }

    fn put(&self, record: &SecretRecord) -> BallotResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| BallotError::Storage("Lock poisoned".into()))?;

        if let Some(existing) = records.get(&record.username) {
            if existing.is_registered() {
                return Err(BallotError::Protocol(format!(
                    "Record for '{}' is already registered, refusing overwrite",
                    record.username
                )));
            }
        }

        records.insert(record.username.clone(), record.clone());
        Ok(())
    }

    fn set_leaf_index(&self, username: &str, index: u64) -> BallotResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| BallotError::Storage("Lock poisoned".into()))?;

        let record = records.get_mut(username).ok_or(BallotError::NotRegistered)?;

        match record.leaf_index {
            Some(current) if current == index => Ok(()),
            Some(current) => Err(BallotError::AlreadySet {
                current,
                requested: index,
            }),
            None => {
                record.leaf_index = Some(index);
                Ok(())
            }
        }
    }

    fn contains(&self, username: &str) -> bool {
        self.records
            .read()
            .map(|r| r.contains_key(username))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkballot_types::{FieldElement, VoterAddress};

    fn record(username: &str) -> SecretRecord {
        SecretRecord {
            username: username.into(),
            address: VoterAddress::from_bytes([0x11; 20]),
            secret: FieldElement::from_u64(1),
            nullifier: FieldElement::from_u64(2),
            commitment_hash: FieldElement::from_u64(3),
            leaf_index: None,
        }
    }

    fn exercise_store(store: &dyn SecretRecordStore) {
        assert!(matches!(store.get("alice"), Err(BallotError::NotRegistered)));

        store.put(&record("alice")).unwrap();
        assert!(store.contains("alice"));

        // Re-writing an unregistered record is allowed
        store.put(&record("alice")).unwrap();

        let loaded = store.get("alice").unwrap();
        assert_eq!(loaded.leaf_index, None);
        assert!(!loaded.is_registered());

        store.set_leaf_index("alice", 7).unwrap();
        assert_eq!(store.get("alice").unwrap().leaf_index, Some(7));

        // Idempotent for the same value
        store.set_leaf_index("alice", 7).unwrap();

        // Final once assigned
        assert!(matches!(
            store.set_leaf_index("alice", 8),
            Err(BallotError::AlreadySet {
                current: 7,
                requested: 8
            })
        ));
        assert_eq!(store.get("alice").unwrap().leaf_index, Some(7));

        // A stray put cannot clobber a registered record
        assert!(matches!(
            store.put(&record("alice")),
            Err(BallotError::Protocol(_))
        ));
        assert_eq!(store.get("alice").unwrap().leaf_index, Some(7));

        // Secret material survives the reload
        assert_eq!(store.get("alice").unwrap().secret, FieldElement::from_u64(1));
    }

    #[test]
    fn test_memory_store() {
        exercise_store(&MemoryRecordStore::new());
    }

    #[test]
    fn test_sled_store() {
        let dir = std::env::temp_dir().join(format!("zkballot-store-{}", uuid::Uuid::new_v4()));
        let store = SledRecordStore::open(&dir).unwrap();
        exercise_store(&store);
        drop(store);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_sled_store_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("zkballot-store-{}", uuid::Uuid::new_v4()));
        {
            let store = SledRecordStore::open(&dir).unwrap();
            store.put(&record("alice")).unwrap();
            store.set_leaf_index("alice", 3).unwrap();
        }
        {
            let store = SledRecordStore::open(&dir).unwrap();
            let loaded = store.get("alice").unwrap();
            assert_eq!(loaded.leaf_index, Some(3));
            assert_eq!(loaded.secret, FieldElement::from_u64(1));
        }
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_set_leaf_index_without_record_fails() {
        let store = MemoryRecordStore::new();
        assert!(matches!(
            store.set_leaf_index("ghost", 1),
            Err(BallotError::NotRegistered)
        ));
    }
}
