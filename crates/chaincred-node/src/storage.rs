//! RocksDB storage backend for the ChainCred node.
//!
//! One database backs the record store, the anchor ledger, and the metadata
//! host, each in its own column family.

use anyhow::Result;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Mutex;

use chaincred_credentials::{
    AnchorLedger, AnchorReader, CredentialError, CredentialMetadata, CredentialRecord,
    MetadataSource, MetadataStore, RecordStore,
};

/// Column family names for different data types.
const CF_RECORDS: &str = "records";
const CF_CONTENT_INDEX: &str = "content_index";
const CF_ANCHORS: &str = "anchors";
const CF_METADATA: &str = "metadata";

/// RocksDB-backed storage for the ChainCred node.
pub struct Storage {
    db: DB,
    /// Serializes check-then-write sequences for write-once keys.
    write_lock: Mutex<()>,
}

fn storage_err(e: anyhow::Error) -> CredentialError {
    CredentialError::Storage(format!("{:#}", e))
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_RECORDS, Options::default()),
            ColumnFamilyDescriptor::new(CF_CONTENT_INDEX, Options::default()),
            ColumnFamilyDescriptor::new(CF_ANCHORS, Options::default()),
            ColumnFamilyDescriptor::new(CF_METADATA, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    /// Put a value into a column family.
    pub fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    /// Get a value from a column family.
    pub fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let value = self.db.get_cf(&cf, key)?;
        Ok(value)
    }

    /// Flush memtables to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Write a record and its content-index entry atomically, refusing
    /// either key if it already exists.
    fn insert_record(&self, record: &CredentialRecord) -> Result<(), CredentialError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CredentialError::Storage("write lock poisoned".into()))?;

        let id = record.id();
        if self.get(CF_RECORDS, id.as_bytes()).map_err(storage_err)?.is_some() {
            return Err(CredentialError::AlreadyExists(id.to_string()));
        }
        let digest = record.content_digest();
        if let Some(existing) = self
            .get(CF_CONTENT_INDEX, digest.as_bytes())
            .map_err(storage_err)?
        {
            return Err(CredentialError::AlreadyExists(format!(
                "document {} is already registered as {}",
                digest,
                String::from_utf8_lossy(&existing)
            )));
        }

        let records = self
            .db
            .cf_handle(CF_RECORDS)
            .ok_or_else(|| CredentialError::Storage("records column family missing".into()))?;
        let index = self
            .db
            .cf_handle(CF_CONTENT_INDEX)
            .ok_or_else(|| CredentialError::Storage("index column family missing".into()))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&records, id.as_bytes(), record.to_bytes()?);
        batch.put_cf(&index, digest.as_bytes(), id.as_bytes());
        self.db
            .write(batch)
            .map_err(|e| CredentialError::Storage(e.to_string()))?;
        Ok(())
    }

    fn load_record(&self, id: &str) -> Result<Option<CredentialRecord>, CredentialError> {
        match self.get(CF_RECORDS, id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(CredentialRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RecordStore for Storage {
    async fn get(&self, id: &str) -> Result<Option<CredentialRecord>, CredentialError> {
        self.load_record(id)
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), CredentialError> {
        self.insert_record(&record)?;
        tracing::debug!(credential_id = record.id(), "record persisted");
        Ok(())
    }

    async fn find_by_content_digest(
        &self,
        digest: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        match self
            .get(CF_CONTENT_INDEX, digest.as_bytes())
            .map_err(storage_err)?
        {
            Some(id) => self.load_record(&String::from_utf8_lossy(&id)),
            None => Ok(None),
        }
    }

    async fn list_by_subject(
        &self,
        subject: &str,
    ) -> Result<Vec<CredentialRecord>, CredentialError> {
        let cf = self
            .db
            .cf_handle(CF_RECORDS)
            .ok_or_else(|| CredentialError::Storage("records column family missing".into()))?;

        let mut found = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = item.map_err(|e| CredentialError::Storage(e.to_string()))?;
            let record = match CredentialRecord::from_bytes(&value) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        credential_id = %String::from_utf8_lossy(&key),
                        error = %e,
                        "skipping unreadable record"
                    );
                    continue;
                }
            };
            if record.subject() == subject {
                found.push(record);
            }
        }
        found.sort_by(|a, b| a.issued_at().cmp(b.issued_at()));
        Ok(found)
    }
}

#[async_trait]
impl AnchorReader for Storage {
    async fn read_anchor(&self, record_id: &str) -> Result<Option<String>, CredentialError> {
        let value = self
            .get(CF_ANCHORS, record_id.as_bytes())
            .map_err(storage_err)?;
        Ok(value.map(|v| String::from_utf8_lossy(&v).into_owned()))
    }
}

#[async_trait]
impl AnchorLedger for Storage {
    async fn write_anchor(&self, record_id: &str, anchor: &str) -> Result<(), CredentialError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CredentialError::Storage("write lock poisoned".into()))?;
        if self
            .get(CF_ANCHORS, record_id.as_bytes())
            .map_err(storage_err)?
            .is_some()
        {
            return Err(CredentialError::AlreadyAnchored(record_id.to_string()));
        }
        self.put(CF_ANCHORS, record_id.as_bytes(), anchor.as_bytes())
            .map_err(storage_err)
    }
}

#[async_trait]
impl MetadataSource for Storage {
    async fn fetch_metadata(
        &self,
        record_id: &str,
    ) -> Result<Option<CredentialMetadata>, CredentialError> {
        match self
            .get(CF_METADATA, record_id.as_bytes())
            .map_err(storage_err)?
        {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl MetadataStore for Storage {
    async fn publish_metadata(
        &self,
        record_id: &str,
        metadata: CredentialMetadata,
    ) -> Result<(), CredentialError> {
        let bytes = serde_json::to_vec(&metadata)?;
        self.put(CF_METADATA, record_id.as_bytes(), &bytes)
            .map_err(storage_err)
    }
}
