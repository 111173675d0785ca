//! LMDB-backed document store.
//!
//! Uses heed (Rust bindings for LMDB). Every document is stored as a JSON
//! envelope holding its key and body, indexed by [`DocKey::encode`]. Queries
//! scan the leaf-kind prefix and evaluate the [`Query`] in memory. The id
//! sequence lives in the same database under a reserved key and is advanced
//! inside the write transaction that stores the document.
//!
//! The environment's map size is the storage quota: a full map surfaces as
//! `StorageError::OverQuota`.

use std::path::Path;

use async_trait::async_trait;
use cloudcms_core::{CmsError, CmsResult, StorageError};
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, MdbError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::traits::DocumentStore;
use crate::key::DocKey;
use crate::query::Query;

/// Reserved key of the id sequence. Never a valid [`DocKey`] encoding.
const SEQUENCE_KEY: &[u8] = b"\x00sequence";

#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    #[error("Failed to open database: {0}")]
    DbOpen(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("LMDB map is full")]
    MapFull,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<heed::Error> for LmdbStoreError {
    fn from(e: heed::Error) -> Self {
        match e {
            heed::Error::Mdb(MdbError::MapFull) => LmdbStoreError::MapFull,
            other => LmdbStoreError::Transaction(other.to_string()),
        }
    }
}

impl From<LmdbStoreError> for CmsError {
    fn from(e: LmdbStoreError) -> Self {
        match e {
            LmdbStoreError::MapFull => StorageError::OverQuota {
                reason: e.to_string(),
            }
            .into(),
            other => StorageError::backend(other.to_string()).into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    key: DocKey,
    doc: Value,
}

pub struct LmdbDocumentStore {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl LmdbDocumentStore {
    /// Open (or create) a store in `path` with a map of `max_size_mb`.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env.write_txn()?;
        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;
        wtxn.commit()?;

        info!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB document store");
        Ok(Self { env, db })
    }

    /// Store one document, inside `txn` when given, otherwise in its own
    /// committed transaction.
    fn write(&self, key: &DocKey, doc: Value, txn: Option<&mut heed::RwTxn<'_>>) -> Result<(), LmdbStoreError> {
        let bytes = serde_json::to_vec(&Envelope {
            key: key.clone(),
            doc,
        })
        .map_err(|e| LmdbStoreError::Serialization(e.to_string()))?;

        match txn {
            Some(wtxn) => self.db.put(wtxn, &key.encode(), &bytes)?,
            None => {
                let mut wtxn = self.env.write_txn()?;
                self.db.put(&mut wtxn, &key.encode(), &bytes)?;
                wtxn.commit()?;
            }
        }
        Ok(())
    }

    fn scan_kind(&self, kind: &str) -> Result<Vec<(DocKey, Value)>, LmdbStoreError> {
        let prefix = DocKey::kind_prefix(kind);
        let rtxn = self.env.read_txn()?;

        let mut out = Vec::new();
        for entry in self.db.prefix_iter(&rtxn, &prefix)? {
            let (_, bytes) = entry?;
            match serde_json::from_slice::<Envelope>(bytes) {
                Ok(envelope) => out.push((envelope.key, envelope.doc)),
                Err(e) => debug!(error = %e, "Skipping undecodable LMDB entry"),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for LmdbDocumentStore {
    async fn insert(&self, kind: &str, parent: Option<&DocKey>, doc: Value) -> CmsResult<DocKey> {
        let mut wtxn = self.env.write_txn().map_err(LmdbStoreError::from)?;

        let last = match self.db.get(&wtxn, SEQUENCE_KEY).map_err(LmdbStoreError::from)? {
            Some(raw) => raw
                .try_into()
                .map(i64::from_be_bytes)
                .map_err(|_| StorageError::backend("corrupt id sequence"))?,
            None => 0,
        };
        let id = last + 1;
        self.db
            .put(&mut wtxn, SEQUENCE_KEY, &id.to_be_bytes())
            .map_err(LmdbStoreError::from)?;

        let key = DocKey::numeric(kind, id, parent);
        self.write(&key, doc, Some(&mut wtxn))?;
        wtxn.commit().map_err(LmdbStoreError::from)?;
        Ok(key)
    }

    async fn put(&self, key: &DocKey, doc: Value) -> CmsResult<()> {
        Ok(self.write(key, doc, None)?)
    }

    async fn get(&self, key: &DocKey) -> CmsResult<Option<Value>> {
        let rtxn = self.env.read_txn().map_err(LmdbStoreError::from)?;
        let Some(bytes) = self.db.get(&rtxn, &key.encode()).map_err(LmdbStoreError::from)? else {
            return Ok(None);
        };
        let envelope: Envelope = serde_json::from_slice(bytes).map_err(|e| StorageError::Corrupt {
            kind: key.kind.clone(),
            key: key.id.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(envelope.doc))
    }

    async fn query(&self, query: &Query) -> CmsResult<Vec<(DocKey, Value)>> {
        Ok(query.execute(self.scan_kind(&query.kind)?))
    }

    async fn count(&self, query: &Query) -> CmsResult<usize> {
        let docs = self.scan_kind(&query.kind)?;
        Ok(query.count(docs.iter().map(|(k, v)| (k, v))))
    }

    async fn health_check(&self) -> CmsResult<()> {
        self.env.read_txn().map_err(LmdbStoreError::from)?;
        Ok(())
    }
}
