//! Hierarchical document keys.
//!
//! A key names a document by kind and id and optionally nests it under a
//! parent key. Content kinds live under a fixed named root per kind; status
//! and version texts live under their parent record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the kind and the id of one path segment.
const KIND_SEPARATOR: u8 = 0x1F;
/// Separator between path segments (root first).
const SEGMENT_SEPARATOR: u8 = 0x1E;
/// Separator between the leaf kind prefix and the full path.
const PREFIX_SEPARATOR: u8 = 0x1D;

/// Identity part of a key: generated number or caller-supplied name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyId {
    Numeric(i64),
    Named(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Numeric(id) => write!(f, "{id}"),
            KeyId::Named(name) => write!(f, "'{name}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocKey {
    pub kind: String,
    pub id: KeyId,
    pub parent: Option<Box<DocKey>>,
}

impl DocKey {
    pub fn numeric(kind: impl Into<String>, id: i64, parent: Option<&DocKey>) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Numeric(id),
            parent: parent.cloned().map(Box::new),
        }
    }

    pub fn named(kind: impl Into<String>, name: impl Into<String>, parent: Option<&DocKey>) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Named(name.into()),
            parent: parent.cloned().map(Box::new),
        }
    }

    /// Named top-level key, the shape used for every kind root.
    pub fn root(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::named(kind, name, None)
    }

    /// Generated id, if this key has one.
    pub fn numeric_id(&self) -> Option<i64> {
        match self.id {
            KeyId::Numeric(id) => Some(id),
            KeyId::Named(_) => None,
        }
    }

    /// True when `ancestor` is a strict ancestor of this key.
    pub fn has_ancestor(&self, ancestor: &DocKey) -> bool {
        let mut current = self.parent.as_deref();
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = key.parent.as_deref();
        }
        false
    }

    /// Byte encoding, unique per key.
    ///
    /// Layout: `leaf kind 0x1D segment (0x1E segment)*`, root segment first,
    /// each segment `kind 0x1F json(id)`. JSON escapes control characters,
    /// so ids never contain a separator byte.
    pub fn encode(&self) -> Vec<u8> {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(key) = current {
            segments.push(key);
            current = key.parent.as_deref();
        }

        let mut bytes = Self::kind_prefix(&self.kind);
        for (i, key) in segments.iter().rev().enumerate() {
            if i > 0 {
                bytes.push(SEGMENT_SEPARATOR);
            }
            bytes.extend_from_slice(key.kind.as_bytes());
            bytes.push(KIND_SEPARATOR);
            match &key.id {
                KeyId::Numeric(id) => bytes.extend_from_slice(id.to_string().as_bytes()),
                KeyId::Named(name) => {
                    let quoted = serde_json::Value::String(name.clone()).to_string();
                    bytes.extend_from_slice(quoted.as_bytes());
                }
            }
        }
        bytes
    }

    /// Prefix shared by the encoding of every key of `kind`.
    pub fn kind_prefix(kind: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(kind.len() + 1);
        bytes.extend_from_slice(kind.as_bytes());
        bytes.push(PREFIX_SEPARATOR);
        bytes
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent}/")?;
        }
        write!(f, "{}({})", self.kind, self.id)
    }
}
