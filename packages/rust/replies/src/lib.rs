//! Reply sink boundary and the in-memory reply store.
//!
//! The crawler only ever talks to a [`ReplySink`]: it asks for new list items
//! and records reply values. [`ReplyStore`] is the stock sink that keeps the
//! reply tree in memory and renders it as a [`RepliesDocument`].

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use kmimport_shared::{ImportError, ReplyPath, ReplyValue, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Receiver of the crawl's output.
///
/// Errors returned from either method abort the crawl.
pub trait ReplySink {
    /// Materialize a new item of the list question at `path`; returns its id.
    fn create_item(&mut self, path: &ReplyPath) -> Result<Uuid>;

    /// Record `value` as the reply at `path`.
    fn set_reply(&mut self, path: &ReplyPath, value: ReplyValue) -> Result<()>;
}

impl<S: ReplySink + ?Sized> ReplySink for &mut S {
    fn create_item(&mut self, path: &ReplyPath) -> Result<Uuid> {
        (**self).create_item(path)
    }

    fn set_reply(&mut self, path: &ReplyPath, value: ReplyValue) -> Result<()> {
        (**self).set_reply(path, value)
    }
}

// ---------------------------------------------------------------------------
// ReplyStore
// ---------------------------------------------------------------------------

/// In-memory reply tree keyed by dot-joined path.
#[derive(Debug, Clone, Default)]
pub struct ReplyStore {
    replies: BTreeMap<String, ReplyValue>,
}

impl ReplyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &ReplyPath) -> Option<&ReplyValue> {
        self.replies.get(&path.to_string())
    }

    /// Item ids of the list question at `path` (empty if none were created).
    pub fn items(&self, path: &ReplyPath) -> &[Uuid] {
        match self.get(path) {
            Some(ReplyValue::ItemList(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    pub fn replies(&self) -> &BTreeMap<String, ReplyValue> {
        &self.replies
    }

    /// Snapshot the store as a document stamped with the current time.
    pub fn document(&self, knowledge_model_uuid: Uuid) -> RepliesDocument {
        RepliesDocument {
            knowledge_model_uuid,
            imported_at: Utc::now(),
            replies: self.replies.clone(),
        }
    }
}

impl ReplySink for ReplyStore {
    fn create_item(&mut self, path: &ReplyPath) -> Result<Uuid> {
        let item = Uuid::now_v7();
        let entry = self
            .replies
            .entry(path.to_string())
            .or_insert_with(|| ReplyValue::ItemList(Vec::new()));

        match entry {
            ReplyValue::ItemList(items) => items.push(item),
            other => {
                return Err(ImportError::Sink(format!(
                    "cannot add an item at {path}: it already holds {other:?}"
                )));
            }
        }

        trace!(%path, %item, "item created");
        Ok(item)
    }

    fn set_reply(&mut self, path: &ReplyPath, value: ReplyValue) -> Result<()> {
        trace!(%path, ?value, "reply set");
        self.replies.insert(path.to_string(), value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RepliesDocument
// ---------------------------------------------------------------------------

/// Serialized output of an import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesDocument {
    /// Knowledge model the replies belong to.
    pub knowledge_model_uuid: Uuid,
    /// When the import ran.
    pub imported_at: DateTime<Utc>,
    /// Reply values keyed by dot-joined path.
    pub replies: BTreeMap<String, ReplyValue>,
}

impl RepliesDocument {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| ImportError::Sink(format!("failed to serialize replies: {e}")))
    }

    /// Write the document as JSON, creating parent directories as needed.
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ImportError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json(pretty)?).map_err(|e| ImportError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ids: &[u128]) -> ReplyPath {
        ids.iter().map(|n| Uuid::from_u128(*n)).collect::<Vec<_>>().into()
    }

    #[test]
    fn items_accumulate_in_order() {
        let mut store = ReplyStore::new();
        let list = path(&[1, 2]);
        let first = store.create_item(&list).unwrap();
        let second = store.create_item(&list).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.items(&list), &[first, second]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn item_on_scalar_reply_is_rejected() {
        let mut store = ReplyStore::new();
        let p = path(&[1, 2]);
        store
            .set_reply(&p, ReplyValue::String("Alice".into()))
            .unwrap();

        let err = store.create_item(&p).unwrap_err();
        assert!(matches!(err, ImportError::Sink(_)));
    }

    #[test]
    fn set_reply_overwrites() {
        let mut store = ReplyStore::new();
        let p = path(&[1, 3]);
        store.set_reply(&p, ReplyValue::Answer(Uuid::from_u128(7))).unwrap();
        store.set_reply(&p, ReplyValue::Answer(Uuid::from_u128(8))).unwrap();
        assert_eq!(store.get(&p), Some(&ReplyValue::Answer(Uuid::from_u128(8))));
    }

    #[test]
    fn document_serialization() {
        let mut store = ReplyStore::new();
        store
            .set_reply(&path(&[1, 4]), ReplyValue::String("Open Data".into()))
            .unwrap();

        let doc = store.document(Uuid::from_u128(0));
        let json = doc.to_json(false).unwrap();
        assert!(json.contains("\"knowledgeModelUuid\""));
        assert!(json.contains("\"StringReply\""));

        let parsed: RepliesDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.replies.len(), 1);
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("kmimport-replies-{}", Uuid::now_v7()));
        let file = dir.join("nested").join("replies.json");

        ReplyStore::new()
            .document(Uuid::from_u128(0))
            .write_to(&file, true)
            .unwrap();
        assert!(file.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
