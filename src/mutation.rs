//! Pending-mutation buffers drained by `commit`.
//!
//! The index engine accumulates postings in memory and hands them to the
//! store by value; taking ownership is the drain, so a buffer can never be
//! aliased by a concurrent writer.

use ahash::AHashMap;
use serde_json::Value as JsonValue;

use crate::backend::Value;
use crate::error::{LexstoreError, Result};

/// A document identifier, text or integer depending on the scope's id kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocId {
    /// Text identifier.
    Text(String),
    /// Integer identifier.
    Int(i64),
}

impl DocId {
    pub(crate) fn to_value(&self) -> Value {
        match self {
            DocId::Text(s) => Value::Text(s.clone()),
            DocId::Int(n) => Value::Int(*n),
        }
    }

    pub(crate) fn from_value(value: Value) -> Result<DocId> {
        match value {
            Value::Text(s) => Ok(DocId::Text(s)),
            Value::Int(n) => Ok(DocId::Int(n)),
            other => Err(LexstoreError::decode(format!(
                "unsupported id value: {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocId::Text(s) => write!(f, "{s}"),
            DocId::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        DocId::Text(s.to_string())
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        DocId::Text(s)
    }
}

impl From<i64> for DocId {
    fn from(n: i64) -> Self {
        DocId::Int(n)
    }
}

/// A registry row resolved back into a document id and its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// The document id.
    pub id: DocId,
    /// The canonical payload, absent when the engine stored no body.
    pub payload: Option<JsonValue>,
}

/// Rank-tiered posting lists: index into the outer `Vec` is the rank.
pub type RankedPostings = Vec<Vec<DocId>>;

/// The four pending buffers the index engine fills between commits.
#[derive(Debug, Clone, Default)]
pub struct MutationBuffers {
    /// Exact-term postings: key → rank → ids.
    pub map: AHashMap<String, RankedPostings>,
    /// Proximity postings: context key → key → rank → ids.
    pub ctx: AHashMap<String, AHashMap<String, RankedPostings>>,
    /// Tag membership: tag → ids.
    pub tags: AHashMap<String, Vec<DocId>>,
    /// Registry entries: id → optional payload.
    pub registry: AHashMap<DocId, Option<JsonValue>>,
}

impl MutationBuffers {
    /// Create empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no buffer holds any pending row.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
            && self.ctx.is_empty()
            && self.tags.is_empty()
            && self.registry.is_empty()
    }

    /// Queue an exact-term posting at the given rank tier.
    pub fn insert_posting(&mut self, key: &str, rank: usize, id: DocId) {
        let tiers = self.map.entry(key.to_string()).or_default();
        if tiers.len() <= rank {
            tiers.resize(rank + 1, Vec::new());
        }
        tiers[rank].push(id);
    }

    /// Queue a proximity posting for the ordered pair `(ctx, key)`.
    pub fn insert_context(&mut self, ctx: &str, key: &str, rank: usize, id: DocId) {
        let tiers = self
            .ctx
            .entry(ctx.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();
        if tiers.len() <= rank {
            tiers.resize(rank + 1, Vec::new());
        }
        tiers[rank].push(id);
    }

    /// Queue a tag membership posting.
    pub fn insert_tag(&mut self, tag: &str, id: DocId) {
        self.tags.entry(tag.to_string()).or_default().push(id);
    }

    /// Register a document, optionally with its canonical payload.
    ///
    /// Every id referenced by a posting must be registered in the same commit
    /// (or an earlier one); the store does not check this.
    pub fn register(&mut self, id: DocId, payload: Option<JsonValue>) {
        self.registry.insert(id, payload);
    }
}
