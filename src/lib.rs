//! # Lexstore
//!
//! Persistent relational storage backend for in-memory full-text document
//! indexes.
//!
//! ## Features
//!
//! - Durable postings, tag memberships, and canonical documents per index scope
//! - Batched mutation under a bounded-parameter backing store
//! - Multi-term AND/OR retrieval with a bidirectional proximity path
//! - Rank-ordered posting compaction after removals
//! - Per-scope FIFO write serialization
//!
//! The store does not tokenize, stem, or score text; the index engine owns
//! those concerns and hands this crate its pending-mutation buffers.

pub mod backend;
pub mod error;
pub mod mutation;
pub mod scope;
pub mod store;

pub use backend::{RelationalBackend, Row, SqliteBackend, Statement, Value};
pub use error::{LexstoreError, Result};
pub use mutation::{DocId, MutationBuffers, StoredDocument};
pub use scope::{IdKind, IndexScope};
pub use store::{DocumentStore, GetOptions, SearchOptions, StoreConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
