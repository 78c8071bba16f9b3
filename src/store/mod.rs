//! The document store: persistent posting storage for one index scope.
//!
//! A [`DocumentStore`] owns the five relations of one scope (one named index
//! crossed with one indexed field) on a backing relational store, drains the engine's
//! pending-mutation buffers into chunked parameter-bounded writes, and
//! answers ranked retrieval queries. Writes for a scope are strictly
//! ordered through a FIFO sequencer; reads run against the relations
//! directly and may observe pre-commit or partially-committed state until
//! the commit completes.

pub(crate) mod batch;
pub(crate) mod compact;
pub mod query;
pub(crate) mod schema;
mod sequencer;

use futures::future::try_join_all;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::backend::{RelationalBackend, Statement, Value};
use crate::error::Result;
use crate::mutation::{DocId, MutationBuffers, StoredDocument};
use crate::scope::{IdKind, IndexScope};
use crate::store::sequencer::Sequencer;

pub use query::{GetOptions, SearchOptions};

/// Configuration for a document store scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Id type name as configured on the index engine (`text`, `int`,
    /// `bigint`, and their aliases). Unknown names fail construction.
    pub id_type: String,

    /// Proximity depth configured on the engine; 0 disables the context
    /// search path.
    pub context_depth: usize,

    /// Whether context pairs are stored once in bidirectional order
    /// (lexicographically smaller term as context).
    pub bidirectional: bool,

    /// Statements per execution batch when submitting writes. Independent
    /// of the insert row-chunk size, which is bounded by the backend's
    /// parameter ceiling.
    pub statement_batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            id_type: "text".to_string(),
            context_depth: 0,
            bidirectional: true,
            statement_batch_size: 64,
        }
    }
}

/// Persistent storage for one index scope.
#[derive(Debug)]
pub struct DocumentStore<B: RelationalBackend> {
    scope: IndexScope,
    config: StoreConfig,
    id_kind: IdKind,
    backend: B,
    sequencer: Sequencer,
}

impl<B: RelationalBackend> DocumentStore<B> {
    /// Create a store for `scope` on `backend`.
    ///
    /// Fails with a configuration error when the configured id type is not
    /// recognized. (A missing backend cannot be expressed: the store owns
    /// its backend by value.)
    pub fn new(backend: B, scope: IndexScope, config: StoreConfig) -> Result<Self> {
        let id_kind = IdKind::parse(&config.id_type)?;

        Ok(DocumentStore {
            scope,
            config,
            id_kind,
            backend,
            sequencer: Sequencer::new(),
        })
    }

    /// The scope this store owns.
    pub fn scope(&self) -> &IndexScope {
        &self.scope
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The backing store handle.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn batch_size(&self) -> usize {
        self.config.statement_batch_size.max(1)
    }

    /// Submit statements in fixed-size execution batches.
    async fn execute_batches(&self, statements: Vec<Statement>) -> Result<()> {
        for slice in statements.chunks(self.batch_size()) {
            self.backend.execute_batch(slice.to_vec()).await?;
        }
        Ok(())
    }

    /// Idempotently create the scope's relations and access-path indexes.
    pub async fn open(&self) -> Result<()> {
        debug!("opening scope {}_{}", self.scope.name(), self.scope.field());
        self.execute_batches(schema::create_statements(&self.scope, self.id_kind))
            .await
    }

    /// Drop all five relations for this scope.
    pub async fn destroy(&self) -> Result<()> {
        self.backend
            .execute_batch(schema::drop_statements(&self.scope))
            .await
    }

    /// Delete every row in the scope's relations without dropping them.
    pub async fn clear(&self) -> Result<()> {
        let _slot = self.sequencer.acquire().await;
        self.backend
            .execute_batch(schema::clear_statements(&self.scope))
            .await
    }

    /// Drain pending mutation buffers into the scope's relations.
    ///
    /// Removals run first so stale postings never coexist with a re-insert
    /// of the same id within the commit; compaction runs afterward only when
    /// the commit included removals. Taking the buffers by value is the
    /// drain. Earlier chunks of a failed multi-chunk commit are not rolled
    /// back; the caller must treat the scope as needing re-synchronization.
    pub async fn commit(&self, buffers: MutationBuffers, removals: Vec<DocId>) -> Result<()> {
        let _slot = self.sequencer.acquire().await;

        if !removals.is_empty() {
            self.remove_unsequenced(&removals).await?;
        }

        let statements = batch::buffer_statements(
            &self.scope,
            &buffers,
            self.backend.max_bound_parameters(),
        )?;
        if !statements.is_empty() {
            debug!(
                "committing {} statements to scope {}_{}",
                statements.len(),
                self.scope.name(),
                self.scope.field()
            );
            self.execute_batches(statements).await?;
        }

        if !removals.is_empty() {
            self.compact_unsequenced().await?;
        }

        Ok(())
    }

    /// Remove documents from all four posting and registry relations.
    pub async fn remove(&self, ids: &[DocId]) -> Result<()> {
        let _slot = self.sequencer.acquire().await;
        self.remove_unsequenced(ids).await
    }

    async fn remove_unsequenced(&self, ids: &[DocId]) -> Result<()> {
        let max_params = self.backend.max_bound_parameters().max(1);
        for chunk in ids.chunks(max_params) {
            let values: Vec<Value> = chunk.iter().map(DocId::to_value).collect();
            self.backend
                .execute_batch(batch::removal_batch(&self.scope, &values))
                .await?;
        }
        Ok(())
    }

    async fn compact_unsequenced(&self) -> Result<()> {
        debug!(
            "compacting scope {}_{}",
            self.scope.name(),
            self.scope.field()
        );
        self.backend
            .execute_batch(compact::dedup_statements(&self.scope))
            .await
    }

    /// Look up postings for `key` (or the context pair `(ctx, key)`),
    /// ordered by rank ascending.
    pub async fn get(
        &self,
        key: &str,
        ctx: Option<&str>,
        options: &GetOptions,
    ) -> Result<Vec<DocId>> {
        let stmt = query::get_statement(&self.scope, key, ctx, options, false);
        query::decode_ids(self.backend.query(stmt).await?)
    }

    /// Like [`get`](Self::get), but grouped by rank tier.
    pub async fn get_grouped(
        &self,
        key: &str,
        ctx: Option<&str>,
        options: &GetOptions,
    ) -> Result<Vec<Vec<DocId>>> {
        let stmt = query::get_statement(&self.scope, key, ctx, options, true);
        query::decode_grouped(self.backend.query(stmt).await?)
    }

    /// Documents carrying `tag`.
    pub async fn tag(&self, tag: &str, limit: usize, offset: usize) -> Result<Vec<DocId>> {
        let stmt = query::tag_statement(&self.scope, tag, limit, offset, false);
        query::decode_ids(self.backend.query(stmt).await?)
    }

    /// Documents carrying `tag`, joined with their registry payloads.
    pub async fn tag_enriched(
        &self,
        tag: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredDocument>> {
        let stmt = query::tag_statement(&self.scope, tag, limit, offset, true);
        query::decode_documents(self.backend.query(stmt).await?)
    }

    /// Multi-term search.
    ///
    /// Strict AND by default: a document qualifies only when it matches
    /// every term (or every adjacent pair on the proximity path). Suggest
    /// mode admits any match count, ordered by match count descending and
    /// summed rank ascending. An empty term list returns no results rather
    /// than an error.
    pub async fn search(&self, terms: &[String], options: &SearchOptions) -> Result<Vec<DocId>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let stmt = self.search_statement(terms, options, false);
        query::decode_ids(self.backend.query(stmt).await?)
    }

    /// Like [`search`](Self::search), joined with registry payloads.
    pub async fn search_enriched(
        &self,
        terms: &[String],
        options: &SearchOptions,
    ) -> Result<Vec<StoredDocument>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let stmt = self.search_statement(terms, options, true);
        query::decode_documents(self.backend.query(stmt).await?)
    }

    fn search_statement(&self, terms: &[String], options: &SearchOptions, enrich: bool) -> Statement {
        let proximity = terms.len() > 1 && self.config.context_depth > 0;
        query::search_statement(
            &self.scope,
            terms,
            options,
            proximity,
            self.config.bidirectional,
            enrich,
        )
    }

    /// Resolve ids to their registry payloads.
    ///
    /// Ids are chunked by the backend's parameter ceiling and the chunks are
    /// fetched in parallel; results preserve chunk order but no order within
    /// a chunk is guaranteed.
    pub async fn enrich(&self, ids: &[DocId]) -> Result<Vec<StoredDocument>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let max_params = self.backend.max_bound_parameters().max(1);
        let statements: Vec<Statement> = ids
            .chunks(max_params)
            .map(|chunk| {
                let values: Vec<Value> = chunk.iter().map(DocId::to_value).collect();
                query::enrich_statement(&self.scope, &values)
            })
            .collect();

        let batches = try_join_all(
            statements
                .into_iter()
                .map(|stmt| self.backend.query(stmt)),
        )
        .await?;

        let mut documents = Vec::with_capacity(ids.len());
        for rows in batches {
            documents.extend(query::decode_documents(rows)?);
        }
        Ok(documents)
    }

    /// Whether `id` has a registry row.
    pub async fn has(&self, id: &DocId) -> Result<bool> {
        let row = self
            .backend
            .query_first(query::has_statement(&self.scope, id))
            .await?;
        Ok(matches!(
            row.as_deref(),
            Some([Value::Int(n), ..]) if *n != 0
        ))
    }
}
