//! Posting deduplication.
//!
//! Repeated partial updates leave duplicate posting rows behind: a document
//! re-indexed at a different rank before its old rows are fully cleaned.
//! Compaction partitions each relation by its key tuple, orders by rank
//! ascending, and deletes every row that is not first in its group, so only
//! the best-ranked posting survives.

use crate::backend::Statement;
use crate::scope::{IndexScope, Relation};

/// Rank-ordered partition deletes for the map and context relations.
pub(crate) fn dedup_statements(scope: &IndexScope) -> Vec<Statement> {
    let map = scope.table(Relation::Map);
    let ctx = scope.table(Relation::Ctx);

    vec![
        Statement::new(format!(
            "DELETE FROM {map} WHERE rowid IN ( \
             SELECT rowid FROM ( \
             SELECT rowid, row_number() OVER dupes AS pos FROM {map} \
             WINDOW dupes AS (PARTITION BY id, key ORDER BY res) \
             ) WHERE pos > 1)"
        )),
        Statement::new(format!(
            "DELETE FROM {ctx} WHERE rowid IN ( \
             SELECT rowid FROM ( \
             SELECT rowid, row_number() OVER dupes AS pos FROM {ctx} \
             WINDOW dupes AS (PARTITION BY id, ctx, key ORDER BY res) \
             ) WHERE pos > 1)"
        )),
    ]
}
