//! Mutation batching under a bounded-parameter backing store.
//!
//! Two chunk sizes are at work: the row chunk bounds how many rows fit into
//! one multi-row insert (parameter ceiling divided by column count), while
//! the execution batch bounds how many statements are submitted to the
//! backend at once. The first is dictated by the backing store, the second
//! is a throughput/latency tuning knob.

use crate::backend::{Statement, Value};
use crate::error::Result;
use crate::mutation::MutationBuffers;
use crate::scope::{IndexScope, Relation};

/// Rows per multi-row insert: `max(1, ⌊max_params / columns_per_row⌋)`.
pub(crate) fn chunk_size(max_params: usize, columns_per_row: usize) -> usize {
    (max_params / columns_per_row.max(1)).max(1)
}

/// A `?,?,...` placeholder list for an `IN (...)` clause.
pub(crate) fn in_clause(len: usize) -> String {
    let mut clause = String::with_capacity(len * 2);
    for i in 0..len {
        if i > 0 {
            clause.push(',');
        }
        clause.push('?');
    }
    clause
}

/// Build one parameterized multi-row insert per row chunk.
pub(crate) fn insert_statements(
    table: &str,
    columns: &[&str],
    rows: Vec<Vec<Value>>,
    conflict_clause: &str,
    max_params: usize,
) -> Vec<Statement> {
    if rows.is_empty() {
        return Vec::new();
    }

    let width = columns.len();
    let size = chunk_size(max_params, width);
    let row_placeholders = format!("({})", in_clause(width));

    let mut statements = Vec::with_capacity(rows.len().div_ceil(size));
    let mut rows = rows.into_iter().peekable();

    while rows.peek().is_some() {
        let chunk: Vec<Vec<Value>> = rows.by_ref().take(size).collect();
        let placeholders = vec![row_placeholders.as_str(); chunk.len()].join(",");

        let mut params = Vec::with_capacity(chunk.len() * width);
        for row in chunk {
            debug_assert_eq!(row.len(), width);
            params.extend(row);
        }

        let sql = format!(
            "INSERT INTO {table} ({}) VALUES {placeholders}{conflict_clause}",
            columns.join(", ")
        );
        statements.push(Statement::with_params(sql, params));
    }

    statements
}

/// Flatten the pending buffers into insert statements, in map, ctx,
/// registry, tag order.
pub(crate) fn buffer_statements(
    scope: &IndexScope,
    buffers: &MutationBuffers,
    max_params: usize,
) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();

    let mut map_rows = Vec::new();
    for (key, tiers) in &buffers.map {
        for (rank, ids) in tiers.iter().enumerate() {
            for id in ids {
                map_rows.push(vec![
                    Value::Text(key.clone()),
                    Value::Int(rank as i64),
                    id.to_value(),
                ]);
            }
        }
    }
    statements.extend(insert_statements(
        &scope.table(Relation::Map),
        &["key", "res", "id"],
        map_rows,
        "",
        max_params,
    ));

    let mut ctx_rows = Vec::new();
    for (ctx, keys) in &buffers.ctx {
        for (key, tiers) in keys {
            for (rank, ids) in tiers.iter().enumerate() {
                for id in ids {
                    ctx_rows.push(vec![
                        Value::Text(ctx.clone()),
                        Value::Text(key.clone()),
                        Value::Int(rank as i64),
                        id.to_value(),
                    ]);
                }
            }
        }
    }
    statements.extend(insert_statements(
        &scope.table(Relation::Ctx),
        &["ctx", "key", "res", "id"],
        ctx_rows,
        "",
        max_params,
    ));

    // Re-registering a known document is a no-op, not an error.
    let mut reg_rows = Vec::with_capacity(buffers.registry.len());
    for (id, payload) in &buffers.registry {
        let doc = match payload {
            Some(value) => Value::Text(serde_json::to_string(value)?),
            None => Value::Null,
        };
        reg_rows.push(vec![id.to_value(), doc]);
    }
    statements.extend(insert_statements(
        &scope.table(Relation::Reg),
        &["id", "doc"],
        reg_rows,
        " ON CONFLICT(id) DO NOTHING",
        max_params,
    ));

    let mut tag_rows = Vec::new();
    for (tag, ids) in &buffers.tags {
        for id in ids {
            tag_rows.push(vec![Value::Text(tag.clone()), id.to_value()]);
        }
    }
    statements.extend(insert_statements(
        &scope.table(Relation::Tag),
        &["tag", "id"],
        tag_rows,
        "",
        max_params,
    ));

    Ok(statements)
}

/// One batch of DELETEs clearing a chunk of ids from all four posting and
/// registry relations.
pub(crate) fn removal_batch(scope: &IndexScope, ids: &[Value]) -> Vec<Statement> {
    let clause = in_clause(ids.len());
    [Relation::Map, Relation::Ctx, Relation::Tag, Relation::Reg]
        .iter()
        .map(|relation| {
            Statement::with_params(
                format!(
                    "DELETE FROM {} WHERE id IN ({clause})",
                    scope.table(*relation)
                ),
                ids.to_vec(),
            )
        })
        .collect()
}
