//! Read-path statement builders and row decoding.
//!
//! All retrieval shapes reduce to a small family of parameterized SELECTs.
//! Multi-term search aggregates matches per document id in a grouping
//! subquery: a document qualifies under strict AND only when its match count
//! equals the term (or term-pair) count; suggest mode admits any match count
//! and orders by match count descending, then summed rank ascending.

use crate::backend::{Row, Statement, Value};
use crate::error::{LexstoreError, Result};
use crate::mutation::{DocId, StoredDocument};
use crate::scope::{IndexScope, Relation};

/// Options for `get` and `get_grouped`.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Maximum rows returned; 0 means unlimited.
    pub limit: usize,
    /// Rows skipped before the first returned row.
    pub offset: usize,
    /// Tags a matching document must carry, all of them.
    pub tags: Vec<String>,
}

/// Options for `search` and `search_enriched`.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum rows returned; 0 means unlimited.
    pub limit: usize,
    /// Rows skipped before the first returned row.
    pub offset: usize,
    /// Ranked OR instead of strict AND.
    pub suggest: bool,
    /// Tags a matching document must carry, all of them.
    pub tags: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            limit: 100,
            offset: 0,
            suggest: false,
            tags: Vec::new(),
        }
    }
}

/// `LIMIT`/`OFFSET` suffix. SQLite accepts OFFSET only after LIMIT, so an
/// offset without a limit gets `LIMIT -1`.
fn limit_clause(limit: usize, offset: usize) -> String {
    match (limit, offset) {
        (0, 0) => String::new(),
        (0, o) => format!(" LIMIT -1 OFFSET {o}"),
        (l, 0) => format!(" LIMIT {l}"),
        (l, o) => format!(" LIMIT {l} OFFSET {o}"),
    }
}

/// Correlated tag membership filters, one per required tag.
fn tag_filters(scope: &IndexScope, tags: &[String], id_expr: &str, params: &mut Vec<Value>) -> String {
    let tag_table = scope.table(Relation::Tag);
    let mut clause = String::new();
    for tag in tags {
        clause.push_str(&format!(
            " AND {id_expr} IN (SELECT id FROM {tag_table} WHERE tag = ?)"
        ));
        params.push(Value::Text(tag.clone()));
    }
    clause
}

/// Direct key (or context-pair) lookup, ordered by rank ascending.
pub(crate) fn get_statement(
    scope: &IndexScope,
    key: &str,
    ctx: Option<&str>,
    options: &GetOptions,
    grouped: bool,
) -> Statement {
    let table = match ctx {
        Some(_) => scope.table(Relation::Ctx),
        None => scope.table(Relation::Map),
    };

    let mut params = Vec::new();
    let predicate = match ctx {
        Some(ctx) => {
            params.push(Value::Text(ctx.to_string()));
            params.push(Value::Text(key.to_string()));
            "ctx = ? AND key = ?"
        }
        None => {
            params.push(Value::Text(key.to_string()));
            "key = ?"
        }
    };

    let id_expr = format!("{table}.id");
    let filters = tag_filters(scope, &options.tags, &id_expr, &mut params);
    let res_column = if grouped { ", res" } else { "" };

    Statement::with_params(
        format!(
            "SELECT {id_expr}{res_column} FROM {table} WHERE {predicate}{filters} ORDER BY res{}",
            limit_clause(options.limit, options.offset)
        ),
        params,
    )
}

/// Tag lookup, optionally joined with the registry for enrichment.
pub(crate) fn tag_statement(
    scope: &IndexScope,
    tag: &str,
    limit: usize,
    offset: usize,
    enrich: bool,
) -> Statement {
    let table = scope.table(Relation::Tag);
    let reg = scope.table(Relation::Reg);

    let (columns, join) = if enrich {
        (
            format!("{table}.id, doc"),
            format!(" LEFT JOIN {reg} ON {reg}.id = {table}.id"),
        )
    } else {
        (format!("{table}.id"), String::new())
    };

    Statement::with_params(
        format!(
            "SELECT {columns} FROM {table}{join} WHERE tag = ?{}",
            limit_clause(limit, offset)
        ),
        vec![Value::Text(tag.to_string())],
    )
}

/// Multi-term search over the map or context relation.
///
/// `proximity` selects the context relation and walks the term list
/// pairwise. With `bidirectional` enabled a pair is stored once with the
/// lexicographically smaller term as context, so when the following term
/// sorts before the preceding one the lookup swaps to `(ctx = following,
/// key = preceding)`.
pub(crate) fn search_statement(
    scope: &IndexScope,
    terms: &[String],
    options: &SearchOptions,
    proximity: bool,
    bidirectional: bool,
    enrich: bool,
) -> Statement {
    let mut params = Vec::new();
    let mut predicate = String::new();
    let required;
    let table;

    if proximity {
        table = scope.table(Relation::Ctx);
        required = terms.len() - 1;

        for pair in terms.windows(2) {
            let (preceding, following) = (&pair[0], &pair[1]);
            if !predicate.is_empty() {
                predicate.push_str(" OR ");
            }
            predicate.push_str("(ctx = ? AND key = ?)");

            if bidirectional && following < preceding {
                params.push(Value::Text(following.clone()));
                params.push(Value::Text(preceding.clone()));
            } else {
                params.push(Value::Text(preceding.clone()));
                params.push(Value::Text(following.clone()));
            }
        }
    } else {
        table = scope.table(Relation::Map);
        required = terms.len();

        for term in terms {
            if !predicate.is_empty() {
                predicate.push_str(" OR ");
            }
            predicate.push_str("key = ?");
            params.push(Value::Text(term.clone()));
        }
    }

    if !options.tags.is_empty() {
        predicate = format!("({predicate})");
        predicate.push_str(&tag_filters(scope, &options.tags, "id", &mut params));
    }

    let reg = scope.table(Relation::Reg);
    let (columns, join) = if enrich {
        (
            "r.id, doc".to_string(),
            format!(" LEFT JOIN {reg} ON {reg}.id = r.id"),
        )
    } else {
        ("r.id".to_string(), String::new())
    };

    let count_filter = if options.suggest {
        String::new()
    } else {
        format!(" WHERE count = {required}")
    };
    let ordering = if options.suggest {
        "count DESC, res"
    } else {
        "res"
    };

    Statement::with_params(
        format!(
            "SELECT {columns} FROM ( \
             SELECT id, count(*) AS count, SUM(res) AS res \
             FROM {table} WHERE {predicate} GROUP BY id \
             ) AS r{join}{count_filter} ORDER BY {ordering}{}",
            limit_clause(options.limit, options.offset)
        ),
        params,
    )
}

/// Registry fetch for one chunk of ids.
pub(crate) fn enrich_statement(scope: &IndexScope, ids: &[Value]) -> Statement {
    Statement::with_params(
        format!(
            "SELECT id, doc FROM {} WHERE id IN ({})",
            scope.table(Relation::Reg),
            crate::store::batch::in_clause(ids.len())
        ),
        ids.to_vec(),
    )
}

/// Registry existence check.
pub(crate) fn has_statement(scope: &IndexScope, id: &DocId) -> Statement {
    Statement::with_params(
        format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)",
            scope.table(Relation::Reg)
        ),
        vec![id.to_value()],
    )
}

/// Decode the id column of a result set.
pub(crate) fn decode_ids(rows: Vec<Row>) -> Result<Vec<DocId>> {
    rows.into_iter()
        .map(|mut row| {
            if row.is_empty() {
                return Err(LexstoreError::decode("empty result row"));
            }
            DocId::from_value(row.remove(0))
        })
        .collect()
}

/// Decode `(id, res)` rows into posting lists grouped by rank tier.
pub(crate) fn decode_grouped(rows: Vec<Row>) -> Result<Vec<Vec<DocId>>> {
    let mut grouped: Vec<Vec<DocId>> = Vec::new();
    for mut row in rows {
        if row.len() < 2 {
            return Err(LexstoreError::decode("expected id and res columns"));
        }
        let res = row.remove(1);
        let id = DocId::from_value(row.remove(0))?;
        let rank = match res {
            Value::Int(n) if n >= 0 => n as usize,
            other => {
                return Err(LexstoreError::decode(format!(
                    "invalid rank value: {other:?}"
                )));
            }
        };
        if grouped.len() <= rank {
            grouped.resize(rank + 1, Vec::new());
        }
        grouped[rank].push(id);
    }
    Ok(grouped)
}

/// Decode `(id, doc)` rows, deserializing JSON payloads.
pub(crate) fn decode_documents(rows: Vec<Row>) -> Result<Vec<StoredDocument>> {
    rows.into_iter()
        .map(|mut row| {
            if row.len() < 2 {
                return Err(LexstoreError::decode("expected id and doc columns"));
            }
            let doc = row.remove(1);
            let id = DocId::from_value(row.remove(0))?;
            let payload = match doc {
                Value::Null => None,
                Value::Text(json) => Some(serde_json::from_str(&json)?),
                other => {
                    return Err(LexstoreError::decode(format!(
                        "invalid payload value: {other:?}"
                    )));
                }
            };
            Ok(StoredDocument { id, payload })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> IndexScope {
        IndexScope::new("t", "f")
    }

    #[test]
    fn test_get_statement_map_path() {
        let stmt = get_statement(
            &scope(),
            "climate",
            None,
            &GetOptions {
                limit: 10,
                offset: 5,
                tags: Vec::new(),
            },
            false,
        );

        assert_eq!(
            stmt.sql,
            "SELECT map_t_f.id FROM map_t_f WHERE key = ? ORDER BY res LIMIT 10 OFFSET 5"
        );
        assert_eq!(stmt.params, vec![Value::Text("climate".to_string())]);
    }

    #[test]
    fn test_get_statement_context_path_with_tags() {
        let stmt = get_statement(
            &scope(),
            "change",
            Some("climate"),
            &GetOptions {
                limit: 0,
                offset: 0,
                tags: vec!["reports".to_string()],
            },
            true,
        );

        assert_eq!(
            stmt.sql,
            "SELECT ctx_t_f.id, res FROM ctx_t_f WHERE ctx = ? AND key = ? \
             AND ctx_t_f.id IN (SELECT id FROM tag_t_f WHERE tag = ?) ORDER BY res"
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_search_statement_strict_and() {
        let terms = vec!["a".to_string(), "b".to_string()];
        let stmt = search_statement(&scope(), &terms, &SearchOptions::default(), false, false, false);

        assert!(stmt.sql.contains("FROM map_t_f WHERE key = ? OR key = ?"));
        assert!(stmt.sql.contains("WHERE count = 2"));
        assert!(stmt.sql.contains("ORDER BY res"));
        assert!(!stmt.sql.contains("count DESC"));
    }

    #[test]
    fn test_search_statement_suggest_ordering() {
        let terms = vec!["a".to_string(), "b".to_string()];
        let options = SearchOptions {
            suggest: true,
            ..Default::default()
        };
        let stmt = search_statement(&scope(), &terms, &options, false, false, false);

        assert!(!stmt.sql.contains("WHERE count ="));
        assert!(stmt.sql.contains("ORDER BY count DESC, res"));
    }

    #[test]
    fn test_search_statement_bidirectional_swap() {
        let options = SearchOptions::default();

        // "berry" precedes "apple" in the phrase, but "apple" sorts first,
        // so the pair is looked up as (ctx=apple, key=berry).
        let terms = vec!["berry".to_string(), "apple".to_string()];
        let stmt = search_statement(&scope(), &terms, &options, true, true, false);
        assert!(stmt.sql.contains("FROM ctx_t_f WHERE (ctx = ? AND key = ?)"));
        assert!(stmt.sql.contains("WHERE count = 1"));
        assert_eq!(
            stmt.params,
            vec![
                Value::Text("apple".to_string()),
                Value::Text("berry".to_string()),
            ]
        );

        // Without bidirectional mode the natural order is preserved.
        let stmt = search_statement(&scope(), &terms, &options, true, false, false);
        assert_eq!(
            stmt.params,
            vec![
                Value::Text("berry".to_string()),
                Value::Text("apple".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_statement_tags_parenthesize_predicate() {
        let terms = vec!["a".to_string(), "b".to_string()];
        let options = SearchOptions {
            tags: vec!["reports".to_string()],
            ..Default::default()
        };
        let stmt = search_statement(&scope(), &terms, &options, false, false, false);

        assert!(
            stmt.sql
                .contains("WHERE (key = ? OR key = ?) AND id IN (SELECT id FROM tag_t_f WHERE tag = ?)")
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_search_statement_enrich_joins_registry() {
        let terms = vec!["a".to_string()];
        let stmt = search_statement(&scope(), &terms, &SearchOptions::default(), false, false, true);

        assert!(stmt.sql.contains("SELECT r.id, doc FROM"));
        assert!(stmt.sql.contains("LEFT JOIN reg_t ON reg_t.id = r.id"));
    }

    #[test]
    fn test_tag_statement() {
        let stmt = tag_statement(&scope(), "reports", 10, 0, false);
        assert_eq!(
            stmt.sql,
            "SELECT tag_t_f.id FROM tag_t_f WHERE tag = ? LIMIT 10"
        );

        let stmt = tag_statement(&scope(), "reports", 0, 0, true);
        assert!(stmt.sql.contains("LEFT JOIN reg_t"));
        assert!(stmt.sql.contains("doc"));
    }

    #[test]
    fn test_limit_clause() {
        assert_eq!(limit_clause(0, 0), "");
        assert_eq!(limit_clause(10, 0), " LIMIT 10");
        assert_eq!(limit_clause(10, 5), " LIMIT 10 OFFSET 5");
        assert_eq!(limit_clause(0, 5), " LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_has_and_enrich_statements() {
        let stmt = has_statement(&scope(), &DocId::from("doc1"));
        assert_eq!(
            stmt.sql,
            "SELECT EXISTS(SELECT 1 FROM reg_t WHERE id = ?)"
        );

        let ids = vec![Value::Text("a".to_string()), Value::Text("b".to_string())];
        let stmt = enrich_statement(&scope(), &ids);
        assert_eq!(stmt.sql, "SELECT id, doc FROM reg_t WHERE id IN (?,?)");
    }

    #[test]
    fn test_decode_grouped() {
        let rows = vec![
            vec![Value::Text("doc1".to_string()), Value::Int(2)],
            vec![Value::Text("doc2".to_string()), Value::Int(0)],
        ];
        let grouped = decode_grouped(rows).unwrap();

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0], vec![DocId::from("doc2")]);
        assert!(grouped[1].is_empty());
        assert_eq!(grouped[2], vec![DocId::from("doc1")]);
    }

    #[test]
    fn test_decode_documents() {
        let rows = vec![
            vec![
                Value::Text("doc1".to_string()),
                Value::Text("{\"title\":\"t\"}".to_string()),
            ],
            vec![Value::Text("doc2".to_string()), Value::Null],
        ];
        let docs = decode_documents(rows).unwrap();

        assert_eq!(docs[0].id, DocId::from("doc1"));
        assert_eq!(docs[0].payload, Some(serde_json::json!({"title": "t"})));
        assert_eq!(docs[1].payload, None);
    }
}
