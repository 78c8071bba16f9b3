//! Relation schema management for one scope.
//!
//! Creation is idempotent (`IF NOT EXISTS` throughout) so `open` can run on
//! every mount. The id column type comes from the scope's configured
//! [`IdKind`](crate::scope::IdKind).

use crate::backend::Statement;
use crate::scope::{IdKind, IndexScope, Relation};

/// DDL creating the five relations and their access-path indexes.
pub(crate) fn create_statements(scope: &IndexScope, id_kind: IdKind) -> Vec<Statement> {
    let id_type = id_kind.sql_type();
    let map = scope.table(Relation::Map);
    let ctx = scope.table(Relation::Ctx);
    let tag = scope.table(Relation::Tag);
    let cfg = scope.table(Relation::Cfg);
    let reg = scope.table(Relation::Reg);

    vec![
        Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {map} (key TEXT NOT NULL, res INTEGER NOT NULL, id {id_type} NOT NULL)"
        )),
        Statement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {map} (key)",
            scope.access_index(Relation::Map, "key")
        )),
        Statement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {map} (id)",
            scope.access_index(Relation::Map, "id")
        )),
        Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {ctx} (ctx TEXT NOT NULL, key TEXT NOT NULL, res INTEGER NOT NULL, id {id_type} NOT NULL)"
        )),
        Statement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {ctx} (ctx, key)",
            scope.access_index(Relation::Ctx, "ctx_key")
        )),
        Statement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {ctx} (id)",
            scope.access_index(Relation::Ctx, "id")
        )),
        Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {tag} (tag TEXT NOT NULL, id {id_type} NOT NULL)"
        )),
        Statement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {tag} (tag)",
            scope.access_index(Relation::Tag, "tag")
        )),
        Statement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {tag} (id)",
            scope.access_index(Relation::Tag, "id")
        )),
        Statement::new(format!("CREATE TABLE IF NOT EXISTS {cfg} (cfg TEXT NOT NULL)")),
        Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {reg} (id {id_type} NOT NULL PRIMARY KEY, doc TEXT DEFAULT NULL)"
        )),
        Statement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {reg} (id)",
            scope.access_index(Relation::Reg, "id")
        )),
    ]
}

/// DDL dropping all five relations.
pub(crate) fn drop_statements(scope: &IndexScope) -> Vec<Statement> {
    Relation::ALL
        .iter()
        .map(|relation| Statement::new(format!("DROP TABLE IF EXISTS {}", scope.table(*relation))))
        .collect()
}

/// Statements deleting every row without dropping the relations.
pub(crate) fn clear_statements(scope: &IndexScope) -> Vec<Statement> {
    Relation::ALL
        .iter()
        .map(|relation| Statement::new(format!("DELETE FROM {}", scope.table(*relation))))
        .collect()
}
