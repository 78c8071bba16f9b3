//! Index scopes and relation naming.
//!
//! A scope is one named index crossed with one indexed field; it is the unit
//! of relation ownership. Scope and field names are sanitized to a
//! storage-safe token set before they become part of relation identifiers.

use serde::{Deserialize, Serialize};

use crate::error::{LexstoreError, Result};

/// The five storage relations owned by a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Exact-term postings: `(key, res, id)`.
    Map,
    /// Proximity postings: `(ctx, key, res, id)`.
    Ctx,
    /// Tag membership postings: `(tag, id)`.
    Tag,
    /// Opaque configuration snapshots.
    Cfg,
    /// Canonical document registry: `(id, doc)`.
    Reg,
}

impl Relation {
    /// All relations, in schema creation order.
    pub const ALL: [Relation; 5] = [
        Relation::Map,
        Relation::Ctx,
        Relation::Tag,
        Relation::Cfg,
        Relation::Reg,
    ];

    /// Short relation prefix used in table and index names.
    pub fn prefix(&self) -> &'static str {
        match self {
            Relation::Map => "map",
            Relation::Ctx => "ctx",
            Relation::Tag => "tag",
            Relation::Cfg => "cfg",
            Relation::Reg => "reg",
        }
    }
}

/// SQL column type for document ids, selected by the engine's id type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdKind {
    /// Text ids, stored as `TEXT`.
    Text,
    /// Integer ids, stored as `INTEGER`.
    Int,
    /// Wide integer ids, stored as `BIGINT`.
    BigInt,
}

impl IdKind {
    /// Parse an id type name as configured on the index engine.
    ///
    /// Accepts the same alias set as the original adapter family. Unknown
    /// names are a configuration error, raised at store construction.
    pub fn parse(name: &str) -> Result<IdKind> {
        match name.to_ascii_lowercase().as_str() {
            "text" | "char" | "varchar" | "string" => Ok(IdKind::Text),
            "number" | "numeric" | "integer" | "smallint" | "tinyint" | "mediumint" | "int"
            | "int8" | "uint8" | "int16" | "uint16" | "int32" => Ok(IdKind::Int),
            "uint32" | "int64" | "bigint" => Ok(IdKind::BigInt),
            other => Err(LexstoreError::config(format!(
                "unknown type of id '{other}'"
            ))),
        }
    }

    /// SQL column type for this kind.
    pub fn sql_type(&self) -> &'static str {
        match self {
            IdKind::Text => "TEXT",
            IdKind::Int => "INTEGER",
            IdKind::BigInt => "BIGINT",
        }
    }
}

/// One named index crossed with one indexed field.
///
/// Relation names follow the `{prefix}_{scope}_{field}` convention, except the
/// registry, which is shared across the fields of one index and carries no
/// field suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexScope {
    name: String,
    field: String,
}

impl IndexScope {
    /// Create a scope from an index name and a field name.
    ///
    /// Both parts are sanitized: lowercased, with everything outside
    /// `[a-z0-9_]` removed.
    pub fn new(name: &str, field: &str) -> Self {
        IndexScope {
            name: sanitize(name),
            field: sanitize(field),
        }
    }

    /// The sanitized index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sanitized field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Table name for a relation in this scope.
    pub fn table(&self, relation: Relation) -> String {
        match relation {
            Relation::Reg => format!("reg_{}", self.name),
            other => format!("{}_{}_{}", other.prefix(), self.name, self.field),
        }
    }

    /// Name of the access-path index covering `column` on a relation.
    pub fn access_index(&self, relation: Relation, column: &str) -> String {
        match relation {
            Relation::Reg => format!("reg_{}_{}", column, self.name),
            other => format!("{}_{}_{}_{}", other.prefix(), column, self.name, self.field),
        }
    }
}

/// Reduce a name to the storage-safe token set `[a-z0-9_]`.
pub fn sanitize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("My-Index"), "myindex");
        assert_eq!(sanitize("docs_2024"), "docs_2024");
        assert_eq!(sanitize("a b;DROP TABLE--"), "abdroptable");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_table_names() {
        let scope = IndexScope::new("Articles", "body");

        assert_eq!(scope.table(Relation::Map), "map_articles_body");
        assert_eq!(scope.table(Relation::Ctx), "ctx_articles_body");
        assert_eq!(scope.table(Relation::Tag), "tag_articles_body");
        assert_eq!(scope.table(Relation::Cfg), "cfg_articles_body");
        // Registry is shared per index, no field suffix.
        assert_eq!(scope.table(Relation::Reg), "reg_articles");
    }

    #[test]
    fn test_access_index_names() {
        let scope = IndexScope::new("articles", "body");

        assert_eq!(
            scope.access_index(Relation::Map, "key"),
            "map_key_articles_body"
        );
        assert_eq!(
            scope.access_index(Relation::Ctx, "ctx_key"),
            "ctx_ctx_key_articles_body"
        );
        assert_eq!(scope.access_index(Relation::Reg, "id"), "reg_id_articles");
    }

    #[test]
    fn test_id_kind_parse() {
        assert_eq!(IdKind::parse("text").unwrap(), IdKind::Text);
        assert_eq!(IdKind::parse("VARCHAR").unwrap(), IdKind::Text);
        assert_eq!(IdKind::parse("int32").unwrap(), IdKind::Int);
        assert_eq!(IdKind::parse("bigint").unwrap(), IdKind::BigInt);
        assert_eq!(IdKind::parse("uint32").unwrap(), IdKind::BigInt);

        let err = IdKind::parse("uuid").unwrap_err();
        assert!(err.to_string().contains("unknown type of id"));
    }

    #[test]
    fn test_sql_types() {
        assert_eq!(IdKind::Text.sql_type(), "TEXT");
        assert_eq!(IdKind::Int.sql_type(), "INTEGER");
        assert_eq!(IdKind::BigInt.sql_type(), "BIGINT");
    }
}
