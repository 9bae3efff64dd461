//! Complete statements assembled from fragments.
//!
//! `table` is always a quoted, possibly schema-qualified name as produced by
//! `TableIdentity::qualified_name`.

use crate::builders::fragment::{
    build_in_clause_literal, build_insert_columns, build_set_clause, build_value_placeholders,
    quote_ident,
};
use crate::clauses::WhereClause;
use crate::types::{ColumnMap, SqlValue};

/// SQL text plus positional parameters, ready for a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// `LIMIT offset,count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: u64,
    pub count: u64,
}

/// `SELECT fields FROM table [WHERE ..] [ORDER BY ..] [LIMIT o,n]`
///
/// `order_by` is a trusted expression such as `` `id` DESC ``, without the
/// `ORDER BY` keywords; blank means unordered.
pub fn select(
    table: &str,
    fields: &str,
    clause: &WhereClause,
    order_by: &str,
    limit: Option<Limit>,
) -> Statement {
    let mut sql = String::with_capacity(128);

    sql.push_str("SELECT ");
    sql.push_str(fields);
    sql.push_str(" FROM ");
    sql.push_str(table);

    clause.append_to(&mut sql);

    let order_by = order_by.trim();
    if !order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }

    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {},{}", limit.offset, limit.count));
    }

    Statement {
        sql,
        params: clause.params().to_vec(),
    }
}

/// `` SELECT fields FROM table WHERE `id_field` IN (...) `` with the ids
/// rendered inline. `ids` must come out of `filter_ids`.
pub fn select_in(table: &str, fields: &str, id_field: &str, ids: &[SqlValue]) -> Statement {
    Statement {
        sql: format!(
            "SELECT {} FROM {} WHERE {} {}",
            fields,
            table,
            quote_ident(id_field),
            build_in_clause_literal(ids)
        ),
        params: Vec::new(),
    }
}

/// `SELECT COUNT(0) FROM table [WHERE ..]`
pub fn count(table: &str, clause: &WhereClause) -> Statement {
    let mut sql = format!("SELECT COUNT(0) FROM {table}");
    clause.append_to(&mut sql);
    Statement {
        sql,
        params: clause.params().to_vec(),
    }
}

/// `INSERT INTO table (cols) VALUES (?,..)`
pub fn insert(table: &str, values: ColumnMap) -> Statement {
    let (columns, params) = values.into_parts();
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            build_insert_columns(&columns),
            build_value_placeholders(params.len())
        ),
        params,
    }
}

/// One multi-row insert over a fixed column list. A row without a column
/// binds `NULL` in its place.
pub fn insert_many(table: &str, columns: &[String], rows: &[ColumnMap]) -> Statement {
    let tuple = format!("({})", build_value_placeholders(columns.len()));
    let mut params = Vec::with_capacity(columns.len() * rows.len());
    for row in rows {
        for column in columns {
            params.push(row.get(column).cloned().unwrap_or(SqlValue::Null));
        }
    }
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            build_insert_columns(columns),
            vec![tuple; rows.len()].join(",")
        ),
        params,
    }
}

/// `` UPDATE table SET `a`=?,.. [WHERE ..] `` with the SET arguments ahead of
/// the WHERE arguments.
pub fn update(table: &str, values: ColumnMap, clause: &WhereClause) -> Statement {
    let (columns, mut params) = values.into_parts();
    let mut sql = format!("UPDATE {} SET {}", table, build_set_clause(&columns));
    clause.append_to(&mut sql);
    params.extend_from_slice(clause.params());
    Statement { sql, params }
}

/// `DELETE FROM table [WHERE ..]`
pub fn delete(table: &str, clause: &WhereClause) -> Statement {
    let mut sql = format!("DELETE FROM {table}");
    clause.append_to(&mut sql);
    Statement {
        sql,
        params: clause.params().to_vec(),
    }
}
