use crate::builders::fragment::{build_equality_where, count_placeholders, quote_ident};
use crate::error::{DaoError, Result};
use crate::types::{ColumnMap, SqlValue};

/// A WHERE predicate: SQL text without the `WHERE` keyword plus its
/// positional arguments.
///
/// The argument count always equals the number of `?` placeholders in the
/// text. An empty clause means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    sql: String,
    params: Vec<SqlValue>,
}

impl WhereClause {
    /// The unconstrained clause.
    pub fn none() -> Self {
        Self::default()
    }

    /// A caller-written predicate such as `` `age` > ? ``.
    ///
    /// The text is trusted and spliced into the statement verbatim; only
    /// the placeholder count is checked against `params`.
    pub fn raw<I>(sql: impl Into<String>, params: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        let sql = sql.into().trim().to_string();
        let params: Vec<SqlValue> = params.into_iter().map(Into::into).collect();
        let placeholders = count_placeholders(&sql);
        if placeholders != params.len() {
            return Err(DaoError::InvalidArgument(format!(
                "predicate has {} placeholder(s) but {} argument(s): {}",
                placeholders,
                params.len(),
                sql
            )));
        }
        Ok(Self { sql, params })
    }

    /// A trusted predicate without placeholders, e.g. `` `deleted_at` IS NULL ``.
    pub fn literal(sql: impl Into<String>) -> Result<Self> {
        Self::raw(sql, Vec::<SqlValue>::new())
    }

    /// `` `column` = ? ``
    pub fn eq(column: &str, value: impl Into<SqlValue>) -> Self {
        Self {
            sql: format!("{} = ?", quote_ident(column)),
            params: vec![value.into()],
        }
    }

    /// Equality on every entry of the example, ANDed together.
    pub fn from_example(example: &ColumnMap) -> Self {
        let (keys, params) = example.clone().into_parts();
        let (sql, _) = build_equality_where(&keys);
        Self { sql, params }
    }

    /// Combines this clause with another using AND.
    pub fn and(self, other: WhereClause) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let mut params = self.params;
        params.extend(other.params);
        Self {
            sql: format!("({}) and ({})", self.sql, other.sql),
            params,
        }
    }

    /// Combines this clause with another using OR.
    /// An empty side is unconstrained, so the result is too.
    pub fn or(self, other: WhereClause) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::none();
        }
        let mut params = self.params;
        params.extend(other.params);
        Self {
            sql: format!("({}) or ({})", self.sql, other.sql),
            params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Appends ` WHERE <predicate>` to `sql` unless the clause is empty.
    pub(crate) fn append_to(&self, sql: &mut String) {
        if !self.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.sql);
        }
    }
}
