//! Stateless SQL fragment helpers.
//!
//! Every externally supplied value becomes a `?` placeholder. The only
//! exception is [`build_in_clause_literal`], which renders values inline and
//! is only safe for values that went through [`filter_ids`].

use crate::types::SqlValue;

/// Wraps an identifier in backticks, doubling any embedded backtick.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `` `k1` = ? and `k2` = ? `` plus the number of placeholders emitted.
/// No keys yields an empty fragment, meaning "unconstrained".
pub fn build_equality_where<S: AsRef<str>>(keys: &[S]) -> (String, usize) {
    let sql = keys
        .iter()
        .map(|k| format!("{} = ?", quote_ident(k.as_ref())))
        .collect::<Vec<_>>()
        .join(" and ");
    (sql, keys.len())
}

/// `` `k1`=?,`k2`=? ``
pub fn build_set_clause<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(|k| format!("{}=?", quote_ident(k.as_ref())))
        .collect::<Vec<_>>()
        .join(",")
}

/// `` `k1`,`k2` ``
pub fn build_insert_columns<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(|k| quote_ident(k.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// `?,?,?` with `n` placeholders.
pub fn build_value_placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// `IN (1,'a',...)` rendered inline.
///
/// Safety rests entirely on the caller having passed the values through
/// [`filter_ids`]; this function does no escaping of its own.
pub fn build_in_clause_literal(values: &[SqlValue]) -> String {
    let list = values
        .iter()
        .map(|v| match v {
            SqlValue::Text(s) => format!("'{s}'"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("IN ({list})")
}

/// Counts `?` placeholders, skipping quoted literals and identifiers.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

/// Character allow-list applied to ids before they are rendered inline.
///
/// A new id shape (say, ids containing `:`) needs its characters admitted
/// here; anything rejected is silently dropped from the id list.
pub trait IdCharFilter: Send + Sync {
    fn is_allowed(&self, c: char) -> bool;
}

/// ASCII letters, digits and `- _ ~ .`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIdCharFilter;

impl IdCharFilter for DefaultIdCharFilter {
    fn is_allowed(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '~' | '.')
    }
}

impl<F> IdCharFilter for F
where
    F: Fn(char) -> bool + Send + Sync,
{
    fn is_allowed(&self, c: char) -> bool {
        self(c)
    }
}

/// Prepares an id list for [`build_in_clause_literal`]: drops nulls, keeps
/// the first occurrence of each id, and drops every id that is not an
/// integer or text, is empty, or contains a character the filter rejects.
pub fn filter_ids<I>(ids: I, filter: &dyn IdCharFilter) -> Vec<SqlValue>
where
    I: IntoIterator,
    I::Item: Into<SqlValue>,
{
    let mut kept: Vec<SqlValue> = Vec::new();
    for id in ids.into_iter().map(Into::into) {
        if !matches!(
            id,
            SqlValue::Int32(_) | SqlValue::Int64(_) | SqlValue::Text(_)
        ) {
            continue;
        }
        if kept.contains(&id) {
            continue;
        }
        let text = id.to_string();
        if text.is_empty() || !text.chars().all(|c| filter.is_allowed(c)) {
            continue;
        }
        kept.push(id);
    }
    kept
}
