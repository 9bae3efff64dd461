use indexmap::IndexMap;

use crate::types::SqlValue;

/// Insertion-ordered column name to value mapping.
///
/// Statement builders read the keys and the values in one pass, so the Nth
/// column always lines up with the Nth bound argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    entries: IndexMap<String, SqlValue>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, keeping the original position when the key exists.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.entries.insert(column.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Splits into column names and values, in matching order.
    pub fn into_parts(self) -> (Vec<String>, Vec<SqlValue>) {
        self.entries.into_iter().unzip()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ColumnMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Into<String>, V: Into<SqlValue>, const N: usize> From<[(K, V); N]> for ColumnMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for ColumnMap {
    type Item = (String, SqlValue);
    type IntoIter = indexmap::map::IntoIter<String, SqlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
