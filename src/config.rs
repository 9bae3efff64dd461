use serde::Deserialize;

/// Accessor settings, handed to every [`Dao`](crate::Dao) at construction.
///
/// Deserializable so it can live in an application's own config file;
/// missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DaoConfig {
    /// Page size used when a caller asks for zero or a negative size.
    pub default_page_size: u64,
    pub min_page_size: u64,
    pub max_page_size: u64,
    /// Projection used by every SELECT, e.g. `*` or `` `id`,`name` ``.
    pub select_fields: String,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            default_page_size: 30,
            min_page_size: 1,
            max_page_size: 1000,
            select_fields: "*".to_string(),
        }
    }
}

impl DaoConfig {
    /// Normalizes a requested page size.
    ///
    /// Non-positive sizes take the default, then the result is clamped to
    /// `[min_page_size, max_page_size]`.
    pub fn clamp_page_size(&self, requested: i64) -> u64 {
        let size = if requested <= 0 {
            self.default_page_size
        } else {
            requested as u64
        };
        let min = self.min_page_size.max(1);
        size.clamp(min, self.max_page_size.max(min))
    }
}
