/// Outcome of a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub success: bool,
    pub affected_rows: Option<u64>,
    /// Why the mutation was rejected or failed.
    pub message: Option<String>,
}

impl UpdateResult {
    /// A statement that reached storage and changed `n` rows.
    pub fn affected(n: u64) -> Self {
        Self {
            success: true,
            affected_rows: Some(n),
            message: None,
        }
    }

    /// A failed mutation, either rejected before touching storage or
    /// refused by it.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            affected_rows: None,
            message: Some(message.into()),
        }
    }
}

/// One page of records plus the total size of the unpaged result.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total_count: i64,
    /// Zero-based page number.
    pub page_no: u64,
    pub page_size: u64,
}
