/// Kind of mutation reported to a [`DataModifyListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyKind {
    Insert,
    Update,
    Delete,
}

/// A successful mutation against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataModifyEvent {
    /// Schema-qualified table name, as used in the statement.
    pub table: String,
    pub kind: ModifyKind,
    pub affected_rows: u64,
}

/// Hook invoked after every successful insert, update or delete.
///
/// Listeners run inline on the calling task and must not block.
pub trait DataModifyListener: Send + Sync {
    fn on_data_modified(&self, event: &DataModifyEvent);
}
