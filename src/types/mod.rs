mod column_map;
mod outcome;
mod row;
mod sql_value;

pub use column_map::ColumnMap;
pub use outcome::{Page, UpdateResult};
pub use row::{QueryResult, RawQueryResult, Row};
pub use sql_value::{FromSqlValue, SqlValue};
