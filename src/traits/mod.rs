mod driver;
mod factory;
mod listener;
mod record;

pub use driver::DatabaseDriver;
pub use factory::ConnectionFactory;
pub use listener::{DataModifyEvent, DataModifyListener, ModifyKind};
pub use record::{Record, ToColumnMap};
