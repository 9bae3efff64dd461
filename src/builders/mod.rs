pub mod fragment;
pub mod statement;

pub use statement::{Limit, Statement};
