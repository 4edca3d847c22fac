//! Types that represent the core data model, such as `Transaction` and `Amount`.
mod amount;
pub mod date;
mod mapping;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat, Grouping, Symbol};
pub use date::{DateOrder, DateValue, Precision};
pub use mapping::{Column, Mapping, MappingError};
pub use transaction::{AmountValue, Flow, RawRow, RawTable, Transaction, Transactions};
