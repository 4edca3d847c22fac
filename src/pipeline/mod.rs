//! The transaction pipeline: `normalize` a raw table once, then `filter` and `aggregate` it for
//! every selection. All of it is pure and synchronous.

mod aggregate;
mod filter;
mod normalize;

pub use aggregate::{
    aggregate, Aggregates, CategoryTotal, CategoryTypeTotal, FlowTotals, TypeTotal,
};
pub use filter::{
    available_types, filter, filter_picked, DateRange, EmptyReason, FilterOutcome, TypeFilter,
    BOTH,
};
pub(crate) use normalize::in_range;
pub use normalize::{normalize, Dropped, Normalized};
