//! Query values: filters and sort orders rendered for the store.

mod filter;
mod sort;

pub use filter::Filter;
pub use sort::Sort;
