//! Core module containing the filters, records and storage contract

pub mod error;
pub mod filter;
pub mod order;
pub mod predicate;
pub mod store;

pub use error::{ConfigError, DeskError, DeskResult, StorageError, ValidationError};
pub use filter::{
    BadReviewFilter, BaseFilter, DateRange, ExceededPriceFilter, Page, SortDirection, SortField,
    UnpaidFilter, WarningCriteria, WarningFilter, WarningStatusFilter,
};
pub use order::{OrderOption, RawOrder, StatusTimeKey};
pub use predicate::{Column, Predicate, PredicateTarget};
pub use store::OrderStore;
