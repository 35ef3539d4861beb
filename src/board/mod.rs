//! The warning-orders pipeline
//!
//! - [`criteria`]: the four attention predicates, one storage read each
//! - [`aggregator`]: concurrent union of the criteria
//! - [`retriever`]: concurrent count + page fetch under one warning snapshot
//! - [`classifier`]: the four dispatcher tabs with the warning merge
//! - [`service`]: the [`OrderBoard`] facade used by the HTTP layer

pub mod aggregator;
pub mod classifier;
pub mod criteria;
pub mod retriever;
pub mod service;

pub use aggregator::{WarningAggregator, union_sorted};
pub use classifier::{GroupClassifier, StatusGroup, TabSummary};
pub use criteria::Criterion;
pub use retriever::{ListingPage, PaginatedRetriever, WarningSnapshot};
pub use service::{OrderBoard, Overview, PreparedListing};
