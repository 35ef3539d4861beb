//! # Order Desk
//!
//! Warning-order aggregation and dispatcher listings for a ride-dispatch
//! platform.
//!
//! ## Features
//!
//! - **Attention criteria**: unpaid, badly reviewed, over-priced and
//!   explicitly flagged orders, each a single storage read
//! - **Concurrent aggregation**: all criteria fetched at once and unioned
//!   into one sorted warning set
//! - **Consistent paging**: count and page fetch share one warning snapshot
//! - **Dispatcher tabs**: new / pre-order / warning / works with the warning
//!   merge rule
//! - **Presentation**: deduplicated, display-ready orders with decoded
//!   addresses, categories, colours and device labels
//! - **Storage-agnostic**: any [`OrderStore`](core::OrderStore) backend; an
//!   in-memory store and a MySQL store ship with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_desk::prelude::*;
//!
//! let store = InMemoryOrderStore::new();
//! let board = OrderBoard::new(std::sync::Arc::new(store));
//!
//! let filter = WarningFilter::new(BaseFilter::for_tenant(1), WarningCriteria::default());
//! let ids = board.warning_orders(&filter).await?;
//! ```

pub mod board;
pub mod config;
pub mod core;
pub mod presentation;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        BaseFilter, DateRange, DeskError, DeskResult, OrderOption, OrderStore, Page, RawOrder,
        SortDirection, SortField, StatusTimeKey, WarningCriteria, WarningFilter,
    };

    // === Pipeline ===
    pub use crate::board::{
        Criterion, GroupClassifier, OrderBoard, PaginatedRetriever, StatusGroup, TabSummary,
        WarningAggregator, WarningSnapshot,
    };

    // === Presentation ===
    pub use crate::presentation::{FormattedOrder, PreparedOrder, prepare_page};

    // === Config ===
    pub use crate::config::DeskConfig;

    // === Server ===
    pub use crate::server::ServerBuilder;

    // === Storage ===
    pub use crate::storage::InMemoryOrderStore;

    #[cfg(feature = "mysql")]
    pub use crate::storage::MysqlOrderStore;

    // === Common external types ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
