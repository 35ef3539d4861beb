//! Count and page fetch under one shared warning set

use crate::core::error::DeskResult;
use crate::core::filter::{BaseFilter, Page};
use crate::core::order::RawOrder;
use crate::core::store::OrderStore;
use std::sync::Arc;
use std::time::Instant;

/// Immutable warning-id set handed to both listing reads
///
/// Cloning shares the same allocation, so the count and the fetch always
/// see exactly the same ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningSnapshot(Arc<[i64]>);

impl WarningSnapshot {
    pub fn new(ids: Vec<i64>) -> Self {
        Self(ids.into())
    }

    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether two snapshots share one allocation
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for WarningSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// One page of raw records plus the total under the same predicate
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub total_count: u64,
    pub orders: Vec<RawOrder>,
    pub page: Page,
}

/// Concurrent count + fetch
///
/// The two reads are independent statements; they are not wrapped in a
/// transaction, so a write landing between them can make the total and the
/// page disagree.
#[derive(Clone)]
pub struct PaginatedRetriever {
    store: Arc<dyn OrderStore>,
}

impl PaginatedRetriever {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn retrieve(
        &self,
        filter: &BaseFilter,
        warnings: &WarningSnapshot,
        page: Page,
    ) -> DeskResult<ListingPage> {
        let started = Instant::now();
        let ids = warnings.ids();

        let (total_count, orders) = futures::try_join!(
            self.store.count_orders(filter, ids),
            self.store.fetch_orders(filter, ids, page),
        )?;

        tracing::debug!(
            tenant_id = filter.tenant_id,
            warning_ids = warnings.len(),
            total_count,
            fetched = orders.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "listing retrieved"
        );

        Ok(ListingPage {
            total_count,
            orders,
            page,
        })
    }
}
