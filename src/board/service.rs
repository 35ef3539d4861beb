//! The order board: every dispatcher read composed over one store

use crate::board::aggregator::WarningAggregator;
use crate::board::classifier::{GroupClassifier, TabSummary};
use crate::board::criteria::Criterion;
use crate::board::retriever::{ListingPage, PaginatedRetriever, WarningSnapshot};
use crate::core::error::DeskResult;
use crate::core::filter::{Page, WarningFilter};
use crate::core::store::OrderStore;
use crate::presentation::{PreparedOrder, prepare_page, status_time_keys};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// A page of display-ready orders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedListing {
    pub total_count: u64,
    pub orders: Vec<PreparedOrder>,
    pub page: u32,
    pub page_size: u32,
}

/// Listing and tabs computed together
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub listing: PreparedListing,
    pub tabs: TabSummary,
}

/// Facade over the aggregation, retrieval, classification and presentation
/// stages
///
/// Cheap to clone; all stages share the same `Arc<dyn OrderStore>`.
#[derive(Clone)]
pub struct OrderBoard {
    store: Arc<dyn OrderStore>,
    aggregator: WarningAggregator,
    retriever: PaginatedRetriever,
    classifier: GroupClassifier,
}

impl OrderBoard {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            aggregator: WarningAggregator::new(store.clone()),
            retriever: PaginatedRetriever::new(store.clone()),
            classifier: GroupClassifier::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// Sorted ids matching a single criterion
    pub async fn criterion_orders(
        &self,
        criterion: Criterion,
        filter: &WarningFilter,
    ) -> DeskResult<Vec<i64>> {
        criterion.fetch_sorted(self.store.as_ref(), filter).await
    }

    /// Sorted union of all criteria
    pub async fn warning_orders(&self, filter: &WarningFilter) -> DeskResult<Vec<i64>> {
        self.aggregator.aggregate(filter).await
    }

    /// Raw page for a tab
    ///
    /// The `warning` tab is OR-extended by the aggregated warning set; every
    /// other tab lists by its own filter only.
    pub async fn orders_by_group(
        &self,
        filter: &WarningFilter,
        page: Page,
    ) -> DeskResult<ListingPage> {
        let warnings = if filter.base.is_warning_group() {
            WarningSnapshot::new(self.aggregator.aggregate(filter).await?)
        } else {
            WarningSnapshot::empty()
        };
        self.retriever.retrieve(&filter.base, &warnings, page).await
    }

    /// Display-ready page for a tab
    pub async fn prepared_orders_by_group(
        &self,
        filter: &WarningFilter,
        page: Page,
    ) -> DeskResult<PreparedListing> {
        let started = Instant::now();
        let listing = self.orders_by_group(filter, page).await?;

        let orders = if listing.orders.is_empty() {
            Vec::new()
        } else {
            let ids: Vec<i64> = listing.orders.iter().map(|o| o.order_id).collect();
            let keys = status_time_keys(&listing.orders);
            let (options, status_times) = futures::try_join!(
                self.store.fetch_options(&ids),
                self.store.fetch_status_times(&keys),
            )?;
            prepare_page(listing.orders, &options, &status_times)
        };

        tracing::info!(
            tenant_id = filter.base.tenant_id,
            group = %filter.base.group,
            total_count = listing.total_count,
            returned = orders.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "orders by group"
        );

        Ok(PreparedListing {
            total_count: listing.total_count,
            orders,
            page: listing.page.page,
            page_size: listing.page.page_size,
        })
    }

    /// Per-tab counts and the signalling id lists
    pub async fn tabs(&self, filter: &WarningFilter) -> DeskResult<TabSummary> {
        self.classifier.classify(filter).await
    }

    /// Listing and tabs concurrently; either failure fails both
    pub async fn overview(&self, filter: &WarningFilter, page: Page) -> DeskResult<Overview> {
        let (listing, tabs) = futures::try_join!(
            self.prepared_orders_by_group(filter, page),
            self.tabs(filter),
        )?;
        Ok(Overview { listing, tabs })
    }
}

