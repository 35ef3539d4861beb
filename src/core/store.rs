//! The read-only storage contract the pipeline depends on

use crate::core::error::DeskResult;
use crate::core::filter::{
    BadReviewFilter, BaseFilter, ExceededPriceFilter, Page, UnpaidFilter, WarningStatusFilter,
};
use crate::core::order::{OrderOption, RawOrder, StatusTimeKey};
use async_trait::async_trait;
use std::collections::HashMap;

/// Storage collaborator for order reads
///
/// Implementations must scope every query by tenant and active flag, express
/// filter values as bound parameters only, and validate the incoming filter
/// with [`BaseFilter::validate`] before touching the backend. Identifier
/// results are unordered sets; callers sort when they need determinism.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Orders in the "completed, not paid" status
    async fn fetch_unpaid(&self, filter: &UnpaidFilter) -> DeskResult<Vec<i64>>;

    /// Orders with a client review rated between 1 and the ceiling
    async fn fetch_bad_review(&self, filter: &BadReviewFilter) -> DeskResult<Vec<i64>>;

    /// Unfinished orders whose realtime price exceeds the threshold
    async fn fetch_exceeded_price(&self, filter: &ExceededPriceFilter) -> DeskResult<Vec<i64>>;

    /// Orders in one of the explicit warning statuses
    async fn fetch_warning_status(&self, filter: &WarningStatusFilter) -> DeskResult<Vec<i64>>;

    /// Count of orders matching the filter, or whose id is in `warning_ids`
    async fn count_orders(&self, filter: &BaseFilter, warning_ids: &[i64]) -> DeskResult<u64>;

    /// One page of full records under the same predicate as [`count_orders`](Self::count_orders)
    async fn fetch_orders(
        &self,
        filter: &BaseFilter,
        warning_ids: &[i64],
        page: Page,
    ) -> DeskResult<Vec<RawOrder>>;

    /// Identifiers of orders in the filter's status list
    async fn fetch_ids_by_status_group(&self, filter: &BaseFilter) -> DeskResult<Vec<i64>>;

    /// Options per order, for a batch of orders
    async fn fetch_options(&self, order_ids: &[i64]) -> DeskResult<HashMap<i64, Vec<OrderOption>>>;

    /// Time each `(order, status)` pair was entered, when recorded
    async fn fetch_status_times(
        &self,
        keys: &[StatusTimeKey],
    ) -> DeskResult<HashMap<StatusTimeKey, i64>>;
}
