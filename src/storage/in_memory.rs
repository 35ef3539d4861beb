//! In-memory implementation of OrderStore for testing and development

use crate::core::error::{DeskResult, StorageError};
use crate::core::filter::{
    BadReviewFilter, BaseFilter, ExceededPriceFilter, Page, SortDirection, SortField,
    UnpaidFilter, WarningStatusFilter,
};
use crate::core::order::{OrderOption, RawOrder, StatusTimeKey};
use crate::core::predicate::{self, Column, Predicate, PredicateTarget, StatusScope};
use crate::core::store::OrderStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const BACKEND: &str = "in-memory";

/// An order row together with the ratings of its client reviews
#[derive(Debug, Clone, Default)]
pub struct StoredOrder {
    pub order: RawOrder,
    pub review_ratings: Vec<i64>,
}

impl StoredOrder {
    fn sort_key(&self, field: SortField) -> Option<i64> {
        let o = &self.order;
        match field {
            SortField::StatusTime => Some(o.status_time),
            SortField::OrderTime => o.order_time,
            SortField::CreateTime => o.create_time,
            SortField::UpdateTime => o.update_time,
            SortField::OrderId => Some(o.order_id),
            SortField::OrderNumber => Some(o.order_number),
        }
    }
}

impl PredicateTarget for StoredOrder {
    fn int_value(&self, column: Column) -> Option<i64> {
        let o = &self.order;
        match column {
            Column::OrderId => Some(o.order_id),
            Column::TenantId => Some(o.tenant_id),
            Column::Active => o.active,
            Column::StatusId => Some(o.status_id),
            Column::StatusTime => Some(o.status_time),
            Column::CityId => o.city_id,
            Column::TariffId => Some(o.tariff_id),
            Column::PositionId => Some(o.position_id),
            Column::RealtimePrice => None,
        }
    }

    fn float_value(&self, column: Column) -> Option<f64> {
        match column {
            Column::RealtimePrice => self.order.realtime_price,
            _ => None,
        }
    }

    fn review_ratings(&self) -> &[i64] {
        &self.review_ratings
    }
}

#[derive(Default)]
struct Tables {
    orders: BTreeMap<i64, StoredOrder>,
    options: HashMap<i64, Vec<OrderOption>>,
    status_times: HashMap<StatusTimeKey, i64>,
}

/// In-memory order store
///
/// Useful for testing and development. Uses RwLock for thread-safe access and
/// evaluates the same predicates the SQL backends render.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryOrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DeskResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|e| {
            StorageError::query(BACKEND, format!("Failed to acquire read lock: {}", e)).into()
        })
    }

    fn write(&self) -> DeskResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|e| {
            StorageError::query(BACKEND, format!("Failed to acquire write lock: {}", e)).into()
        })
    }

    /// Insert or replace an order
    pub fn insert_order(&self, order: RawOrder) -> DeskResult<()> {
        self.insert_reviewed_order(order, Vec::new())
    }

    /// Insert or replace an order along with its review ratings
    pub fn insert_reviewed_order(
        &self,
        order: RawOrder,
        review_ratings: Vec<i64>,
    ) -> DeskResult<()> {
        let mut tables = self.write()?;
        tables.orders.insert(
            order.order_id,
            StoredOrder {
                order,
                review_ratings,
            },
        );
        Ok(())
    }

    /// Attach a client review rating to an existing order
    pub fn add_review(&self, order_id: i64, rating: i64) -> DeskResult<()> {
        let mut tables = self.write()?;
        if let Some(stored) = tables.orders.get_mut(&order_id) {
            stored.review_ratings.push(rating);
        }
        Ok(())
    }

    pub fn add_option(&self, option: OrderOption) -> DeskResult<()> {
        let mut tables = self.write()?;
        tables.options.entry(option.order_id).or_default().push(option);
        Ok(())
    }

    /// Record when an order entered a status
    pub fn record_status_time(&self, order_id: i64, status_id: i64, at: i64) -> DeskResult<()> {
        let mut tables = self.write()?;
        tables
            .status_times
            .insert(StatusTimeKey::new(order_id, status_id), at);
        Ok(())
    }

    pub fn len(&self) -> DeskResult<usize> {
        Ok(self.read()?.orders.len())
    }

    pub fn is_empty(&self) -> DeskResult<bool> {
        Ok(self.len()? == 0)
    }

    fn collect_ids(&self, predicate: &Predicate) -> DeskResult<Vec<i64>> {
        let tables = self.read()?;
        Ok(tables
            .orders
            .values()
            .filter(|stored| predicate.matches(*stored))
            .map(|stored| stored.order.order_id)
            .collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn fetch_unpaid(&self, filter: &UnpaidFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.collect_ids(&predicate::unpaid_predicate(filter))
    }

    async fn fetch_bad_review(&self, filter: &BadReviewFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.collect_ids(&predicate::bad_review_predicate(filter))
    }

    async fn fetch_exceeded_price(&self, filter: &ExceededPriceFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.collect_ids(&predicate::exceeded_price_predicate(filter))
    }

    async fn fetch_warning_status(&self, filter: &WarningStatusFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.collect_ids(&predicate::warning_status_predicate(filter))
    }

    async fn count_orders(&self, filter: &BaseFilter, warning_ids: &[i64]) -> DeskResult<u64> {
        filter.validate()?;
        let predicate = predicate::listing_predicate(filter, warning_ids);
        let tables = self.read()?;
        Ok(tables
            .orders
            .values()
            .filter(|stored| predicate.matches(*stored))
            .count() as u64)
    }

    async fn fetch_orders(
        &self,
        filter: &BaseFilter,
        warning_ids: &[i64],
        page: Page,
    ) -> DeskResult<Vec<RawOrder>> {
        filter.validate()?;
        let predicate = predicate::listing_predicate(filter, warning_ids);
        let tables = self.read()?;

        let mut matched: Vec<&StoredOrder> = tables
            .orders
            .values()
            .filter(|stored| predicate.matches(*stored))
            .collect();

        matched.sort_by(|a, b| {
            let primary = a.sort_key(filter.sort_field).cmp(&b.sort_key(filter.sort_field));
            let primary = match filter.sort_direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then(a.order.order_id.cmp(&b.order.order_id))
        });

        Ok(matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|stored| stored.order.clone())
            .collect())
    }

    async fn fetch_ids_by_status_group(&self, filter: &BaseFilter) -> DeskResult<Vec<i64>> {
        filter.validate()?;
        self.collect_ids(&predicate::base_predicate(filter, StatusScope::Include))
    }

    async fn fetch_options(&self, order_ids: &[i64]) -> DeskResult<HashMap<i64, Vec<OrderOption>>> {
        let tables = self.read()?;
        Ok(order_ids
            .iter()
            .filter_map(|id| tables.options.get(id).map(|opts| (*id, opts.clone())))
            .collect())
    }

    async fn fetch_status_times(
        &self,
        keys: &[StatusTimeKey],
    ) -> DeskResult<HashMap<StatusTimeKey, i64>> {
        let tables = self.read()?;
        Ok(keys
            .iter()
            .filter_map(|key| tables.status_times.get(key).map(|at| (*key, *at)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(order_id: i64, status_id: i64, status_time: i64) -> RawOrder {
        RawOrder {
            order_id,
            tenant_id: 1,
            status_id,
            status_time,
            active: Some(1),
            order_number: order_id * 10,
            ..Default::default()
        }
    }

    fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
        ids.sort_unstable();
        ids
    }

    #[tokio::test]
    async fn test_fetch_unpaid() {
        let store = InMemoryOrderStore::new();
        store.insert_order(order(1, 38, 100)).unwrap();
        store.insert_order(order(2, 37, 100)).unwrap();

        let ids = store
            .fetch_unpaid(&UnpaidFilter {
                base: BaseFilter::for_tenant(1),
                status_completed_not_paid: 38,
            })
            .await
            .unwrap();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_fetch_bad_review_uses_reviews() {
        let store = InMemoryOrderStore::new();
        store.insert_reviewed_order(order(1, 37, 100), vec![1]).unwrap();
        store.insert_order(order(2, 37, 100)).unwrap();
        store.add_review(2, 5).unwrap();

        let ids = store
            .fetch_bad_review(&BadReviewFilter {
                base: BaseFilter::for_tenant(1),
                bad_rating_max: 2,
            })
            .await
            .unwrap();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_invalid_filter_rejected() {
        let store = InMemoryOrderStore::new();
        let result = store.count_orders(&BaseFilter::default(), &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_count_and_fetch_agree() {
        let store = InMemoryOrderStore::new();
        for id in 1..=5 {
            store.insert_order(order(id, 1, 100 + id)).unwrap();
        }
        store.insert_order(order(6, 38, 50)).unwrap();

        let filter = BaseFilter {
            status_ids: vec![1],
            ..BaseFilter::for_tenant(1)
        };
        let count = store.count_orders(&filter, &[6]).await.unwrap();
        let page = store
            .fetch_orders(&filter, &[6], Page { page: 0, page_size: 10 })
            .await
            .unwrap();
        assert_eq!(count, 6);
        assert_eq!(page.len(), 6);
        // status_time descending by default
        assert_eq!(page[0].order_id, 5);
        assert_eq!(page[5].order_id, 6);
    }

    #[tokio::test]
    async fn test_fetch_orders_pagination_and_sort() {
        let store = InMemoryOrderStore::new();
        for id in 1..=7 {
            store.insert_order(order(id, 1, 100 + id)).unwrap();
        }
        let filter = BaseFilter {
            sort_field: SortField::OrderId,
            sort_direction: SortDirection::Asc,
            ..BaseFilter::for_tenant(1)
        };
        let page = store
            .fetch_orders(&filter, &[], Page { page: 1, page_size: 3 })
            .await
            .unwrap();
        let ids: Vec<i64> = page.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }

    #[tokio::test]
    async fn test_status_group_ids() {
        let store = InMemoryOrderStore::new();
        store.insert_order(order(1, 1, 100)).unwrap();
        store.insert_order(order(2, 6, 100)).unwrap();
        store.insert_order(order(3, 2, 100)).unwrap();

        let filter = BaseFilter::for_tenant(1).with_statuses(&[1, 2]);
        let ids = store.fetch_ids_by_status_group(&filter).await.unwrap();
        assert_eq!(sorted(ids), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_options_and_status_times() {
        let store = InMemoryOrderStore::new();
        store.insert_order(order(1, 1, 100)).unwrap();
        store
            .add_option(OrderOption {
                order_id: 1,
                option_id: 3,
                name: "Child seat".to_string(),
                price: Some(50.0),
            })
            .unwrap();
        store.record_status_time(1, 1, 90).unwrap();

        let options = store.fetch_options(&[1, 2]).await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[&1][0].name, "Child seat");

        let times = store
            .fetch_status_times(&[StatusTimeKey::new(1, 1), StatusTimeKey::new(1, 2)])
            .await
            .unwrap();
        assert_eq!(times.len(), 1);
        assert_eq!(times[&StatusTimeKey::new(1, 1)], 90);
    }
}
