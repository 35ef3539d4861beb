//! The four attention criteria

use crate::core::error::DeskResult;
use crate::core::filter::WarningFilter;
use crate::core::store::OrderStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One attention predicate, backed by one storage read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Completed but not paid
    Unpaid,
    /// Client review rated at or below the ceiling
    BadReview,
    /// Realtime price above the threshold on an unfinished order
    ExceededPrice,
    /// Status on the explicit warning list
    WarningStatus,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Unpaid,
        Criterion::BadReview,
        Criterion::ExceededPrice,
        Criterion::WarningStatus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Unpaid => "unpaid",
            Criterion::BadReview => "bad_review",
            Criterion::ExceededPrice => "exceeded_price",
            Criterion::WarningStatus => "warning_status",
        }
    }

    /// Run this criterion's query with the filter's own threshold
    ///
    /// The result is an unordered set; storage errors propagate unchanged.
    pub async fn fetch(
        &self,
        store: &dyn OrderStore,
        filter: &WarningFilter,
    ) -> DeskResult<Vec<i64>> {
        match self {
            Criterion::Unpaid => store.fetch_unpaid(&filter.unpaid()).await,
            Criterion::BadReview => store.fetch_bad_review(&filter.bad_review()).await,
            Criterion::ExceededPrice => store.fetch_exceeded_price(&filter.exceeded_price()).await,
            Criterion::WarningStatus => store.fetch_warning_status(&filter.warning_status()).await,
        }
    }

    /// Like [`fetch`](Self::fetch), with the ids sorted and deduplicated
    pub async fn fetch_sorted(
        &self,
        store: &dyn OrderStore,
        filter: &WarningFilter,
    ) -> DeskResult<Vec<i64>> {
        let mut ids = self.fetch(store, filter).await?;
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::{BaseFilter, WarningCriteria};
    use crate::core::order::RawOrder;
    use crate::storage::InMemoryOrderStore;

    fn order(order_id: i64, status_id: i64) -> RawOrder {
        RawOrder {
            order_id,
            tenant_id: 1,
            status_id,
            active: Some(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_each_criterion_uses_its_own_threshold() {
        let store = InMemoryOrderStore::new();
        store.insert_order(order(3, 38)).unwrap();
        store.insert_order(order(1, 38)).unwrap();
        store.insert_order(order(2, 10)).unwrap();
        store
            .insert_order(RawOrder {
                realtime_price: Some(900.0),
                ..order(4, 17)
            })
            .unwrap();

        let filter = WarningFilter::new(
            BaseFilter::for_tenant(1),
            WarningCriteria {
                status_completed_not_paid: 38,
                bad_rating_max: 2,
                min_real_price: 500.0,
                finished_status: vec![37, 38],
                warning_status: vec![10],
            },
        );

        let unpaid = Criterion::Unpaid.fetch_sorted(&store, &filter).await.unwrap();
        assert_eq!(unpaid, vec![1, 3]);

        let status = Criterion::WarningStatus.fetch_sorted(&store, &filter).await.unwrap();
        assert_eq!(status, vec![2]);

        let price = Criterion::ExceededPrice.fetch_sorted(&store, &filter).await.unwrap();
        assert_eq!(price, vec![4]);

        let bad = Criterion::BadReview.fetch_sorted(&store, &filter).await.unwrap();
        assert!(bad.is_empty());
    }

    #[test]
    fn test_names() {
        let names: Vec<&str> = Criterion::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["unpaid", "bad_review", "exceeded_price", "warning_status"]
        );
    }
}
