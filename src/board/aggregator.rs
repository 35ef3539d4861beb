//! Union of the attention criteria into one warning set

use crate::board::criteria::Criterion;
use crate::core::error::DeskResult;
use crate::core::filter::WarningFilter;
use crate::core::store::OrderStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// Runs every [`Criterion`] concurrently and unions the results
///
/// The branches are joined with `try_join!`: the first failure drops the
/// remaining futures and no partial union is ever returned.
#[derive(Clone)]
pub struct WarningAggregator {
    store: Arc<dyn OrderStore>,
}

impl WarningAggregator {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Sorted, duplicate-free union of all four criteria
    pub async fn aggregate(&self, filter: &WarningFilter) -> DeskResult<Vec<i64>> {
        let started = Instant::now();
        let store = self.store.as_ref();

        let (unpaid, bad_review, exceeded_price, warning_status) = futures::try_join!(
            Criterion::Unpaid.fetch(store, filter),
            Criterion::BadReview.fetch(store, filter),
            Criterion::ExceededPrice.fetch(store, filter),
            Criterion::WarningStatus.fetch(store, filter),
        )?;

        tracing::debug!(
            tenant_id = filter.base.tenant_id,
            unpaid = unpaid.len(),
            bad_review = bad_review.len(),
            exceeded_price = exceeded_price.len(),
            warning_status = warning_status.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "criteria fetched"
        );

        Ok(union_sorted([unpaid, bad_review, exceeded_price, warning_status]))
    }
}

/// Set union of any number of id lists, ascending
pub fn union_sorted<I>(lists: I) -> Vec<i64>
where
    I: IntoIterator<Item = Vec<i64>>,
{
    lists
        .into_iter()
        .flatten()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect()
}
