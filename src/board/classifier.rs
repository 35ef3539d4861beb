//! Status-group tabs with the warning merge

use crate::board::aggregator::{WarningAggregator, union_sorted};
use crate::core::error::{DeskError, DeskResult};
use crate::core::filter::WarningFilter;
use crate::core::store::OrderStore;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// A dispatcher tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusGroup {
    New,
    PreOrder,
    Warning,
    Works,
}

impl StatusGroup {
    pub const ALL: [StatusGroup; 4] = [
        StatusGroup::New,
        StatusGroup::PreOrder,
        StatusGroup::Warning,
        StatusGroup::Works,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatusGroup::New => "new",
            StatusGroup::PreOrder => "pre_order",
            StatusGroup::Warning => "warning",
            StatusGroup::Works => "works",
        }
    }

    /// Status codes that make up the tab
    pub fn status_ids(&self) -> &'static [i64] {
        match self {
            StatusGroup::New => NEW_STATUSES,
            StatusGroup::PreOrder => PRE_ORDER_STATUSES,
            StatusGroup::Warning => WARNING_STATUSES,
            StatusGroup::Works => WORKS_STATUSES,
        }
    }

    /// Only these tabs expose their id lists for the dispatcher's sound signal
    pub fn exposes_ids(&self) -> bool {
        matches!(self, StatusGroup::New | StatusGroup::PreOrder)
    }
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const NEW_STATUSES: &[i64] = &[1, 2, 3, 4, 5, 52, 108, 109, 115, 127, 128, 130, 131];

pub const PRE_ORDER_STATUSES: &[i64] = &[6, 7, 16, 111, 112, 116, 117, 118, 119];

pub const WARNING_STATUSES: &[i64] = &[
    5, 10, 16, 27, 30, 38, 45, 46, 47, 48, 52, 54, 117, 118, 129, 135,
];

pub const WORKS_STATUSES: &[i64] = &[
    17, 26, 27, 29, 30, 36, 54, 55, 106, 110, 113, 114, 132, 133, 134, 135, 136,
];

/// Per-tab counts plus the id lists of the signalling tabs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabSummary {
    pub order_counts: BTreeMap<StatusGroup, usize>,
    pub orders_for_signal: BTreeMap<StatusGroup, Vec<i64>>,
}

impl TabSummary {
    pub fn count(&self, group: StatusGroup) -> usize {
        self.order_counts.get(&group).copied().unwrap_or(0)
    }
}

/// Computes the four tabs concurrently
#[derive(Clone)]
pub struct GroupClassifier {
    store: Arc<dyn OrderStore>,
    aggregator: WarningAggregator,
}

impl GroupClassifier {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            aggregator: WarningAggregator::new(store.clone()),
            store,
        }
    }

    pub async fn classify(&self, filter: &WarningFilter) -> DeskResult<TabSummary> {
        let started = Instant::now();
        let groups: Mutex<HashMap<StatusGroup, Vec<i64>>> = Mutex::new(HashMap::new());

        let branches = StatusGroup::ALL.into_iter().map(|group| {
            let base = filter
                .base
                .with_statuses(group.status_ids())
                .with_select_for_date(group == StatusGroup::Warning);
            let store = self.store.clone();
            let groups = &groups;
            async move {
                let ids = store.fetch_ids_by_status_group(&base).await?;
                let mut guard = groups
                    .lock()
                    .map_err(|e| DeskError::Internal(format!("group map poisoned: {}", e)))?;
                guard.insert(group, ids);
                Ok::<(), DeskError>(())
            }
        });
        try_join_all(branches).await?;

        let mut groups = groups
            .into_inner()
            .map_err(|e| DeskError::Internal(format!("group map poisoned: {}", e)))?;

        // Second stage runs only after every tab is in
        let warnings = self
            .aggregator
            .aggregate(&filter.with_select_for_date(true))
            .await?;
        let tab = groups.remove(&StatusGroup::Warning).unwrap_or_default();
        groups.insert(StatusGroup::Warning, union_sorted([tab, warnings]));

        let mut summary = TabSummary::default();
        for (group, ids) in groups {
            summary.order_counts.insert(group, ids.len());
            if group.exposes_ids() {
                summary.orders_for_signal.insert(group, ids);
            }
        }

        tracing::debug!(
            tenant_id = filter.base.tenant_id,
            new = summary.count(StatusGroup::New),
            pre_order = summary.count(StatusGroup::PreOrder),
            warning = summary.count(StatusGroup::Warning),
            works = summary.count(StatusGroup::Works),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tabs classified"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_tables() {
        assert_eq!(StatusGroup::New.status_ids().len(), 13);
        assert!(StatusGroup::Warning.status_ids().contains(&38));
        assert!(StatusGroup::Works.status_ids().contains(&135));
        assert!(StatusGroup::New.exposes_ids());
        assert!(StatusGroup::PreOrder.exposes_ids());
        assert!(!StatusGroup::Warning.exposes_ids());
        assert!(!StatusGroup::Works.exposes_ids());
    }

    #[test]
    fn test_tab_summary_serializes_with_group_names() {
        let mut summary = TabSummary::default();
        summary.order_counts.insert(StatusGroup::PreOrder, 2);
        summary.orders_for_signal.insert(StatusGroup::PreOrder, vec![4, 5]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["order_counts"]["pre_order"], 2);
        assert_eq!(json["orders_for_signal"]["pre_order"][1], 5);
    }
}
