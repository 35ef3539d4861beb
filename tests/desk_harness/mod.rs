//! Shared fixtures for the order-desk integration tests
//!
//! Provides an order builder for seeding [`InMemoryOrderStore`] and a
//! [`ScriptedStore`] that answers every read from a script, records the
//! calls it receives and can be told to fail.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod desk_harness;
//! use desk_harness::*;
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use order_desk::board::StatusGroup;
use order_desk::core::error::{DeskError, DeskResult, StorageError};
use order_desk::core::filter::{
    BadReviewFilter, BaseFilter, ExceededPriceFilter, Page, UnpaidFilter, WarningStatusFilter,
};
use order_desk::core::order::{OrderOption, RawOrder, StatusTimeKey};
use order_desk::core::store::OrderStore;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const TENANT: i64 = 68;

/// An active order of the test tenant
pub fn order(order_id: i64, status_id: i64) -> RawOrder {
    RawOrder {
        order_id,
        tenant_id: TENANT,
        status_id,
        status_time: 1_700_000_000 + order_id,
        order_number: 1_000 + order_id,
        tariff_id: 1,
        client_id: 1,
        currency_id: 1,
        position_id: 1,
        city_id: Some(26068),
        active: Some(1),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// ScriptedStore
// ---------------------------------------------------------------------------

/// What one scripted read answers
#[derive(Debug, Clone)]
pub enum Script {
    Ids(Vec<i64>),
    /// Answer after a delay
    Slow(Duration, Vec<i64>),
    Fail,
}

impl Default for Script {
    fn default() -> Self {
        Script::Ids(Vec::new())
    }
}

impl Script {
    async fn run(&self, operation: &str) -> DeskResult<Vec<i64>> {
        match self {
            Script::Ids(ids) => Ok(ids.clone()),
            Script::Slow(delay, ids) => {
                tokio::time::sleep(*delay).await;
                Ok(ids.clone())
            }
            Script::Fail => Err(failure(operation)),
        }
    }
}

pub fn failure(operation: &str) -> DeskError {
    DeskError::Storage(StorageError::query("scripted", format!("{} failed", operation)))
}

/// A recorded storage call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Unpaid { select_for_date: bool },
    BadReview { select_for_date: bool },
    ExceededPrice { select_for_date: bool },
    WarningStatus { select_for_date: bool },
    Count { warning_ids: Vec<i64> },
    Fetch { warning_ids: Vec<i64>, page: Page },
    Group { status_ids: Vec<i64>, select_for_date: bool },
    Options { order_ids: Vec<i64> },
    StatusTimes { keys: usize },
}

#[derive(Default)]
pub struct ScriptedStore {
    pub unpaid: Script,
    pub bad_review: Script,
    pub exceeded_price: Script,
    pub warning_status: Script,
    pub groups: HashMap<Vec<i64>, Script>,
    pub total: u64,
    pub rows: Vec<RawOrder>,
    pub fail_count: bool,
    pub options: HashMap<i64, Vec<OrderOption>>,
    pub status_times: HashMap<StatusTimeKey, i64>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criterion answers in the order unpaid, bad review, price, status
    pub fn with_criteria(mut self, scripts: [Script; 4]) -> Self {
        let [unpaid, bad_review, exceeded_price, warning_status] = scripts;
        self.unpaid = unpaid;
        self.bad_review = bad_review;
        self.exceeded_price = exceeded_price;
        self.warning_status = warning_status;
        self
    }

    pub fn with_group(mut self, group: StatusGroup, ids: Vec<i64>) -> Self {
        self.groups
            .insert(group.status_ids().to_vec(), Script::Ids(ids));
        self
    }

    pub fn with_failing_group(mut self, group: StatusGroup) -> Self {
        self.groups.insert(group.status_ids().to_vec(), Script::Fail);
        self
    }

    pub fn with_listing(mut self, total: u64, rows: Vec<RawOrder>) -> Self {
        self.total = total;
        self.rows = rows;
        self
    }

    pub fn with_failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl OrderStore for ScriptedStore {
    async fn fetch_unpaid(&self, filter: &UnpaidFilter) -> DeskResult<Vec<i64>> {
        self.record(Call::Unpaid {
            select_for_date: filter.base.select_for_date,
        });
        self.unpaid.run("unpaid").await
    }

    async fn fetch_bad_review(&self, filter: &BadReviewFilter) -> DeskResult<Vec<i64>> {
        self.record(Call::BadReview {
            select_for_date: filter.base.select_for_date,
        });
        self.bad_review.run("bad review").await
    }

    async fn fetch_exceeded_price(&self, filter: &ExceededPriceFilter) -> DeskResult<Vec<i64>> {
        self.record(Call::ExceededPrice {
            select_for_date: filter.base.select_for_date,
        });
        self.exceeded_price.run("exceeded price").await
    }

    async fn fetch_warning_status(&self, filter: &WarningStatusFilter) -> DeskResult<Vec<i64>> {
        self.record(Call::WarningStatus {
            select_for_date: filter.base.select_for_date,
        });
        self.warning_status.run("warning status").await
    }

    async fn count_orders(&self, _filter: &BaseFilter, warning_ids: &[i64]) -> DeskResult<u64> {
        self.record(Call::Count {
            warning_ids: warning_ids.to_vec(),
        });
        if self.fail_count {
            return Err(failure("count"));
        }
        Ok(self.total)
    }

    async fn fetch_orders(
        &self,
        _filter: &BaseFilter,
        warning_ids: &[i64],
        page: Page,
    ) -> DeskResult<Vec<RawOrder>> {
        self.record(Call::Fetch {
            warning_ids: warning_ids.to_vec(),
            page,
        });
        Ok(self.rows.clone())
    }

    async fn fetch_ids_by_status_group(&self, filter: &BaseFilter) -> DeskResult<Vec<i64>> {
        self.record(Call::Group {
            status_ids: filter.status_ids.clone(),
            select_for_date: filter.select_for_date,
        });
        match self.groups.get(&filter.status_ids) {
            Some(script) => script.run("group").await,
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_options(&self, order_ids: &[i64]) -> DeskResult<HashMap<i64, Vec<OrderOption>>> {
        self.record(Call::Options {
            order_ids: order_ids.to_vec(),
        });
        Ok(self
            .options
            .iter()
            .filter(|(id, _)| order_ids.contains(id))
            .map(|(id, opts)| (*id, opts.clone()))
            .collect())
    }

    async fn fetch_status_times(
        &self,
        keys: &[StatusTimeKey],
    ) -> DeskResult<HashMap<StatusTimeKey, i64>> {
        self.record(Call::StatusTimes { keys: keys.len() });
        Ok(self
            .status_times
            .iter()
            .filter(|(key, _)| keys.contains(key))
            .map(|(key, at)| (*key, *at))
            .collect())
    }
}
