//! HTTP handlers for the order board
//!
//! Every handler takes the same [`OrderRequest`] body, converts it into a
//! [`WarningFilter`](crate::core::WarningFilter) and runs one board
//! operation under the configured request deadline.

use crate::board::{Criterion, OrderBoard, StatusGroup};
use crate::config::DeskConfig;
use crate::core::error::{DeskError, DeskResult, StorageError};
use crate::presentation::PreparedOrder;
use crate::server::dto::{OrderRequest, ValidatedJson};
use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub board: OrderBoard,
    pub config: Arc<DeskConfig>,
}

impl AppState {
    pub fn new(board: OrderBoard, config: DeskConfig) -> Self {
        Self {
            board,
            config: Arc::new(config),
        }
    }

    /// Run `operation` under the request deadline, if one is configured
    ///
    /// Dropping the future on expiry cancels every branch still in flight.
    async fn within_deadline<T, F>(&self, operation: &str, fut: F) -> DeskResult<T>
    where
        F: Future<Output = DeskResult<T>>,
    {
        match self.config.server.request_timeout() {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        operation,
                        timeout_ms = limit.as_millis() as u64,
                        "deadline exceeded"
                    );
                    Err(DeskError::Storage(StorageError::Timeout {
                        operation: operation.to_string(),
                    }))
                }
            },
            None => fut.await,
        }
    }
}

/// Body of `POST /orders/by-group`
#[derive(Debug, Serialize)]
pub struct GroupListingResponse {
    pub total_count: u64,
    pub orders: Vec<PreparedOrder>,
    pub page: u32,
    pub page_size: u32,
}

/// Body of `POST /orders/tabs`
#[derive(Debug, Serialize)]
pub struct TabsResponse {
    pub order_counts: BTreeMap<StatusGroup, usize>,
    pub orders_for_signal: BTreeMap<StatusGroup, Vec<i64>>,
}

/// Body of `POST /orders`, in the dispatcher UI's key style
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub order_total_count: u64,
    pub orders_for_signal: BTreeMap<StatusGroup, Vec<i64>>,
    pub order_counts: BTreeMap<StatusGroup, usize>,
    pub count_per_page: u32,
    pub orders: Vec<PreparedOrder>,
}

async fn criterion_ids(
    state: &AppState,
    criterion: Criterion,
    req: &OrderRequest,
) -> DeskResult<Vec<i64>> {
    let filter = req.to_filter()?;
    state
        .within_deadline(criterion.name(), state.board.criterion_orders(criterion, &filter))
        .await
}

/// POST /orders/unpaid
pub async fn unpaid_orders(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<Value>, DeskError> {
    let ids = criterion_ids(&state, Criterion::Unpaid, &req).await?;
    Ok(Json(json!({ "unpaid_order_ids": ids })))
}

/// POST /orders/bad-review
pub async fn bad_review_orders(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<Value>, DeskError> {
    let ids = criterion_ids(&state, Criterion::BadReview, &req).await?;
    Ok(Json(json!({ "bad_review_ids": ids })))
}

/// POST /orders/realtime-price-more
pub async fn exceeded_price_orders(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<Value>, DeskError> {
    let ids = criterion_ids(&state, Criterion::ExceededPrice, &req).await?;
    Ok(Json(json!({ "price_ids": ids })))
}

/// POST /orders/warning-status
pub async fn warning_status_orders(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<Value>, DeskError> {
    let ids = criterion_ids(&state, Criterion::WarningStatus, &req).await?;
    Ok(Json(json!({ "warning_status_ids": ids })))
}

/// POST /orders/warning
pub async fn warning_orders(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<Value>, DeskError> {
    let filter = req.to_filter()?;
    let ids = state
        .within_deadline("warning orders", state.board.warning_orders(&filter))
        .await?;
    Ok(Json(json!({ "warning_order_ids": ids })))
}

/// POST /orders/by-group
pub async fn orders_by_group(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<GroupListingResponse>, DeskError> {
    let filter = req.to_filter()?;
    let page = req.page(&state.config.pagination);
    let listing = state
        .within_deadline(
            "orders by group",
            state.board.prepared_orders_by_group(&filter, page),
        )
        .await?;

    Ok(Json(GroupListingResponse {
        total_count: listing.total_count,
        orders: listing.orders,
        page: listing.page,
        page_size: listing.page_size,
    }))
}

/// POST /orders/tabs
pub async fn order_tabs(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<TabsResponse>, DeskError> {
    let filter = req.to_filter()?;
    let tabs = state
        .within_deadline("order tabs", state.board.tabs(&filter))
        .await?;

    Ok(Json(TabsResponse {
        order_counts: tabs.order_counts,
        orders_for_signal: tabs.orders_for_signal,
    }))
}

/// POST /orders
pub async fn orders_overview(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OrderRequest>,
) -> Result<Json<OverviewResponse>, DeskError> {
    let filter = req.to_filter()?;
    let page = req.page(&state.config.pagination);
    let overview = state
        .within_deadline("orders overview", state.board.overview(&filter, page))
        .await?;

    Ok(Json(OverviewResponse {
        order_total_count: overview.listing.total_count,
        orders_for_signal: overview.tabs.orders_for_signal,
        order_counts: overview.tabs.order_counts,
        count_per_page: overview.listing.page_size,
        orders: overview.listing.orders,
    }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
