//! Route table for the order board

use crate::server::handlers::{
    AppState, bad_review_orders, exceeded_price_orders, health, order_tabs, orders_by_group,
    orders_overview, unpaid_orders, warning_orders, warning_status_orders,
};
use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the order routes
///
/// - POST /orders - listing and tabs together
/// - POST /orders/by-group - one tab's page
/// - POST /orders/tabs - per-tab counts and signal ids
/// - POST /orders/warning - union of every attention criterion
/// - POST /orders/unpaid, /orders/bad-review, /orders/realtime-price-more,
///   /orders/warning-status - one criterion each
/// - GET /health
pub fn build_order_routes(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(orders_overview))
        .route("/orders/by-group", post(orders_by_group))
        .route("/orders/tabs", post(order_tabs))
        .route("/orders/warning", post(warning_orders))
        .route("/orders/unpaid", post(unpaid_orders))
        .route("/orders/bad-review", post(bad_review_orders))
        .route("/orders/realtime-price-more", post(exceeded_price_orders))
        .route("/orders/warning-status", post(warning_status_orders))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
