//! HTTP transport for the order board
//!
//! Thin axum layer: [`dto`] parses and validates the request body,
//! [`handlers`] call the [`OrderBoard`](crate::board::OrderBoard) under the
//! request deadline, [`router`] wires the routes, and [`ServerBuilder`]
//! assembles and serves it all.

pub mod builder;
pub mod dto;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use dto::{OrderRequest, ValidatedJson};
pub use handlers::AppState;
pub use router::build_order_routes;
