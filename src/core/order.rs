//! Raw order records as read from storage
//!
//! [`RawOrder`] is the wide denormalized row joining an order with its status,
//! worker, client, car, tariff, cost detail, creating user and currency.
//! Every column of a secondary entity is nullable because all joins are outer
//! joins.

use serde::{Deserialize, Serialize};

/// One order joined with everything a dispatcher listing shows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mysql", derive(sqlx::FromRow))]
pub struct RawOrder {
    // tbl_order
    pub order_id: i64,
    pub tenant_id: i64,
    pub worker_id: Option<i64>,
    pub car_id: Option<i64>,
    pub city_id: Option<i64>,
    pub tariff_id: i64,
    pub user_create: Option<i64>,
    pub status_id: i64,
    pub user_modified: Option<i64>,
    pub company_id: Option<i64>,
    pub parking_id: Option<i64>,
    /// Serialized address payload (PHP `serialize` format)
    pub address: Option<String>,
    pub comment: Option<String>,
    pub predv_price: Option<f64>,
    pub predv_price_no_discount: Option<f64>,
    pub device: Option<String>,
    pub order_number: i64,
    pub payment: Option<String>,
    pub show_phone: Option<i64>,
    pub create_time: Option<i64>,
    pub status_time: i64,
    pub time_to_client: Option<i64>,
    pub app_id: Option<i64>,
    pub order_time: Option<i64>,
    pub predv_distance: Option<f64>,
    pub predv_time: Option<i64>,
    pub call_warning_id: Option<i64>,
    pub phone: Option<String>,
    pub client_id: i64,
    pub bonus_payment: Option<i64>,
    pub currency_id: i64,
    /// Offset of the order's city from UTC, in seconds
    pub time_offset: Option<i64>,
    pub is_fix: i64,
    pub update_time: Option<i64>,
    pub position_id: i64,
    pub promo_code_id: Option<i64>,
    pub mark: Option<i64>,
    pub client_passenger_phone: Option<String>,
    pub active: Option<i64>,
    pub is_pre_order: Option<i64>,
    pub finish_time: Option<i64>,
    pub comment_for_dispatcher: Option<String>,
    pub realtime_price: Option<f64>,
    pub order_code: Option<String>,
    pub client_offered_price: Option<f64>,
    pub initial_price: Option<f64>,
    pub time_to_order: Option<i64>,

    // tbl_order_detail_cost
    pub summary_cost: Option<String>,
    pub summary_cost_no_discount: Option<String>,

    // tbl_order_status
    pub status_name: Option<String>,

    // tbl_worker
    pub worker_callsign: Option<i64>,
    pub worker_name: Option<String>,
    pub worker_last_name: Option<String>,
    pub worker_second_name: Option<String>,
    pub worker_phone: Option<String>,

    // tbl_client
    pub client_phone: Option<String>,
    pub client_name: Option<String>,
    pub client_last_name: Option<String>,
    pub client_second_name: Option<String>,

    // tbl_car
    pub car_name: Option<String>,
    pub car_color: Option<i64>,
    pub car_gos_number: Option<String>,

    // tbl_taxi_tariff
    pub tariff_type: Option<String>,
    pub tariff_name: Option<String>,

    // tbl_user (creator)
    pub user_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_second_name: Option<String>,

    // tbl_currency
    pub currency_name: Option<String>,
    pub currency_code: Option<String>,
    pub currency_symbol: Option<String>,
}

/// An additional option ordered with a ride (child seat, luggage...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mysql", derive(sqlx::FromRow))]
pub struct OrderOption {
    pub order_id: i64,
    pub option_id: i64,
    pub name: String,
    pub price: Option<f64>,
}

/// Lookup key into the status-change history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusTimeKey {
    pub order_id: i64,
    pub status_id: i64,
}

impl StatusTimeKey {
    pub fn new(order_id: i64, status_id: i64) -> Self {
        Self {
            order_id,
            status_id,
        }
    }
}
