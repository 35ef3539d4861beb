//! Typed projection of a raw order row

use crate::core::order::{OrderOption, RawOrder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub status_id: i64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: i64,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub second_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub worker_id: i64,
    pub callsign: Option<i64>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub second_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarInfo {
    pub car_id: i64,
    pub name: Option<String>,
    pub color: Option<i64>,
    pub gos_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffInfo {
    pub tariff_id: i64,
    pub tariff_type: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub currency_id: i64,
    pub name: Option<String>,
    pub code: Option<String>,
    pub symbol: Option<String>,
}

/// The dispatcher who created the order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub second_name: Option<String>,
}

/// An order with nullable columns as options and joined entities nested
///
/// Worker, car and creator are absent when the order has no such link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedOrder {
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
    pub comment: Option<String>,
    /// Resolved display price
    pub predv_price: f64,
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
    pub summary_cost: Option<String>,
    pub summary_cost_no_discount: Option<String>,

    pub status: StatusInfo,
    pub client: ClientInfo,
    pub worker: Option<WorkerInfo>,
    pub car: Option<CarInfo>,
    pub tariff: TariffInfo,
    pub currency: CurrencyInfo,
    pub user_created: Option<UserInfo>,
    pub options: Vec<OrderOption>,

    /// Serialized address payload, decoded during preparation
    #[serde(skip)]
    pub address_payload: Option<String>,
}

/// Summary cost if it parses as a finite number, else the estimate, else zero
pub fn display_price(summary_cost: Option<&str>, predv_price: Option<f64>) -> f64 {
    summary_cost
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .or(predv_price)
        .unwrap_or(0.0)
}

/// Project one raw row; `options` are attached as given
pub fn format_order(raw: RawOrder, options: Vec<OrderOption>) -> FormattedOrder {
    let predv_price = display_price(raw.summary_cost.as_deref(), raw.predv_price);

    let worker = raw.worker_id.map(|worker_id| WorkerInfo {
        worker_id,
        callsign: raw.worker_callsign,
        name: raw.worker_name,
        last_name: raw.worker_last_name,
        second_name: raw.worker_second_name,
        phone: raw.worker_phone,
    });
    let car = raw.car_id.map(|car_id| CarInfo {
        car_id,
        name: raw.car_name,
        color: raw.car_color,
        gos_number: raw.car_gos_number,
    });
    let user_created = raw.user_create.map(|user_id| UserInfo {
        user_id,
        name: raw.user_name,
        last_name: raw.user_last_name,
        second_name: raw.user_second_name,
    });

    FormattedOrder {
        order_id: raw.order_id,
        tenant_id: raw.tenant_id,
        worker_id: raw.worker_id,
        car_id: raw.car_id,
        city_id: raw.city_id,
        tariff_id: raw.tariff_id,
        user_create: raw.user_create,
        status_id: raw.status_id,
        user_modified: raw.user_modified,
        company_id: raw.company_id,
        parking_id: raw.parking_id,
        comment: raw.comment,
        predv_price,
        predv_price_no_discount: raw.predv_price_no_discount,
        device: raw.device,
        order_number: raw.order_number,
        payment: raw.payment,
        show_phone: raw.show_phone,
        create_time: raw.create_time,
        status_time: raw.status_time,
        time_to_client: raw.time_to_client,
        app_id: raw.app_id,
        order_time: raw.order_time,
        predv_distance: raw.predv_distance,
        predv_time: raw.predv_time,
        call_warning_id: raw.call_warning_id,
        phone: raw.phone,
        client_id: raw.client_id,
        bonus_payment: raw.bonus_payment,
        currency_id: raw.currency_id,
        time_offset: raw.time_offset,
        is_fix: raw.is_fix,
        update_time: raw.update_time,
        position_id: raw.position_id,
        promo_code_id: raw.promo_code_id,
        mark: raw.mark,
        client_passenger_phone: raw.client_passenger_phone,
        active: raw.active,
        is_pre_order: raw.is_pre_order,
        finish_time: raw.finish_time,
        comment_for_dispatcher: raw.comment_for_dispatcher,
        realtime_price: raw.realtime_price,
        order_code: raw.order_code,
        client_offered_price: raw.client_offered_price,
        initial_price: raw.initial_price,
        time_to_order: raw.time_to_order,
        summary_cost: raw.summary_cost,
        summary_cost_no_discount: raw.summary_cost_no_discount,
        status: StatusInfo {
            status_id: raw.status_id,
            name: raw.status_name,
        },
        client: ClientInfo {
            client_id: raw.client_id,
            phone: raw.client_phone,
            name: raw.client_name,
            last_name: raw.client_last_name,
            second_name: raw.client_second_name,
        },
        worker,
        car,
        tariff: TariffInfo {
            tariff_id: raw.tariff_id,
            tariff_type: raw.tariff_type,
            name: raw.tariff_name,
        },
        currency: CurrencyInfo {
            currency_id: raw.currency_id,
            name: raw.currency_name,
            code: raw.currency_code,
            symbol: raw.currency_symbol,
        },
        user_created,
        options,
        address_payload: raw.address,
    }
}
