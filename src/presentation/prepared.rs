//! Display-ready orders

use crate::core::order::{OrderOption, RawOrder, StatusTimeKey};
use crate::presentation::address::{AddressEntry, decode_address};
use crate::presentation::formatted::{FormattedOrder, format_order};
use crate::presentation::tables::{DisplayColor, category, device_label};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const SORTABLE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const SHORT_DATE_FORMAT: &str = "%d.%m.%y %H:%M";

/// Records identified by their order id
pub trait OrderKeyed {
    fn order_id(&self) -> i64;
}

impl OrderKeyed for RawOrder {
    fn order_id(&self) -> i64 {
        self.order_id
    }
}

impl OrderKeyed for FormattedOrder {
    fn order_id(&self) -> i64 {
        self.order_id
    }
}

/// A formatted order plus everything the dispatcher list renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedOrder {
    #[serde(flatten)]
    pub order: FormattedOrder,
    pub category: String,
    pub color: DisplayColor,
    pub device_label: String,
    /// When the order entered its current status
    pub status_changed_at: i64,
    pub address: Vec<AddressEntry>,
    pub display_order_number: String,
    /// Order time shifted by the city's UTC offset
    pub display_order_time: Option<i64>,
    pub order_date: Option<String>,
    pub order_date_short: Option<String>,
}

impl OrderKeyed for PreparedOrder {
    fn order_id(&self) -> i64 {
        self.order.order_id
    }
}

/// Keep the first record per order id, preserving order
///
/// Applying it twice is the same as applying it once.
pub fn dedup_by_order_id<T: OrderKeyed>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.order_id()))
        .collect()
}

/// `(order, status)` keys to look up in the status history
pub fn status_time_keys<T>(orders: &[T]) -> Vec<StatusTimeKey>
where
    T: OrderKeyed + HasStatus,
{
    orders
        .iter()
        .map(|o| StatusTimeKey::new(o.order_id(), o.status_id()))
        .collect()
}

pub trait HasStatus {
    fn status_id(&self) -> i64;
}

impl HasStatus for RawOrder {
    fn status_id(&self) -> i64 {
        self.status_id
    }
}

impl HasStatus for FormattedOrder {
    fn status_id(&self) -> i64 {
        self.status_id
    }
}

/// Order code when set, else the numeric order number
pub fn display_order_number(order_code: Option<&str>, order_number: i64) -> String {
    match order_code.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => order_number.to_string(),
    }
}

/// Sortable and short date strings for an epoch time
pub fn date_strings(ts: i64) -> Option<(String, String)> {
    let dt = DateTime::<Utc>::from_timestamp(ts, 0)?;
    Some((
        dt.format(SORTABLE_DATE_FORMAT).to_string(),
        dt.format(SHORT_DATE_FORMAT).to_string(),
    ))
}

/// Enrich one formatted order
pub fn prepare_order(
    order: FormattedOrder,
    status_times: &HashMap<StatusTimeKey, i64>,
) -> PreparedOrder {
    let status_changed_at = status_times
        .get(&StatusTimeKey::new(order.order_id, order.status_id))
        .copied()
        .unwrap_or(order.status_time);
    let address = order
        .address_payload
        .as_deref()
        .map(decode_address)
        .unwrap_or_default();
    let display_order_time = order
        .order_time
        .map(|t| t.saturating_sub(order.time_offset.unwrap_or(0)));
    let (order_date, order_date_short) = match display_order_time.and_then(date_strings) {
        Some((sortable, short)) => (Some(sortable), Some(short)),
        None => (None, None),
    };

    PreparedOrder {
        category: category(order.status_id).to_string(),
        color: DisplayColor::for_status(order.status_id),
        device_label: device_label(order.device.as_deref()).to_string(),
        status_changed_at,
        address,
        display_order_number: display_order_number(order.order_code.as_deref(), order.order_number),
        display_order_time,
        order_date,
        order_date_short,
        order,
    }
}

/// Full mapping of one fetched page: format, dedup, enrich
pub fn prepare_page(
    orders: Vec<RawOrder>,
    options: &HashMap<i64, Vec<OrderOption>>,
    status_times: &HashMap<StatusTimeKey, i64>,
) -> Vec<PreparedOrder> {
    let formatted = orders
        .into_iter()
        .map(|raw| {
            let opts = options.get(&raw.order_id).cloned().unwrap_or_default();
            format_order(raw, opts)
        })
        .collect();

    dedup_by_order_id(formatted)
        .into_iter()
        .map(|order| prepare_order(order, status_times))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(order_id: i64, status_id: i64) -> RawOrder {
        RawOrder {
            order_id,
            status_id,
            status_time: 1_000,
            order_number: 500 + order_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let once = dedup_by_order_id(vec![raw(1, 1), raw(2, 1), raw(1, 2), raw(3, 1)]);
        let ids: Vec<i64> = once.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // first occurrence wins
        assert_eq!(once[0].status_id, 1);

        let twice = dedup_by_order_id(once.clone());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_status_time_falls_back_to_row() {
        let mut history = HashMap::new();
        history.insert(StatusTimeKey::new(1, 10), 777);

        let hit = prepare_order(format_order(raw(1, 10), vec![]), &history);
        assert_eq!(hit.status_changed_at, 777);

        let miss = prepare_order(format_order(raw(2, 10), vec![]), &history);
        assert_eq!(miss.status_changed_at, 1_000);
    }

    #[test]
    fn test_display_order_number() {
        assert_eq!(display_order_number(Some("A-17"), 17), "A-17");
        assert_eq!(display_order_number(Some(""), 17), "17");
        assert_eq!(display_order_number(None, 17), "17");
    }

    #[test]
    fn test_order_time_shifted_by_offset() {
        let order = RawOrder {
            order_time: Some(1_700_000_000),
            time_offset: Some(3 * 3600),
            ..raw(1, 1)
        };
        let prepared = prepare_order(format_order(order, vec![]), &HashMap::new());

        assert_eq!(prepared.display_order_time, Some(1_700_000_000 - 10_800));
        assert_eq!(prepared.order_date.as_deref(), Some("2023-11-14 19:13:20"));
        assert_eq!(prepared.order_date_short.as_deref(), Some("14.11.23 19:13"));
    }

    #[test]
    fn test_missing_order_time_has_no_dates() {
        let prepared = prepare_order(format_order(raw(1, 1), vec![]), &HashMap::new());
        assert!(prepared.display_order_time.is_none());
        assert!(prepared.order_date.is_none());
    }

    #[test]
    fn test_prepare_page_attaches_options_and_tables() {
        let mut options = HashMap::new();
        options.insert(
            2,
            vec![OrderOption {
                order_id: 2,
                option_id: 1,
                name: "Conditioner".to_string(),
                price: None,
            }],
        );
        let page = prepare_page(
            vec![raw(2, 10), raw(2, 10), raw(3, 1)],
            &options,
            &HashMap::new(),
        );

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].order.options.len(), 1);
        assert_eq!(page[0].category, "warning");
        assert_eq!(page[0].color, DisplayColor::Red);
        assert_eq!(page[1].category, "new");
        assert_eq!(page[1].color, DisplayColor::Black);
        assert!(page[1].address.is_empty());
    }

    #[test]
    fn test_prepared_serializes_flat_with_decoded_address() {
        let prepared = prepare_order(format_order(raw(4, 1), vec![]), &HashMap::new());
        let json = serde_json::to_value(&prepared).unwrap();
        assert_eq!(json["order_id"], 4);
        assert_eq!(json["display_order_number"], "504");
        assert!(json["address"].as_array().unwrap().is_empty());
        assert_eq!(json["status"]["status_id"], 1);
    }
}
