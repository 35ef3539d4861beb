//! Fixed display tables
//!
//! All tables are immutable statics; lookups fall back to a default on miss.

use crate::board::classifier::{NEW_STATUSES, PRE_ORDER_STATUSES, WARNING_STATUSES, WORKS_STATUSES};
use serde::{Deserialize, Serialize};

pub const COMPLETED_STATUSES: &[i64] = &[37, 38];

pub const REJECTED_STATUSES: &[i64] = &[39, 40, 41, 42, 43, 44, 49, 50, 51, 120, 121, 122];

/// Ordered status -> category table; the first table containing a status wins
pub static CATEGORY_TABLE: &[(&str, &[i64])] = &[
    ("new", NEW_STATUSES),
    ("works", WORKS_STATUSES),
    ("warning", WARNING_STATUSES),
    ("pre_order", PRE_ORDER_STATUSES),
    ("completed", COMPLETED_STATUSES),
    ("rejected", REJECTED_STATUSES),
];

/// Statuses highlighted in the listing
pub const ATTENTION_STATUSES: &[i64] = WARNING_STATUSES;

/// Device codes as stored on the order, with their display labels
pub static DEVICE_LABELS: &[(&str, &str)] = &[
    ("DISPATCHER", "Dispatcher"),
    ("IOS", "iOS app"),
    ("ANDROID", "Android app"),
    ("WEB", "Website"),
    ("CABINET", "Client cabinet"),
    ("WORKER", "Driver app"),
    ("HOSPITAL", "Corporate client"),
];

/// Category name for a status, or `""`
pub fn category(status_id: i64) -> &'static str {
    CATEGORY_TABLE
        .iter()
        .find(|(_, statuses)| statuses.contains(&status_id))
        .map(|(name, _)| *name)
        .unwrap_or("")
}

/// Row highlight colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayColor {
    Red,
    Black,
}

impl DisplayColor {
    pub fn for_status(status_id: i64) -> Self {
        if ATTENTION_STATUSES.contains(&status_id) {
            DisplayColor::Red
        } else {
            DisplayColor::Black
        }
    }
}

/// Display label for a device code, or `""`
pub fn device_label(device: Option<&str>) -> &'static str {
    let Some(device) = device else {
        return "";
    };
    DEVICE_LABELS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(device.trim()))
        .map(|(_, label)| *label)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_first_match_wins() {
        // 5 is both "new" and "warning"
        assert_eq!(category(5), "new");
        // 27 is both "works" and "warning"
        assert_eq!(category(27), "works");
        // 38 is both "warning" and "completed"
        assert_eq!(category(38), "warning");
        // 16 is both "warning" and "pre_order"
        assert_eq!(category(16), "warning");
        assert_eq!(category(37), "completed");
        assert_eq!(category(39), "rejected");
        assert_eq!(category(999), "");
    }

    #[test]
    fn test_color() {
        assert_eq!(DisplayColor::for_status(10), DisplayColor::Red);
        assert_eq!(DisplayColor::for_status(1), DisplayColor::Black);
        assert_eq!(serde_json::to_value(DisplayColor::Red).unwrap(), "red");
    }

    #[test]
    fn test_device_label() {
        assert_eq!(device_label(Some("IOS")), "iOS app");
        assert_eq!(device_label(Some("android")), "Android app");
        assert_eq!(device_label(Some("FAX")), "");
        assert_eq!(device_label(None), "");
    }
}
