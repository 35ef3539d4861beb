//! Raw rows to display-ready orders
//!
//! Three pure stages: [`format_order`] turns a raw row into a typed
//! [`FormattedOrder`], [`dedup_by_order_id`] drops repeated orders, and
//! [`prepare_order`] adds the category, colour, device label, resolved status
//! time, decoded address and display dates.

pub mod address;
pub mod formatted;
pub mod prepared;
pub mod tables;

pub use address::{AddressEntry, AddressKind, SerializedValue, decode_address};
pub use formatted::{FormattedOrder, display_price, format_order};
pub use prepared::{
    OrderKeyed, PreparedOrder, dedup_by_order_id, prepare_order, prepare_page, status_time_keys,
};
pub use tables::{DisplayColor, category, device_label};
