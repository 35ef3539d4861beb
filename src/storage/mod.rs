//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mysql")]
pub mod mysql;

pub use in_memory::{InMemoryOrderStore, StoredOrder};
#[cfg(feature = "mysql")]
pub use mysql::MysqlOrderStore;
