mod models;
mod repository;

pub use models::{LedgerEntry, NewLedgerEntry, Wallet};
pub use repository::LedgerStore;
