pub mod config;
pub mod db;
pub mod deposits;
pub mod errors;
pub mod ledger;
pub mod telemetry;
pub mod withdrawals;

pub use errors::{CoreError, CoreResult};
