mod models;
mod repository;
mod service;

pub use models::{Deposit, NewDeposit};
pub use repository::DepositRepository;
pub use service::DepositService;
