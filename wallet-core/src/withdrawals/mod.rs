mod bank;
mod models;
mod repository;
mod service;
mod worker;

pub use bank::{new_bank_client, BankClient, BankClientConfig, BankSignal, DummyBankClient};
pub use models::{BankType, NewWithdrawal, Withdrawal, WithdrawalStatus};
pub use repository::WithdrawalRepository;
pub use service::WithdrawalService;
pub use worker::{WorkerConfig, WorkerJob, WorkerPool};
