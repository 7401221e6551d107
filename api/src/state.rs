use std::sync::Arc;

use sqlx::PgPool;
use wallet_core::deposits::DepositService;
use wallet_core::withdrawals::WithdrawalService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub deposit_service: Arc<DepositService>,
    pub withdrawal_service: Arc<WithdrawalService>,
    pub auth_token: Arc<str>,
}
