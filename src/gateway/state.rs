use std::sync::Arc;

use crate::db::Database;
use crate::service::BankService;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<BankService>,
    /// PostgreSQL pool for health checks, absent when serving a test double
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(bank: Arc<BankService>, db: Option<Arc<Database>>) -> Self {
        Self { bank, db }
    }
}
