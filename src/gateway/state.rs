use crate::db::Database;
use crate::service::WalletService;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Transfers and ledger reads
    pub service: WalletService,
    /// Health probe
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database, service: WalletService) -> Self {
        Self { service, db }
    }
}
