use database::services::AccountPolicy;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub policy: Arc<AccountPolicy>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, policy: AccountPolicy) -> Self {
        Self {
            db,
            policy: Arc::new(policy),
        }
    }
}
