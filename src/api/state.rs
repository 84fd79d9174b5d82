use std::sync::Arc;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::notify::Notifier;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config,
            notifier,
        }
    }
}
