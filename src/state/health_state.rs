use crate::config::database::Database;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct HealthState {
    pub database: Option<Arc<Database>>,
    pub started_at: Instant,
}

impl HealthState {
    pub fn new(database: Option<Arc<Database>>) -> Self {
        Self {
            database,
            started_at: Instant::now(),
        }
    }
}
