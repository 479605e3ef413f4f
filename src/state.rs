use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{DbPool, OrmConn};
use crate::middleware::rate_limit::RateLimiter;

/// Which of the two near-identical apps a binary is serving. Branding and
/// entity routes differ; everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppVariant {
    DogEvents,
    EmployeeDirectory,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub limiter: Arc<RateLimiter>,
    pub variant: AppVariant,
}
