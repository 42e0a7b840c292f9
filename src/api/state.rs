use std::sync::Arc;

use crate::config::AppConfig;
use crate::dashboard::Dashboard;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    pub config: Arc<AppConfig>,
}
