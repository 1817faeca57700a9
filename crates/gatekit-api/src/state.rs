use gatekit_core::services::{AuthService, SessionStore};
use gatekit_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub sessions: SessionStore,
    pub config: AppConfig,
}
