pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use crate::services::{
    attempt_service::AttemptService,
    session_service::{SessionService, ValidityPolicy},
    test_service::TestService,
};
use crate::store::memory::{AttemptStore, TestStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub test_service: TestService,
    pub attempt_service: AttemptService,
    pub session_service: SessionService,
}

impl AppState {
    pub fn new() -> Self {
        let config = crate::config::get_config();
        let tests = Arc::new(TestStore::new());
        let attempts = Arc::new(AttemptStore::new());

        let test_service = TestService::new(tests.clone());
        let session_service =
            SessionService::new(attempts.clone(), ValidityPolicy::from_config(config));
        let attempt_service = AttemptService::new(tests, attempts, session_service.clone());

        Self {
            test_service,
            attempt_service,
            session_service,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
