//! Test utilities for handler tests
use std::sync::Arc;

use axum_test::TestServer;

use crate::{Application, config::Config, store::MockContentStore};

/// A config with the required GitHub settings filled in.
pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        github_token: Some("test-token".to_string()),
        repo_owner: Some("octo".to_string()),
        repo_name: Some("maps".to_string()),
        ..Config::default()
    }
}

/// Build a test server around a mock content store, returning both so tests
/// can queue responses and inspect recorded calls.
pub fn create_test_app(config: Config) -> (TestServer, MockContentStore) {
    let mock = MockContentStore::new();
    let app = Application::new_with_store(config, Arc::new(mock.clone()));
    (app.into_test_server(), mock)
}
