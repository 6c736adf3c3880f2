mod common;

use async_trait::async_trait;
use common::MockLmsApi;
use gocanvas_client::api::{ApiClient, LmsApi, Role};
use gocanvas_client::components::calendar::{semester_matches, semester_options};
use gocanvas_client::components::calendar::time::SemesterRangeOptions;
use gocanvas_client::config::Config;
use gocanvas_client::context::AppContext;
use gocanvas_client::error::{storage_error, ClientResult, Error};
use gocanvas_client::storage::{keys, FileStore, KeyValueStore, MemoryStore};
use std::sync::Arc;

/// Store whose writes always fail
struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> ClientResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, key: &str, _value: String) -> ClientResult<()> {
        Err(storage_error(&format!("Cannot write {}", key)))
    }

    async fn remove(&self, _key: &str) -> ClientResult<()> {
        Ok(())
    }
}

/// Smoke test to verify that a config can be built for a server
#[tokio::test]
async fn test_config_for_server() {
    let config = Config::with_base_url(" https://lms.example.edu/api// ").unwrap();
    assert_eq!(config.api_base_url, "https://lms.example.edu/api");
    assert!(config.is_panel_enabled("calendar"));
    assert!(config.credentials().is_none());

    let context = AppContext::new(Arc::new(MemoryStore::new()));
    let client = ApiClient::new(&config, context).unwrap();
    assert_eq!(client.base_url(), "https://lms.example.edu/api");

    assert!(matches!(Config::with_base_url("   "), Err(Error::Config(_))));
}

#[tokio::test]
async fn test_login_then_restore_from_file_store() {
    let path = std::env::temp_dir().join(format!("gocanvas-smoke-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let api = MockLmsApi::new();
    assert_eq!(api.login("ann", "wrong").await.unwrap_err().status(), Some(401));
    let token = api.login("ann", "secret").await.unwrap();

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&path));
    let context = AppContext::restore(Arc::clone(&store)).await.unwrap();
    assert!(!context.is_signed_in().await);

    // Not a JWT, so the role cannot be read
    let role = context.sign_in(token.access_token.clone()).await.unwrap();
    assert_eq!(role, Role::Unknown);
    context.select_course(Some(42)).await.unwrap();

    let restored = AppContext::restore(Arc::new(FileStore::new(&path))).await.unwrap();
    assert_eq!(restored.token().await, Some(token.access_token));
    assert_eq!(restored.selected_course().await, Some(42));

    restored.sign_out().await.unwrap();
    let cleared = FileStore::new(&path);
    assert_eq!(cleared.get(keys::AUTH_TOKEN).await.unwrap(), None);
    assert_eq!(cleared.get(keys::SELECTED_COURSE).await.unwrap(), None);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_failed_persist_leaves_context_signed_out() {
    let context = AppContext::new(Arc::new(ReadOnlyStore));
    let err = context.sign_in("abc".to_string()).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(!context.is_signed_in().await);
    assert!(context.select_course(Some(1)).await.is_err());
    assert_eq!(context.selected_course().await, None);
}

#[test]
fn test_semester_helpers() {
    let today = chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let options = semester_options(today, SemesterRangeOptions::default());
    assert_eq!(options.len(), 12);
    assert!(options.iter().any(|code| semester_matches(code, "SUMMER25")));
}
