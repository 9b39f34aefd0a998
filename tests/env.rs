// ABOUTME: Integration tests for environment read-modify-write cycles.
// ABOUTME: Conflicts retry within the budget; exhaustion surfaces distinctly.

mod support;

use anevazo::application::{EnvError, env_list, env_set, env_unset};
use anevazo::retry::RetryPolicy;
use anevazo::types::{AppName, AppRef};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use support::MockPlatform;

fn app() -> AppRef {
    AppRef::new(AppName::new("demo").unwrap(), "workspace")
}

fn retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(1))
}

#[tokio::test]
async fn conflicting_writes_are_retried_until_they_land() {
    let platform = Arc::new(MockPlatform::new());
    platform.env_conflicts_remaining.store(2, Ordering::SeqCst);

    env_set(
        platform.as_ref(),
        &retry(5),
        &app(),
        &[("PORT".to_string(), "8080".to_string())],
        false,
    )
    .await
    .unwrap();

    let stores = platform
        .recorded()
        .iter()
        .filter(|c| *c == "env_store")
        .count();
    assert_eq!(stores, 3, "two conflicts then one successful write");

    let vars = env_list(platform.as_ref(), &app()).await.unwrap();
    assert_eq!(vars.get("PORT").map(String::as_str), Some("8080"));
}

#[tokio::test]
async fn conflict_budget_exhaustion_is_reported() {
    let platform = Arc::new(MockPlatform::new());
    platform.env_conflicts_remaining.store(100, Ordering::SeqCst);

    let err = env_set(
        platform.as_ref(),
        &retry(3),
        &app(),
        &[("PORT".to_string(), "8080".to_string())],
        false,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EnvError::Conflict { attempts: 3 }));
}

#[tokio::test]
async fn unset_removes_only_the_named_variable() {
    let platform = Arc::new(MockPlatform::new());
    env_set(
        platform.as_ref(),
        &retry(3),
        &app(),
        &[
            ("PORT".to_string(), "8080".to_string()),
            ("DEBUG".to_string(), "1".to_string()),
        ],
        false,
    )
    .await
    .unwrap();

    env_unset(platform.as_ref(), &retry(3), &app(), "DEBUG")
        .await
        .unwrap();

    let vars = env_list(platform.as_ref(), &app()).await.unwrap();
    assert!(vars.contains_key("PORT"));
    assert!(!vars.contains_key("DEBUG"));
}

#[tokio::test]
async fn replace_drops_variables_not_reassigned() {
    let platform = Arc::new(MockPlatform::new());
    env_set(
        platform.as_ref(),
        &retry(3),
        &app(),
        &[("OLD".to_string(), "1".to_string())],
        false,
    )
    .await
    .unwrap();

    env_set(
        platform.as_ref(),
        &retry(3),
        &app(),
        &[("NEW".to_string(), "2".to_string())],
        true,
    )
    .await
    .unwrap();

    let vars = env_list(platform.as_ref(), &app()).await.unwrap();
    assert!(!vars.contains_key("OLD"));
    assert_eq!(vars.get("NEW").map(String::as_str), Some("2"));
}
