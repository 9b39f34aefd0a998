// ABOUTME: Integration tests for the push pipeline.
// ABOUTME: Full scenarios against the mock platform, plus failure taxonomy.

mod support;

use anevazo::api::AppConfiguration;
use anevazo::config::Budgets;
use anevazo::output::{Output, OutputMode};
use anevazo::push::{PushError, PushParams, PushPipeline, SourceSpec};
use anevazo::types::ImageRef;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use support::MockPlatform;

fn fast_budgets() -> Budgets {
    Budgets {
        staging_attempts: 5,
        ready_attempts: 5,
        poll_delay: Duration::from_millis(1),
        ..Budgets::default()
    }
}

fn pipeline(platform: Arc<MockPlatform>) -> PushPipeline<MockPlatform> {
    PushPipeline::new(
        platform,
        "workspace",
        &fast_budgets(),
        Output::new(OutputMode::Quiet),
    )
}

fn params(name: &str, source: SourceSpec) -> PushParams {
    PushParams {
        name: name.to_string(),
        source,
        builder_image: ImageRef::parse("paketobuildpacks/builder:base").unwrap(),
        configuration: AppConfiguration::default(),
    }
}

fn source_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("main.py")).unwrap();
    writeln!(file, "print('hello')").unwrap();
    dir
}

#[tokio::test]
async fn push_from_local_path_runs_all_stages_in_order() {
    let platform = Arc::new({
        let mut p = MockPlatform::new();
        p.staging_polls_until_success = 3;
        p.route = "demo.example.com".to_string();
        p
    });
    let dir = source_dir();

    let route = pipeline(platform.clone())
        .push(params(
            "demo",
            SourceSpec::Archive(dir.path().to_path_buf()),
        ))
        .await
        .unwrap();

    assert_eq!(route.as_str(), "demo.example.com");
    assert_eq!(platform.staging_poll_count(), 3);
    assert_eq!(platform.ready_poll_count(), 1);

    let calls = platform.recorded();
    let relevant: Vec<&str> = calls
        .iter()
        .map(String::as_str)
        .filter(|c| {
            !c.starts_with("staging_status") && !c.starts_with("running") && *c != "staging_logs"
        })
        .collect();
    assert_eq!(
        relevant,
        vec![
            "create:demo",
            "upload",
            "stage:b1",
            "deploy:registry.local/demo:s1:s1",
        ]
    );
}

#[tokio::test]
async fn existing_name_recovers_through_update() {
    let platform = Arc::new({
        let mut p = MockPlatform::new();
        p.conflict_on_create = true;
        p
    });

    let route = pipeline(platform.clone())
        .push(params(
            "demo",
            SourceSpec::Image(ImageRef::parse("registry.example.com/demo:2").unwrap()),
        ))
        .await
        .unwrap();

    assert_eq!(route.as_str(), "demo.example.com");

    let calls = platform.recorded();
    let create = calls.iter().position(|c| c == "create:demo").unwrap();
    let update = calls.iter().position(|c| c == "update:demo").unwrap();
    assert!(create < update);
}

#[tokio::test]
async fn prebuilt_image_skips_source_and_staging() {
    let platform = Arc::new(MockPlatform::new());

    pipeline(platform.clone())
        .push(params(
            "demo",
            SourceSpec::Image(ImageRef::parse("registry.example.com/demo:2").unwrap()),
        ))
        .await
        .unwrap();

    let calls = platform.recorded();
    assert!(!calls.iter().any(|c| c == "upload"));
    assert!(!calls.iter().any(|c| c.starts_with("stage:")));
    assert!(
        calls
            .iter()
            .any(|c| c == "deploy:registry.example.com/demo:2:-"),
        "deploy should carry the caller's image and no stage: {calls:?}"
    );
}

#[tokio::test]
async fn git_source_imports_and_stages() {
    let platform = Arc::new(MockPlatform::new());

    pipeline(platform.clone())
        .push(params(
            "demo",
            SourceSpec::Git {
                url: "https://git.example.com/demo.git".to_string(),
                revision: "v3".to_string(),
            },
        ))
        .await
        .unwrap();

    let calls = platform.recorded();
    assert!(
        calls
            .iter()
            .any(|c| c == "import:https://git.example.com/demo.git@v3")
    );
    assert!(calls.iter().any(|c| c == "stage:b-git"));
}

#[tokio::test]
async fn invalid_name_fails_before_any_remote_call() {
    let platform = Arc::new(MockPlatform::new());
    let dir = source_dir();

    let err = pipeline(platform.clone())
        .push(params(
            "Not_A_Label",
            SourceSpec::Archive(dir.path().to_path_buf()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, PushError::InvalidName { .. }));
    assert!(platform.recorded().is_empty());
}

#[tokio::test]
async fn definitive_staging_failure_is_not_a_timeout() {
    let platform = Arc::new({
        let mut p = MockPlatform::new();
        p.staging_failure = Some("buildpack detect failed".to_string());
        p
    });
    let dir = source_dir();

    let err = pipeline(platform)
        .push(params("demo", SourceSpec::Archive(dir.path().to_path_buf())))
        .await
        .unwrap_err();

    match err {
        PushError::StagingFailed { reason } => assert!(reason.contains("detect")),
        other => panic!("expected a staging failure, got {other}"),
    }
}

#[tokio::test]
async fn exhausted_staging_budget_is_a_timeout() {
    let platform = Arc::new({
        let mut p = MockPlatform::new();
        p.staging_polls_until_success = 100;
        p
    });
    let dir = source_dir();

    let err = pipeline(platform.clone())
        .push(params("demo", SourceSpec::Archive(dir.path().to_path_buf())))
        .await
        .unwrap_err();

    match err {
        PushError::StagingTimeout { attempts, .. } => assert_eq!(attempts, 5),
        other => panic!("expected a staging timeout, got {other}"),
    }
    assert_eq!(platform.staging_poll_count(), 5);
}

#[tokio::test]
async fn exhausted_readiness_budget_is_a_distinct_timeout() {
    let platform = Arc::new({
        let mut p = MockPlatform::new();
        p.ready_polls_until_success = 100;
        p
    });

    let err = pipeline(platform)
        .push(params(
            "demo",
            SourceSpec::Image(ImageRef::parse("registry.example.com/demo:2").unwrap()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, PushError::ReadyTimeout { attempts: 5, .. }));
}

/// The state machine's type signatures, checked at compile time. Never
/// called.
#[test]
fn push_transition_signatures_compile() {
    use anevazo::api::{BuildOps, SourceOps, WorkloadOps};
    use anevazo::push::{Created, Deployed, Push, SourceAcquired, Staged, Validated};
    use anevazo::types::Route;
    use std::path::Path;

    #[allow(dead_code)]
    async fn check_signatures<C: WorkloadOps + BuildOps + SourceOps>(
        client: &C,
        archive: &Path,
        builder: &ImageRef,
    ) {
        let p1: Push<Validated> =
            Push::validate("demo", "workspace", AppConfiguration::default()).unwrap();
        let p2: Push<Created> = p1.create_or_update(client).await.unwrap();
        let p3: Push<SourceAcquired> = p2.upload(client, archive).await.unwrap();
        let p4: Push<Staged> = p3.stage(client, builder).await.unwrap();
        let p5: Push<Deployed> = p4.deploy(client).await.unwrap();
        let _route: Route = p5.finish();
    }

    #[allow(dead_code)]
    async fn check_image_shortcut<C: WorkloadOps>(client: &C, image: ImageRef) {
        let p1 = Push::validate("demo", "workspace", AppConfiguration::default()).unwrap();
        let p2 = p1.create_or_update(client).await.unwrap();
        let p3: Push<Staged> = p2.with_image(image);
        let _p4: Push<Deployed> = p3.deploy(client).await.unwrap();
    }
}
