// ABOUTME: Push pipeline state machine and its transition methods.
// ABOUTME: Strictly sequential stages; polls bounded; tail always joined.

use super::error::PushError;
use super::source::{SourceSpec, package_source};
use super::state::{Created, Deployed, SourceAcquired, Staged, Validated};
use super::tail::LogTailCoordinator;
use crate::api::{
    ApiError, AppConfiguration, BuildOps, DeployRequest, SourceOps, StageRequest, StagingStatus,
    WorkloadOps,
};
use crate::config::Budgets;
use crate::output::Output;
use crate::retry::{RetryError, RetryPolicy};
use crate::types::{AppName, AppRef, BlobId, ImageRef, Route, StageId};
use std::path::Path;
use std::sync::Arc;

/// Caller input for one push.
#[derive(Debug, Clone)]
pub struct PushParams {
    pub name: String,
    pub source: SourceSpec,
    pub builder_image: ImageRef,
    pub configuration: AppConfiguration,
}

/// One application's push workflow, parameterized by its current state.
///
/// The state type parameter `S` carries the data each stage produced (blob,
/// stage id, image, route) directly in the state type, so a stage can only
/// read what an earlier stage actually wrote.
#[derive(Debug)]
pub struct Push<S> {
    app: AppRef,
    config: AppConfiguration,
    state: S,
}

impl<S> Push<S> {
    pub fn app(&self) -> &AppRef {
        &self.app
    }

    fn transition<T>(self, state: T) -> Push<T> {
        Push {
            app: self.app,
            config: self.config,
            state,
        }
    }
}

impl Push<Validated> {
    /// Validate the application identity. Runs before any remote call.
    pub fn validate(
        name: &str,
        namespace: &str,
        config: AppConfiguration,
    ) -> Result<Self, PushError> {
        let app_name = AppName::new(name).map_err(|source| PushError::InvalidName {
            name: name.to_string(),
            source,
        })?;
        Ok(Push {
            app: AppRef::new(app_name, namespace),
            config,
            state: Validated,
        })
    }

    /// Create the application resource; on a name conflict, update the
    /// existing resource with the same configuration instead.
    pub async fn create_or_update<C>(self, client: &C) -> Result<Push<Created>, PushError>
    where
        C: WorkloadOps + ?Sized,
    {
        match client.app_create(&self.app, &self.config).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                tracing::debug!(app = %self.app, "application exists, updating");
                client
                    .app_update(&self.app, &self.config)
                    .await
                    .map_err(|source| PushError::Update { source })?;
            }
            Err(source) => return Err(PushError::Create { source }),
        }
        Ok(self.transition(Created))
    }
}

impl Push<Created> {
    /// Upload a packaged archive; the platform stores it under a blob id.
    pub async fn upload<C>(self, client: &C, archive: &Path) -> Result<Push<SourceAcquired>, PushError>
    where
        C: SourceOps + ?Sized,
    {
        let blob = client
            .upload(&self.app, archive)
            .await
            .map_err(|source| PushError::Upload { source })?;
        Ok(self.transition(SourceAcquired { blob }))
    }

    /// Have the platform fetch source from git; yields a blob id like an
    /// upload does.
    pub async fn import_git<C>(
        self,
        client: &C,
        url: &str,
        revision: &str,
    ) -> Result<Push<SourceAcquired>, PushError>
    where
        C: SourceOps + ?Sized,
    {
        let blob = client
            .import_git(&self.app, url, revision)
            .await
            .map_err(|source| PushError::Import { source })?;
        Ok(self.transition(SourceAcquired { blob }))
    }

    /// Skip acquisition and staging: the caller already has an image.
    pub fn with_image(self, image: ImageRef) -> Push<Staged> {
        self.transition(Staged { image, stage: None })
    }
}

impl Push<SourceAcquired> {
    pub fn blob(&self) -> &BlobId {
        &self.state.blob
    }

    /// Submit the build request; records the stage to poll and the image
    /// the build will produce.
    pub async fn stage<C>(self, client: &C, builder: &ImageRef) -> Result<Push<Staged>, PushError>
    where
        C: BuildOps + ?Sized,
    {
        let request = StageRequest {
            app: self.app.clone(),
            blob: self.state.blob.clone(),
            builder_image: builder.clone(),
        };
        let response = client
            .app_stage(&request)
            .await
            .map_err(|source| PushError::Stage { source })?;
        Ok(self.transition(Staged {
            image: response.image,
            stage: Some(response.stage),
        }))
    }
}

impl Push<Staged> {
    pub fn stage_id(&self) -> Option<&StageId> {
        self.state.stage.as_ref()
    }

    /// Submit the deploy request with the built or caller-provided image.
    pub async fn deploy<C>(self, client: &C) -> Result<Push<Deployed>, PushError>
    where
        C: WorkloadOps + ?Sized,
    {
        let request = DeployRequest {
            app: self.app.clone(),
            image: self.state.image.clone(),
            stage: self.state.stage.clone(),
        };
        let response = client
            .app_deploy(&request)
            .await
            .map_err(|source| PushError::Deploy { source })?;
        Ok(self.transition(Deployed {
            route: response.route,
        }))
    }
}

impl Push<Deployed> {
    pub fn route(&self) -> &Route {
        &self.state.route
    }

    pub fn finish(self) -> Route {
        self.state.route
    }
}

/// Drives one application's build/deploy workflow end to end.
///
/// Single caller task; the only concurrency is the log tail task, which is
/// always stopped and joined before the pipeline acts on a poll result.
pub struct PushPipeline<C> {
    client: Arc<C>,
    namespace: String,
    staging_poll: RetryPolicy,
    ready_poll: RetryPolicy,
    output: Output,
}

impl<C> PushPipeline<C>
where
    C: WorkloadOps + BuildOps + SourceOps + Send + Sync + 'static,
{
    pub fn new(
        client: Arc<C>,
        namespace: impl Into<String>,
        budgets: &Budgets,
        output: Output,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            staging_poll: RetryPolicy::new(budgets.staging_attempts, budgets.poll_delay),
            ready_poll: RetryPolicy::new(budgets.ready_attempts, budgets.poll_delay),
            output,
        }
    }

    /// Run the whole workflow; returns the route the platform assigned.
    pub async fn push(&self, params: PushParams) -> Result<Route, PushError> {
        self.output.progress(&format!(
            "Pushing {} ({}) to namespace {}",
            params.name,
            params.source.describe(),
            self.namespace
        ));

        let push = Push::validate(&params.name, &self.namespace, params.configuration)?;

        self.output
            .progress("  → Creating the application resource...");
        let push = push.create_or_update(self.client.as_ref()).await?;

        let staged = match &params.source {
            SourceSpec::Image(image) => push.with_image(image.clone()),
            SourceSpec::Archive(path) => {
                self.output
                    .progress("  → Collecting and uploading the application sources...");
                let packaged = package_source(path)?;
                let push = push
                    .upload(self.client.as_ref(), packaged.archive_path())
                    .await?;
                self.run_stage(push, &params.builder_image).await?
            }
            SourceSpec::Git { url, revision } => {
                self.output
                    .progress("  → Importing the application sources from git...");
                let push = push
                    .import_git(self.client.as_ref(), url, revision)
                    .await?;
                self.run_stage(push, &params.builder_image).await?
            }
        };

        self.output.progress("  → Deploying the application...");
        let push = staged.deploy(self.client.as_ref()).await?;

        self.output
            .progress("  → Waiting for the workload to report ready...");
        self.await_ready(push.app()).await?;

        let route = push.finish();
        self.output
            .success(&format!("App is online at {}", route.url()));
        Ok(route)
    }

    /// Submit the build, tail its logs, and poll it to completion. The tail
    /// task is stopped and joined whatever the poll returned, so one push's
    /// log output never interleaves with the next stage.
    async fn run_stage(
        &self,
        push: Push<SourceAcquired>,
        builder: &ImageRef,
    ) -> Result<Push<Staged>, PushError> {
        self.output.progress("  → Staging the application...");
        let push = push.stage(self.client.as_ref(), builder).await?;
        let stage = push
            .stage_id()
            .expect("stage() always records a stage id")
            .clone();

        let tail = LogTailCoordinator::start(
            self.client.clone(),
            self.output.clone(),
            push.app().clone(),
            stage.clone(),
        );
        let poll = self.poll_staging(push.app(), &stage).await;
        tail.stop().await;
        poll?;

        Ok(push)
    }

    async fn poll_staging(&self, app: &AppRef, stage: &StageId) -> Result<(), PushError> {
        let result = self
            .staging_poll
            .run(
                "staging completion",
                || async {
                    match self.client.staging_status(app, stage).await {
                        Ok(StagingStatus::Succeeded) => Ok(()),
                        Ok(StagingStatus::Running) => Err(StagePoll::Running),
                        Ok(StagingStatus::Failed(reason)) => Err(StagePoll::Failed(reason)),
                        Err(e) => Err(StagePoll::Api(e)),
                    }
                },
                StagePoll::is_retryable,
            )
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(RetryError::Rejected(StagePoll::Failed(reason))) => {
                Err(PushError::StagingFailed { reason })
            }
            Err(RetryError::Rejected(StagePoll::Api(source))) => {
                Err(PushError::StagingPoll { source })
            }
            Err(RetryError::Rejected(StagePoll::Running)) => {
                unreachable!("Running is retryable")
            }
            Err(RetryError::Exhausted { attempts, last }) => Err(PushError::StagingTimeout {
                attempts,
                last: last.to_string(),
            }),
        }
    }

    async fn await_ready(&self, app: &AppRef) -> Result<(), PushError> {
        let result = self
            .ready_poll
            .run(
                "workload readiness",
                || async {
                    match self.client.app_running(app).await {
                        Ok(true) => Ok(()),
                        Ok(false) => Err(ReadyPoll::NotYet),
                        Err(e) => Err(ReadyPoll::Api(e)),
                    }
                },
                ReadyPoll::is_retryable,
            )
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(RetryError::Rejected(ReadyPoll::Api(source))) => {
                Err(PushError::ReadyPoll { source })
            }
            Err(RetryError::Rejected(ReadyPoll::NotYet)) => unreachable!("NotYet is retryable"),
            Err(RetryError::Exhausted { attempts, last }) => Err(PushError::ReadyTimeout {
                attempts,
                last: last.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum StagePoll {
    #[error("staging still running")]
    Running,

    #[error("staging failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Api(ApiError),
}

impl StagePoll {
    fn is_retryable(&self) -> bool {
        match self {
            StagePoll::Running => true,
            StagePoll::Failed(_) => false,
            StagePoll::Api(e) => e.is_retryable(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ReadyPoll {
    #[error("workload not ready yet")]
    NotYet,

    #[error(transparent)]
    Api(ApiError),
}

impl ReadyPoll {
    fn is_retryable(&self) -> bool {
        match self {
            ReadyPoll::NotYet => true,
            ReadyPoll::Api(e) => e.is_retryable(),
        }
    }
}
