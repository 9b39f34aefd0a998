// ABOUTME: Background log tailing for a staging run.
// ABOUTME: Single task, buffered stop signal, stop() awaits task exit.

use crate::api::BuildOps;
use crate::output::Output;
use crate::types::{AppRef, StageId};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to the one background task streaming a stage's logs.
///
/// The only exposed operation is [`stop`](TailHandle::stop), which never
/// returns before the task has fully exited.
pub struct TailHandle {
    stop: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl TailHandle {
    /// Signal the task to stop and wait for it to exit.
    ///
    /// The channel is buffered so the send succeeds even if the task
    /// already exited on its own (remote stream closed); the await below is
    /// what guarantees no task outlives this call.
    pub async fn stop(self) {
        let _ = self.stop.try_send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "log tail task aborted");
        }
    }
}

/// Streams staging logs in the background until stopped.
///
/// Tailing is best-effort observability: stream failures are reported to
/// the output surface and end the task, but never become pipeline errors.
pub struct LogTailCoordinator;

impl LogTailCoordinator {
    pub fn start<C>(client: Arc<C>, output: Output, app: AppRef, stage: StageId) -> TailHandle
    where
        C: BuildOps + Send + Sync + 'static,
    {
        let (stop, mut stopped) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut stream = match client.staging_logs(&app, &stage).await {
                Ok(stream) => stream,
                Err(e) => {
                    output.warning(&format!("failed to tail staging logs: {e}"));
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = stopped.recv() => break,
                    item = stream.next() => match item {
                        Some(Ok(line)) => {
                            output.progress(&format!("[{}] {}", line.source, line.text));
                        }
                        Some(Err(e)) => {
                            output.warning(&format!("staging log stream failed: {e}"));
                            break;
                        }
                        None => break,
                    },
                }
            }
        });

        TailHandle { stop, task }
    }
}
