use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use hoard_source::{BlobStore, Resolve};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::data::{DownloadResult, FileTask, Report, Status};
use crate::error::FetchError;

use super::pipeline::Pipeline;

/// Bounded fan-out of pipelines with in-order fan-in.
///
/// At most `concurrency` pipelines run at once. Each task is spawned
/// separately, so one task panicking or failing never affects the others.
pub struct Scheduler<R, S> {
    pipeline:    Arc<Pipeline<R, S>>,
    concurrency: usize,
}

impl<R, S> Scheduler<R, S>
where
    R: Resolve + 'static,
    S: BlobStore + 'static,
{
    /// A `concurrency` of 0 is treated as 1.
    pub fn new(pipeline: Pipeline<R, S>, concurrency: usize) -> Self {
        Self {
            pipeline:    Arc::new(pipeline),
            concurrency: concurrency.max(1),
        }
    }

    /// Run every task and return one result per task, in input order.
    ///
    /// Tasks still waiting for a slot when `cancel` fires never start; tasks
    /// in flight stop at their next suspension point. Both report
    /// [`Status::Cancelled`]. Returns after background cache stores settle.
    pub async fn run(&self, tasks: Vec<FileTask>, cancel: &CancellationToken) -> Report {
        let gate = Arc::new(Semaphore::new(self.concurrency));
        let mut running = FuturesUnordered::new();

        for (index, task) in tasks.iter().cloned().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            let gate = Arc::clone(&gate);
            let cancel = cancel.clone();
            let handle = tokio::spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    permit = gate.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    return Status::Cancelled;
                };
                pipeline.run(index, &task, &cancel).await
            });
            running.push(async move { (index, handle.await) });
        }

        let mut statuses: Vec<Option<Status>> = tasks.iter().map(|_| None).collect();
        while let Some((index, joined)) = running.next().await {
            let status = joined.unwrap_or_else(|err| {
                tracing::error!(index, error = %err, "download task aborted");
                Status::Failed(FetchError::Aborted(err.to_string()))
            });
            statuses[index] = Some(status);
        }

        self.pipeline.wait_for_uploads().await;

        let results = tasks
            .into_iter()
            .zip(statuses)
            .map(|(task, status)| DownloadResult {
                task,
                status: status.unwrap_or_else(|| Status::Failed(FetchError::Aborted("no result".into()))),
            })
            .collect();
        Report { results }
    }
}
