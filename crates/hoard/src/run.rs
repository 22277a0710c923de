//! The download command.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use hoard_config::{Manifest, load_multiple};
use hoard_fetch::{Pipeline, Report, Scheduler};
use hoard_source::{S3Bucket, SourceResolver};
use indicatif::MultiProgress;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::DownloadArgs;
use crate::progress::Bars;

/// How a run ended, as far as the exit code is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    Interrupted,
}

impl Outcome {
    fn of(report: &Report, cancel: &CancellationToken) -> Self {
        if !report.is_success() {
            Outcome::Failed
        } else if cancel.is_cancelled() {
            Outcome::Interrupted
        } else {
            Outcome::Completed
        }
    }

    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Completed => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
            Outcome::Interrupted => ExitCode::from(130),
        }
    }
}

fn apply_overrides(manifest: &mut Manifest, args: &DownloadArgs) {
    if let Some(parallel) = args.parallel.filter(|&p| p > 0) {
        manifest.settings.parallel = parallel;
    }
    if let Some(retries) = args.retries.filter(|&r| r > 0) {
        manifest.settings.retries = retries;
    }
}

/// Cancel `cancel` on the first Ctrl-C.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Resolves on SIGTERM. The handler is installed before this returns.
#[cfg(unix)]
fn terminate() -> impl Future<Output = ()> + Send + 'static {
    use tokio::signal::unix::{SignalKind, signal};

    let signal = signal(SignalKind::terminate());
    async move {
        match signal {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(%err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
fn terminate() -> impl Future<Output = ()> + Send + 'static { std::future::pending() }

fn cancel_on_interrupt(cancel: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let cancel = cancel.clone();
    let terminate = terminate();
    tokio::spawn(async move {
        tokio::select! {
            () = ctrl_c() => warn!("interrupted, cancelling downloads"),
            () = terminate => warn!("terminated, cancelling downloads"),
        }
        cancel.cancel();
    })
}

fn summarize(report: &Report, outcome: Outcome) {
    for (task, err) in report.failures() {
        error!("error downloading {}: {err}", task.locator);
    }

    let total = report.total();
    match outcome {
        Outcome::Completed => println!("All {total} downloads completed successfully"),
        Outcome::Failed => eprintln!("{}/{total} downloads failed", report.failed()),
        Outcome::Interrupted => eprintln!("{}/{total} downloads cancelled", report.cancelled()),
    }
}

pub async fn download(args: &DownloadArgs, multi: Option<MultiProgress>) -> anyhow::Result<Outcome> {
    let mut manifest = load_multiple(&args.configs).context("loading config")?;
    apply_overrides(&mut manifest, args);

    let tasks = manifest.tasks()?;
    info!(files = tasks.len(), "loaded config");

    let mut options = manifest.fetch_options();
    let bars = multi.map(|multi| Arc::new(Bars::new(multi, &tasks)));
    if let Some(bars) = &bars {
        options = options.on_progress(bars.sink());
    }

    let resolver = SourceResolver::connect(&manifest.endpoints(), manifest.timeout())
        .await
        .context("configuring sources")?;
    let cache = manifest
        .cache_alias()
        .map(|alias| resolver.bucket(alias).cloned())
        .transpose()
        .context("configuring cache")?;

    let mut pipeline: Pipeline<SourceResolver, S3Bucket> = Pipeline::new(resolver, &options);
    if let Some(store) = cache {
        info!(bucket = store.bucket(), "cache enabled");
        pipeline = pipeline.with_cache(store);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel_on_interrupt(&cancel);
    let report = Scheduler::new(pipeline, options.concurrency).run(tasks, &cancel).await;
    interrupt.abort();

    if let Some(bars) = &bars {
        bars.clear();
    }

    let outcome = Outcome::of(&report, &cancel);
    summarize(&report, outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use hoard_fetch::{DownloadResult, FetchError, FileTask, Status};
    use hoard_verify::Digest;

    use super::*;

    fn args(parallel: Option<usize>, retries: Option<u32>) -> DownloadArgs {
        DownloadArgs {
            configs: vec![PathBuf::from("c.yaml")],
            parallel,
            retries,
            no_progress: true,
            verbose: 0,
        }
    }

    fn report(statuses: Vec<Status>) -> Report {
        Report {
            results: statuses
                .into_iter()
                .map(|status| DownloadResult {
                    task: FileTask::new("https://h/f", "f", Digest::of(b"f")),
                    status,
                })
                .collect(),
        }
    }

    #[test]
    fn command_line_overrides_settings() {
        let mut manifest = Manifest::default();
        manifest.settings.parallel = 4;
        manifest.settings.retries = 3;

        apply_overrides(&mut manifest, &args(Some(16), None));
        assert_eq!(manifest.settings.parallel, 16);
        assert_eq!(manifest.settings.retries, 3);

        apply_overrides(&mut manifest, &args(Some(0), Some(7)));
        assert_eq!(manifest.settings.parallel, 16);
        assert_eq!(manifest.settings.retries, 7);
    }

    #[test]
    fn outcome_follows_report() {
        let cancel = CancellationToken::new();
        let ok = report(vec![Status::Fetched { attempts: 1 }, Status::Skipped, Status::Cached]);
        assert_eq!(Outcome::of(&ok, &cancel), Outcome::Completed);

        let failed = report(vec![Status::Skipped, Status::Failed(FetchError::Aborted("boom".into()))]);
        assert_eq!(Outcome::of(&failed, &cancel), Outcome::Failed);

        cancel.cancel();
        let interrupted = report(vec![Status::Skipped, Status::Cancelled]);
        assert_eq!(Outcome::of(&interrupted, &cancel), Outcome::Interrupted);
        assert_eq!(Outcome::of(&failed, &cancel), Outcome::Failed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sigterm_cancels_the_run() {
        let cancel = CancellationToken::new();
        let listener = cancel_on_interrupt(&cancel);

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(std::time::Duration::from_secs(5), cancel.cancelled())
            .await
            .unwrap();
        listener.await.unwrap();
    }
}
