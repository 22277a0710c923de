mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MemoryStore, MockObject, MockResolver, body, options, task};
use hoard_fetch::{FetchError, FileTask, Pipeline, Scheduler, Status, staging_path};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn tasks(
    resolver: &mut MockResolver,
    dir: &std::path::Path,
    count: usize,
    object: impl Fn(Vec<u8>) -> MockObject,
) -> Vec<FileTask> {
    (0..count)
        .map(|i| {
            let locator = format!("https://h/{i}");
            let data = body(40 + i);
            resolver.insert(&locator, object(data.clone()));
            task(&locator, &dir.join(format!("f{i}")), &data)
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_keep_input_order() {
    let dir = tempdir().unwrap();
    let mut resolver = MockResolver::new();
    let tasks = tasks(&mut resolver, dir.path(), 6, |data| MockObject {
        chunk_delay: Some(Duration::from_millis(10)),
        chunk_size: 8,
        ..MockObject::new(data)
    });
    let scheduler = Scheduler::new(Pipeline::<_, MemoryStore>::new(resolver, &options(1)), 6);

    let report = scheduler.run(tasks.clone(), &CancellationToken::new()).await;

    assert!(report.is_success());
    assert_eq!(report.total(), 6);
    for (result, task) in report.results.iter().zip(&tasks) {
        assert_eq!(&result.task, task);
        assert!(matches!(result.status, Status::Fetched { attempts: 1 }));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_more_than_limit_streaming() {
    let dir = tempdir().unwrap();
    let mut resolver = MockResolver::new();
    let tasks = tasks(&mut resolver, dir.path(), 10, |data| MockObject {
        chunk_delay: Some(Duration::from_millis(5)),
        ..MockObject::new(data)
    });
    let stats = Arc::clone(&resolver.stats);
    let scheduler = Scheduler::new(Pipeline::<_, MemoryStore>::new(resolver, &options(1)), 3);

    let report = scheduler.run(tasks, &CancellationToken::new()).await;

    assert!(report.is_success());
    assert_eq!(stats.opens(), 10);
    assert!(stats.max_active() <= 3, "max active was {}", stats.max_active());
    assert!(stats.max_active() >= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancellation_reaches_every_task() {
    let dir = tempdir().unwrap();
    let mut resolver = MockResolver::new();
    let tasks = tasks(&mut resolver, dir.path(), 5, |data| MockObject {
        stall: true,
        ..MockObject::new(data)
    });
    let stats = Arc::clone(&resolver.stats);
    let scheduler = Scheduler::new(Pipeline::<_, MemoryStore>::new(resolver, &options(3)), 2);
    let cancel = CancellationToken::new();

    let trigger = async {
        while stats.opens() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    };
    let (report, ()) = tokio::join!(scheduler.run(tasks.clone(), &cancel), trigger);

    assert_eq!(report.total(), 5);
    assert_eq!(report.cancelled(), 5);
    assert!(report.is_success());
    assert_eq!(stats.opens(), 2, "queued tasks must not touch the network");

    let staged = tasks.iter().filter(|t| staging_path(&t.destination).exists()).count();
    assert_eq!(staged, 2, "in-flight tasks keep their staging files");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_task_is_isolated() {
    let dir = tempdir().unwrap();
    let mut resolver = MockResolver::new();
    let mut tasks = tasks(&mut resolver, dir.path(), 2, MockObject::new);
    resolver.insert("https://h/boom", MockObject {
        panic: true,
        ..MockObject::new(body(8))
    });
    tasks.insert(1, task("https://h/boom", &dir.path().join("boom"), &body(8)));
    let scheduler = Scheduler::new(Pipeline::<_, MemoryStore>::new(resolver, &options(1)), 2);

    let report = scheduler.run(tasks, &CancellationToken::new()).await;

    assert_eq!(report.failed(), 1);
    assert!(matches!(report.results[0].status, Status::Fetched { .. }));
    assert!(matches!(report.results[1].error(), Some(FetchError::Aborted(_))));
    assert!(matches!(report.results[2].status, Status::Fetched { .. }));
}

#[tokio::test]
async fn already_cancelled_run_starts_nothing() {
    let dir = tempdir().unwrap();
    let mut resolver = MockResolver::new();
    let tasks = tasks(&mut resolver, dir.path(), 3, MockObject::new);
    let stats = Arc::clone(&resolver.stats);
    let scheduler = Scheduler::new(Pipeline::<_, MemoryStore>::new(resolver, &options(3)), 4);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = scheduler.run(tasks, &cancel).await;

    assert_eq!(report.cancelled(), 3);
    assert_eq!(stats.opens(), 0);
}
