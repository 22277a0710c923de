//! In-memory sources and stores for engine-level tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use hoard_fetch::{FetchOptions, FileTask, RetryPolicy};
use hoard_source::{BlobStore, Opened, Resolve, Result, Source, SourceError};
use hoard_verify::Digest;

pub fn body(len: usize) -> Vec<u8> { (0..len).map(|i| (i % 251) as u8).collect() }

pub fn options(attempts: u32) -> FetchOptions {
    FetchOptions::default().retry(RetryPolicy::default().attempts(attempts).delay(Duration::from_millis(1)))
}

/// Counters shared by every object of a [`MockResolver`].
#[derive(Debug, Default)]
pub struct Stats {
    pub opens:      AtomicUsize,
    pub active:     AtomicUsize,
    pub max_active: AtomicUsize,
}

impl Stats {
    pub fn opens(&self) -> usize { self.opens.load(Ordering::SeqCst) }

    pub fn max_active(&self) -> usize { self.max_active.load(Ordering::SeqCst) }
}

/// Counts a stream as active for as long as it is alive.
struct ActiveGuard(Arc<Stats>);

impl ActiveGuard {
    fn new(stats: Arc<Stats>) -> Self {
        let now = stats.active.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_active.fetch_max(now, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) { self.0.active.fetch_sub(1, Ordering::SeqCst); }
}

/// One remote object and how it misbehaves.
#[derive(Debug, Default)]
pub struct MockObject {
    pub data:         Vec<u8>,
    /// Answer ranged opens with the whole object.
    pub ignore_range: bool,
    /// Fail this many opens with a 503 before answering.
    pub fail_opens:   AtomicUsize,
    /// Serve these bytes instead of `data` for this many opens.
    pub corrupt:      Mutex<Option<(usize, Vec<u8>)>>,
    /// Stop sending after the first chunk and never finish.
    pub stall:        bool,
    pub chunk_size:   usize,
    pub chunk_delay:  Option<Duration>,
    /// Panic inside `open`.
    pub panic:        bool,
    /// Offsets of every open, in order.
    pub offsets:      Mutex<Vec<u64>>,
}

impl MockObject {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            chunk_size: 16,
            ..Self::default()
        }
    }

    pub fn offsets(&self) -> Vec<u64> { self.offsets.lock().unwrap().clone() }
}

#[derive(Debug, Clone)]
pub struct MockSource {
    object: Arc<MockObject>,
    stats:  Arc<Stats>,
}

impl Source for MockSource {
    async fn open(&self, offset: u64) -> Result<Opened> {
        let object = &self.object;
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        object.offsets.lock().unwrap().push(offset);
        if object.panic {
            panic!("source exploded");
        }
        if object
            .fail_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SourceError::UnexpectedStatus {
                status: 503,
                url:    "mock://object".into(),
            });
        }

        let mut data = object.data.clone();
        if let Some((remaining, bytes)) = object.corrupt.lock().unwrap().as_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                data = bytes.clone();
            }
        }
        let total = data.len() as u64;
        if !object.ignore_range && offset > 0 && offset >= total {
            return Ok(Opened::past_end(offset, Some(total)));
        }
        let start = if object.ignore_range { 0 } else { offset };
        let tail = data[start as usize..].to_vec();

        let chunks: Vec<Result<Bytes>> = tail
            .chunks(object.chunk_size.max(1))
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        let guard = ActiveGuard::new(Arc::clone(&self.stats));
        let delay = object.chunk_delay;
        let body = stream::iter(chunks).then(move |chunk| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            chunk
        });
        let body = if object.stall {
            body.take(1).chain(stream::pending()).boxed()
        } else {
            body.boxed()
        };
        let body = body.map(move |chunk| {
            let _active = &guard;
            chunk
        });

        Ok(Opened {
            stream: Box::pin(body),
            start,
            total_size: Some(total),
        })
    }

    async fn size(&self) -> Result<u64> { Ok(self.object.data.len() as u64) }
}

/// Locator → object table. Unknown locators resolve to `AliasNotFound`.
#[derive(Debug, Default)]
pub struct MockResolver {
    objects:   HashMap<String, Arc<MockObject>>,
    pub stats: Arc<Stats>,
}

impl MockResolver {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, locator: &str, object: MockObject) -> Arc<MockObject> {
        let object = Arc::new(object);
        self.objects.insert(locator.to_string(), Arc::clone(&object));
        object
    }
}

impl Resolve for MockResolver {
    type Source = MockSource;

    fn resolve(&self, locator: &str) -> Result<MockSource> {
        self.objects
            .get(locator)
            .map(|object| MockSource {
                object: Arc::clone(object),
                stats:  Arc::clone(&self.stats),
            })
            .ok_or_else(|| SourceError::AliasNotFound(locator.to_string()))
    }
}

/// A bucket in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub calls:   Arc<AtomicUsize>,
    pub puts:    Arc<AtomicUsize>,
    /// Every call fails as if the store were unreachable.
    pub broken:  bool,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with(digest: &Digest, data: Vec<u8>) -> Self {
        let store = Self::default();
        store.objects.lock().unwrap().insert(digest.to_string(), data);
        store
    }

    pub fn contains(&self, digest: &Digest) -> bool { self.objects.lock().unwrap().contains_key(digest.as_str()) }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(SourceError::Api("store unreachable".into()));
        }
        Ok(())
    }
}

impl BlobStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.check()?;
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Opened> {
        self.check()?;
        let data = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::Api(format!("no such key: {key}")))?;
        let total = data.len() as u64;
        let chunks: Vec<Result<Bytes>> = data.chunks(7).map(|c| Ok(Bytes::copy_from_slice(c))).collect();
        Ok(Opened {
            stream:     Box::pin(stream::iter(chunks)),
            start:      0,
            total_size: Some(total),
        })
    }

    async fn put(&self, key: &str, path: &Path) -> Result<()> {
        self.check()?;
        let data = tokio::fs::read(path).await.map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.objects.lock().unwrap().insert(key.to_string(), data);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn task(locator: &str, dest: &Path, data: &[u8]) -> FileTask { FileTask::new(locator, dest, Digest::of(data)) }
