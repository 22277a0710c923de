//! Turning a validated manifest into what the download engine consumes.

use std::path::PathBuf;
use std::time::Duration;

use hoard_fetch::{FetchOptions, FileTask, RetryPolicy};
use hoard_source::{Access, Endpoint, Endpoints};
use hoard_verify::Digest;

use crate::error::{ConfigError, Result};
use crate::manifest::{Alias, DEFAULT_PARALLEL, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, Manifest};

fn non_empty(value: &str) -> Option<String> { (!value.is_empty()).then(|| value.to_string()) }

impl From<&Alias> for Endpoint {
    fn from(alias: &Alias) -> Self {
        let mut endpoint = Endpoint::new(&alias.bucket).prefix(&alias.prefix).access(Access::from_parts(
            non_empty(&alias.access_key),
            non_empty(&alias.secret_key),
            alias.no_sign_request,
        ));
        endpoint.url = non_empty(&alias.endpoint);
        endpoint.region = non_empty(&alias.region);
        endpoint
    }
}

impl Manifest {
    /// One task per file entry, in manifest order.
    pub fn tasks(&self) -> Result<Vec<FileTask>> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                let digest: Digest = file
                    .sha256
                    .parse()
                    .map_err(|err| ConfigError::Invalid(format!("file {i}: {err}")))?;
                Ok(FileTask::new(&file.url, PathBuf::from(&file.dest), digest))
            })
            .collect()
    }

    pub fn endpoints(&self) -> Endpoints {
        self.aliases
            .iter()
            .map(|(name, alias)| (name.clone(), Endpoint::from(alias)))
            .collect()
    }

    /// Name of the cache alias when caching is enabled.
    pub fn cache_alias(&self) -> Option<&str> { self.cache.enabled.then_some(self.cache.alias.as_str()) }

    pub fn timeout(&self) -> Option<Duration> { self.settings.timeout.filter(|t| !t.is_zero()) }

    pub fn fetch_options(&self) -> FetchOptions {
        let settings = &self.settings;
        let nonzero = |value: usize, default: usize| if value == 0 { default } else { value };

        FetchOptions::default()
            .concurrency(nonzero(settings.parallel, DEFAULT_PARALLEL))
            .retry(
                RetryPolicy::default()
                    .attempts(if settings.retries == 0 { DEFAULT_RETRIES } else { settings.retries })
                    .delay(settings.retry_delay.filter(|d| !d.is_zero()).unwrap_or(DEFAULT_RETRY_DELAY))
                    .backoff(settings.backoff.unwrap_or_default()),
            )
    }
}
