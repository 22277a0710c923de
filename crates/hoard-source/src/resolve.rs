use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;

use crate::endpoint::Endpoints;
use crate::error::{Result, SourceError};
use crate::http::{HttpSource, http_client};
use crate::locator::Locator;
use crate::s3::{S3Bucket, S3Source};
use crate::source::{Opened, Resolve, Source};

/// Either kind of source, chosen by locator scheme.
#[derive(Debug, Clone)]
pub enum AnySource {
    Http(HttpSource),
    S3(S3Source),
}

impl Source for AnySource {
    async fn open(&self, offset: u64) -> Result<Opened> {
        match self {
            AnySource::Http(source) => source.open(offset).await,
            AnySource::S3(source) => source.open(offset).await,
        }
    }

    async fn size(&self) -> Result<u64> {
        match self {
            AnySource::Http(source) => source.size().await,
            AnySource::S3(source) => source.size().await,
        }
    }
}

/// Production resolver: one HTTP client and one S3 client per alias, built
/// once and then shared read-only by every download in the run.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    http:    Client,
    buckets: HashMap<String, S3Bucket>,
}

impl SourceResolver {
    pub async fn connect(endpoints: &Endpoints, timeout: Option<Duration>) -> Result<Self> {
        let http = http_client(timeout)?;
        let mut buckets = HashMap::with_capacity(endpoints.len());
        for (alias, endpoint) in endpoints.iter() {
            tracing::debug!(alias, bucket = %endpoint.bucket, url = ?endpoint.url, "configuring S3 endpoint");
            buckets.insert(alias.to_string(), S3Bucket::connect(endpoint, timeout).await);
        }
        Ok(Self { http, buckets })
    }

    pub fn bucket(&self, alias: &str) -> Result<&S3Bucket> {
        self.buckets
            .get(alias)
            .ok_or_else(|| SourceError::AliasNotFound(alias.to_string()))
    }
}

impl Resolve for SourceResolver {
    type Source = AnySource;

    fn resolve(&self, locator: &str) -> Result<AnySource> {
        match locator.parse::<Locator>()? {
            Locator::Http(url) => Ok(AnySource::Http(HttpSource::new(self.http.clone(), url))),
            Locator::S3 { alias, key } => Ok(AnySource::S3(self.bucket(&alias)?.object(&key))),
        }
    }
}
