use std::path::Path;
use std::time::Duration;

use aws_config::meta::region::RegionProviderChain;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use futures_util::stream;

use crate::endpoint::{Access, Endpoint};
use crate::error::{Result, SourceError};
use crate::range::{range_header, total_size, unsatisfied_range_total};
use crate::source::{BlobStore, Opened, Source};

const FALLBACK_REGION: &str = "us-east-1";

fn api_error<E>(err: SdkError<E, HttpResponse>) -> SourceError
where
    E: std::error::Error + 'static,
{
    SourceError::Api(DisplayErrorContext(&err).to_string())
}

fn has_status<E>(err: &SdkError<E, HttpResponse>, status: u16) -> bool {
    err.raw_response()
        .is_some_and(|raw| raw.status().as_u16() == status)
}

/// A bucket (plus key prefix) on one S3-compatible endpoint.
///
/// Cloning is cheap: the SDK client is reference counted.
#[derive(Debug, Clone)]
pub struct S3Bucket {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Bucket {
    /// Build the client for `endpoint`.
    ///
    /// Region comes from the endpoint, then the ambient provider chain, then
    /// `us-east-1`, which is what most S3-compatible servers accept. An
    /// endpoint override always uses path-style addressing.
    pub async fn connect(endpoint: &Endpoint, timeout: Option<Duration>) -> Self {
        let region = RegionProviderChain::first_try(endpoint.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(FALLBACK_REGION));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        loader = match &endpoint.access {
            Access::Ambient => loader,
            Access::Static {
                access_key,
                secret_key,
            } => loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "hoard-static",
            )),
            Access::Anonymous => loader.no_credentials(),
        };
        if let Some(timeout) = timeout {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(timeout)
                    .read_timeout(timeout)
                    .build(),
            );
        }
        let shared = loader.load().await;

        let mut config = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(url) = &endpoint.url {
            config = config.endpoint_url(url).force_path_style(true);
        }

        Self {
            client: Client::from_conf(config.build()),
            bucket: endpoint.bucket.clone(),
            prefix: endpoint.prefix.clone(),
        }
    }

    pub fn bucket(&self) -> &str { &self.bucket }

    pub fn full_key(&self, key: &str) -> String { format!("{}{}", self.prefix, key) }

    /// One object of this bucket as a [`Source`].
    pub fn object(&self, key: &str) -> S3Source {
        S3Source {
            bucket: self.clone(),
            key:    key.to_string(),
        }
    }

    async fn get_from(&self, key: &str, offset: u64) -> Result<Opened> {
        let full_key = self.full_key(key);
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .set_range(range_header(offset))
            .send()
            .await;
        let output = match result {
            Ok(output) => output,
            Err(err) if offset > 0 && has_status(&err, 416) => {
                let total_size = err
                    .raw_response()
                    .and_then(|raw| raw.headers().get("content-range"))
                    .and_then(unsatisfied_range_total);
                tracing::debug!(bucket = %self.bucket, key = %full_key, offset, ?total_size, "range starts past the end");
                return Ok(Opened::past_end(offset, total_size));
            }
            Err(err) => return Err(api_error(err)),
        };

        let content_length = output.content_length().and_then(|n| u64::try_from(n).ok());
        let partial = output.content_range().is_some();
        let total_size = total_size(partial, offset, content_length, output.content_range());
        let start = if offset > 0 && !partial { 0 } else { offset };

        tracing::debug!(bucket = %self.bucket, key = %full_key, offset, start, ?total_size, "opened S3 object");

        let body = stream::try_unfold(output.body, |mut body: ByteStream| async move {
            let chunk = body
                .try_next()
                .await
                .map_err(|e| SourceError::Api(e.to_string()))?;
            Ok::<_, SourceError>(chunk.map(|chunk| (chunk, body)))
        });

        Ok(Opened {
            stream: Box::pin(body),
            start,
            total_size,
        })
    }

    async fn head_len(&self, key: &str) -> Result<u64> {
        let full_key = self.full_key(key);
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(api_error)?;

        output
            .content_length()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| SourceError::MissingContentLength(format!("s3://{}/{}", self.bucket, full_key)))
    }
}

impl BlobStore for S3Bucket {
    async fn exists(&self, key: &str) -> Result<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(err) if has_status(&err, 404) => Ok(false),
            Err(err) => Err(api_error(err)),
        }
    }

    async fn get(&self, key: &str) -> Result<Opened> { self.get_from(key, 0).await }

    async fn put(&self, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| SourceError::Api(e.to_string()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .body(body)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}

/// One object in an [`S3Bucket`].
#[derive(Debug, Clone)]
pub struct S3Source {
    bucket: S3Bucket,
    key:    String,
}

impl S3Source {
    pub fn key(&self) -> &str { &self.key }
}

impl Source for S3Source {
    async fn open(&self, offset: u64) -> Result<Opened> { self.bucket.get_from(&self.key, offset).await }

    async fn size(&self) -> Result<u64> { self.bucket.head_len(&self.key).await }
}
