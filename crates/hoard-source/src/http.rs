use std::time::Duration;

use futures_util::TryStreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::{Client, StatusCode, Url};

use crate::error::{Result, SourceError};
use crate::range::{range_header, total_size, unsatisfied_range_total};
use crate::source::{Opened, Source};

/// Build the HTTP client shared by every [`HttpSource`] in a run.
///
/// `timeout` bounds connecting and each read, not the whole transfer, so
/// large files are not cut off while they are still making progress.
pub fn http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("hoard/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.connect_timeout(timeout).read_timeout(timeout);
    }
    Ok(builder.build()?)
}

/// An object behind an `http://` or `https://` URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url:    Url,
}

impl HttpSource {
    pub fn new(client: Client, url: Url) -> Self { Self { client, url } }

    pub fn url(&self) -> &Url { &self.url }

    fn unexpected(&self, status: StatusCode) -> SourceError {
        SourceError::UnexpectedStatus {
            status: status.as_u16(),
            url:    self.url.to_string(),
        }
    }
}

impl Source for HttpSource {
    async fn open(&self, offset: u64) -> Result<Opened> {
        let mut request = self.client.get(self.url.clone());
        if let Some(range) = range_header(offset) {
            request = request.header(RANGE, range);
        }

        let response = request.send().await?;
        let partial = match response.status() {
            StatusCode::OK => false,
            StatusCode::PARTIAL_CONTENT => true,
            StatusCode::RANGE_NOT_SATISFIABLE if offset > 0 => {
                let total_size = response
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(unsatisfied_range_total);
                tracing::debug!(url = %self.url, offset, ?total_size, "range starts past the end");
                return Ok(Opened::past_end(offset, total_size));
            }
            other => return Err(self.unexpected(other)),
        };

        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let total_size = total_size(
            partial,
            offset,
            response.content_length(),
            content_range.as_deref(),
        );
        let start = if partial { offset } else { 0 };

        tracing::debug!(url = %self.url, offset, start, ?total_size, "opened HTTP source");

        let stream = response.bytes_stream().map_err(SourceError::from);
        Ok(Opened {
            stream: Box::pin(stream),
            start,
            total_size,
        })
    }

    async fn size(&self) -> Result<u64> {
        let response = self.client.head(self.url.clone()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(self.unexpected(response.status()));
        }

        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| SourceError::MissingContentLength(self.url.to_string()))
    }
}
