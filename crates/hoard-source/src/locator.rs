use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::error::SourceError;

const S3_SCHEME: &str = "s3://";

/// Where a file's bytes live.
///
/// `http://` and `https://` locators are fetched directly; `s3://alias/key`
/// names an object under a configured [`Endpoint`](crate::Endpoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Http(Url),
    S3 { alias: String, key: String },
}

impl FromStr for Locator {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SourceError::InvalidLocator {
            locator: s.to_string(),
            reason:  reason.to_string(),
        };

        if let Some(rest) = s.strip_prefix(S3_SCHEME) {
            let (alias, key) = rest
                .split_once('/')
                .ok_or_else(|| invalid("expected s3://alias/path"))?;
            if alias.is_empty() {
                return Err(invalid("empty alias"));
            }
            if key.is_empty() {
                return Err(invalid("empty object key"));
            }
            return Ok(Locator::S3 {
                alias: alias.to_string(),
                key:   key.to_string(),
            });
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).map_err(|e| invalid(&e.to_string()))?;
            return Ok(Locator::Http(url));
        }

        Err(SourceError::UnsupportedScheme(s.to_string()))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Http(url) => write!(f, "{url}"),
            Locator::S3 { alias, key } => write!(f, "{S3_SCHEME}{alias}/{key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http_and_https() {
        let loc: Locator = "https://h/f".parse().unwrap();
        assert!(matches!(loc, Locator::Http(ref url) if url.host_str() == Some("h")));
        assert!(matches!("http://h:8080/a/b".parse(), Ok(Locator::Http(_))));
    }

    #[test]
    fn parses_s3_alias_and_nested_key() {
        let loc: Locator = "s3://minio/builds/v1/app.tar".parse().unwrap();
        assert_eq!(
            loc,
            Locator::S3 {
                alias: "minio".into(),
                key:   "builds/v1/app.tar".into(),
            }
        );
        assert_eq!(loc.to_string(), "s3://minio/builds/v1/app.tar");
    }

    #[test]
    fn rejects_s3_without_key() {
        assert!(matches!(
            "s3://minio".parse::<Locator>(),
            Err(SourceError::InvalidLocator { .. })
        ));
        assert!(matches!(
            "s3://minio/".parse::<Locator>(),
            Err(SourceError::InvalidLocator { .. })
        ));
        assert!(matches!(
            "s3:///key".parse::<Locator>(),
            Err(SourceError::InvalidLocator { .. })
        ));
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(matches!(
            "ftp://h/f".parse::<Locator>(),
            Err(SourceError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            "/local/path".parse::<Locator>(),
            Err(SourceError::UnsupportedScheme(_))
        ));
    }
}
