use std::collections::HashMap;
use std::fmt;

/// How requests to an endpoint are authenticated.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Access {
    /// Credentials from the environment, profile files or instance metadata.
    #[default]
    Ambient,
    Static {
        access_key: String,
        secret_key: String,
    },
    /// Unsigned requests, for public buckets.
    Anonymous,
}

impl Access {
    /// Anonymous wins over keys; keys are only used when both are present.
    pub fn from_parts(
        access_key: Option<String>,
        secret_key: Option<String>,
        anonymous: bool,
    ) -> Self {
        if anonymous {
            return Access::Anonymous;
        }
        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key))
                if !access_key.is_empty() && !secret_key.is_empty() =>
            {
                Access::Static {
                    access_key,
                    secret_key,
                }
            }
            _ => Access::Ambient,
        }
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Ambient => write!(f, "Ambient"),
            Access::Static { access_key, .. } => f
                .debug_struct("Static")
                .field("access_key", access_key)
                .field("secret_key", &"***")
                .finish(),
            Access::Anonymous => write!(f, "Anonymous"),
        }
    }
}

/// A named S3-compatible storage location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// Endpoint override, e.g. a MinIO server. Forces path-style addressing.
    pub url:    Option<String>,
    pub region: Option<String>,
    pub bucket: String,
    /// Prepended verbatim to every object key.
    pub prefix: String,
    pub access: Access,
}

impl Endpoint {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn object_key(&self, key: &str) -> String { format!("{}{}", self.prefix, key) }
}

/// Alias name → endpoint. Read-only once the run starts.
#[derive(Debug, Clone, Default)]
pub struct Endpoints(HashMap<String, Endpoint>);

impl Endpoints {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, alias: impl Into<String>, endpoint: Endpoint) {
        self.0.insert(alias.into(), endpoint);
    }

    pub fn get(&self, alias: &str) -> Option<&Endpoint> { self.0.get(alias) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Endpoint)> {
        self.0.iter().map(|(name, endpoint)| (name.as_str(), endpoint))
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<(String, Endpoint)> for Endpoints {
    fn from_iter<T: IntoIterator<Item = (String, Endpoint)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_prefers_anonymous() {
        let access = Access::from_parts(Some("ak".into()), Some("sk".into()), true);
        assert_eq!(access, Access::Anonymous);
    }

    #[test]
    fn access_needs_both_keys() {
        assert_eq!(Access::from_parts(Some("ak".into()), None, false), Access::Ambient);
        assert_eq!(
            Access::from_parts(Some("ak".into()), Some(String::new()), false),
            Access::Ambient
        );
        assert!(matches!(
            Access::from_parts(Some("ak".into()), Some("sk".into()), false),
            Access::Static { .. }
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let access = Access::Static {
            access_key: "AKIA".into(),
            secret_key: "hunter2".into(),
        };
        let shown = format!("{access:?}");
        assert!(shown.contains("AKIA"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn prefix_is_concatenated() {
        let endpoint = Endpoint::new("bucket").prefix("builds/");
        assert_eq!(endpoint.object_key("app.tar"), "builds/app.tar");
        assert_eq!(Endpoint::new("bucket").object_key("app.tar"), "app.tar");
    }
}
