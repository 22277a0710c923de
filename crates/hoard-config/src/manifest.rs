use std::collections::BTreeMap;
use std::time::Duration;

use hoard_fetch::Backoff;
use hoard_verify::Digest;
use serde::{Deserialize, Serialize};

use crate::duration;
use crate::env::expand_env_vars;
use crate::error::{ConfigError, Result};

pub const DEFAULT_PARALLEL: usize = 4;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// A download manifest, as written in YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases:  BTreeMap<String, Alias>,
    #[serde(skip_serializing_if = "CacheConfig::is_unset")]
    pub cache:    CacheConfig,
    #[serde(skip_serializing_if = "Settings::is_unset")]
    pub settings: Settings,
    pub files:    Vec<FileEntry>,
}

/// An S3-compatible storage backend referenced as `s3://<name>/…`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alias {
    pub endpoint:        String,
    pub region:          String,
    pub bucket:          String,
    pub prefix:          String,
    pub access_key:      String,
    pub secret_key:      String,
    pub no_sign_request: bool,
}

impl Alias {
    fn expand_env(&mut self) {
        for field in [
            &mut self.endpoint,
            &mut self.region,
            &mut self.bucket,
            &mut self.prefix,
            &mut self.access_key,
            &mut self.secret_key,
        ] {
            *field = expand_env_vars(field);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub alias:   String,
}

impl CacheConfig {
    fn is_unset(&self) -> bool { self == &Self::default() }
}

/// Run settings. Zero and missing values mean "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub parallel:    usize,
    pub retries:     u32,
    #[serde(with = "duration::optional", skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff:     Option<Backoff>,
    /// Per-request connect and read timeout.
    #[serde(with = "duration::optional", skip_serializing_if = "Option::is_none")]
    pub timeout:     Option<Duration>,
}

impl Settings {
    fn is_unset(&self) -> bool { self == &Self::default() }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEntry {
    pub url:    String,
    pub dest:   String,
    pub sha256: String,
}

fn non_zero(duration: Option<Duration>) -> Option<Duration> { duration.filter(|d| !d.is_zero()) }

impl Manifest {
    /// Parse one YAML document and expand `${VAR}` references in aliases.
    ///
    /// No defaults are applied and nothing is validated yet.
    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let mut manifest: Manifest = serde_yaml::from_str(text)?;
        for alias in manifest.aliases.values_mut() {
            alias.expand_env();
        }
        Ok(manifest)
    }

    /// Fold a later manifest into this one.
    ///
    /// Aliases are replaced by name. The cache alias is taken when
    /// non-empty and caching is switched on when the later file enables it.
    /// Settings are taken when non-zero. Files accumulate in order.
    pub fn merge(&mut self, other: Manifest) {
        self.aliases.extend(other.aliases);

        if !other.cache.alias.is_empty() {
            self.cache.alias = other.cache.alias;
        }
        if other.cache.enabled {
            self.cache.enabled = true;
        }

        let (base, over) = (&mut self.settings, other.settings);
        if over.parallel > 0 {
            base.parallel = over.parallel;
        }
        if over.retries > 0 {
            base.retries = over.retries;
        }
        if let Some(delay) = non_zero(over.retry_delay) {
            base.retry_delay = Some(delay);
        }
        if over.backoff.is_some() {
            base.backoff = over.backoff;
        }
        if let Some(timeout) = non_zero(over.timeout) {
            base.timeout = Some(timeout);
        }

        self.files.extend(other.files);
    }

    /// Fill in every setting left at zero.
    pub fn apply_defaults(&mut self) {
        let settings = &mut self.settings;
        if settings.parallel == 0 {
            settings.parallel = DEFAULT_PARALLEL;
        }
        if settings.retries == 0 {
            settings.retries = DEFAULT_RETRIES;
        }
        settings.retry_delay = Some(non_zero(settings.retry_delay).unwrap_or(DEFAULT_RETRY_DELAY));
        settings.backoff.get_or_insert_with(Backoff::default);
        settings.timeout = non_zero(settings.timeout);
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.enabled {
            if self.cache.alias.is_empty() {
                return Err(ConfigError::Invalid("cache enabled but no alias specified".into()));
            }
            if !self.aliases.contains_key(&self.cache.alias) {
                return Err(ConfigError::Invalid(format!(
                    "cache alias {:?} not found in aliases",
                    self.cache.alias
                )));
            }
        }

        for (i, file) in self.files.iter().enumerate() {
            let field = if file.url.is_empty() {
                "url"
            } else if file.dest.is_empty() {
                "dest"
            } else if file.sha256.is_empty() {
                "sha256"
            } else {
                if let Err(err) = file.sha256.parse::<Digest>() {
                    return Err(ConfigError::Invalid(format!("file {i}: {err}")));
                }
                continue;
            };
            return Err(ConfigError::Invalid(format!("file {i}: {field} is required")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn file(url: &str, dest: &str, sha256: &str) -> FileEntry {
        FileEntry {
            url:    url.into(),
            dest:   dest.into(),
            sha256: sha256.into(),
        }
    }

    #[test]
    fn merge_into_empty_base() {
        let mut base = Manifest::default();
        let mut over = Manifest::default();
        over.aliases.insert("alias1".into(), Alias {
            endpoint: "http://endpoint1".into(),
            ..Alias::default()
        });

        base.merge(over);

        assert_eq!(base.aliases.len(), 1);
        assert_eq!(base.aliases["alias1"].endpoint, "http://endpoint1");
    }

    #[test]
    fn empty_override_changes_nothing() {
        let mut base = Manifest {
            cache: CacheConfig {
                enabled: true,
                alias:   "cache".into(),
            },
            settings: Settings {
                parallel: 5,
                retries: 3,
                ..Settings::default()
            },
            files: vec![file("http://example.com/1", "/tmp/1", DIGEST)],
            ..Manifest::default()
        };
        let before = base.clone();

        base.merge(Manifest::default());

        assert_eq!(base, before);
    }

    #[test]
    fn zero_settings_do_not_override() {
        let mut base = Manifest::default();
        base.settings.parallel = 8;
        base.settings.retry_delay = Some(Duration::from_secs(2));

        let mut over = Manifest::default();
        over.settings.retry_delay = Some(Duration::ZERO);
        over.settings.retries = 7;
        base.merge(over);

        assert_eq!(base.settings.parallel, 8);
        assert_eq!(base.settings.retries, 7);
        assert_eq!(base.settings.retry_delay, Some(Duration::from_secs(2)));
    }

    #[test]
    fn defaults_fill_gaps() {
        let mut manifest = Manifest::default();
        manifest.settings.retries = 9;
        manifest.apply_defaults();

        assert_eq!(manifest.settings.parallel, DEFAULT_PARALLEL);
        assert_eq!(manifest.settings.retries, 9);
        assert_eq!(manifest.settings.retry_delay, Some(DEFAULT_RETRY_DELAY));
        assert_eq!(manifest.settings.backoff, Some(Backoff::Fixed));
        assert_eq!(manifest.settings.timeout, None);
    }

    #[test]
    fn cache_needs_a_known_alias() {
        let mut manifest = Manifest::default();
        manifest.cache.enabled = true;
        assert!(matches!(manifest.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("no alias")));

        manifest.cache.alias = "cache".into();
        assert!(matches!(manifest.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("not found")));

        manifest.aliases.insert("cache".into(), Alias::default());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn files_need_every_field() {
        let cases = [
            (file("", "/d", DIGEST), "file 0: url is required"),
            (file("https://h/f", "", DIGEST), "file 0: dest is required"),
            (file("https://h/f", "/d", ""), "file 0: sha256 is required"),
        ];
        for (entry, message) in cases {
            let manifest = Manifest {
                files: vec![entry],
                ..Manifest::default()
            };
            assert_eq!(manifest.validate().unwrap_err().to_string(), format!("invalid config: {message}"));
        }
    }

    #[test]
    fn sha256_must_be_a_digest() {
        let manifest = Manifest {
            files: vec![file("https://h/f", "/d", DIGEST), file("https://h/g", "/e", "abc123")],
            ..Manifest::default()
        };
        let err = manifest.validate().unwrap_err().to_string();
        assert!(err.contains("file 1"), "{err}");
    }

    #[test]
    fn aliases_expand_environment() {
        let manifest = Manifest::from_yaml(
            "aliases:\n  a:\n    bucket: b\n    secret_key: ${HOARD_TEST_UNSET_SECRET}\n",
        )
        .unwrap();
        assert_eq!(manifest.aliases["a"].secret_key, "${HOARD_TEST_UNSET_SECRET}");
        assert_eq!(manifest.aliases["a"].bucket, "b");
    }
}
