//! Error types for hoard-config.

use std::io;
use std::path::PathBuf;

use humantime_serde::re::humantime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config file {path}: {source}")]
    Parse {
        path:   PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("no config files specified")]
    NoFiles,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid duration {input:?}: {source}")]
pub struct ParseDurationError {
    pub input:  String,
    #[source]
    pub source: humantime::DurationError,
}
