//! Durations as `humantime` writes them (`500ms`, `5s`, `1m 30s`, `1h30m`),
//! or a bare number of seconds.

use std::time::Duration;

use humantime_serde::re::humantime;
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::ParseDurationError;

pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    let text = input.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(text).map_err(|source| ParseDurationError {
        input: input.to_string(),
        source,
    })
}

pub fn format_duration(duration: Duration) -> String { humantime::format_duration(duration).to_string() }

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Seconds(u64),
    Text(String),
}

/// Serde adapter for `Option<Duration>` fields.
pub(crate) mod optional {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Seconds(secs)) => Ok(Some(Duration::from_secs(secs))),
            Some(Raw::Text(text)) => parse_duration(&text).map(Some).map_err(serde::de::Error::custom),
        }
    }

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        humantime_serde::serialize(value, serializer)
    }
}
