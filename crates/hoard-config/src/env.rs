use std::env;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENV_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Replace every `${NAME}` with the value of the environment variable
/// `NAME`. References to unset variables are left as they are.
pub fn expand_env_vars(input: &str) -> String { expand_with(input, |name| env::var(name).ok()) }

/// [`expand_env_vars`] with a custom variable lookup.
pub fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    ENV_VAR
        .replace_all(input, |caps: &Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([("MINIO_KEY", "minioadmin"), ("REGION", "eu-west-1"), ("EMPTY", "")])
    }

    fn expand(input: &str) -> String {
        let vars = vars();
        expand_with(input, |name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn replaces_known_variables() {
        assert_eq!(expand("${MINIO_KEY}"), "minioadmin");
        assert_eq!(expand("s3.${REGION}.example.com/${MINIO_KEY}"), "s3.eu-west-1.example.com/minioadmin");
        assert_eq!(expand("x${EMPTY}y"), "xy");
    }

    #[test]
    fn leaves_unknown_variables_verbatim() {
        assert_eq!(expand("${NOT_SET}"), "${NOT_SET}");
        assert_eq!(expand("a-${NOT_SET}-${REGION}"), "a-${NOT_SET}-eu-west-1");
    }

    #[test]
    fn ignores_other_dollar_forms() {
        assert_eq!(expand("$MINIO_KEY"), "$MINIO_KEY");
        assert_eq!(expand("${}"), "${}");
        assert_eq!(expand("plain"), "plain");
    }

    #[test]
    fn reads_process_environment() {
        assert_eq!(expand_env_vars("${HOARD_SURELY_UNSET_VARIABLE}"), "${HOARD_SURELY_UNSET_VARIABLE}");
    }
}
