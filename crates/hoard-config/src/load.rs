use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::manifest::Manifest;

fn read(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::from_yaml(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load, default and validate a single manifest.
pub fn load(path: impl AsRef<Path>) -> Result<Manifest> { load_multiple(&[path]) }

/// Load several manifests and merge them left to right.
///
/// See [`Manifest::merge`] for precedence. Defaults are applied and the
/// result is validated only after the last file is merged, so one file may
/// name a cache alias that another defines.
pub fn load_multiple<P: AsRef<Path>>(paths: &[P]) -> Result<Manifest> {
    let (first, rest) = paths.split_first().ok_or(ConfigError::NoFiles)?;

    let mut manifest = read(first.as_ref())?;
    for path in rest {
        manifest.merge(read(path.as_ref())?);
    }
    manifest.apply_defaults();
    manifest.validate()?;

    tracing::debug!(
        configs = paths.len(),
        files = manifest.files.len(),
        aliases = manifest.aliases.len(),
        "loaded configuration"
    );
    Ok(manifest)
}
