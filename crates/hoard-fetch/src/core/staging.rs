use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to a destination to name its staging file.
pub const STAGING_SUFFIX: &str = ".partial";

/// `dest` + `.partial`, next to the destination so the final rename never
/// crosses filesystems.
pub fn staging_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}
