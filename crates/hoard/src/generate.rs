//! `hoard generate`: a manifest for the files already on disk.

use std::path::{Component, Path};

use anyhow::{Context, bail};
use hoard_config::{FileEntry, Manifest};
use hoard_verify::file_digest_blocking;
use walkdir::WalkDir;

/// Relative path with `/` separators, whatever the host uses.
fn relative_dest(base: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path
        .strip_prefix(base)
        .with_context(|| format!("{} is outside {}", path.display(), base.display()))?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Ok(if parts.is_empty() { ".".to_string() } else { parts.join("/") })
}

/// One entry per regular file under `dir`, sorted by path, with empty URLs.
/// Entries that cannot be read are logged and left out.
pub fn scan(dir: &Path) -> anyhow::Result<Vec<FileEntry>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let digest = match file_digest_blocking(entry.path()) {
            Ok(digest) => digest,
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), %err, "skipping file that cannot be hashed");
                continue;
            }
        };
        tracing::debug!(path = %entry.path().display(), %digest, "hashed");
        files.push(FileEntry {
            url:    String::new(),
            dest:   relative_dest(dir, entry.path())?,
            sha256: digest.to_string(),
        });
    }
    Ok(files)
}

pub fn manifest(dir: &Path) -> anyhow::Result<Manifest> {
    let meta = std::fs::metadata(dir).with_context(|| format!("accessing {}", dir.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let files = scan(dir)?;
    if files.is_empty() {
        bail!("no files found in {}", dir.display());
    }
    Ok(Manifest {
        files,
        ..Manifest::default()
    })
}

pub fn run(dir: &Path) -> anyhow::Result<()> {
    let manifest = manifest(dir)?;
    let yaml = serde_yaml::to_string(&manifest).context("rendering manifest")?;
    print!("{yaml}");
    tracing::info!(files = manifest.files.len(), "manifest generated");
    Ok(())
}
