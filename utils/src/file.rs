use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

/// Lists every regular file below `root`, sorted for deterministic output.
///
/// Hidden files are included. Symbolic links are not followed, so links to
/// files or directories are skipped.
pub fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Build output directory {} does not exist", root.display());
    }

    let mut files = vec![];
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Bucket key of `path` relative to `root`, always with forward slashes.
pub fn storage_key(root: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path.strip_prefix(root).with_context(|| {
        format!("{} is not below {}", path.display(), root.display())
    })?;

    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();

    if parts.is_empty() {
        anyhow::bail!("{} has no path below {}", path.display(), root.display());
    }
    Ok(parts.join("/"))
}
