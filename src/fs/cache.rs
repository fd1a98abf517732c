//! On-disk route caches.
//!
//! Route finding is the expensive part of a run. Each route set is written to
//! the output directory after it is computed; when the file already exists it
//! is read back as-is and the finder is skipped.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::models::constants::HDF5_EXTENSION;
use crate::models::RouteSet;

pub fn read_route_cache(path: &Path) -> Result<RouteSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read route cache: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse route cache: {}", path.display()))
}

pub fn write_route_cache(path: &Path, routes: &RouteSet) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }
    }

    let content = serde_json::to_string(routes).context("Failed to serialize routes")?;

    // Stage next to the target so an interrupted run never leaves a truncated cache behind.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging =
        NamedTempFile::new_in(dir).context("Failed to create route cache staging file")?;
    staging
        .write_all(content.as_bytes())
        .with_context(|| format!("Failed to write route cache: {}", path.display()))?;
    staging
        .persist(path)
        .with_context(|| format!("Failed to move route cache into place: {}", path.display()))?;

    Ok(())
}

/// Return cached routes when `path` exists, otherwise compute, cache and return them.
///
/// An HDF5 cache next to `path` (`aiz_routes.hdf5` beside `aiz_routes.json`)
/// is an error: it cannot be read here, and searching again would discard it.
pub fn load_or_compute<F>(path: &Path, compute: F) -> Result<RouteSet>
where
    F: FnOnce() -> Result<RouteSet>,
{
    if path.is_file() {
        tracing::info!(cache = %path.display(), "using cached routes");
        return read_route_cache(path);
    }

    let hdf5 = path.with_extension(HDF5_EXTENSION);
    if hdf5.is_file() {
        bail!(
            "Found HDF5 route cache {}, which cannot be read. Export it to {} \
             (a JSON list of {{\"target\", \"trees\"}} records) or remove it to search again",
            hdf5.display(),
            path.display()
        );
    }

    let routes = compute()?;
    write_route_cache(path, &routes)?;
    tracing::info!(cache = %path.display(), targets = routes.len(), "cached routes");
    Ok(routes)
}
