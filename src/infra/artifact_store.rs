// ============================================================
// Layer 6 — Filesystem Artifact Store
// ============================================================
// Saves and restores ModelArtifacts as JSON files.
//
// One file per location, overwritten on every save. A save
// never writes into the destination file directly:
//
//   1. serialise the artifact to bytes
//   2. write them to a temp file in the destination directory
//   3. fsync the temp file
//   4. rename it over the destination (atomic on one filesystem)
//
// A concurrent reader therefore sees either the previous
// artifact or the new one, never a torn mix.
//
// Writers to the same location are serialised by a
// process-wide lock registry keyed by the canonical path.
// Readers take no lock at all.
//
// Error mapping:
//   load, file missing          → ArtifactNotFound
//   load, bytes unreadable      → CorruptArtifact
//   load, other I/O failure     → PersistenceError
//   save, any I/O failure       → PersistenceError
//
// Reference: tempfile crate documentation (NamedTempFile::persist)
//            Rust Book §9 (Error Handling)

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::domain::artifact::ModelArtifact;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::ArtifactStore;

/// Stores artifacts as JSON files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

impl FsArtifactStore {
    pub fn new() -> Self {
        Self
    }
}

/// The writer lock for the file `file_name` inside `dir`, shared by every
/// store in the process.
///
/// `dir` must already exist: it is canonicalised so that relative paths,
/// symlinks and working-directory changes all map one file to one key.
/// Entries are never removed; the registry holds one small entry per
/// distinct artifact location the process has saved to.
fn location_lock(dir: &Path, file_name: &OsStr) -> io::Result<Arc<Mutex<()>>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let key = fs::canonicalize(dir)?.join(file_name);

    Ok(LOCKS
        .get_or_init(Default::default)
        .lock()
        .entry(key)
        .or_default()
        .clone())
}

fn persistence_error(action: &str, path: &Path, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::PersistenceError(format!("cannot {action} '{}': {err}", path.display()))
}

impl ArtifactStore for FsArtifactStore {
    fn save(&self, artifact: &ModelArtifact, location: &Path) -> PipelineResult<()> {
        artifact.validate()?;

        let bytes = serde_json::to_vec(artifact)
            .map_err(|e| persistence_error("serialise artifact for", location, e))?;

        // A bare file name has an empty parent; write beside it in the cwd
        let dir = location
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        fs::create_dir_all(dir).map_err(|e| persistence_error("create directory", dir, e))?;

        let file_name = location
            .file_name()
            .ok_or_else(|| persistence_error("save to", location, "path has no file name"))?;
        let lock = location_lock(dir, file_name)
            .map_err(|e| persistence_error("resolve directory", dir, e))?;
        let _guard = lock.lock();

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| persistence_error("create temp file in", dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| persistence_error("write", tmp.path(), e))?;
        tmp.persist(location)
            .map_err(|e| persistence_error("move artifact into", location, e.error))?;

        tracing::debug!("Saved artifact ({} bytes) to '{}'", bytes.len(), location.display());
        Ok(())
    }

    fn load(&self, location: &Path) -> PipelineResult<ModelArtifact> {
        let bytes = fs::read(location).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PipelineError::ArtifactNotFound(format!(
                "no artifact persisted at '{}'",
                location.display()
            )),
            _ => persistence_error("read", location, e),
        })?;

        let artifact: ModelArtifact = serde_json::from_slice(&bytes).map_err(|e| {
            PipelineError::CorruptArtifact(format!(
                "'{}' is not a valid model artifact: {e}",
                location.display()
            ))
        })?;
        artifact.validate()?;

        tracing::debug!("Loaded artifact from '{}'", location.display());
        Ok(artifact)
    }

    fn exists(&self, location: &Path) -> bool {
        location.is_file()
    }
}
