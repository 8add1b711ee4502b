//! Reading and writing the aggregated snapshot artifact.

use std::io::Write;
use std::path::{Path, PathBuf};

use fuelwatch_core::Snapshot;

use crate::error::SnapshotError;

/// Write `snapshot` as pretty JSON at `path`, creating parent directories.
///
/// The document goes to a uniquely named temporary file in the same
/// directory, which is then renamed over `path`. Readers see either the old
/// or the new snapshot, and overlapping writers never share a temporary file.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] on any filesystem failure and
/// [`SnapshotError::Json`] if serialization fails.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let io_err = |path: &Path, source: std::io::Error| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    };

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(parent, e))?;
            parent.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    let body = serde_json::to_vec_pretty(snapshot).map_err(|e| SnapshotError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    let bytes = body.len();

    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || persist_atomically(&dir, &target, &body))
        .await
        .map_err(|e| io_err(path, std::io::Error::other(e)))?
        .map_err(|e| io_err(path, e))?;

    tracing::info!(
        path = %path.display(),
        brands = snapshot.data.len(),
        bytes,
        "wrote snapshot"
    );
    Ok(())
}

fn persist_atomically(dir: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".snapshot-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be read and
/// [`SnapshotError::Json`] if it is not a snapshot document.
pub async fn read_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let body = tokio::fs::read(path).await.map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_slice(&body).map_err(|e| SnapshotError::Json {
        path: path.display().to_string(),
        source: e,
    })
}
