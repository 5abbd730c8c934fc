//! # Scene Hot-Reloading
//!
//! Watches the scene file so controller gains can be edited while the
//! simulation runs. The directory holding the file is watched rather than
//! the file itself, since many editors save by replacing the file.
//!
//! Events arrive on the `notify` thread and are forwarded over a channel; the
//! simulation loop drains it once per step.

use anyhow::{anyhow, Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info};

/// Keeps the underlying watcher alive; dropping it stops watching.
pub struct SceneWatcher {
    _watcher: RecommendedWatcher,
    changes: Receiver<PathBuf>,
}

impl SceneWatcher {
    /// Whether the scene file changed since the last call.
    pub fn changed(&self) -> bool {
        drain(&self.changes)
    }
}

/// Empty the channel; true if anything was queued.
fn drain(changes: &Receiver<PathBuf>) -> bool {
    changes.try_iter().count() > 0
}

/// Start watching `scene`.
///
/// # Errors
///
/// Fails if the file has no parent directory or the watcher cannot be
/// started on it.
pub fn start(scene: &Path) -> Result<SceneWatcher> {
    let scene = scene
        .canonicalize()
        .with_context(|| format!("resolving {}", scene.display()))?;
    let dir = scene
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", scene.display()))?
        .to_path_buf();
    let name = scene
        .file_name()
        .ok_or_else(|| anyhow!("{} is not a file", scene.display()))?
        .to_os_string();

    let (tx, changes) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        handle_file_event(result, &name, &tx);
    })
    .map_err(|e| anyhow!("Failed to create file watcher: {e}"))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| anyhow!("Failed to watch {}: {e}", dir.display()))?;

    info!("Scene watcher active - monitoring {}", scene.display());
    Ok(SceneWatcher {
        _watcher: watcher,
        changes,
    })
}

fn handle_file_event(result: notify::Result<Event>, name: &OsString, tx: &Sender<PathBuf>) {
    let event = match result {
        Ok(event) => event,
        Err(e) => {
            error!("File watcher error: {e:?}");
            return;
        }
    };
    if !event.kind.is_modify() && !event.kind.is_create() {
        return;
    }
    for path in event.paths {
        if path.file_name() == Some(name.as_os_str()) {
            debug!("scene file touched: {}", path.display());
            // The receiver is gone once the loop has finished.
            let _ = tx.send(path);
        }
    }
}
