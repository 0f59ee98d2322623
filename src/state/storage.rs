//! Best-effort JSON persistence in the data directory.
//!
//! Failures never propagate: a missing or corrupt file reads as `None`, and a
//! failed write is logged and dropped.

use anyhow::Context;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("no readable state at {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring invalid json in {}: {e}", path.display());
            None
        }
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) {
    if let Err(e) = try_write_json(path, value) {
        warn!("could not persist {}: {e:#}", path.display());
    }
}

fn try_write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let payload = serde_json::to_string_pretty(value).context("serializing state")?;
    std::fs::write(path, payload).with_context(|| format!("writing {}", path.display()))
}

/// Fresh scratch directory for persistence tests.
#[cfg(test)]
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("eswatch-test-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
