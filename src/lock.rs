//! Per-interface file locking.
//!
//! Reconciling one interface from two processes at once would interleave
//! adds and removes, so every mutating command holds an advisory flock on
//! a lock file named after the interface.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lock file name for `interface`; characters outside `[A-Za-z0-9_.-]`
/// become `_`.
///
/// Distinct names can share a file (`br 0` and `br_0`). Those interfaces
/// are then serialized against each other, which is only stricter.
pub fn lock_file_name(interface: &str) -> String {
    let sanitized: String = interface
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "_.-".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("ipfwd-{}.lock", sanitized)
}

/// An exclusive lock on one interface, released on drop.
#[derive(Debug)]
pub struct InterfaceLock {
    _file: File,
    path: PathBuf,
}

impl InterfaceLock {
    /// Attempt to acquire the lock for `interface` under `lock_dir`.
    /// Fails immediately if another process holds it.
    pub fn acquire(lock_dir: &Path, interface: &str) -> Result<Self> {
        fs::create_dir_all(lock_dir)
            .with_context(|| format!("Failed to create lock directory: {:?}", lock_dir))?;

        let path = lock_dir.join(lock_file_name(interface));

        // No truncate: another holder may have it open
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {:?}", path))?;

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("Failed to set lock file permissions")?;

        file.try_lock_exclusive().map_err(|_| {
            anyhow::anyhow!(
                "Another ipfwd process is already changing {}.\n\
                 Wait for it to complete, or remove the stale lock file: {}",
                interface,
                path.display()
            )
        })?;

        debug!("Acquired lock {:?}", path);
        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
