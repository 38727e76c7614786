use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    process,
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::infrastructure::directories::ResolvedPaths;

const LOCK_FILENAME: &str = ".server.lock";

/// Exclusive lock on the data directory. Two servers sharing the same store
/// files would lose each other's updates, so the second one refuses to start.
#[derive(Debug)]
pub struct InstanceGuard {
    file: File,
    path: PathBuf,
}

impl InstanceGuard {
    pub fn acquire(paths: &ResolvedPaths) -> Result<Self> {
        let lock_path = paths.data_dir.join(LOCK_FILENAME);
        fs::create_dir_all(&paths.data_dir)
            .with_context(|| format!("failed to ensure data dir {}", paths.data_dir.display()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file {}", lock_path.display()))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                write_lock_info(&mut file, process::id())?;
                tracing::info!(
                    target: "lifecycle",
                    pid = process::id(),
                    path = %lock_path.display(),
                    "acquired data directory lock"
                );
                Ok(Self {
                    file,
                    path: lock_path,
                })
            }
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                let holder = read_lock_info(&lock_path)?
                    .map(|info| format!("pid {}", info.pid))
                    .unwrap_or_else(|| "unknown pid".to_string());
                Err(anyhow!(
                    "another server instance ({holder}) is using {}",
                    paths.data_dir.display()
                ))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!(
                    target: "lifecycle",
                    path = %self.path.display(),
                    error = %err,
                    "failed to remove lock file on shutdown"
                );
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    started_at: i64,
}

fn write_lock_info(file: &mut File, pid: u32) -> Result<()> {
    let info = LockInfo {
        pid,
        started_at: Utc::now().timestamp_millis(),
    };
    let payload = serde_json::to_vec(&info)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&payload)?;
    file.sync_all()?;
    Ok(())
}

fn read_lock_info(lock_path: &Path) -> Result<Option<LockInfo>> {
    match fs::read_to_string(lock_path) {
        Ok(contents) => {
            if contents.trim().is_empty() {
                return Ok(None);
            }
            match serde_json::from_str(&contents) {
                Ok(info) => Ok(Some(info)),
                Err(err) => {
                    tracing::warn!(
                        target: "lifecycle",
                        path = %lock_path.display(),
                        error = %err,
                        "failed to parse lock file metadata"
                    );
                    Ok(None)
                }
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
