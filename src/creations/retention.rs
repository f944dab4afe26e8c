//! Removal of old creations and their audio files.

use super::CreationStore;
use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub creations_removed: usize,
    pub files_removed: usize,
}

fn remove_file_if_present(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to remove {:?}: {}", path, e);
            false
        }
    }
}

/// Deletes the file of a creation, if it still exists.
pub fn remove_creation_file(audio_dir: &Path, file_name: &str) -> bool {
    remove_file_if_present(&audio_dir.join(file_name))
}

fn orphan_wavs_older_than(audio_dir: &Path, cutoff: SystemTime) -> Vec<PathBuf> {
    let entries = match fs::read_dir(audio_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping orphan scan of {:?}: {}", audio_dir, e);
            return Vec::new();
        }
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "wav"))
        .filter(|path| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .is_ok_and(|modified| modified < cutoff)
        })
        .collect()
}

/// Removes creations created before `cutoff` together with their WAV files,
/// then any leftover `.wav` in `audio_dir` last modified before `cutoff`.
pub fn prune_older_than(
    store: &dyn CreationStore,
    audio_dir: &Path,
    cutoff: DateTime<Utc>,
) -> Result<PruneSummary> {
    let mut summary = PruneSummary::default();

    for creation in store.list_creations_older_than(cutoff)? {
        if store.delete_creation(&creation.id)? {
            summary.creations_removed += 1;
        }
        if remove_creation_file(audio_dir, &creation.file_name()) {
            summary.files_removed += 1;
        }
    }

    let file_cutoff = SystemTime::from(cutoff);
    for path in orphan_wavs_older_than(audio_dir, file_cutoff) {
        if remove_file_if_present(&path) {
            summary.files_removed += 1;
        }
    }

    Ok(summary)
}

/// The instant before which creations are pruned, or `None` when
/// `retention_days` does not fit in the representable time range.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u64) -> Option<DateTime<Utc>> {
    let days = i64::try_from(retention_days).ok()?;
    now.checked_sub_signed(ChronoDuration::try_days(days)?)
}

/// Spawns the periodic pruning task. Returns `None` when retention is
/// disabled (`retention_days == 0`).
pub fn spawn_retention_task(
    store: Arc<dyn CreationStore>,
    audio_dir: PathBuf,
    retention_days: u64,
    interval_hours: u64,
) -> Option<JoinHandle<()>> {
    if retention_days == 0 {
        info!("Audio retention disabled");
        return None;
    }
    if retention_cutoff(Utc::now(), retention_days).is_none() {
        error!(
            "Audio retention of {} days is out of range, pruning disabled",
            retention_days
        );
        return None;
    }

    info!(
        "Audio retention enabled: keeping {} days, pruning every {} hours",
        retention_days, interval_hours
    );

    Some(tokio::spawn(async move {
        let interval = Duration::from_secs(interval_hours.clamp(1, u64::MAX / 3600) * 60 * 60);
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            let Some(cutoff) = retention_cutoff(Utc::now(), retention_days) else {
                error!("Failed to compute retention cutoff for {} days", retention_days);
                continue;
            };
            let store = store.clone();
            let audio_dir = audio_dir.clone();
            let result = tokio::task::spawn_blocking(move || {
                prune_older_than(store.as_ref(), &audio_dir, cutoff)
            })
            .await;

            match result {
                Ok(Ok(summary)) => {
                    if summary.creations_removed > 0 || summary.files_removed > 0 {
                        info!(
                            "Pruned {} creations and {} audio files",
                            summary.creations_removed, summary.files_removed
                        );
                    }
                }
                Ok(Err(e)) => error!("Failed to prune creations: {:#}", e),
                Err(e) => error!("Pruning task panicked: {}", e),
            }
        }
    }))
}
