//! File watching for automatic configuration reloads.

use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Configuration watcher that monitors files for changes.
///
/// Each file is observed through its parent directory, so a file that does
/// not exist yet, or that an editor replaces by renaming, is still seen.
/// Events are debounced per file: every change pushes that file's deadline
/// out by the debounce window, and one signal carrying the file path is
/// sent once the file has been quiet for the whole window.
///
/// # Examples
///
/// ```rust,no_run
/// use halflife_launcher::notify::ConfigWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(500))?;
/// watcher.watch("/path/to/settings.ini").await?;
///
/// while let Some(path) = rx.recv().await {
///     println!("{} changed, reload triggered!", path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcher {
    watcher: Arc<tokio::sync::Mutex<RecommendedWatcher>>,
    debounce_duration: Duration,
    watched_files: Arc<Mutex<HashSet<PathBuf>>>,
    watched_dirs: tokio::sync::Mutex<HashMap<PathBuf, usize>>,
}

impl ConfigWatcher {
    /// Create a new configuration watcher.
    ///
    /// # Arguments
    ///
    /// * `debounce_duration` - Quiet period required before a change is reported
    ///
    /// # Returns
    ///
    /// Returns a tuple of (ConfigWatcher, receiver channel). The receiver gets
    /// the resolved path of each file that changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying file watcher cannot be created.
    pub fn new(debounce_duration: Duration) -> Result<(Self, mpsc::Receiver<PathBuf>)> {
        let (tx, rx) = mpsc::channel(100);
        let debounce = debounce_duration;
        let watched_files: Arc<Mutex<HashSet<PathBuf>>> = Arc::default();

        // Channel for raw events from notify
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PathBuf>();

        let files = Arc::clone(&watched_files);
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            if !matches!(
                event.kind,
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
            ) {
                return;
            }
            let files = files.lock();
            for path in event.paths {
                if files.contains(&path) {
                    let _ = event_tx.send(path);
                }
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        tokio::spawn(async move {
            let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

            loop {
                let next_deadline = pending.values().min().copied();
                tokio::select! {
                    event = event_rx.recv() => match event {
                        Some(path) => {
                            pending.insert(path, Instant::now() + debounce);
                        }
                        None => break,
                    },
                    _ = sleep_until(next_deadline) => {
                        let now = Instant::now();
                        let due: Vec<PathBuf> = pending
                            .iter()
                            .filter(|(_, deadline)| **deadline <= now)
                            .map(|(path, _)| path.clone())
                            .collect();
                        for path in due {
                            pending.remove(&path);
                            if tx.send(path).await.is_err() {
                                // Receiver dropped, exit
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok((
            Self {
                watcher: Arc::new(tokio::sync::Mutex::new(watcher)),
                debounce_duration,
                watched_files,
                watched_dirs: tokio::sync::Mutex::new(HashMap::new()),
            },
            rx,
        ))
    }

    /// Start watching a file.
    ///
    /// Returns the resolved path that will be reported on the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be resolved or watched.
    pub async fn watch(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let (dir, resolved) = resolve(path.as_ref())?;

        let mut dirs = self.watched_dirs.lock().await;
        let count = dirs.entry(dir.clone()).or_insert(0);
        if *count == 0 {
            self.watcher
                .lock()
                .await
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;
        }

        if self.watched_files.lock().insert(resolved.clone()) {
            *count += 1;
        }

        Ok(resolved)
    }

    /// Stop watching a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be resolved or unwatched.
    pub async fn unwatch(&self, path: impl AsRef<Path>) -> Result<()> {
        let (dir, resolved) = resolve(path.as_ref())?;

        if !self.watched_files.lock().remove(&resolved) {
            return Ok(());
        }

        let mut dirs = self.watched_dirs.lock().await;
        if let Some(count) = dirs.get_mut(&dir) {
            *count -= 1;
            if *count == 0 {
                dirs.remove(&dir);
                self.watcher
                    .lock()
                    .await
                    .unwatch(&dir)
                    .map_err(|e| ConfigError::WatchError(format!("Failed to unwatch path: {}", e)))?;
            }
        }

        Ok(())
    }

    /// Get the debounce duration for this watcher.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Get a list of currently watched files.
    pub async fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.watched_files.lock().iter().cloned().collect();
        paths.sort();
        paths
    }
}

/// Split a file path into its canonical parent directory and the file path
/// under that directory.
fn resolve(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = path.file_name().ok_or_else(|| {
        ConfigError::WatchError(format!("Not a file path: {}", path.display()))
    })?;
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = parent.canonicalize().map_err(|e| {
        ConfigError::WatchError(format!("Failed to resolve {}: {}", parent.display(), e))
    })?;
    let resolved = dir.join(file_name);
    Ok((dir, resolved))
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_watcher_creation() {
        let result = ConfigWatcher::new(Duration::from_millis(100));
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_watch_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.ini");
        fs::write(&path, "Map=crossfire\n").unwrap();

        let (watcher, _rx) = ConfigWatcher::new(Duration::from_millis(100)).unwrap();
        let resolved = watcher.watch(&path).await.unwrap();

        assert_eq!(resolved.file_name(), path.file_name());
        assert_eq!(watcher.watched_paths().await, vec![resolved]);
    }

    #[tokio::test]
    async fn test_watch_file_that_does_not_exist_yet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.ini");

        let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(50)).unwrap();
        let resolved = watcher.watch(&path).await.unwrap();

        fs::write(&path, "Map=crossfire\n").unwrap();

        let changed = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(changed, Some(resolved));
    }

    #[tokio::test]
    async fn test_watch_missing_directory() {
        let (watcher, _rx) = ConfigWatcher::new(Duration::from_millis(100)).unwrap();
        let result = watcher.watch("/nonexistent/dir/settings.ini").await;
        assert!(matches!(result, Err(ConfigError::WatchError(_))));
    }

    #[tokio::test]
    async fn test_other_files_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.ini");
        fs::write(&path, "").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(50)).unwrap();
        watcher.watch(&path).await.unwrap();

        fs::write(temp_dir.path().join("other.ini"), "Map=crossfire\n").unwrap();

        let result = timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_burst_collapses_into_one_signal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.ini");
        fs::write(&path, "").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(300)).unwrap();
        watcher.watch(&path).await.unwrap();

        for i in 0..5 {
            fs::write(&path, format!("MaxPlayers={}\n", i)).unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let first = timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(matches!(first, Ok(Some(_))));

        let second = timeout(Duration::from_millis(600), rx.recv()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_unwatch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.ini");
        fs::write(&path, "Map=crossfire\n").unwrap();

        let (watcher, _rx) = ConfigWatcher::new(Duration::from_millis(100)).unwrap();
        watcher.watch(&path).await.unwrap();
        assert_eq!(watcher.watched_paths().await.len(), 1);

        watcher.unwatch(&path).await.unwrap();
        assert!(watcher.watched_paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_debounce_duration() {
        let duration = Duration::from_millis(500);
        let (watcher, _rx) = ConfigWatcher::new(duration).unwrap();
        assert_eq!(watcher.debounce_duration(), duration);
    }
}
