//! Writable settings file source.

use super::ConfigSource;
use crate::codec;
use crate::core::{ConfigKey, Snapshot};
use crate::error::{ConfigError, Result};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Write-side state of a settings file.
enum WriterState {
    /// No handle yet; the next `set` truncates the file.
    Unopened,
    /// Handle positioned at the end of everything written so far.
    Open(File),
}

/// A user-editable `key=value` settings file that is also the write target.
///
/// Reads come from the in-memory snapshot. Writes update the snapshot and are
/// then written through to disk:
///
/// - the first `set` after construction (or after [`dispose`](ConfigSource::dispose))
///   creates the parent directory and truncates the file to zero length;
/// - every `set` then appends one `key=value` line to the open handle.
///
/// The file is therefore an append-only log of the `set` calls made since
/// the handle was opened. A key set twice appears twice on disk; parsing
/// keeps the last value. Keys loaded from the file before the first `set`
/// stay in memory but are not written back, unless
/// [`rewrite_on_open`](Self::rewrite_on_open) is enabled.
///
/// If the disk write fails the snapshot has already been updated, so memory
/// is ahead of disk until the caller retries.
///
/// # Examples
///
/// ```rust,no_run
/// use halflife_launcher::sources::{ConfigSource, SettingsFileSource};
///
/// # fn example() -> halflife_launcher::error::Result<()> {
/// let settings = SettingsFileSource::new("settings.ini").optional(true);
/// settings.load()?;
/// settings.set(&"Game".into(), "gearbox")?;
/// # Ok(())
/// # }
/// ```
pub struct SettingsFileSource {
    path: PathBuf,
    optional: bool,
    reload_on_change: bool,
    rewrite_on_open: bool,
    current: ArcSwap<Snapshot>,
    writer: Mutex<WriterState>,
}

impl SettingsFileSource {
    /// Create a settings source for the given file.
    ///
    /// The source starts empty; it is read when added to a provider.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
            reload_on_change: false,
            rewrite_on_open: false,
            current: ArcSwap::from_pointee(Snapshot::new()),
            writer: Mutex::new(WriterState::Unopened),
        }
    }

    /// Tolerate a missing file by loading an empty snapshot.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Reload this source when the file changes on disk.
    pub fn reload_on_change(mut self, enabled: bool) -> Self {
        self.reload_on_change = enabled;
        self
    }

    /// Write the loaded keys back after truncating on the first `set`.
    ///
    /// With this enabled the first `set` writes the snapshot as it stood
    /// before that call, then appends the new line, so keys already in the
    /// file survive the truncation.
    pub fn rewrite_on_open(mut self, enabled: bool) -> Self {
        self.rewrite_on_open = enabled;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file handle is currently open.
    pub fn is_open(&self) -> bool {
        matches!(*self.writer.lock(), WriterState::Open(_))
    }

    fn open_truncated(&self, previous: &Snapshot) -> io::Result<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        let rewritten = if self.rewrite_on_open { previous.len() } else { 0 };
        if rewritten > 0 {
            file.write_all(codec::serialize(previous).as_bytes())?;
        }

        debug!(path = %self.path.display(), rewritten, "opened settings file for writing");
        Ok(file)
    }
}

impl ConfigSource for SettingsFileSource {
    fn name(&self) -> String {
        format!("settings:{}", self.path.display())
    }

    fn read(&self) -> Result<Snapshot> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(codec::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.optional {
                    debug!(path = %self.path.display(), "optional settings file not found");
                    Ok(Snapshot::new())
                } else {
                    Err(ConfigError::MissingRequiredSource(self.path.clone()))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    fn install(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    fn set(&self, key: &ConfigKey, value: &str) -> Result<()> {
        let mut writer = self.writer.lock();

        let previous = self.current.load_full();
        let mut next = (*previous).clone();
        next.insert(key.clone(), value);
        self.current.store(Arc::new(next));

        if matches!(*writer, WriterState::Unopened) {
            *writer = WriterState::Open(self.open_truncated(&previous)?);
        }

        if let WriterState::Open(file) = &mut *writer {
            file.write_all(codec::format_line(key.as_str(), value).as_bytes())?;
            file.sync_data()?;
        }

        debug!(path = %self.path.display(), key = %key, "wrote setting");
        Ok(())
    }

    fn is_writable(&self) -> bool {
        true
    }

    fn watch_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn reload_on_change(&self) -> bool {
        self.reload_on_change
    }

    fn dispose(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        if let WriterState::Open(file) = std::mem::replace(&mut *writer, WriterState::Unopened) {
            file.sync_all()?;
            debug!(path = %self.path.display(), "closed settings file");
        }
        Ok(())
    }
}
