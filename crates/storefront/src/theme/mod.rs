//! Light/dark theme preference.
//!
//! Same shape as the cart: in-memory state, change notification, and a
//! background write of the `@app_theme` flag after every change.

pub mod palette;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, PersistTask, SnapshotWriter, keys, read_json};

pub use palette::Palette;

/// Theme selection.
///
/// Stored as a bare JSON boolean (`true` for dark), not by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// Mode for a stored dark flag.
    #[must_use]
    pub const fn from_dark(is_dark: bool) -> Self {
        if is_dark { Self::Dark } else { Self::Light }
    }

    /// Whether this is the dark mode.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Colors for this mode.
    #[must_use]
    pub const fn palette(self) -> Palette {
        match self {
            Self::Light => palette::LIGHT,
            Self::Dark => palette::DARK,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme preference with write-through persistence.
#[derive(Debug)]
pub struct ThemeManager {
    mode: Mutex<ThemeMode>,
    changes: watch::Sender<ThemeMode>,
    writer: SnapshotWriter,
    loaded: AtomicBool,
    edits: AtomicU64,
}

impl ThemeManager {
    /// Create a manager in light mode backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (changes, _) = watch::channel(ThemeMode::Light);
        Self {
            mode: Mutex::new(ThemeMode::Light),
            changes,
            writer: SnapshotWriter::new(store, keys::THEME),
            loaded: AtomicBool::new(false),
            edits: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ThemeMode> {
        self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch between light and dark.
    pub fn toggle(&self) -> PersistTask {
        self.update(ThemeMode::toggled)
    }

    /// Select a mode explicitly.
    pub fn set(&self, mode: ThemeMode) -> PersistTask {
        self.update(|_| mode)
    }

    fn update(&self, next: impl FnOnce(ThemeMode) -> ThemeMode) -> PersistTask {
        let mut mode = self.lock();
        self.edits.fetch_add(1, Ordering::SeqCst);
        let new = next(*mode);
        if new != *mode {
            *mode = new;
            self.changes.send_replace(new);
        }
        self.persist(new)
    }

    fn persist(&self, mode: ThemeMode) -> PersistTask {
        add_breadcrumb("theme", "Theme set", Some(&[("mode", mode.as_str())]));
        self.writer.write(mode.is_dark().to_string())
    }

    /// Restore the saved preference, once. Stays light if nothing valid is stored.
    ///
    /// A toggle or set made while the value is being read wins over it.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        if self.loaded.load(Ordering::SeqCst) {
            return;
        }

        let edits_before = self.edits.load(Ordering::SeqCst);

        match read_json::<bool>(self.writer.store().as_ref(), keys::THEME).await {
            Ok(Some(is_dark)) => {
                let mode = ThemeMode::from_dark(is_dark);
                let mut current = self.lock();
                if self.edits.load(Ordering::SeqCst) != edits_before {
                    debug!("Theme changed during load, keeping current mode");
                } else if *current != mode {
                    debug!(%mode, "Restored theme");
                    *current = mode;
                    self.changes.send_replace(mode);
                }
            }
            Ok(None) => debug!("No saved theme"),
            Err(e) => warn!(error = %e, "Failed to load theme from storage"),
        }

        self.loaded.store(true, Ordering::SeqCst);
    }

    /// Whether [`Self::load`] has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        *self.lock()
    }

    /// Whether dark mode is active.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.mode().is_dark()
    }

    /// Colors for the current mode.
    #[must_use]
    pub fn palette(&self) -> Palette {
        self.mode().palette()
    }

    /// Receiver that observes mode changes; map through [`ThemeMode::palette`]
    /// for colors.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.changes.subscribe()
    }
}
