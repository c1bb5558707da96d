//! Progress reporting for counting runs.
//!
//! The walker never touches the terminal; it reports through the
//! [`CountObserver`] seam. [`TreeReporter`] is the terminal implementation:
//! it recolors the completed entry's line in the shared [`FileTree`] and
//! advances an in-place loader bar. [`NullObserver`] keeps headless runs
//! and tests display-free.

use std::path::Path;
use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};

use crate::tree::{EntryStatus, FileTree};

/// Observer notified as the walker completes or skips files.
///
/// Implementations must be callable from any walker task, so both the tree
/// mutation and the loader redraw have to be serialized internally.
pub trait CountObserver: Send + Sync {
    /// A file was read, filtered, and counted.
    fn on_file_done(&self, _path: &Path) {}

    /// A file was excluded at traversal time.
    fn on_file_skipped(&self, _path: &Path) {}
}

/// Observer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl CountObserver for NullObserver {}

/// Terminal reporter: tree line recoloring plus the loader bar.
///
/// All tree-text mutation goes through the mutex; the bar only advances for
/// files that are part of the snapshot, so it can reach its length even
/// when files are skipped.
pub struct TreeReporter {
    tree: Arc<Mutex<FileTree>>,
    bar: ProgressBar,
}

impl TreeReporter {
    /// Create a reporter over a shared snapshot. The bar length is the
    /// snapshot's file count; `quiet` hides the bar entirely.
    #[must_use]
    pub fn new(tree: Arc<Mutex<FileTree>>, quiet: bool) -> Self {
        let total = tree.lock().unwrap().file_count() as u64;
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total)
        };
        bar.set_style(loader_style());
        Self { tree, bar }
    }

    /// Finish the loader line.
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Current loader position, for tests and logging.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    fn mark(&self, path: &Path, status: EntryStatus) {
        let marked = self.tree.lock().unwrap().mark_file(path, status).is_some();
        if marked {
            self.bar.inc(1);
        }
    }
}

impl CountObserver for TreeReporter {
    fn on_file_done(&self, path: &Path) {
        self.mark(path, EntryStatus::Done);
    }

    fn on_file_skipped(&self, path: &Path) {
        self.mark(path, EntryStatus::Skipped);
    }
}

fn loader_style() -> ProgressStyle {
    ProgressStyle::with_template("[{bar:20}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("▮▮ ")
}
