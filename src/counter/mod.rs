//! The line counting core.
//!
//! This module owns the configuration and result types, the error taxonomy,
//! and the run orchestration: a counting run walks the directory tree with
//! the concurrent walker ([`walker`]), aggregates totals behind a mutex,
//! and terminates through the write-once cancellation cell ([`cancel`]).
//!
//! # Example
//!
//! ```no_run
//! use loctree::counter::{run_count, CountConfig};
//!
//! let config = CountConfig::new(".")
//!     .with_ignore_tokens(vec!["target".to_string()]);
//! let outcome = run_count(&config).unwrap();
//! println!("{} lines in {} files", outcome.totals.lines, outcome.totals.files.len());
//! ```

pub mod cancel;
pub mod filter;
pub mod walker;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::progress::CountObserver;
use cancel::CancelCell;

/// Errors that can terminate a counting run.
#[derive(thiserror::Error, Debug)]
pub enum CountError {
    /// The requested root path does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The requested root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A directory listing or file read failed during traversal.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The run was interrupted by a shutdown signal.
    #[error("Interrupted")]
    Interrupted,
}

/// Configuration for a counting run.
///
/// Built with the `with_*` methods; the defaults mirror the CLI defaults
/// (count everything recursively, exclude blank lines, include comments).
pub struct CountConfig {
    /// Root directory to count.
    pub root: PathBuf,
    /// Literal substring tokens; any root-relative path containing one is
    /// excluded from traversal and counting.
    pub ignore_tokens: Vec<String>,
    /// Whether to descend into subdirectories.
    pub recursive: bool,
    /// Whether blank lines count.
    pub include_blanks: bool,
    /// Whether comment-like lines count.
    pub include_comments: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional observer notified as files complete.
    pub observer: Option<Arc<dyn CountObserver>>,
}

impl std::fmt::Debug for CountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountConfig")
            .field("root", &self.root)
            .field("ignore_tokens", &self.ignore_tokens)
            .field("recursive", &self.recursive)
            .field("include_blanks", &self.include_blanks)
            .field("include_comments", &self.include_comments)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("observer", &self.observer.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

impl CountConfig {
    /// Create a configuration rooted at `root` with default options.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_tokens: Vec::new(),
            recursive: true,
            include_blanks: false,
            include_comments: true,
            shutdown_flag: None,
            observer: None,
        }
    }

    /// Set the ignore tokens.
    #[must_use]
    pub fn with_ignore_tokens(mut self, tokens: Vec<String>) -> Self {
        self.ignore_tokens = tokens;
        self
    }

    /// Enable or disable recursion into subdirectories.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Include or exclude blank lines.
    #[must_use]
    pub fn with_include_blanks(mut self, include: bool) -> Self {
        self.include_blanks = include;
        self
    }

    /// Include or exclude comment-like lines.
    #[must_use]
    pub fn with_include_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the observer notified as files complete or are skipped.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CountObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Check if shutdown has been requested.
    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check a path against the ignore tokens.
    pub(crate) fn matches_ignore(&self, path: &Path) -> bool {
        is_ignored(&self.root, &self.ignore_tokens, path)
    }
}

/// Check whether a path is excluded by the ignore list.
///
/// A token excludes an object when it is a literal substring of the path
/// relative to `root`. This is the one ignore semantic used everywhere:
/// the registry's coloring, the walker's directory skip, and the walker's
/// file skip all agree.
#[must_use]
pub fn is_ignored(root: &Path, ignore_tokens: &[String], path: &Path) -> bool {
    if ignore_tokens.is_empty() {
        return false;
    }
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel.to_string_lossy();
    ignore_tokens.iter().any(|token| rel.contains(token.as_str()))
}

/// Aggregated totals of a completed run.
///
/// `files` and `dirs` are in completion order: concurrent tasks interleave,
/// so the order is not the filesystem order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountTotals {
    /// Total count of lines that survived filtering.
    pub lines: usize,
    /// Names of every counted file, including files whose every line was
    /// filtered out.
    pub files: Vec<String>,
    /// Names of every fully traversed directory (the root excluded).
    pub dirs: Vec<String>,
}

/// Counters describing how a walk unfolded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories listed (the root included).
    pub dirs_walked: usize,
    /// Files read and counted.
    pub files_counted: usize,
    /// Files excluded at traversal time.
    pub files_skipped: usize,
    /// Walker tasks dispatched across all levels.
    pub tasks_spawned: usize,
}

/// Atomic counterparts of [`WalkStats`], shared by the walker tasks.
#[derive(Debug, Default)]
pub(crate) struct WalkCounters {
    pub dirs_walked: AtomicUsize,
    pub files_counted: AtomicUsize,
    pub files_skipped: AtomicUsize,
    pub tasks_spawned: AtomicUsize,
}

impl WalkCounters {
    fn snapshot(&self) -> WalkStats {
        WalkStats {
            dirs_walked: self.dirs_walked.load(Ordering::Relaxed),
            files_counted: self.files_counted.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
        }
    }
}

/// Totals and stats of a successful run.
#[derive(Debug, Clone)]
pub struct CountOutcome {
    /// Aggregated line count, file names, and directory names.
    pub totals: CountTotals,
    /// Walk counters, for logging and tests.
    pub stats: WalkStats,
}

/// Validate that `path` exists and is a directory.
pub(crate) fn ensure_directory(path: &Path) -> Result<(), CountError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(CountError::NotADirectory(path.to_path_buf())),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CountError::NotFound(path.to_path_buf()))
        }
        Err(source) => Err(CountError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Run a counting pass over `config.root`.
///
/// The walk runs on a background thread; this call blocks on the
/// cancellation cell and returns once the cell fires. The first fatal cause
/// wins: an I/O failure anywhere in the tree fails the whole run, a
/// shutdown request maps to [`CountError::Interrupted`], and a clean root
/// return yields the totals.
///
/// # Errors
///
/// Fails before any traversal if the root is missing or not a directory,
/// and during traversal with the first error any task reported.
pub fn run_count(config: &CountConfig) -> Result<CountOutcome, CountError> {
    ensure_directory(&config.root)?;

    let cancel = CancelCell::new();
    let totals = Mutex::new(CountTotals::default());
    let counters = WalkCounters::default();

    let cause = std::thread::scope(|scope| {
        let ctx = walker::WalkContext {
            config,
            cancel: &cancel,
            totals: &totals,
            counters: &counters,
        };
        scope.spawn(move || {
            walker::walk_dir(ctx, &ctx.config.root);
            // Root return means every branch joined. An error that fired
            // earlier wins; this success signal is then dropped.
            ctx.cancel.fire(None);
        });
        cancel.wait()
    });

    match cause {
        Some(err) => Err(err),
        None => {
            let stats = counters.snapshot();
            log::info!(
                "counted {} files across {} directories ({} skipped, {} tasks)",
                stats.files_counted,
                stats.dirs_walked,
                stats.files_skipped,
                stats.tasks_spawned
            );
            Ok(CountOutcome {
                totals: totals.into_inner().unwrap(),
                stats,
            })
        }
    }
}
