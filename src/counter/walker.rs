//! The concurrent directory walker.
//!
//! Each directory level is a fan-out/fan-in step: the level's entries are
//! listed, sorted by name, and dispatched as rayon scoped tasks according
//! to the dispatch plan; the end of the scope is the join point, so a
//! parent level never reports completion before all of its children have.
//! Recursion into subdirectories nests scopes, which is where the
//! depth-wise parallelism comes from.
//!
//! Per level the fan-out is capped at four concurrent branches:
//!
//! - 0 entries: no-op
//! - 1 entry: one task, wait for it
//! - 2 to 4 entries: one task per entry, wait for all
//! - 5 or more: exactly 4 contiguous slices processed sequentially inside
//!   their task, sizes differing by at most 1
//!
//! Cancellation is cooperative: tasks check the cell before listing a
//! directory and before each entry, which stops future scheduling but never
//! aborts an in-flight read.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use super::cancel::CancelCell;
use super::{filter, CountConfig, CountError, CountTotals, WalkCounters};

/// Maximum concurrent branches dispatched per directory level.
const MAX_FANOUT: usize = 4;

/// Shared references threaded through every walker task.
#[derive(Clone, Copy)]
pub(crate) struct WalkContext<'a> {
    pub config: &'a CountConfig,
    pub cancel: &'a CancelCell,
    pub totals: &'a Mutex<CountTotals>,
    pub counters: &'a WalkCounters,
}

impl WalkContext<'_> {
    /// Check for cancellation, folding a pending shutdown request into the
    /// cell as the first cause.
    fn cancelled(&self) -> bool {
        if self.cancel.is_fired() {
            return true;
        }
        if self.config.is_shutdown_requested() {
            self.cancel.fire(Some(CountError::Interrupted));
            return true;
        }
        false
    }

    fn notify_done(&self, path: &Path) {
        if let Some(observer) = &self.config.observer {
            observer.on_file_done(path);
        }
    }

    fn notify_skipped(&self, path: &Path) {
        if let Some(observer) = &self.config.observer {
            observer.on_file_skipped(path);
        }
    }
}

/// One directory entry, listed and sorted before dispatch.
struct ListedEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Recursively walk one directory with bounded fan-out.
pub(crate) fn walk_dir(ctx: WalkContext<'_>, dir: &Path) {
    if ctx.cancelled() {
        return;
    }
    ctx.counters.dirs_walked.fetch_add(1, Ordering::Relaxed);

    let entries = match list_entries(dir) {
        Ok(entries) => entries,
        Err(err) => {
            ctx.cancel.fire(Some(err));
            return;
        }
    };

    let plan = dispatch_plan(entries.len());
    if plan.is_empty() {
        return;
    }

    // The scope end is the fan-in join point for this level.
    rayon::scope(|s| {
        for range in plan {
            ctx.counters.tasks_spawned.fetch_add(1, Ordering::Relaxed);
            let slice = &entries[range];
            s.spawn(move |_| {
                for entry in slice {
                    process_entry(ctx, entry);
                }
            });
        }
    });
}

/// List a directory and sort its entries by name.
fn list_entries(dir: &Path) -> Result<Vec<ListedEntry>, CountError> {
    let read = fs::read_dir(dir).map_err(|source| CountError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut entries = Vec::new();
    for result in read {
        let entry = result.map_err(|source| CountError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| CountError::Io {
            path: entry.path(),
            source,
        })?;
        entries.push(ListedEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Partition `len` entries into per-level dispatch ranges.
///
/// Up to [`MAX_FANOUT`] entries get one range each; above that, exactly
/// [`MAX_FANOUT`] contiguous ranges whose sizes differ by at most 1 and
/// whose concatenation preserves the entry order.
#[must_use]
pub fn dispatch_plan(len: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    if len <= MAX_FANOUT {
        return (0..len).map(|i| i..i + 1).collect();
    }
    let div = len / MAX_FANOUT;
    let rem = len % MAX_FANOUT;
    let mut plan = Vec::with_capacity(MAX_FANOUT);
    let mut start = 0;
    for i in 0..MAX_FANOUT {
        let size = div + usize::from(i < rem);
        plan.push(start..start + size);
        start += size;
    }
    plan
}

fn process_entry(ctx: WalkContext<'_>, entry: &ListedEntry) {
    if ctx.cancelled() {
        return;
    }
    if entry.is_dir {
        process_directory(ctx, entry);
    } else {
        process_file(ctx, entry);
    }
}

fn process_directory(ctx: WalkContext<'_>, entry: &ListedEntry) {
    if entry.name.starts_with('.') {
        log::trace!("skipping hidden directory: {}", entry.path.display());
        return;
    }
    if ctx.config.matches_ignore(&entry.path) {
        log::trace!("skipping ignored directory: {}", entry.path.display());
        return;
    }
    if !ctx.config.recursive {
        log::debug!("recursion disabled, not entering {}", entry.path.display());
        return;
    }
    walk_dir(ctx, &entry.path);
    ctx.totals.lock().unwrap().dirs.push(entry.name.clone());
}

fn process_file(ctx: WalkContext<'_>, entry: &ListedEntry) {
    if entry.name.ends_with(".sum") || ctx.config.matches_ignore(&entry.path) {
        ctx.counters.files_skipped.fetch_add(1, Ordering::Relaxed);
        ctx.notify_skipped(&entry.path);
        return;
    }
    let bytes = match fs::read(&entry.path) {
        Ok(bytes) => bytes,
        Err(source) => {
            ctx.cancel.fire(Some(CountError::Io {
                path: entry.path.clone(),
                source,
            }));
            return;
        }
    };
    // Non-text content is excluded silently, by contract.
    let Ok(text) = String::from_utf8(bytes) else {
        log::debug!("skipping non-UTF-8 file: {}", entry.path.display());
        return;
    };
    let kept = filter::count_lines(&text, ctx.config.include_blanks, ctx.config.include_comments);
    ctx.counters.files_counted.fetch_add(1, Ordering::Relaxed);
    ctx.notify_done(&entry.path);

    let mut totals = ctx.totals.lock().unwrap();
    totals.lines += kept;
    totals.files.push(entry.name.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_plan_empty() {
        assert!(dispatch_plan(0).is_empty());
    }

    #[test]
    fn test_dispatch_plan_single() {
        assert_eq!(dispatch_plan(1), vec![0..1]);
    }

    #[test]
    fn test_dispatch_plan_one_task_per_entry_up_to_four() {
        assert_eq!(dispatch_plan(2), vec![0..1, 1..2]);
        assert_eq!(dispatch_plan(4), vec![0..1, 1..2, 2..3, 3..4]);
    }

    #[test]
    fn test_dispatch_plan_five_plus_uses_four_slices() {
        assert_eq!(dispatch_plan(5), vec![0..2, 2..3, 3..4, 4..5]);
        assert_eq!(dispatch_plan(8), vec![0..2, 2..4, 4..6, 6..8]);
        assert_eq!(dispatch_plan(9), vec![0..3, 3..5, 5..7, 7..9]);
    }

    #[test]
    fn test_dispatch_plan_properties() {
        for len in 0..200 {
            let plan = dispatch_plan(len);
            assert!(plan.len() <= MAX_FANOUT, "len {len}: too many slices");
            if len > MAX_FANOUT {
                assert_eq!(plan.len(), MAX_FANOUT, "len {len}: expected 4 slices");
            }

            // Concatenation must reproduce 0..len in order.
            let mut next = 0;
            for range in &plan {
                assert_eq!(range.start, next, "len {len}: gap or overlap");
                next = range.end;
            }
            assert_eq!(next, len, "len {len}: entries dropped");

            // Slice sizes differ by at most 1.
            if let (Some(max), Some(min)) = (
                plan.iter().map(ExactSizeIterator::len).max(),
                plan.iter().map(ExactSizeIterator::len).min(),
            ) {
                assert!(max - min <= 1, "len {len}: unbalanced slices");
            }
        }
    }
}
