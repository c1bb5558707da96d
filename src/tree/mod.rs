//! The directory tree snapshot.
//!
//! [`FileTree`] is built once, single-threaded, before any concurrency
//! starts. It maps rendered-line indices to entries (directories and files
//! separately) and owns the rendered text of the tree, so a later status
//! change can rewrite exactly one line. The registry itself never touches
//! the terminal; printing and recoloring are driven from
//! [`crate::progress`].
//!
//! Invariant: an entry's key in the line-index maps is exactly the index of
//! its line in the rendered text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use yansi::Paint;

use crate::counter::{self, CountError};

/// Completion state of a single tree entry.
///
/// Files move from `Pending` to `Done` when counted or to `Skipped` when
/// excluded at traversal time, at most once. Directory entries keep their
/// construction-time status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Not yet visited by the walker.
    Pending,
    /// Counted.
    Done,
    /// Excluded at traversal time.
    Skipped,
}

/// A single file or directory node in the snapshot.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// File or directory name.
    pub name: String,
    /// Path relative to the snapshot root.
    pub rel_path: PathBuf,
    /// Nesting depth; the root is 0.
    pub depth: usize,
    /// Whether the entry matched the ignore list at build time.
    pub ignored: bool,
    /// Completion state.
    pub status: EntryStatus,
}

/// Immutable-after-construction snapshot of the directory tree plus its
/// rendered text.
#[derive(Debug)]
pub struct FileTree {
    root: PathBuf,
    lines: Vec<String>,
    directories: HashMap<usize, TreeEntry>,
    files: HashMap<usize, TreeEntry>,
}

impl FileTree {
    /// Walk the subtree rooted at `root` and build the snapshot.
    ///
    /// Excluded from the snapshot entirely: dot-prefixed directories and
    /// their subtrees (the root itself is exempt) and checksum-sidecar
    /// `.sum` files. Entries matching the ignore list stay in the snapshot
    /// but render dim. With `recursive` off the snapshot stops at depth 1,
    /// matching the walker.
    ///
    /// # Errors
    ///
    /// Fails before walking if `root` is missing or not a directory, and
    /// with any filesystem error during the walk; the run does not continue
    /// with a partial snapshot.
    pub fn build(
        root: &Path,
        ignore_tokens: &[String],
        recursive: bool,
    ) -> Result<Self, CountError> {
        counter::ensure_directory(root)?;
        let mut tree = Self {
            root: root.to_path_buf(),
            lines: Vec::new(),
            directories: HashMap::new(),
            files: HashMap::new(),
        };

        let mut walk = WalkDir::new(root).sort_by_file_name();
        if !recursive {
            walk = walk.max_depth(1);
        }
        let iter = walk
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry));
        for result in iter {
            let entry = result.map_err(walk_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().is_dir();
            if !is_dir && name.ends_with(".sum") {
                continue;
            }
            let rel_path = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            let tree_entry = TreeEntry {
                name,
                rel_path,
                depth: entry.depth(),
                ignored: counter::is_ignored(root, ignore_tokens, entry.path()),
                status: EntryStatus::Pending,
            };
            let id = tree.lines.len();
            tree.lines.push(render_line(&tree_entry));
            if is_dir {
                tree.directories.insert(id, tree_entry);
            } else {
                tree.files.insert(id, tree_entry);
            }
        }
        Ok(tree)
    }

    /// The rendered tree text.
    #[must_use]
    pub fn rendered(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of file entries in the snapshot.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of directory entries in the snapshot.
    #[must_use]
    pub fn dir_count(&self) -> usize {
        self.directories.len()
    }

    /// One rendered line, by index.
    #[must_use]
    pub fn line(&self, id: usize) -> Option<&str> {
        self.lines.get(id).map(String::as_str)
    }

    /// Status of the file at `path` (absolute or root-relative).
    #[must_use]
    pub fn file_status(&self, path: &Path) -> Option<EntryStatus> {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        self.files
            .values()
            .find(|entry| entry.rel_path == rel)
            .map(|entry| entry.status)
    }

    /// Record a file's completion and rewrite its rendered line.
    ///
    /// The entry is located by a linear scan over the file map, since the
    /// map is keyed by line index. A status is written at most once: a file
    /// already marked keeps its first status. Returns the line index when
    /// the file is part of the snapshot.
    pub fn mark_file(&mut self, path: &Path, status: EntryStatus) -> Option<usize> {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let id = self
            .files
            .iter()
            .find_map(|(id, entry)| (entry.rel_path == rel).then_some(*id))?;
        let entry = self.files.get_mut(&id)?;
        if entry.status == EntryStatus::Pending {
            entry.status = status;
            self.lines[id] = render_line(entry);
        }
        Some(id)
    }
}

fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn walk_error(err: walkdir::Error) -> CountError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
    CountError::Io { path, source }
}

/// Render one tree line: a depth-based gutter plus the colored name.
fn render_line(entry: &TreeEntry) -> String {
    let name = paint_name(entry);
    if entry.depth == 0 {
        format!(" {name}")
    } else {
        format!("|{} {}", "__".repeat(entry.depth - 1), name)
    }
}

fn paint_name(entry: &TreeEntry) -> String {
    if entry.ignored && entry.status == EntryStatus::Pending {
        return entry.name.dim().to_string();
    }
    match entry.status {
        EntryStatus::Pending => entry.name.yellow().to_string(),
        EntryStatus::Done => entry.name.green().to_string(),
        EntryStatus::Skipped => entry.name.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn create_test_tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.txt"))
            .unwrap()
            .write_all(b"a")
            .unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/b.txt"))
            .unwrap()
            .write_all(b"b")
            .unwrap();
        dir
    }

    #[test]
    fn test_build_registers_all_entries() {
        let dir = create_test_tree();
        let tree = FileTree::build(dir.path(), &[], true).unwrap();

        // Root dir, sub dir, two files.
        assert_eq!(tree.dir_count(), 2);
        assert_eq!(tree.file_count(), 2);
        assert_eq!(tree.rendered().lines().count(), 4);
    }

    #[test]
    fn test_line_index_invariant() {
        let dir = create_test_tree();
        let tree = FileTree::build(dir.path(), &[], true).unwrap();

        for (id, entry) in tree.files.iter().chain(tree.directories.iter()) {
            let line = tree.line(*id).expect("line index out of range");
            assert!(
                line.contains(&entry.name),
                "line {id} does not carry {}",
                entry.name
            );
        }
    }

    #[test]
    fn test_build_excludes_hidden_directories() {
        let dir = create_test_tree();
        fs::create_dir(dir.path().join(".git")).unwrap();
        File::create(dir.path().join(".git/config"))
            .unwrap()
            .write_all(b"x")
            .unwrap();

        let tree = FileTree::build(dir.path(), &[], true).unwrap();
        assert!(!tree.rendered().contains(".git"));
        assert_eq!(tree.file_count(), 2);
    }

    #[test]
    fn test_build_keeps_hidden_files() {
        let dir = create_test_tree();
        File::create(dir.path().join(".env"))
            .unwrap()
            .write_all(b"SECRET=1")
            .unwrap();

        let tree = FileTree::build(dir.path(), &[], true).unwrap();
        assert!(tree.rendered().contains(".env"));
    }

    #[test]
    fn test_build_excludes_sum_files() {
        let dir = create_test_tree();
        File::create(dir.path().join("go.sum"))
            .unwrap()
            .write_all(b"checksum")
            .unwrap();

        let tree = FileTree::build(dir.path(), &[], true).unwrap();
        assert!(!tree.rendered().contains("go.sum"));
        assert_eq!(tree.file_count(), 2);
    }

    #[test]
    fn test_build_non_recursive_stops_at_depth_one() {
        let dir = create_test_tree();
        let tree = FileTree::build(dir.path(), &[], false).unwrap();
        assert_eq!(tree.file_count(), 1);
        assert!(!tree.rendered().contains("b.txt"));
    }

    #[test]
    fn test_build_missing_root_fails() {
        let dir = tempdir().unwrap();
        let result = FileTree::build(&dir.path().join("missing"), &[], true);
        assert!(matches!(result, Err(CountError::NotFound(_))));
    }

    #[test]
    fn test_ignored_entries_registered_but_flagged() {
        let dir = create_test_tree();
        let tokens = vec!["sub".to_string()];
        let tree = FileTree::build(dir.path(), &tokens, true).unwrap();

        assert_eq!(tree.file_count(), 2);
        let ignored = tree
            .files
            .values()
            .filter(|entry| entry.ignored)
            .map(|entry| entry.name.clone())
            .collect::<Vec<_>>();
        assert_eq!(ignored, vec!["b.txt".to_string()]);
    }

    #[test]
    fn test_mark_file_rewrites_one_line() {
        let dir = create_test_tree();
        let mut tree = FileTree::build(dir.path(), &[], true).unwrap();

        let before = tree.rendered();
        let id = tree
            .mark_file(&dir.path().join("a.txt"), EntryStatus::Done)
            .expect("a.txt is in the snapshot");
        let after = tree.rendered();

        assert_ne!(before, after);
        assert_eq!(tree.file_status(Path::new("a.txt")), Some(EntryStatus::Done));
        // Only the one line changed.
        for (n, (old, new)) in before.lines().zip(after.lines()).enumerate() {
            if n == id {
                assert_ne!(old, new);
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_mark_file_status_written_once() {
        let dir = create_test_tree();
        let mut tree = FileTree::build(dir.path(), &[], true).unwrap();
        let path = dir.path().join("a.txt");

        tree.mark_file(&path, EntryStatus::Done);
        tree.mark_file(&path, EntryStatus::Skipped);
        assert_eq!(tree.file_status(&path), Some(EntryStatus::Done));
    }

    #[test]
    fn test_mark_file_unknown_path() {
        let dir = create_test_tree();
        let mut tree = FileTree::build(dir.path(), &[], true).unwrap();
        assert!(tree
            .mark_file(&dir.path().join("nope.txt"), EntryStatus::Done)
            .is_none());
    }

    #[test]
    fn test_depth_based_gutter() {
        let dir = create_test_tree();
        let tree = FileTree::build(dir.path(), &[], true).unwrap();
        let rendered = tree.rendered();

        let top = rendered
            .lines()
            .find(|line| line.contains("a.txt"))
            .unwrap();
        let nested = rendered
            .lines()
            .find(|line| line.contains("b.txt"))
            .unwrap();
        assert!(top.starts_with('|'));
        assert!(nested.starts_with("|__"));
    }
}
