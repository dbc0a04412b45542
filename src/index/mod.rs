//! Folder-tree indexing.
//!
//! [`index`] walks a directory tree depth-first and builds a lazy tree of
//! [`FolderNode`]s and [`MessageRef`]s. No message parsing happens here —
//! only filesystem metadata is touched. Access failures are recovered
//! locally: a directory that cannot be listed gets a sentinel
//! "access denied" child and the walk continues with its siblings, so one
//! restricted subtree never aborts indexing of the rest of the tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// File extension identifying message files (matched case-insensitively).
pub const MESSAGE_EXTENSION: &str = "msg";

/// Display name of the sentinel child inserted for an unlistable directory.
const ACCESS_DENIED_NAME: &str = "(access denied)";

/// A lightweight handle to an undecoded message file.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRef {
    /// File name for display.
    pub name: String,
    /// Absolute (or walk-root-relative) path to the message file.
    pub path: PathBuf,
}

/// One directory in the indexed tree.
///
/// Children are discovered once per index pass and the node is immutable
/// after the walk completes; the tree is singly owned, rooted at the
/// walk's starting directory.
#[derive(Debug, Clone, Serialize)]
pub struct FolderNode {
    /// Directory name for display.
    pub name: String,
    /// Path of the directory.
    pub path: PathBuf,
    /// Child directories, in name order.
    pub folders: Vec<FolderNode>,
    /// Message files directly in this directory, in name order.
    pub messages: Vec<MessageRef>,
    /// Sentinel marker: this node stands for a subtree that could not be
    /// listed due to an access restriction.
    pub access_denied: bool,
}

impl FolderNode {
    fn new(name: String, path: PathBuf) -> Self {
        Self {
            name,
            path,
            folders: Vec::new(),
            messages: Vec::new(),
            access_denied: false,
        }
    }

    fn denied(path: PathBuf) -> Self {
        Self {
            name: ACCESS_DENIED_NAME.to_string(),
            path,
            folders: Vec::new(),
            messages: Vec::new(),
            access_denied: true,
        }
    }

    /// Total number of message refs reachable from this node.
    pub fn message_count(&self) -> usize {
        self.messages.len()
            + self
                .folders
                .iter()
                .map(FolderNode::message_count)
                .sum::<usize>()
    }

    /// Depth-first iteration over every reachable message ref.
    pub fn walk_messages(&self, f: &mut dyn FnMut(&MessageRef)) {
        for msg in &self.messages {
            f(msg);
        }
        for folder in &self.folders {
            folder.walk_messages(f);
        }
    }
}

/// Index the directory tree rooted at `root` with the default `.msg`
/// extension.
pub fn index(root: impl AsRef<Path>) -> FolderNode {
    index_with_extension(root, MESSAGE_EXTENSION)
}

/// Index with a custom message-file extension (no leading dot).
///
/// Never fails: access errors anywhere in the tree, including at the root,
/// become sentinel children of the affected node.
pub fn index_with_extension(root: impl AsRef<Path>, extension: &str) -> FolderNode {
    let root = root.as_ref();
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut visited = HashSet::new();
    let node = walk(name, root.to_path_buf(), extension, &mut visited);
    debug!(
        root = %root.display(),
        messages = node.message_count(),
        "indexed folder tree"
    );
    node
}

fn walk(
    name: String,
    path: PathBuf,
    extension: &str,
    visited: &mut HashSet<PathBuf>,
) -> FolderNode {
    let mut node = FolderNode::new(name, path.clone());

    // Symlink-cycle guard: track visited directory identities so the walk
    // terminates even on cyclic link structures.
    if let Ok(identity) = std::fs::canonicalize(&path) {
        if !visited.insert(identity) {
            warn!(path = %path.display(), "skipping already-visited directory");
            return node;
        }
    }

    let entries = match std::fs::read_dir(&path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot list directory");
            node.folders.push(FolderNode::denied(path));
            return node;
        }
    };

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    let mut dirs: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let entry_path = entry.path();
        let entry_name = entry.file_name().to_string_lossy().into_owned();
        if entry_path.is_dir() {
            dirs.push((entry_name, entry_path));
        } else if has_extension(&entry_path, extension) {
            files.push((entry_name, entry_path));
        }
    }

    // Deterministic order; message files are collected before descending.
    files.sort_by(|a, b| a.0.cmp(&b.0));
    dirs.sort_by(|a, b| a.0.cmp(&b.0));

    for (file_name, file_path) in files {
        node.messages.push(MessageRef {
            name: file_name,
            path: file_path,
        });
    }
    for (dir_name, dir_path) in dirs {
        node.folders.push(walk(dir_name, dir_path, extension, visited));
    }

    node
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(has_extension(Path::new("a.msg"), "msg"));
        assert!(has_extension(Path::new("a.MSG"), "msg"));
        assert!(!has_extension(Path::new("a.eml"), "msg"));
        assert!(!has_extension(Path::new("msg"), "msg"));
    }

    #[test]
    fn test_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = index(tmp.path());
        assert_eq!(tree.message_count(), 0);
        assert!(tree.folders.is_empty());
        assert!(!tree.access_denied);
    }

    #[test]
    fn test_nonexistent_root_yields_denied_sentinel() {
        let tree = index("/definitely/not/a/real/dir");
        assert_eq!(tree.message_count(), 0);
        assert_eq!(tree.folders.len(), 1);
        assert!(tree.folders[0].access_denied);
    }

    #[test]
    fn test_nested_tree_counts_and_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir(root.join("b-sub")).unwrap();
        std::fs::create_dir(root.join("a-sub")).unwrap();
        std::fs::write(root.join("z.msg"), b"").unwrap();
        std::fs::write(root.join("a.msg"), b"").unwrap();
        std::fs::write(root.join("notes.txt"), b"").unwrap();
        std::fs::write(root.join("a-sub").join("inner.MSG"), b"").unwrap();

        let tree = index(root);
        assert_eq!(tree.message_count(), 3);
        let names: Vec<&str> = tree.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a.msg", "z.msg"]);
        let folders: Vec<&str> = tree.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(folders, vec!["a-sub", "b-sub"]);
        assert_eq!(tree.folders[0].message_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let sub = root.join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("one.msg"), b"").unwrap();
        std::os::unix::fs::symlink(root, sub.join("loop")).unwrap();

        let tree = index(root);
        // Terminates, and the looped-back directory contributes nothing new.
        assert_eq!(tree.message_count(), 1);
    }
}
