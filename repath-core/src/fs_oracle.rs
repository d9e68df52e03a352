//! The file-system oracle the planner depends on (`spec.md` §4.1): a
//! capability interface for existence checks and rename/replace/mkdir
//! operations, plus an in-core simulated implementation for dry analyses
//! and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// What a path resolves to, for the purposes of deciding whether it is a
/// renameable type and whether two paths collide as "the same type".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    File,
    Dir,
    /// Exists but is neither a regular file nor a directory (a socket,
    /// device node, or similar), not a renameable type.
    Other,
    Absent,
}

impl Kind {
    pub fn is_renameable(self) -> bool {
        matches!(self, Self::File | Self::Dir)
    }
}

fn parent_of(path: &str) -> Option<String> {
    let p = Path::new(path).parent()?;
    if p.as_os_str().is_empty() {
        Some(".".to_string())
    } else {
        Some(p.to_string_lossy().into_owned())
    }
}

/// The oracle the planner consults for existence and performs mutation
/// through. `strict = true` is case/encoding-sensitive: a directory entry
/// of that exact spelling must exist. `strict = false` returns true for
/// any resolvable entry (including a case-variant on a case-insensitive
/// volume), which is the correct semantics for "can we rename this at
/// all".
pub trait FileSystem {
    fn exists(&self, path: &str, strict: bool) -> bool;
    fn kind(&self, path: &str) -> Kind;
    fn rename(&self, src: &str, dst: &str) -> Result<(), PlanError>;
    fn replace(&self, src: &str, dst: &str) -> Result<(), PlanError>;
    fn mkdir_parents(&self, path: &str) -> Result<(), PlanError>;
}

/// The real file system, backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Case-sensitive existence check: list the parent directory and look
    /// for an entry whose name matches `path`'s file name byte-for-byte.
    /// This is what lets a case-only rename on a case-insensitive host
    /// filesystem (scenario 7 in `spec.md` §8) be representable: strict
    /// existence of the differently-cased target is false even though the
    /// OS would resolve it to the same inode.
    fn exists_strict(path: &Path) -> bool {
        let Some(file_name) = path.file_name() else {
            return path == Path::new(".") || path == Path::new("/");
        };
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = dir.unwrap_or_else(|| Path::new("."));
        let Ok(entries) = std::fs::read_dir(dir) else {
            return false;
        };
        entries
            .filter_map(Result::ok)
            .any(|entry| entry.file_name() == file_name)
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &str, strict: bool) -> bool {
        let path = Path::new(path);
        if path == Path::new(".") {
            return true;
        }
        if strict {
            Self::exists_strict(path)
        } else {
            std::fs::symlink_metadata(path).is_ok()
        }
    }

    fn kind(&self, path: &str) -> Kind {
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => Kind::Dir,
            Ok(meta) if meta.is_file() => Kind::File,
            Ok(_) => Kind::Other,
            Err(_) => Kind::Absent,
        }
    }

    fn rename(&self, src: &str, dst: &str) -> Result<(), PlanError> {
        std::fs::rename(src, dst).map_err(PlanError::from)
    }

    fn replace(&self, src: &str, dst: &str) -> Result<(), PlanError> {
        // std::fs::rename already overwrites an existing file target on
        // both Unix and Windows (Windows requires removing an existing
        // destination file first; directories never get here since a
        // directory target can only arise from a `Colliding`-kind clobber,
        // which is restricted to same-type targets).
        let dst_path = Path::new(dst);
        if dst_path.is_file() {
            let _ = std::fs::remove_file(dst_path);
        }
        std::fs::rename(src, dst).map_err(PlanError::from)
    }

    fn mkdir_parents(&self, path: &str) -> Result<(), PlanError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// An in-memory oracle over a set of path strings, with directory entries
/// derivable from ancestors. Kept in the core (not test-only) so callers
/// can run dry analyses without touching disk, per `spec.md` §4.1/§9.
#[derive(Debug, Default)]
pub struct SimulatedFileSystem {
    inner: std::cell::RefCell<SimState>,
}

#[derive(Debug, Default)]
struct SimState {
    kinds: BTreeMap<String, Kind>,
    // Explicit directory entries, so ancestors of any file/dir are
    // implicitly present even if never inserted directly.
    dirs: BTreeSet<String>,
    // When set, non-strict existence also matches any case-variant of a
    // known path, simulating a case-insensitive host volume (scenario 7
    // in `spec.md` §8). Strict existence never consults this: that is
    // the whole point of the distinction.
    case_insensitive: bool,
}

impl SimulatedFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fs = Self::new();
        for f in files {
            fs.insert_file(f);
        }
        fs
    }

    /// A simulated oracle over a case-insensitive volume: non-strict
    /// existence also matches any case-variant of a known path.
    pub fn with_files_case_insensitive<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fs = Self::with_files(files);
        fs.inner.borrow_mut().case_insensitive = true;
        fs
    }

    pub fn insert_file(&self, path: impl Into<String>) {
        let path = path.into();
        self.insert_ancestors(&path);
        self.inner.borrow_mut().kinds.insert(path, Kind::File);
    }

    pub fn insert_dir(&self, path: impl Into<String>) {
        let path = path.into();
        self.insert_ancestors(&path);
        self.inner.borrow_mut().dirs.insert(path.clone());
        self.inner.borrow_mut().kinds.insert(path, Kind::Dir);
    }

    fn insert_ancestors(&self, path: &str) {
        let mut cur = PathBuf::from(path);
        while let Some(parent) = cur.parent() {
            if parent.as_os_str().is_empty() {
                break;
            }
            let parent_str = parent.to_string_lossy().into_owned();
            let mut state = self.inner.borrow_mut();
            if !state.dirs.insert(parent_str.clone()) {
                break; // already known, and so are its ancestors
            }
            state.kinds.insert(parent_str, Kind::Dir);
            drop(state);
            cur = parent.to_path_buf();
        }
    }

    fn normalize(path: &str) -> String {
        path.strip_suffix('/').unwrap_or(path).to_string()
    }
}

impl FileSystem for SimulatedFileSystem {
    fn exists(&self, path: &str, strict: bool) -> bool {
        let path = Self::normalize(path);
        if path == "." || path.is_empty() {
            return true;
        }
        let state = self.inner.borrow();
        if state.kinds.contains_key(&path) {
            return true;
        }
        !strict
            && state.case_insensitive
            && state
                .kinds
                .keys()
                .any(|k| k.eq_ignore_ascii_case(&path))
    }

    fn kind(&self, path: &str) -> Kind {
        let path = Self::normalize(path);
        if path == "." {
            return Kind::Dir;
        }
        let state = self.inner.borrow();
        if let Some(kind) = state.kinds.get(&path) {
            return *kind;
        }
        if state.case_insensitive {
            if let Some(kind) = state
                .kinds
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(&path))
                .map(|(_, v)| *v)
            {
                return kind;
            }
        }
        Kind::Absent
    }

    fn rename(&self, src: &str, dst: &str) -> Result<(), PlanError> {
        let src = Self::normalize(src);
        let dst = Self::normalize(dst);
        if self.exists(&dst, true) {
            return Err(PlanError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{dst} already exists"),
            )));
        }
        self.move_path(&src, &dst)
    }

    fn replace(&self, src: &str, dst: &str) -> Result<(), PlanError> {
        let src = Self::normalize(src);
        let dst = Self::normalize(dst);
        self.move_path(&src, &dst)
    }

    fn mkdir_parents(&self, path: &str) -> Result<(), PlanError> {
        if let Some(parent) = parent_of(path) {
            if parent != "." {
                self.insert_dir(parent);
            }
        }
        Ok(())
    }
}

impl SimulatedFileSystem {
    fn move_path(&self, src: &str, dst: &str) -> Result<(), PlanError> {
        let kind = self.kind(src);
        if kind == Kind::Absent {
            return Err(PlanError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{src} does not exist"),
            )));
        }
        self.insert_ancestors(dst);
        let mut state = self.inner.borrow_mut();
        state.kinds.remove(src);
        state.dirs.remove(src);
        state.kinds.insert(dst.to_string(), kind);
        if kind == Kind::Dir {
            state.dirs.insert(dst.to_string());
        }
        Ok(())
    }
}
