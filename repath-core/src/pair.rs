use serde::{Deserialize, Serialize};

/// A single unit of work: an original path and (once resolved) its target.
///
/// `orig` is set at construction and never mutated afterward. `new` starts
/// empty for structures that derive it later (rename-code-only input, or a
/// rename hook) and is filled in during the validation pipeline. Pair
/// mutation during the pipeline always produces a fresh `RenamePair` value
/// rather than mutating in place, so cloning one is cheap and safe to share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePair {
    pub orig: String,
    pub new: Option<String>,
    #[serde(default)]
    pub exclude: bool,
    #[serde(default)]
    pub create_parent: bool,
    #[serde(default)]
    pub clobber: bool,
}

impl RenamePair {
    /// Creates a pair. `orig` must be non-empty; callers that parse from
    /// blank-stripped input lines already guarantee this before calling in.
    pub fn new(orig: impl Into<String>, new: Option<String>) -> Self {
        Self {
            orig: orig.into(),
            new,
            exclude: false,
            create_parent: false,
            clobber: false,
        }
    }

    /// `orig == new`, after stripping a single trailing path separator from
    /// each side for comparison. Returns `false` if `new` is unset.
    pub fn equal(&self) -> bool {
        match &self.new {
            None => false,
            Some(new) => strip_trailing_sep(&self.orig) == strip_trailing_sep(new),
        }
    }

    pub fn with_new(&self, new: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.new = Some(new.into());
        next
    }

    pub fn with_exclude(&self, exclude: bool) -> Self {
        let mut next = self.clone();
        next.exclude = exclude;
        next
    }

    pub fn with_create_parent(&self, create_parent: bool) -> Self {
        let mut next = self.clone();
        next.create_parent = create_parent;
        next
    }

    pub fn with_clobber(&self, clobber: bool) -> Self {
        let mut next = self.clone();
        next.clobber = clobber;
        next
    }
}

fn strip_trailing_sep(path: &str) -> &str {
    path.strip_suffix('/')
        .or_else(|| path.strip_suffix('\\'))
        .unwrap_or(path)
}
