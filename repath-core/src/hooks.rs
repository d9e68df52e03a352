//! The user-code host (`spec.md` §4.3): two optional per-path hooks,
//! `rename` and `filter`, each called as `(orig, path, seq, plan_handle)`.
//!
//! Per the "Dynamic code execution" design note, this crate does not embed
//! a scripting language. Two backends satisfy the fixed hook signature:
//!
//! - a compiled Rust closure, for host programs embedding `repath-core`
//!   directly (design note option (b): "a compiled plug-in loaded at
//!   launch"), and
//! - a small regex-substitution DSL (design note option (c)) for host
//!   programs (like `repath-cli`) that want to accept a hook as a bare
//!   string from a command-line flag.

use std::path::Path;

use regex::Regex;

/// The narrow capability surface a hook is given beyond its own arguments:
/// `strip_prefix`, the single operation `spec.md` §4.3 mandates.
pub struct PlanHandle<'a> {
    prefix_len: usize,
    _marker: std::marker::PhantomData<&'a ()>,
}

impl<'a> PlanHandle<'a> {
    pub fn new(prefix_len: usize) -> Self {
        Self {
            prefix_len,
            _marker: std::marker::PhantomData,
        }
    }

    /// Removes the shared prefix of all surviving originals' strings.
    pub fn strip_prefix<'s>(&self, orig: &'s str) -> &'s str {
        if self.prefix_len == 0 {
            orig
        } else {
            orig.get(self.prefix_len..).unwrap_or(orig)
        }
    }
}

/// What a rename hook may return: a plain string or a path, per spec.md
/// §4.3 ("non-string, non-path return values produce
/// `rename_code_bad_return`"). A compiled Rust closure is constrained to
/// this type at compile time, so it can never actually trigger
/// `rename_code_bad_return` - only the DSL backend, which parses the
/// return value out of a regex substitution at runtime, can.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameHookOutput {
    Str(String),
}

impl RenameHookOutput {
    pub fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
        }
    }
}

impl From<String> for RenameHookOutput {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for RenameHookOutput {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// A per-path renaming transform. Implemented automatically for any
/// closure with this signature.
pub trait RenameHook {
    fn call(
        &self,
        orig: &str,
        path: &Path,
        seq: i64,
        handle: &PlanHandle<'_>,
    ) -> anyhow::Result<RenameHookOutput>;
}

impl<F> RenameHook for F
where
    F: Fn(&str, &Path, i64, &PlanHandle<'_>) -> anyhow::Result<RenameHookOutput>,
{
    fn call(
        &self,
        orig: &str,
        path: &Path,
        seq: i64,
        handle: &PlanHandle<'_>,
    ) -> anyhow::Result<RenameHookOutput> {
        self(orig, path, seq, handle)
    }
}

/// A per-path predicate. Truthy retains the pair, falsy excludes it.
pub trait FilterHook {
    fn call(&self, orig: &str, path: &Path, seq: i64, handle: &PlanHandle<'_>) -> anyhow::Result<bool>;
}

impl<F> FilterHook for F
where
    F: Fn(&str, &Path, i64, &PlanHandle<'_>) -> anyhow::Result<bool>,
{
    fn call(&self, orig: &str, path: &Path, seq: i64, handle: &PlanHandle<'_>) -> anyhow::Result<bool> {
        self(orig, path, seq, handle)
    }
}

/// The restricted regex-substitution DSL (design note option (c)).
///
/// Recognizes exactly two textual forms:
/// - `s/PATTERN/REPLACEMENT/` for a rename hook: substitutes the first
///   match of `PATTERN` in `orig` with `REPLACEMENT` (which may use `$1`
///   style capture-group references).
/// - any other string, for a filter hook: a literal regex matched against
///   `orig`; a match is truthy.
pub mod dsl {
    use super::*;

    pub struct RenameExpr {
        pattern: Regex,
        replacement: String,
    }

    impl RenameExpr {
        /// Compiles `s/PATTERN/REPLACEMENT/`. A malformed form or invalid
        /// regex syntax is a compile-time failure: the caller should treat
        /// this as `ProblemKind::UserCodeExec` and abort `prepare()`.
        pub fn compile(code: &str) -> anyhow::Result<Self> {
            let body = code
                .strip_prefix("s/")
                .ok_or_else(|| anyhow::anyhow!("rename expression must start with 's/'"))?;
            let end = body
                .rfind('/')
                .ok_or_else(|| anyhow::anyhow!("rename expression must end with '/'"))?;
            let (pattern_src, rest) = body.split_at(end);
            let replacement = &rest[1..];
            let pattern = Regex::new(pattern_src)
                .map_err(|e| anyhow::anyhow!("invalid pattern {pattern_src:?}: {e}"))?;
            Ok(Self {
                pattern,
                replacement: replacement.to_string(),
            })
        }

        pub fn apply(&self, orig: &str) -> anyhow::Result<RenameHookOutput> {
            Ok(RenameHookOutput::Str(
                self.pattern.replace(orig, self.replacement.as_str()).into_owned(),
            ))
        }
    }

    pub struct FilterExpr {
        pattern: Regex,
    }

    impl FilterExpr {
        pub fn compile(code: &str) -> anyhow::Result<Self> {
            let pattern =
                Regex::new(code).map_err(|e| anyhow::anyhow!("invalid filter pattern: {e}"))?;
            Ok(Self { pattern })
        }

        pub fn matches(&self, orig: &str) -> bool {
            self.pattern.is_match(orig)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_removes_common_prefix() {
        let handle = PlanHandle::new(4);
        assert_eq!(handle.strip_prefix("srcfoo.rs"), "foo.rs");
    }

    #[test]
    fn strip_prefix_noop_for_zero_length() {
        let handle = PlanHandle::new(0);
        assert_eq!(handle.strip_prefix("foo.rs"), "foo.rs");
    }

    #[test]
    fn dsl_rename_expr_substitutes_first_match() {
        let expr = dsl::RenameExpr::compile("s/foo/bar/").unwrap();
        let out = expr.apply("foo.txt").unwrap();
        assert_eq!(out.into_string(), "bar.txt");
    }

    #[test]
    fn dsl_rename_expr_rejects_malformed_code() {
        assert!(dsl::RenameExpr::compile("not an expr").is_err());
    }

    #[test]
    fn dsl_filter_expr_matches_regex() {
        let expr = dsl::FilterExpr::compile(r"\.rs$").unwrap();
        assert!(expr.matches("foo.rs"));
        assert!(!expr.matches("foo.txt"));
    }

    #[test]
    fn closure_rename_hook_satisfies_trait() {
        let hook = |orig: &str, _: &Path, seq: i64, _: &PlanHandle<'_>| {
            Ok(RenameHookOutput::from(format!("{orig}{seq}")))
        };
        let handle = PlanHandle::new(0);
        let result = hook.call("a", Path::new("a"), 1, &handle).unwrap();
        assert_eq!(result.into_string(), "a1");
    }
}
