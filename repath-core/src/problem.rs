use serde::{Deserialize, Serialize};

use crate::pair::RenamePair;

/// The closed set of anomaly kinds the validation pipeline can detect.
///
/// Variant order matches the order problems can first occur in the
/// pipeline (`spec.md` §4.5), which is also the order `ControlPolicy`'s
/// applicability table (§4.4) is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    // Plan-level: abort prepare(), never controllable.
    ParsingNoPaths,
    ParsingParagraphs,
    ParsingRow,
    ParsingImbalance,
    UserCodeExec,
    AllFiltered,

    // Per-pair: controllable, subject to ControlPolicy's applicability table.
    FilterCodeInvalid,
    RenameCodeInvalid,
    RenameCodeBadReturn,
    Missing,
    Type,
    Equal,
    Existing,
    ExistingDiff,
    Parent,
    Colliding,
    CollidingDiff,
}

impl ProblemKind {
    /// Whether this kind is raised at the plan level (no specific pair) and
    /// unconditionally aborts `prepare()`.
    pub fn is_plan_level(self) -> bool {
        matches!(
            self,
            Self::ParsingNoPaths
                | Self::ParsingParagraphs
                | Self::ParsingRow
                | Self::ParsingImbalance
                | Self::UserCodeExec
                | Self::AllFiltered
        )
    }

    /// Lowercase, hyphen-free name used on the CLI and in serialized output.
    pub fn name(self) -> &'static str {
        match self {
            Self::ParsingNoPaths => "parsing_no_paths",
            Self::ParsingParagraphs => "parsing_paragraphs",
            Self::ParsingRow => "parsing_row",
            Self::ParsingImbalance => "parsing_imbalance",
            Self::UserCodeExec => "user_code_exec",
            Self::AllFiltered => "all_filtered",
            Self::FilterCodeInvalid => "filter_code_invalid",
            Self::RenameCodeInvalid => "rename_code_invalid",
            Self::RenameCodeBadReturn => "rename_code_bad_return",
            Self::Missing => "missing",
            Self::Type => "type",
            Self::Equal => "equal",
            Self::Existing => "existing",
            Self::ExistingDiff => "existing_diff",
            Self::Parent => "parent",
            Self::Colliding => "colliding",
            Self::CollidingDiff => "colliding_diff",
        }
    }

    /// All kinds, in declaration order. Used to expand `--skip all` etc.
    pub fn all() -> &'static [Self] {
        &[
            Self::ParsingNoPaths,
            Self::ParsingParagraphs,
            Self::ParsingRow,
            Self::ParsingImbalance,
            Self::UserCodeExec,
            Self::AllFiltered,
            Self::FilterCodeInvalid,
            Self::RenameCodeInvalid,
            Self::RenameCodeBadReturn,
            Self::Missing,
            Self::Type,
            Self::Equal,
            Self::Existing,
            Self::ExistingDiff,
            Self::Parent,
            Self::Colliding,
            Self::CollidingDiff,
        ]
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tagged anomaly, optionally tied to the `RenamePair` that triggered it.
/// Plan-level problems (parse failures, `all_filtered`, `user_code_exec`)
/// carry `pair = None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub message: String,
    pub pair: Option<RenamePair>,
}

impl Problem {
    pub fn plan_level(kind: ProblemKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            pair: None,
        }
    }

    pub fn for_pair(kind: ProblemKind, message: impl Into<String>, pair: RenamePair) -> Self {
        Self {
            kind,
            message: message.into(),
            pair: Some(pair),
        }
    }

    /// Build the human-readable message for a kind that carries no
    /// parameters of its own; parameterized kinds (`parsing_row`,
    /// `user_code_exec`, the per-pair hook/exec failures) build their own
    /// message strings at the call site instead.
    pub fn default_message(kind: ProblemKind) -> &'static str {
        match kind {
            ProblemKind::ParsingNoPaths => "no input paths",
            ProblemKind::ParsingParagraphs => {
                "the paragraphs structure expects exactly two paragraphs"
            }
            ProblemKind::ParsingRow => "row does not have exactly two non-empty cells",
            ProblemKind::ParsingImbalance => {
                "got an unequal number of original paths and new paths"
            }
            ProblemKind::UserCodeExec => "failed to compile user-supplied hook code",
            ProblemKind::AllFiltered => "all paths were filtered out",
            ProblemKind::FilterCodeInvalid => "filter hook raised an error",
            ProblemKind::RenameCodeInvalid => "rename hook raised an error",
            ProblemKind::RenameCodeBadReturn => "rename hook returned a non-path value",
            ProblemKind::Missing => "original path does not exist",
            ProblemKind::Type => "original path is not a renameable type",
            ProblemKind::Equal => "original path and new path are the same",
            ProblemKind::Existing => "new path already exists",
            ProblemKind::ExistingDiff => "new path exists as a different type",
            ProblemKind::Parent => "parent directory of new path does not exist",
            ProblemKind::Colliding => "new path collides with another new path",
            ProblemKind::CollidingDiff => {
                "new path collides with another new path of a different type"
            }
        }
    }
}
