use crate::control::Control;
use crate::problem::{Problem, ProblemKind};

/// Fatal, raised errors, as opposed to `Problem`s, which are recoverable
/// and accumulated. Per `spec.md` §7: the planning phase never raises for
/// data-driven failures, only for construction/execution-time misuse.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(
        "conflicting controls for {kind}: already bound to {existing}, cannot also bind {requested}"
    )]
    ConflictingControls {
        kind: ProblemKind,
        existing: Control,
        requested: Control,
    },

    #[error("control {control} is not applicable to {kind}")]
    InvalidControl { control: Control, kind: ProblemKind },

    #[error("execute() was already called on this plan")]
    RenameDoneAlready,

    #[error("prepare() failed with {} uncontrolled problem(s)", .0.len())]
    PrepareFailed(Vec<Problem>),

    #[error("renaming pair {index} ({orig} -> {new}) failed")]
    Execution {
        index: usize,
        orig: String,
        new: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
