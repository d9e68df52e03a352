use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::problem::ProblemKind;

/// The four mechanisms a user can elect for handling a problem kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Skip,
    Keep,
    Create,
    Clobber,
}

impl Control {
    pub fn name(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Keep => "keep",
            Self::Create => "create",
            Self::Clobber => "clobber",
        }
    }

    /// The problem kinds this control may legally be bound to, per
    /// `spec.md` §4.4's applicability table.
    pub fn applicable_kinds(self) -> &'static [ProblemKind] {
        use ProblemKind::*;
        match self {
            Self::Skip => &[
                FilterCodeInvalid,
                RenameCodeInvalid,
                Equal,
                Missing,
                Parent,
                Existing,
                ExistingDiff,
                Colliding,
                CollidingDiff,
            ],
            Self::Keep => &[FilterCodeInvalid],
            Self::Create => &[Parent],
            Self::Clobber => &[Existing, ExistingDiff, Colliding, CollidingDiff],
        }
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One user-facing control request, prior to validation: a control
/// mechanism plus the kind(s) it should be bound to. `kinds: None` means
/// the literal `all` ("every kind to which this control is applicable").
#[derive(Debug, Clone)]
pub struct ControlSpec {
    pub control: Control,
    pub kinds: Option<Vec<ProblemKind>>,
}

impl ControlSpec {
    pub fn all(control: Control) -> Self {
        Self {
            control,
            kinds: None,
        }
    }

    pub fn one(control: Control, kind: ProblemKind) -> Self {
        Self {
            control,
            kinds: Some(vec![kind]),
        }
    }
}

/// A partial map from problem kind to the control the user elected for it.
///
/// Built once, at plan-construction time; absent entries are
/// "uncontrolled" and, if triggered during `prepare()`, fail the plan.
#[derive(Debug, Clone, Default)]
pub struct ControlPolicy {
    bindings: BTreeMap<ProblemKind, Control>,
}

impl ControlPolicy {
    pub fn build(specs: &[ControlSpec]) -> Result<Self, PlanError> {
        let mut bindings: BTreeMap<ProblemKind, Control> = BTreeMap::new();
        for spec in specs {
            let kinds: Vec<ProblemKind> = match &spec.kinds {
                Some(kinds) => kinds.clone(),
                None => spec.control.applicable_kinds().to_vec(),
            };
            for kind in kinds {
                if !spec.control.applicable_kinds().contains(&kind) {
                    return Err(PlanError::InvalidControl {
                        control: spec.control,
                        kind,
                    });
                }
                if let Some(existing) = bindings.get(&kind).copied() {
                    if existing != spec.control {
                        return Err(PlanError::ConflictingControls {
                            kind,
                            existing,
                            requested: spec.control,
                        });
                    }
                } else {
                    bindings.insert(kind, spec.control);
                }
            }
        }
        Ok(Self { bindings })
    }

    pub fn control_for(&self, kind: ProblemKind) -> Option<Control> {
        self.bindings.get(&kind).copied()
    }

    /// All `(kind, control)` bindings, sorted by kind, for snapshotting.
    pub fn bindings(&self) -> impl Iterator<Item = (ProblemKind, Control)> + '_ {
        self.bindings.iter().map(|(k, c)| (*k, *c))
    }
}
