//! `PlanSnapshot`: a read-only, serializable view of a `RenamingPlan`
//! (`spec.md` §6/§9). Callable at any lifecycle stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pair::RenamePair;
use crate::parser::Structure;
use crate::plan::{RenamingPlan, TrackingIndex};
use crate::problem::Problem;

/// `controls` restated as `(kind name, control name)` pairs rather than a
/// `BTreeMap<ProblemKind, Control>`, since the latter would serialize with
/// non-string keys under some formats; spec.md §6 only asks for a stable,
/// inspectable list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlBinding {
    pub kind: String,
    pub control: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingIndexSnapshot {
    NotStarted,
    Index(usize),
    Done,
}

impl From<TrackingIndex> for TrackingIndexSnapshot {
    fn from(t: TrackingIndex) -> Self {
        match t {
            TrackingIndex::NotStarted => Self::NotStarted,
            TrackingIndex::Index(i) => Self::Index(i),
            TrackingIndex::Done => Self::Done,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub inputs: Vec<String>,
    pub structure: Structure,
    pub rename_code: Option<String>,
    pub filter_code: Option<String>,
    pub indent: usize,
    pub seq_start: i64,
    pub seq_step: i64,
    pub controls: Vec<ControlBinding>,
    pub prefix_len: usize,
    pub rename_pairs: Vec<RenamePair>,
    pub tracking_index: TrackingIndexSnapshot,
    /// Keyed by the control's lowercase name, or the literal string
    /// `"uncontrolled"` for the plan's uncontrolled bucket (JSON object
    /// keys cannot be `null`, so this sentinel stands in for that bucket
    /// (see DESIGN.md).
    pub problems: BTreeMap<String, Vec<Problem>>,
}

impl PlanSnapshot {
    pub(crate) fn from_plan(plan: &RenamingPlan<'_>) -> Self {
        let controls = plan
            .policy_raw()
            .bindings()
            .map(|(kind, control)| ControlBinding {
                kind: kind.name().to_string(),
                control: control.name().to_string(),
            })
            .collect();

        let problems = plan
            .problems()
            .iter()
            .map(|(control, problems)| {
                let key = (*control)
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| "uncontrolled".to_string());
                (key, problems.clone())
            })
            .collect();

        Self {
            inputs: plan.inputs_raw().to_vec(),
            structure: plan.structure_raw(),
            rename_code: plan.rename_code_raw().map(str::to_string),
            filter_code: plan.filter_code_raw().map(str::to_string),
            indent: plan.indent_raw(),
            seq_start: plan.seq_start_raw(),
            seq_step: plan.seq_step_raw(),
            controls,
            prefix_len: plan.prefix_len_raw(),
            rename_pairs: plan.pairs().to_vec(),
            tracking_index: plan.tracking_index().into(),
            problems,
        }
    }
}
