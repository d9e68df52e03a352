//! The planner state machine (`spec.md` §4.6) and the validation pipeline
//! it drives during `prepare()` (`spec.md` §4.5).

use std::collections::BTreeMap;

use crate::control::{Control, ControlPolicy, ControlSpec};
use crate::error::PlanError;
use crate::fs_oracle::{FileSystem, Kind};
use crate::hooks::{dsl, FilterHook, PlanHandle, RenameHook, RenameHookOutput};
use crate::pair::RenamePair;
use crate::parser::{parse_inputs, Structure};
use crate::problem::{Problem, ProblemKind};
use crate::snapshot::PlanSnapshot;

/// Where a rename hook's logic comes from: a compiled Rust closure
/// provided directly by the host program, or source text for the
/// restricted regex DSL, compiled lazily during `prepare()` so that a
/// syntax error surfaces as the documented `user_code_exec` problem
/// instead of an error at plan-construction time.
pub enum RenameHookSpec<'fs> {
    Compiled(Box<dyn RenameHook + 'fs>),
    Dsl(String),
}

pub enum FilterHookSpec<'fs> {
    Compiled(Box<dyn FilterHook + 'fs>),
    Dsl(String),
}

enum CompiledRenameHook<'fs> {
    Compiled(Box<dyn RenameHook + 'fs>),
    Dsl(dsl::RenameExpr),
}

impl<'fs> CompiledRenameHook<'fs> {
    fn call(
        &self,
        orig: &str,
        path: &std::path::Path,
        seq: i64,
        handle: &PlanHandle<'_>,
    ) -> anyhow::Result<RenameHookOutput> {
        match self {
            Self::Compiled(h) => h.call(orig, path, seq, handle),
            Self::Dsl(expr) => expr.apply(orig),
        }
    }
}

enum CompiledFilterHook<'fs> {
    Compiled(Box<dyn FilterHook + 'fs>),
    Dsl(dsl::FilterExpr),
}

impl<'fs> CompiledFilterHook<'fs> {
    fn call(
        &self,
        orig: &str,
        path: &std::path::Path,
        seq: i64,
        handle: &PlanHandle<'_>,
    ) -> anyhow::Result<bool> {
        match self {
            Self::Compiled(h) => h.call(orig, path, seq, handle),
            Self::Dsl(expr) => Ok(expr.matches(orig)),
        }
    }
}

/// Everything a caller supplies up front to build a `RenamingPlan`.
pub struct PlanInputs<'fs> {
    pub inputs: Vec<String>,
    pub structure: Structure,
    pub rename_hook: Option<RenameHookSpec<'fs>>,
    pub filter_hook: Option<FilterHookSpec<'fs>>,
    pub indent: usize,
    pub seq_start: i64,
    pub seq_step: i64,
    pub controls: Vec<ControlSpec>,
}

impl<'fs> Default for PlanInputs<'fs> {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            structure: Structure::default(),
            rename_hook: None,
            filter_hook: None,
            indent: 4,
            seq_start: 1,
            seq_step: 1,
            controls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanState {
    Fresh,
    Prepared,
    Executed,
}

/// The pair index `execute()` is currently attempting, or a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingIndex {
    NotStarted,
    Index(usize),
    Done,
}

/// A validation step returns either a (possibly modified) pair or a
/// problem - a tagged sum, never a null-return or exception-as-control-flow
/// (design note "Variant type for step results").
enum StepOutcome {
    Keep(RenamePair),
    Problem(Problem),
}

pub struct RenamingPlan<'fs> {
    inputs: Vec<String>,
    structure: Structure,
    rename_code: Option<String>,
    filter_code: Option<String>,
    rename_hook: Option<RenameHookSpec<'fs>>,
    filter_hook: Option<FilterHookSpec<'fs>>,
    compiled_rename: Option<CompiledRenameHook<'fs>>,
    compiled_filter: Option<CompiledFilterHook<'fs>>,
    indent: usize,
    seq_start: i64,
    seq_step: i64,
    policy: ControlPolicy,
    fs: &'fs dyn FileSystem,

    pairs: Vec<RenamePair>,
    problems: BTreeMap<Option<Control>, Vec<Problem>>,
    prefix_len: usize,
    state: PlanState,
    tracking_index: TrackingIndex,
}

impl<'fs> RenamingPlan<'fs> {
    pub fn new(fs: &'fs dyn FileSystem, mut inputs: PlanInputs<'fs>) -> Result<Self, PlanError> {
        let policy = ControlPolicy::build(&inputs.controls)?;
        let rename_code = match &inputs.rename_hook {
            Some(RenameHookSpec::Dsl(src)) => Some(src.clone()),
            _ => None,
        };
        let filter_code = match &inputs.filter_hook {
            Some(FilterHookSpec::Dsl(src)) => Some(src.clone()),
            _ => None,
        };
        let rename_hook = inputs.rename_hook.take();
        let filter_hook = inputs.filter_hook.take();
        Ok(Self {
            inputs: inputs.inputs,
            structure: inputs.structure,
            rename_code,
            filter_code,
            rename_hook,
            filter_hook,
            compiled_rename: None,
            compiled_filter: None,
            indent: inputs.indent,
            seq_start: inputs.seq_start,
            seq_step: inputs.seq_step,
            policy,
            fs,
            pairs: Vec::new(),
            problems: BTreeMap::new(),
            prefix_len: 0,
            state: PlanState::Fresh,
            tracking_index: TrackingIndex::NotStarted,
        })
    }

    // ---- lifecycle ---------------------------------------------------

    /// Populates the pair vector and problem ledger. Idempotent: only the
    /// first call does any work (`spec.md` §4.6).
    pub fn prepare(&mut self) {
        if self.state != PlanState::Fresh {
            return;
        }
        self.state = PlanState::Prepared;

        let span = tracing::debug_span!("prepare", inputs = self.inputs.len());
        let _enter = span.enter();

        match parse_inputs(&self.inputs, self.structure, self.rename_code.is_some()) {
            Ok(pairs) => self.pairs = pairs,
            Err(problem) => {
                self.handle_problem(problem);
                return;
            }
        }

        if self.compile_hooks().is_err() {
            return;
        }

        let steps: [fn(&Self, &RenamePair, i64) -> StepOutcome; 7] = [
            Self::step_user_filter,
            Self::step_user_rename,
            Self::step_orig_exists,
            Self::step_orig_type,
            Self::step_orig_new_differ,
            Self::step_new_not_exists,
            Self::step_new_parent_exists,
        ];

        for step in steps {
            let survivors = std::mem::take(&mut self.pairs);
            self.pairs = self.run_step(survivors, step);
            if self.pairs.is_empty() {
                self.handle_problem(Problem::plan_level(
                    ProblemKind::AllFiltered,
                    Problem::default_message(ProblemKind::AllFiltered),
                ));
            }
            if self.failed() {
                return;
            }
        }

        self.run_collision_check();
        if self.pairs.is_empty() {
            self.handle_problem(Problem::plan_level(
                ProblemKind::AllFiltered,
                Problem::default_message(ProblemKind::AllFiltered),
            ));
        }
    }

    fn compile_hooks(&mut self) -> Result<(), ()> {
        match self.rename_hook.take() {
            Some(RenameHookSpec::Compiled(h)) => {
                self.compiled_rename = Some(CompiledRenameHook::Compiled(h));
            }
            Some(RenameHookSpec::Dsl(src)) => match dsl::RenameExpr::compile(&src) {
                Ok(expr) => self.compiled_rename = Some(CompiledRenameHook::Dsl(expr)),
                Err(e) => {
                    self.handle_problem(Problem::plan_level(
                        ProblemKind::UserCodeExec,
                        format!("failed to compile rename hook: {e}"),
                    ));
                    return Err(());
                }
            },
            None => {}
        }
        match self.filter_hook.take() {
            Some(FilterHookSpec::Compiled(h)) => {
                self.compiled_filter = Some(CompiledFilterHook::Compiled(h));
            }
            Some(FilterHookSpec::Dsl(src)) => match dsl::FilterExpr::compile(&src) {
                Ok(expr) => self.compiled_filter = Some(CompiledFilterHook::Dsl(expr)),
                Err(e) => {
                    self.handle_problem(Problem::plan_level(
                        ProblemKind::UserCodeExec,
                        format!("failed to compile filter hook: {e}"),
                    ));
                    return Err(());
                }
            },
            None => {}
        }
        Ok(())
    }

    /// Executes renames in pair order, tracking progress so partial
    /// failure is diagnosable (`spec.md` §4.6/§7).
    pub fn execute(&mut self) -> Result<(), PlanError> {
        if self.state == PlanState::Executed {
            return Err(PlanError::RenameDoneAlready);
        }
        self.prepare();
        if self.failed() {
            return Err(PlanError::PrepareFailed(self.uncontrolled_problems().to_vec()));
        }
        self.state = PlanState::Executed;

        let span = tracing::debug_span!("execute", pairs = self.pairs.len());
        let _enter = span.enter();

        for i in 0..self.pairs.len() {
            self.tracking_index = TrackingIndex::Index(i);
            let pair = self.pairs[i].clone();
            self.do_rename(&pair).map_err(|e| {
                tracing::warn!(index = i, orig = %pair.orig, "rename failed");
                match e {
                    PlanError::Io(source) => PlanError::Execution {
                        index: i,
                        orig: pair.orig.clone(),
                        new: pair.new.clone().unwrap_or_default(),
                        source,
                    },
                    other => other,
                }
            })?;
        }
        self.tracking_index = TrackingIndex::Done;
        Ok(())
    }

    fn do_rename(&self, pair: &RenamePair) -> Result<(), PlanError> {
        let new = pair.new.as_deref().expect("prepared pair always has `new`");
        if pair.create_parent {
            self.fs.mkdir_parents(new)?;
        }
        if pair.clobber {
            self.fs.replace(&pair.orig, new)
        } else {
            self.fs.rename(&pair.orig, new)
        }
    }

    // ---- validation steps ----------------------------------------------

    fn step_user_filter(&self, pair: &RenamePair, seq: i64) -> StepOutcome {
        let Some(hook) = &self.compiled_filter else {
            return StepOutcome::Keep(pair.clone());
        };
        let handle = PlanHandle::new(self.prefix_len);
        match hook.call(&pair.orig, std::path::Path::new(&pair.orig), seq, &handle) {
            Ok(true) => StepOutcome::Keep(pair.clone()),
            Ok(false) => StepOutcome::Keep(pair.with_exclude(true)),
            Err(e) => StepOutcome::Problem(Problem::for_pair(
                ProblemKind::FilterCodeInvalid,
                format!("filter hook raised for {:?}: {e}", pair.orig),
                pair.clone(),
            )),
        }
    }

    fn step_user_rename(&self, pair: &RenamePair, seq: i64) -> StepOutcome {
        let Some(hook) = &self.compiled_rename else {
            return StepOutcome::Keep(pair.clone());
        };
        let handle = PlanHandle::new(self.prefix_len);
        match hook.call(&pair.orig, std::path::Path::new(&pair.orig), seq, &handle) {
            Ok(out) => StepOutcome::Keep(pair.with_new(out.into_string())),
            Err(e) => StepOutcome::Problem(Problem::for_pair(
                ProblemKind::RenameCodeInvalid,
                format!("rename hook raised for {:?}: {e}", pair.orig),
                pair.clone(),
            )),
        }
    }

    fn step_orig_exists(&self, pair: &RenamePair, _seq: i64) -> StepOutcome {
        if self.fs.exists(&pair.orig, false) {
            StepOutcome::Keep(pair.clone())
        } else {
            StepOutcome::Problem(Problem::for_pair(
                ProblemKind::Missing,
                Problem::default_message(ProblemKind::Missing),
                pair.clone(),
            ))
        }
    }

    fn step_orig_type(&self, pair: &RenamePair, _seq: i64) -> StepOutcome {
        if self.fs.kind(&pair.orig).is_renameable() {
            StepOutcome::Keep(pair.clone())
        } else {
            StepOutcome::Problem(Problem::for_pair(
                ProblemKind::Type,
                Problem::default_message(ProblemKind::Type),
                pair.clone(),
            ))
        }
    }

    fn step_orig_new_differ(&self, pair: &RenamePair, _seq: i64) -> StepOutcome {
        if pair.equal() {
            StepOutcome::Problem(Problem::for_pair(
                ProblemKind::Equal,
                Problem::default_message(ProblemKind::Equal),
                pair.clone(),
            ))
        } else {
            StepOutcome::Keep(pair.clone())
        }
    }

    fn step_new_not_exists(&self, pair: &RenamePair, _seq: i64) -> StepOutcome {
        let new = pair.new.as_deref().unwrap_or_default();
        if !pair.equal() && self.fs.exists(new, true) {
            let same_type = self.fs.kind(&pair.orig) == self.fs.kind(new);
            let kind = if same_type {
                ProblemKind::Existing
            } else {
                ProblemKind::ExistingDiff
            };
            StepOutcome::Problem(Problem::for_pair(
                kind,
                Problem::default_message(kind),
                pair.clone(),
            ))
        } else {
            StepOutcome::Keep(pair.clone())
        }
    }

    fn step_new_parent_exists(&self, pair: &RenamePair, _seq: i64) -> StepOutcome {
        let new = pair.new.as_deref().unwrap_or_default();
        let parent = std::path::Path::new(new)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        if self.fs.exists(&parent, false) {
            StepOutcome::Keep(pair.clone())
        } else {
            StepOutcome::Problem(Problem::for_pair(
                ProblemKind::Parent,
                Problem::default_message(ProblemKind::Parent),
                pair.clone(),
            ))
        }
    }

    fn run_collision_check(&mut self) {
        self.prefix_len = compute_prefix_len(&self.pairs);

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, pair) in self.pairs.iter().enumerate() {
            groups
                .entry(pair.new.clone().unwrap_or_default())
                .or_default()
                .push(i);
        }

        let survivors = std::mem::take(&mut self.pairs);
        let mut outcomes = Vec::with_capacity(survivors.len());
        for (i, pair) in survivors.iter().enumerate() {
            let group = &groups[pair.new.as_deref().unwrap_or_default()];
            if group.len() < 2 {
                outcomes.push((pair.clone(), StepOutcome::Keep(pair.clone())));
                continue;
            }
            let same_type = group
                .iter()
                .map(|&j| self.fs.kind(&survivors[j].orig))
                .collect::<std::collections::BTreeSet<_>>()
                .len()
                == 1;
            let _ = i;
            let kind = if same_type {
                ProblemKind::Colliding
            } else {
                ProblemKind::CollidingDiff
            };
            outcomes.push((
                pair.clone(),
                StepOutcome::Problem(Problem::for_pair(
                    kind,
                    Problem::default_message(kind),
                    pair.clone(),
                )),
            ));
        }

        self.pairs = self.apply_outcomes(outcomes);
    }

    fn run_step(
        &mut self,
        survivors: Vec<RenamePair>,
        step_fn: fn(&Self, &RenamePair, i64) -> StepOutcome,
    ) -> Vec<RenamePair> {
        self.prefix_len = compute_prefix_len(&survivors);
        let mut seq = self.seq_start;
        let mut outcomes = Vec::with_capacity(survivors.len());
        for pair in &survivors {
            outcomes.push((pair.clone(), step_fn(self, pair, seq)));
            seq += self.seq_step;
        }
        self.apply_outcomes(outcomes)
    }

    fn apply_outcomes(&mut self, outcomes: Vec<(RenamePair, StepOutcome)>) -> Vec<RenamePair> {
        let mut out = Vec::new();
        for (pair, outcome) in outcomes {
            match outcome {
                StepOutcome::Problem(problem) => {
                    let control = self.handle_problem(problem);
                    match control {
                        Some(Control::Skip) => {}
                        Some(Control::Clobber) => out.push(pair.with_clobber(true)),
                        Some(Control::Create) => out.push(pair.with_create_parent(true)),
                        Some(Control::Keep) => out.push(pair),
                        None => out.push(pair),
                    }
                }
                StepOutcome::Keep(new_pair) => {
                    if !new_pair.exclude {
                        out.push(new_pair);
                    }
                }
            }
        }
        out
    }

    // ---- problem control -----------------------------------------------

    fn handle_problem(&mut self, problem: Problem) -> Option<Control> {
        let control = self.policy.control_for(problem.kind);
        if control.is_none() {
            tracing::warn!(kind = %problem.kind, "uncontrolled problem");
        }
        self.problems.entry(control).or_default().push(problem);
        control
    }

    pub fn failed(&self) -> bool {
        self.problems
            .get(&None)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    pub fn uncontrolled_problems(&self) -> &[Problem] {
        self.problems.get(&None).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn problems(&self) -> &BTreeMap<Option<Control>, Vec<Problem>> {
        &self.problems
    }

    pub fn pairs(&self) -> &[RenamePair] {
        &self.pairs
    }

    pub fn tracking_index(&self) -> TrackingIndex {
        self.tracking_index
    }

    pub fn tracking_pair(&self) -> Option<&RenamePair> {
        match self.tracking_index {
            TrackingIndex::Index(i) => self.pairs.get(i),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot::from_plan(self)
    }

    // exposed for PlanSnapshot
    pub(crate) fn inputs_raw(&self) -> &[String] {
        &self.inputs
    }
    pub(crate) fn structure_raw(&self) -> Structure {
        self.structure
    }
    pub(crate) fn rename_code_raw(&self) -> Option<&str> {
        self.rename_code.as_deref()
    }
    pub(crate) fn filter_code_raw(&self) -> Option<&str> {
        self.filter_code.as_deref()
    }
    pub(crate) fn indent_raw(&self) -> usize {
        self.indent
    }
    pub(crate) fn seq_start_raw(&self) -> i64 {
        self.seq_start
    }
    pub(crate) fn seq_step_raw(&self) -> i64 {
        self.seq_step
    }
    pub(crate) fn policy_raw(&self) -> &ControlPolicy {
        &self.policy
    }
    pub(crate) fn prefix_len_raw(&self) -> usize {
        self.prefix_len
    }
}

/// Length of the common byte prefix shared by every surviving original
/// path. Recomputed at the start of each step because filtering changes
/// the survivor set (`spec.md` §4.5/"Common-prefix dependency").
fn compute_prefix_len(pairs: &[RenamePair]) -> usize {
    let mut iter = pairs.iter().map(|p| p.orig.as_str());
    let Some(first) = iter.next() else {
        return 0;
    };
    let mut prefix_len = first.len();
    for orig in iter {
        let common = first
            .bytes()
            .zip(orig.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        prefix_len = prefix_len.min(common);
        if prefix_len == 0 {
            break;
        }
    }
    prefix_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_oracle::SimulatedFileSystem;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn scenario_1_basic_rename_via_hook() {
        let fs = SimulatedFileSystem::with_files(["a", "b", "c"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "b", "c"]),
            rename_hook: Some(RenameHookSpec::Dsl("s/^(.*)$/$1$1/".to_string())),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.execute().unwrap();
        assert!(!fs.exists("a", true));
        assert!(fs.exists("aa", true));
        assert!(fs.exists("bb", true));
        assert!(fs.exists("cc", true));
        assert!(plan.uncontrolled_problems().is_empty());
    }

    #[test]
    fn scenario_2_dry_run_leaves_fs_untouched() {
        let fs = SimulatedFileSystem::with_files(["a", "b", "c"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "b", "c", "a1", "b1", "c1"]),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.prepare();
        assert_eq!(plan.pairs().len(), 3);
        assert!(fs.exists("a", true));
        assert!(!fs.exists("a1", true));
    }

    #[test]
    fn scenario_3_missing_orig_skip() {
        let fs = SimulatedFileSystem::with_files(["a", "b"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "b", "c", "a1", "b1", "c1"]),
            controls: vec![ControlSpec::one(Control::Skip, ProblemKind::Missing)],
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.execute().unwrap();
        assert!(fs.exists("a1", true));
        assert!(fs.exists("b1", true));
        assert!(!fs.exists("c1", true));
    }

    #[test]
    fn scenario_4_existing_clobber() {
        let fs = SimulatedFileSystem::with_files(["z1", "z2", "z1x"]);
        let inputs = PlanInputs {
            inputs: lines(&["z1", "z2", "z1x", "z2x"]),
            controls: vec![ControlSpec::one(Control::Clobber, ProblemKind::Existing)],
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.execute().unwrap();
        assert!(fs.exists("z1x", true));
        assert!(fs.exists("z2x", true));
        assert!(!fs.exists("z1", true));
        assert!(!fs.exists("z2", true));
    }

    #[test]
    fn scenario_5_collision_skip_all_filtered() {
        let fs = SimulatedFileSystem::with_files(["a", "b", "c"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "b", "c", "Z", "Z", "Z"]),
            controls: vec![ControlSpec::one(Control::Skip, ProblemKind::Colliding)],
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        let err = plan.execute().unwrap_err();
        assert!(matches!(err, PlanError::PrepareFailed(_)));
        assert!(plan.pairs().is_empty());
        assert!(plan
            .uncontrolled_problems()
            .iter()
            .any(|p| p.kind == ProblemKind::AllFiltered));
    }

    #[test]
    fn scenario_6_parent_missing_create() {
        let fs = SimulatedFileSystem::with_files(["a", "b", "c"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "b", "c", "xy/tmp/a1", "b1", "c1"]),
            controls: vec![ControlSpec::one(Control::Create, ProblemKind::Parent)],
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.execute().unwrap();
        assert!(fs.exists("xy", true));
        assert!(fs.exists("xy/tmp", true));
        assert!(fs.exists("xy/tmp/a1", true));
        assert!(fs.exists("b1", true));
        assert!(fs.exists("c1", true));
    }

    #[test]
    fn scenario_7_case_only_rename_on_case_insensitive_fs() {
        let fs = SimulatedFileSystem::with_files_case_insensitive(["file"]);
        let inputs = PlanInputs {
            inputs: lines(&["file", "FILE"]),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.execute().unwrap();
        assert!(plan.uncontrolled_problems().is_empty());
        assert!(fs.exists("FILE", true));
    }

    #[test]
    fn uncontrolled_problem_reports_only_itself_not_all_filtered() {
        // A single pair with no control bound for `missing` should fail
        // prepare with exactly one uncontrolled problem (`missing`), not a
        // second, spurious `all_filtered` caused by dropping the pair.
        let fs = SimulatedFileSystem::new();
        let inputs = PlanInputs {
            inputs: lines(&["a", "a1"]),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.prepare();
        assert!(plan.failed());
        let kinds: Vec<_> = plan
            .uncontrolled_problems()
            .iter()
            .map(|p| p.kind)
            .collect();
        assert_eq!(kinds, vec![ProblemKind::Missing]);
    }

    #[test]
    fn uncontrolled_problem_pair_is_retained_not_dropped() {
        let fs = SimulatedFileSystem::new();
        let inputs = PlanInputs {
            inputs: lines(&["a", "a1"]),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.prepare();
        let uncontrolled = plan.uncontrolled_problems();
        assert_eq!(uncontrolled.len(), 1);
        assert_eq!(uncontrolled[0].pair.as_ref().map(|p| p.orig.as_str()), Some("a"));
    }

    #[test]
    fn collision_check_recomputes_prefix_len_after_prior_step_filters() {
        // Entering the parent-exists step, survivors are foo1/foo2/zzz3
        // (common prefix ""); zzz3's parent is missing and skipped,
        // leaving foo1/foo2 (common prefix "foo") for the collision step.
        // The snapshot's prefix_len must reflect the post-filter survivors,
        // not whatever `run_step` last cached on entry to the prior step.
        let fs = SimulatedFileSystem::with_files(["foo1", "foo2", "zzz3"]);
        let inputs = PlanInputs {
            inputs: lines(&["foo1", "foo2", "zzz3", "foo1x", "foo2y", "missingdir/zzz3z"]),
            controls: vec![ControlSpec::one(Control::Skip, ProblemKind::Parent)],
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.prepare();
        assert!(!plan.failed());
        assert_eq!(plan.pairs().len(), 2);
        assert_eq!(plan.snapshot().prefix_len, 3);
    }

    #[test]
    fn prepare_is_idempotent() {
        let fs = SimulatedFileSystem::with_files(["a", "b"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "a1"]),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.prepare();
        let first = plan.pairs().to_vec();
        plan.prepare();
        assert_eq!(plan.pairs(), first.as_slice());
    }

    #[test]
    fn execute_twice_fails() {
        let fs = SimulatedFileSystem::with_files(["a"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "a1"]),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.execute().unwrap();
        let err = plan.execute().unwrap_err();
        assert!(matches!(err, PlanError::RenameDoneAlready));
    }

    #[test]
    fn tracking_index_records_partial_progress() {
        let fs = SimulatedFileSystem::with_files(["a", "b"]);
        let inputs = PlanInputs {
            inputs: lines(&["a", "b", "a1", "b1"]),
            ..Default::default()
        };
        let mut plan = RenamingPlan::new(&fs, inputs).unwrap();
        plan.prepare();
        assert!(!plan.failed());

        // A target appears between prepare() and execute() that the
        // validation pipeline never got a chance to see, so the oracle
        // itself rejects the second rename.
        fs.insert_file("b1");

        let err = plan.execute().unwrap_err();
        assert!(matches!(err, PlanError::Execution { index: 1, .. }));
        assert_eq!(plan.tracking_index(), TrackingIndex::Index(1));
        assert!(fs.exists("a1", true));
        assert!(fs.exists("b", true));
    }
}
