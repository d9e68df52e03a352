use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use repath_core::{
    Config, FilterHookSpec, PlanError, PlanInputs, RealFileSystem, RenameHookSpec, RenamingPlan,
};

mod cli;
mod confirm;
mod logfile;
mod logging;
mod pager;
mod sources;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.nolog);

    match run(&cli) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        },
    }
}

/// Returns `Ok(true)` on success (including a clean `--dryrun`),
/// `Ok(false)` when the plan or execution failed (exit code 1 per
/// `spec.md` §6), and `Err` for argument/IO-level failures.
fn run(cli: &Cli) -> Result<bool> {
    let config = Config::load().unwrap_or_default();

    let inputs = sources::collect_inputs(
        &cli.paths,
        cli.clipboard,
        cli.stdin,
        cli.file.as_deref(),
    )?;

    let structure = cli.structure().unwrap_or(config.defaults.structure);
    let indent = cli.indent.unwrap_or(config.defaults.indent as i64) as usize;
    let seq_start = cli.seq.unwrap_or(config.defaults.seq_start);
    let seq_step = cli.step.unwrap_or(config.defaults.seq_step);
    let pager = cli.pager.clone().or_else(|| config.defaults.pager.clone());

    let plan_inputs = PlanInputs {
        inputs,
        structure,
        rename_hook: cli.rename.clone().map(RenameHookSpec::Dsl),
        filter_hook: cli.filter.clone().map(FilterHookSpec::Dsl),
        indent,
        seq_start,
        seq_step,
        controls: cli.control_specs()?,
    };

    let fs = RealFileSystem::new();
    let mut plan = RenamingPlan::new(&fs, plan_inputs).context("failed to build the plan")?;
    plan.prepare();

    let preview = render_preview(&plan, cli.limit);
    pager::display(&preview, pager.as_deref())?;

    if plan.failed() {
        for problem in plan.uncontrolled_problems() {
            eprintln!("error: {}: {}", problem.kind, problem.message);
        }
        return Ok(false);
    }

    if cli.dryrun {
        return Ok(true);
    }

    if !confirm::confirm(
        &format!("Rename {} path(s)?", plan.pairs().len()),
        cli.yes,
    )? {
        eprintln!("aborted");
        return Ok(false);
    }

    let log = logfile::LogFile::open(cli.nolog)?;
    let pairs = plan.pairs().to_vec();

    match plan.execute() {
        Ok(()) => {
            for pair in &pairs {
                log.record(pair)?;
            }
            Ok(true)
        },
        Err(PlanError::Execution {
            index,
            orig,
            new,
            source,
        }) => {
            for pair in &pairs[..index] {
                log.record(pair)?;
            }
            eprintln!("error: pair {index} ({orig} -> {new}) failed: {source}");
            eprintln!("{index} pair(s) completed before the failure");
            Ok(false)
        },
        Err(e) => Err(e.into()),
    }
}

fn render_preview(plan: &RenamingPlan<'_>, limit: Option<i64>) -> String {
    let lines: Vec<String> = plan
        .pairs()
        .iter()
        .map(|pair| {
            let new = pair.new.as_deref().unwrap_or("?");
            let mut line = format!("{} -> {}", pair.orig, new);
            if pair.create_parent {
                line.push_str(" [create]");
            }
            if pair.clobber {
                line.push_str(" [clobber]");
            }
            line
        })
        .collect();
    let (shown, hidden) = pager::truncate(&lines, limit);
    let mut out = shown.join("\n");
    if hidden > 0 {
        out.push_str(&format!("\n... and {hidden} more"));
    }
    out
}
