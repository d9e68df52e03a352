//! Command-line argument surface (`spec.md` §6 / `SPEC_FULL.md` §11): a
//! single flat invocation (no subcommands) parsing input sources, an
//! optional layout and hook pair, sequence numbering, per-problem-kind
//! controls, and execution behavior.

use anyhow::{bail, Result};
use clap::{ArgGroup, Parser};
use repath_core::{Control, ControlSpec, ProblemKind, Structure};

/// Rejects zero and negative integers, matching the "must be a positive
/// integer" framing of `original_source`'s `bmv.constants.positive_int`.
fn positive_int(s: &str) -> Result<i64, String> {
    let value: i64 = s.parse().map_err(|_| format!("{s:?} is not an integer"))?;
    if value < 1 {
        return Err(format!("{value} is not a positive integer"));
    }
    Ok(value)
}

/// Bulk file rename/move tool driven by text input or user code.
///
/// A rename or filter hook is called as `(orig, path, seq, plan)`: `orig`
/// is the original path as given, `path` the same value as a `Path`,
/// `seq` this pair's sequence number (`--seq`/`--step`), and `plan` a
/// handle exposing `strip_prefix` over the common prefix shared by every
/// surviving original.
#[derive(Parser, Debug)]
#[command(name = "repath", author, version, about)]
#[command(group(
    ArgGroup::new("source")
        .args(["paths", "clipboard", "stdin", "file"])
        .multiple(false)
))]
#[command(group(
    ArgGroup::new("structure")
        .args(["paragraphs", "flat", "pairs", "rows"])
        .multiple(false)
))]
pub struct Cli {
    /// Input lines: original and new paths, in the layout selected below.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Read input lines from the system clipboard.
    #[arg(long)]
    pub clipboard: bool,

    /// Read input lines from standard input.
    #[arg(long)]
    pub stdin: bool,

    /// Read input lines from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<std::path::PathBuf>,

    /// Input is two blank-line-separated paragraphs: originals, then news.
    #[arg(long)]
    pub paragraphs: bool,

    /// Input alternates halves: all originals, then all news (the default).
    #[arg(long)]
    pub flat: bool,

    /// Input alternates one original, one new, one original, one new...
    #[arg(long)]
    pub pairs: bool,

    /// Input is tab-separated `original\tnew` rows.
    #[arg(long)]
    pub rows: bool,

    /// Rename hook: `s/PATTERN/REPLACEMENT/`, applied to every original.
    #[arg(long, value_name = "CODE")]
    pub rename: Option<String>,

    /// Filter hook: a regex; originals that don't match are excluded.
    #[arg(long, value_name = "CODE")]
    pub filter: Option<String>,

    /// Indentation width passed to hook code (config default: 4).
    #[arg(long, value_parser = positive_int)]
    pub indent: Option<i64>,

    /// First sequence number handed to hook code (config default: 1).
    #[arg(long = "seq", value_parser = positive_int)]
    pub seq: Option<i64>,

    /// Sequence number step between successive pairs (config default: 1).
    #[arg(long = "step", value_parser = positive_int)]
    pub step: Option<i64>,

    /// Problem kinds (or `all`) to silently drop the pair for.
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Problem kinds (or `all`) to keep the pair for, unchanged.
    #[arg(long, value_delimiter = ',')]
    pub keep: Vec<String>,

    /// Problem kinds (or `all`) to create the missing parent directory for.
    #[arg(long, value_delimiter = ',')]
    pub create: Vec<String>,

    /// Problem kinds (or `all`) to overwrite the existing target for.
    #[arg(long, value_delimiter = ',')]
    pub clobber: Vec<String>,

    /// Validate and print the plan; never touch the filesystem.
    #[arg(long = "dryrun")]
    pub dryrun: bool,

    /// Skip the confirmation prompt before executing.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Suppress the diagnostic tracing subscriber.
    #[arg(long)]
    pub nolog: bool,

    /// Pager program used for long previews (e.g. `less`).
    #[arg(long, value_name = "CMD")]
    pub pager: Option<String>,

    /// Maximum number of pairs to print before truncating.
    #[arg(long, value_parser = positive_int, value_name = "N")]
    pub limit: Option<i64>,
}

impl Cli {
    /// `None` means "let the config default (or `flat`) stand".
    pub fn structure(&self) -> Option<Structure> {
        if self.paragraphs {
            Some(Structure::Paragraphs)
        } else if self.pairs {
            Some(Structure::Pairs)
        } else if self.rows {
            Some(Structure::Rows)
        } else if self.flat {
            Some(Structure::Flat)
        } else {
            None
        }
    }

    /// Expands `--skip`/`--keep`/`--create`/`--clobber` into `ControlSpec`s.
    /// A bare `all` expands to every kind that control is applicable to;
    /// anything else must name a known `ProblemKind`.
    pub fn control_specs(&self) -> Result<Vec<ControlSpec>> {
        let mut specs = Vec::new();
        for (control, names) in [
            (Control::Skip, &self.skip),
            (Control::Keep, &self.keep),
            (Control::Create, &self.create),
            (Control::Clobber, &self.clobber),
        ] {
            for name in names {
                if name == "all" {
                    specs.push(ControlSpec::all(control));
                    continue;
                }
                let Some(kind) = ProblemKind::parse(name) else {
                    bail!("unknown problem kind {name:?}");
                };
                specs.push(ControlSpec::one(control, kind));
            }
        }
        Ok(specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn structure_defaults_to_none_when_unspecified() {
        let cli = Cli::parse_from(["repath", "a", "b"]);
        assert_eq!(cli.structure(), None);
    }

    #[test]
    fn structure_flags_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["repath", "--flat", "--pairs", "a", "b"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn source_flags_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["repath", "--stdin", "a"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn control_specs_expands_all() {
        let cli = Cli::parse_from(["repath", "--clobber", "all"]);
        let specs = cli.control_specs().unwrap();
        assert_eq!(specs.len(), 1);
        assert!(specs[0].kinds.is_none());
    }

    #[test]
    fn control_specs_rejects_unknown_kind() {
        let cli = Cli::parse_from(["repath", "--skip", "not_a_kind"]);
        assert!(cli.control_specs().is_err());
    }

    #[test]
    fn indent_rejects_zero() {
        let err = Cli::try_parse_from(["repath", "--indent", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
