//! Parsing heterogeneous textual input layouts into `RenamePair`s
//! (`spec.md` §4.2), ported line-for-line from `RenamingPlan.parse_inputs`
//! in the original Python implementation.

use serde::{Deserialize, Serialize};

use crate::pair::RenamePair;
use crate::problem::{Problem, ProblemKind};

/// The layout under which input lines are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    Paragraphs,
    Pairs,
    Rows,
    Flat,
}

impl Default for Structure {
    fn default() -> Self {
        Self::Flat
    }
}

impl Structure {
    pub fn name(self) -> &'static str {
        match self {
            Self::Paragraphs => "paragraphs",
            Self::Pairs => "pairs",
            Self::Rows => "rows",
            Self::Flat => "flat",
        }
    }
}

/// Parses already-trimmed lines into rename pairs.
///
/// `has_rename_code` selects the rename-only layout (spec.md §4.2's
/// "rename-only" row): every non-empty line becomes an `orig`, and `new`
/// stays unset until the rename hook runs. When `has_rename_code` is
/// false, `structure` determines how lines are split into `orig`/`new`
/// halves.
pub fn parse_inputs(
    lines: &[String],
    structure: Structure,
    has_rename_code: bool,
) -> Result<Vec<RenamePair>, Problem> {
    if has_rename_code {
        let pairs: Vec<RenamePair> = lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(|line| RenamePair::new(line.clone(), None))
            .collect();
        return if pairs.is_empty() {
            Err(Problem::plan_level(
                ProblemKind::ParsingNoPaths,
                Problem::default_message(ProblemKind::ParsingNoPaths),
            ))
        } else {
            Ok(pairs)
        };
    }

    let (origs, news) = match structure {
        Structure::Paragraphs => parse_paragraphs(lines)?,
        Structure::Pairs => parse_pairs(lines),
        Structure::Rows => parse_rows(lines)?,
        Structure::Flat => parse_flat(lines),
    };

    if origs.is_empty() && news.is_empty() {
        return Err(Problem::plan_level(
            ProblemKind::ParsingNoPaths,
            Problem::default_message(ProblemKind::ParsingNoPaths),
        ));
    }

    // `flat` halves an odd total by integer division; the leftover line
    // simply has no counterpart and is dropped rather than treated as an
    // imbalance (spec boundary behavior, distinct from every other
    // structure, where an orig/new length mismatch is always an error).
    if structure != Structure::Flat && origs.len() != news.len() {
        return Err(Problem::plan_level(
            ProblemKind::ParsingImbalance,
            Problem::default_message(ProblemKind::ParsingImbalance),
        ));
    }

    Ok(origs
        .into_iter()
        .zip(news)
        .map(|(orig, new)| RenamePair::new(orig, Some(new)))
        .collect())
}

fn parse_paragraphs(lines: &[String]) -> Result<(Vec<String>, Vec<String>), Problem> {
    // Group consecutive non-empty lines; blank lines split groups.
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.clone());
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    if groups.len() != 2 {
        return Err(Problem::plan_level(
            ProblemKind::ParsingParagraphs,
            Problem::default_message(ProblemKind::ParsingParagraphs),
        ));
    }
    let mut groups = groups.into_iter();
    let origs = groups.next().unwrap();
    let news = groups.next().unwrap();
    Ok((origs, news))
}

fn parse_pairs(lines: &[String]) -> (Vec<String>, Vec<String>) {
    let mut origs = Vec::new();
    let mut news = Vec::new();
    let mut i = 0usize;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if i % 2 == 0 {
            origs.push(line.clone());
        } else {
            news.push(line.clone());
        }
        i += 1;
    }
    (origs, news)
}

fn parse_rows(lines: &[String]) -> Result<(Vec<String>, Vec<String>), Problem> {
    let mut origs = Vec::new();
    let mut news = Vec::new();
    for row in lines {
        if row.is_empty() {
            continue;
        }
        let cells: Vec<&str> = row.split('\t').collect();
        if cells.len() == 2 && !cells[0].is_empty() && !cells[1].is_empty() {
            origs.push(cells[0].to_string());
            news.push(cells[1].to_string());
        } else {
            return Err(Problem::plan_level(
                ProblemKind::ParsingRow,
                format!(
                    "the rows structure expects rows with exactly two cells: {row:?}"
                ),
            ));
        }
    }
    Ok((origs, news))
}

fn parse_flat(lines: &[String]) -> (Vec<String>, Vec<String>) {
    let paths: Vec<String> = lines.iter().filter(|l| !l.is_empty()).cloned().collect();
    let i = paths.len() / 2;
    let news = paths[i..].to_vec();
    let origs = paths[0..i].to_vec();
    (origs, news)
}
