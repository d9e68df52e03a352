//! Resolving the CLI's mutually exclusive input sources (positional
//! paths, `--clipboard`, `--stdin`, `--file PATH`) into the flat line
//! list `repath_core::parse_inputs` expects (`spec.md` §6's "sources"
//! group).

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

pub fn collect_inputs(
    paths: &[String],
    clipboard: bool,
    stdin: bool,
    file: Option<&Path>,
) -> Result<Vec<String>> {
    if clipboard {
        let mut board = arboard::Clipboard::new().context("failed to open the system clipboard")?;
        let text = board
            .get_text()
            .context("failed to read text from the clipboard")?;
        return Ok(split_lines(&text));
    }
    if stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        return Ok(split_lines(&text));
    }
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(split_lines(&text));
    }
    Ok(paths.to_vec())
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_paths_pass_through_unchanged() {
        let lines =
            collect_inputs(&["a".to_string(), "b".to_string()], false, false, None).unwrap();
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn file_source_splits_and_trims_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "  a  \nb\n\nc\n").unwrap();
        let lines = collect_inputs(&[], false, false, Some(&path)).unwrap();
        assert_eq!(lines, vec!["a", "b", "", "c"]);
    }
}
