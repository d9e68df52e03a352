//! Paging long previews through an external program (`spec.md` §6's
//! `--pager CMD` / `--limit N`), shelled out to the same way most CLIs
//! invoke `less`: spawn with stdin piped, write the rendered text, wait.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Writes `text` to `pager` if one is configured and spawns successfully,
/// else falls back to plain stdout.
pub fn display(text: &str, pager: Option<&str>) -> Result<()> {
    let Some(pager) = pager.filter(|p| !p.is_empty()) else {
        println!("{text}");
        return Ok(());
    };

    let mut parts = pager.split_whitespace();
    let Some(program) = parts.next() else {
        println!("{text}");
        return Ok(());
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(program)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                let _ = stdin.write_all(text.as_bytes());
            }
            child.wait().context("pager process failed")?;
            Ok(())
        },
        Err(_) => {
            println!("{text}");
            Ok(())
        },
    }
}

/// Splits `lines` to at most `limit` entries, reporting how many were
/// hidden so the caller can note it (`spec.md` §6's `--limit`).
pub fn truncate(lines: &[String], limit: Option<i64>) -> (Vec<String>, usize) {
    match limit {
        Some(n) if (n as usize) < lines.len() => {
            let n = n as usize;
            (lines[..n].to_vec(), lines.len() - n)
        },
        _ => (lines.to_vec(), 0),
    }
}
