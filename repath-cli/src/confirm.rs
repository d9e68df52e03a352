//! The `--yes` confirmation gate before executing a plan, generalized
//! from the teacher's interactive `prompt_for_init` in `main.rs` into a
//! plain yes/no prompt.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;

/// Returns whether to proceed. `assume_yes` (`--yes`) and a
/// non-interactive stdin both skip the prompt and proceed, matching the
/// teacher's non-interactive auto-init fallback.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes || !io::stdin().is_terminal() {
        return Ok(true);
    }
    confirm_with(prompt, &mut io::stdin().lock())
}

fn confirm_with<R: io::Read>(prompt: &str, reader: &mut R) -> Result<bool> {
    eprint!("{prompt} [Y/n]: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::BufReader::new(reader).read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "" | "y" | "yes"))
}
