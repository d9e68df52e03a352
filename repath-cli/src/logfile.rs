//! The human-readable run-log, `.repath/log`, one line per executed
//! rename. Distinct from the `tracing` diagnostic sink in `logging.rs`
//! (`SPEC_FULL.md` §10.3: spec.md's "log file formatting" is an
//! out-of-scope external collaborator, so this stays a thin, untested-
//! beyond-a-smoke-test adapter). Suppressed by `--nolog`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use repath_core::RenamePair;

pub struct LogFile {
    path: Option<PathBuf>,
}

impl LogFile {
    pub fn open(nolog: bool) -> Result<Self> {
        if nolog {
            return Ok(Self { path: None });
        }
        let dir = Path::new(".repath");
        std::fs::create_dir_all(dir).context("failed to create the .repath directory")?;
        Ok(Self {
            path: Some(dir.join("log")),
        })
    }

    pub fn record(&self, pair: &RenamePair) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let new = pair.new.as_deref().unwrap_or("");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        writeln!(file, "{} -> {}", pair.orig, new)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nolog_never_touches_disk() {
        let log = LogFile::open(true).unwrap();
        assert!(log
            .record(&RenamePair::new("a", Some("b".to_string())))
            .is_ok());
    }

    #[test]
    fn logged_pairs_append_one_line_each() {
        let dir = tempfile::tempdir().unwrap();
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let log = LogFile::open(false).unwrap();
        log.record(&RenamePair::new("a", Some("a1".to_string())))
            .unwrap();
        log.record(&RenamePair::new("b", Some("b1".to_string())))
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join(".repath").join("log")).unwrap();
        std::env::set_current_dir(prev).unwrap();

        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("a -> a1"));
        assert!(content.contains("b -> b1"));
    }
}
