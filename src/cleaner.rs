use crate::error::{CleanError, Result};
use crate::pattern::CleanPattern;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Patterns removed by a default run: everything under `data/files`, and
/// every entry of `data/keys` except the `test_` fixtures
pub const DEFAULT_PATTERNS: &[&str] = &["data/files/*", "data/keys/[!test_*]*"];

/// Removes every file matching an ordered list of glob patterns
#[derive(Debug, Clone)]
pub struct Cleaner {
    patterns: Vec<CleanPattern>,
    root: PathBuf,
}

impl Cleaner {
    /// Parse all patterns up front so a bad one fails before anything is deleted
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| CleanPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            root: PathBuf::from("."),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_PATTERNS)
    }

    /// Resolve relative patterns under `root` instead of the current directory
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Remove all matches, announcing each one on stdout
    pub fn run(&self) -> Result<CleanResult> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }

    /// Remove all matches, writing a `Removed: <path>` line to `out` before each deletion
    ///
    /// Stops at the first file that cannot be removed. Files removed before
    /// the failure stay removed.
    pub fn run_with_output<W: Write>(&self, out: &mut W) -> Result<CleanResult> {
        info!(
            "Cleaning {} pattern(s) under {}",
            self.patterns.len(),
            self.root.display()
        );
        let mut result = CleanResult::default();

        for pattern in &self.patterns {
            let matches = pattern.expand(&self.root)?;
            debug!("{} matched {} path(s)", pattern.as_str(), matches.len());

            for path in matches {
                let shown = self.display_path(&path);
                writeln!(out, "Removed: {}", shown.display())?;

                if let Err(e) = fs::remove_file(&path) {
                    error!("Failed to remove {}: {}", path.display(), e);
                    return Err(CleanError::FileSystem { path, source: e });
                }
                debug!("Deleted file: {}", path.display());
                result.removed.push(shown);
            }
        }

        out.flush()?;
        info!("Removed {} file(s)", result.files_deleted());
        Ok(result)
    }

    /// Report paths relative to the root the patterns were written against
    fn display_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// One-shot run of `patterns` against the current directory
pub fn run(patterns: &[&str]) -> Result<CleanResult> {
    Cleaner::new(patterns)?.run()
}

/// Result of a cleaning run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanResult {
    /// Removed paths, relative to the cleaner root, in removal order
    pub removed: Vec<PathBuf>,
}

impl CleanResult {
    pub fn files_deleted(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    pub fn display_status(&self) -> String {
        format!("Files deleted: {}", self.files_deleted())
    }
}
