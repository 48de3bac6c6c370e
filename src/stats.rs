use std::collections::HashSet;
use std::path::PathBuf;

/// What happened to one input file. Produced inside the parallel phase,
/// folded into [`ProcessingStats`] afterwards.
#[derive(Debug, Clone, Default)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Where the rewritten copy was written, when the file changed.
    pub output: Option<PathBuf>,
    pub declarations_modified: usize,
    pub members_modified: usize,
    /// One line per change, shown with `--verbose`.
    pub notes: Vec<String>,
    /// A non-fatal failure for this file; the batch continues.
    pub warning: Option<String>,
}

impl FileOutcome {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    pub fn failed(path: PathBuf, warning: String) -> Self {
        Self {
            path,
            warning: Some(warning),
            ..Self::default()
        }
    }
}

/// Counters accumulated over a whole run.
///
/// `files_processed` counts only files that were actually written;
/// matched-but-unmodified files are read and left alone. A path is
/// counted at most once per run regardless of how many patterns
/// matched it.
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_matched: usize,
    pub files_processed: usize,
    pub declarations_modified: usize,
    pub members_modified: usize,
    seen: HashSet<PathBuf>,
}

impl ProcessingStats {
    pub fn record(&mut self, outcome: &FileOutcome) {
        if !self.seen.insert(outcome.path.clone()) {
            return;
        }
        self.files_matched += 1;
        if outcome.output.is_some() {
            self.files_processed += 1;
        }
        self.declarations_modified += outcome.declarations_modified;
        self.members_modified += outcome.members_modified;
    }
}
