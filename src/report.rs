use std::io::IsTerminal;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::stats::ProcessingStats;

/// Console reporter. Info and success lines go to stdout in color,
/// warnings and errors to stderr. `--quiet` drops everything except
/// warnings and errors.
pub struct Reporter {
    verbose: bool,
    quiet: bool,
}

impl Reporter {
    pub fn new(verbose: bool, quiet: bool, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { verbose, quiet }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.blue());
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.green());
        }
    }

    /// Per-change detail line, shown only with `--verbose`.
    pub fn note(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{message}");
        }
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{}", format!("warning: {message}").yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", format!("error: {message}").red());
    }

    pub fn summary(&self, stats: &ProcessingStats) {
        self.info("\nProcessing completed:");
        self.info(&format!("- Files processed: {}", stats.files_processed));
        self.info(&format!(
            "- Declarations modified: {}",
            stats.declarations_modified
        ));
        self.info(&format!("- Members modified: {}", stats.members_modified));
    }

    /// A bar over `len` files. Hidden when quiet or when stderr is not
    /// a terminal, so CI logs and piped output stay clean.
    pub fn progress(&self, len: u64) -> ProgressBar {
        if self.quiet || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40} {pos}/{len} files ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  "),
        );
        bar
    }
}
