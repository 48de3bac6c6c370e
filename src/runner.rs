use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::cli::Args;
use crate::config::{Config, load_config};
use crate::discover::{InputFile, discover_inputs};
use crate::parse::{SourceFile, parse_declarations};
use crate::pattern::PatternCache;
use crate::report::Reporter;
use crate::rewrite::rewrite_file;
use crate::rules::RuleSet;
use crate::stats::{FileOutcome, ProcessingStats};

/// Run the rewriter. Returns the exit code: 0 = success (including a
/// run that matched no files). Config and setup failures surface as
/// errors and exit 1 from main.
pub fn run(args: Args) -> Result<i32> {
    let reporter = Reporter::new(args.verbose, args.quiet, args.no_color);
    let start = Instant::now();

    reporter.info("Starting typescrub...");
    let config = load_config(&args.config)?;
    let rules = RuleSet::compile(&config)?;

    if rules.is_empty() {
        reporter.warn("config contains no hide rules; nothing will be modified");
    }
    if config.generate_omit_types {
        reporter.warn("ignoring generateOmitTypes (not implemented)");
    }

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("failed to create output directory {}", config.output_dir)
    })?;

    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let files = discover_inputs(&config.origin_patterns(), &base_dir)?;
    if files.is_empty() {
        reporter.warn("No input files found matching the specified patterns");
        return Ok(0);
    }

    reporter.info(&format!("Found {} files to process", files.len()));
    let progress = reporter.progress(files.len() as u64);

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|input| {
            let outcome = process_file(input, &config, &rules);
            progress.inc(1);
            outcome
        })
        .collect();
    progress.finish_and_clear();

    let mut stats = ProcessingStats::default();
    for outcome in &outcomes {
        if let Some(warning) = &outcome.warning {
            reporter.warn(warning);
        }
        for note in &outcome.notes {
            reporter.note(&format!("{}: {note}", outcome.path.display()));
        }
        stats.record(outcome);
    }

    reporter.summary(&stats);
    reporter.success(&format!(
        "Processing completed successfully in {:.2}s!",
        start.elapsed().as_secs_f64()
    ));
    Ok(0)
}

/// The per-file pipeline: read, parse, rewrite, write the result under
/// the output directory, optionally delete the origin. Every failure is
/// a warning on the outcome; the batch never aborts over one file.
fn process_file(input: &InputFile, config: &Config, rules: &RuleSet) -> FileOutcome {
    let source = match SourceFile::from_path(&input.path) {
        Ok(s) => s,
        Err(e) => return FileOutcome::failed(input.path.clone(), format!("{e:#}")),
    };
    let mut declarations = match parse_declarations(&source) {
        Ok(d) => d,
        Err(e) => {
            return FileOutcome::failed(
                input.path.clone(),
                format!("skipping {}: {e:#}", input.path.display()),
            );
        }
    };

    let mut cache = PatternCache::new();
    let rewrite = rewrite_file(&source, &mut declarations, rules, &mut cache);

    let mut outcome = FileOutcome::new(input.path.clone());
    outcome.declarations_modified = rewrite.declarations_modified;
    outcome.members_modified = rewrite.members_modified;
    outcome.notes = rewrite.notes;

    let Some(content) = rewrite.output else {
        return outcome;
    };

    let out_path = Path::new(&config.output_dir).join(&input.relative);
    if let Some(parent) = out_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            outcome.warning = Some(format!(
                "failed to create output directory {}: {e}",
                parent.display()
            ));
            return outcome;
        }
    }
    if let Err(e) = std::fs::write(&out_path, &content) {
        outcome.warning = Some(format!("failed to write {}: {e}", out_path.display()));
        return outcome;
    }
    outcome.output = Some(out_path);

    if config.delete_origin_file {
        if let Err(e) = std::fs::remove_file(&input.path) {
            outcome.warning = Some(format!(
                "failed to delete origin file {}: {e}",
                input.path.display()
            ));
        }
    }

    outcome
}
