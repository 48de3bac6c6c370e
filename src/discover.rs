use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobBuilder;
use ignore::WalkBuilder;

/// One resolved input file: where it is, and its path relative to the
/// pattern's literal base directory. The relative part is what gets
/// mirrored under the output directory.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub relative: PathBuf,
}

/// Resolve the configured glob pattern(s) into a sorted, deduplicated
/// file list. Relative patterns are taken relative to `base_dir`.
///
/// The walk deliberately ignores .gitignore and hidden-file filtering:
/// generated type output commonly lives in ignored or dot directories,
/// and the patterns alone decide what is in scope. A pattern whose base
/// directory does not exist simply matches nothing.
pub fn discover_inputs(patterns: &[String], base_dir: &Path) -> Result<Vec<InputFile>> {
    let mut inputs: Vec<InputFile> = Vec::new();

    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            base_dir.join(pattern)
        };

        let Some(walk_root) = literal_base(&full) else {
            // No glob metacharacters: the pattern is a plain file path.
            if full.is_file() {
                let relative = full
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| full.clone());
                inputs.push(InputFile {
                    path: full.clone(),
                    relative,
                });
            }
            continue;
        };

        let matcher = GlobBuilder::new(full.to_string_lossy().as_ref())
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .with_context(|| format!("invalid originFile pattern `{pattern}`"))?
            .compile_matcher();

        if !walk_root.is_dir() {
            continue;
        }

        for entry in WalkBuilder::new(&walk_root).standard_filters(false).build() {
            let entry = entry.context("error walking input directory")?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            if matcher.is_match(path) {
                let relative = path.strip_prefix(&walk_root).unwrap_or(path).to_path_buf();
                inputs.push(InputFile {
                    path: path.to_path_buf(),
                    relative,
                });
            }
        }
    }

    inputs.sort_by(|a, b| a.path.cmp(&b.path));
    inputs.dedup_by(|a, b| a.path == b.path);
    Ok(inputs)
}

/// Directory prefix of the pattern up to its first glob component, or
/// None when the pattern holds no metacharacters at all.
fn literal_base(pattern: &Path) -> Option<PathBuf> {
    let has_meta = |s: &str| s.contains(['*', '?', '[', ']', '{', '}']);
    if !has_meta(&pattern.to_string_lossy()) {
        return None;
    }
    let mut base = PathBuf::new();
    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();
        if has_meta(&text) {
            break;
        }
        base.push(component);
    }
    Some(base)
}
