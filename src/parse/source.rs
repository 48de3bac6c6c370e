use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One input file held in memory, with precomputed line starts.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    content: String,
    /// Byte offsets where each line starts (0-indexed into content)
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::from_string(path.to_path_buf(), content))
    }

    /// Create a SourceFile from a string, using the given path for display
    /// purposes.
    pub fn from_string(path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(content.as_bytes());
        Self {
            path,
            content,
            line_starts,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Start offset of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        self.line_starts[self.line_index(offset)]
    }

    /// One past the end of the line containing `offset`, including its
    /// newline when present.
    pub fn line_end(&self, offset: usize) -> usize {
        let idx = self.line_index(offset);
        if idx + 1 < self.line_starts.len() {
            self.line_starts[idx + 1]
        } else {
            self.content.len()
        }
    }

    /// Convert a byte offset into a (1-indexed line, 0-indexed column)
    /// pair. Column is a character offset within the line.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let idx = self.line_index(offset);
        let col = self.content[self.line_starts[idx]..offset].chars().count();
        (idx + 1, col)
    }

    fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }
}

fn compute_line_starts(content: &[u8]) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, &byte) in content.iter().enumerate() {
        if byte == b'\n' && i + 1 < content.len() {
            starts.push(i + 1);
        }
    }
    starts
}
