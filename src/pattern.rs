use std::collections::HashMap;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

/// A single compiled name pattern. Supports `*`, `?`, `[abc]`/`[0-9]`
/// character classes, and `{a,b}` alternation; a pattern with no
/// metacharacters matches literally. A leading `!` marks the pattern as an
/// exclusion when it participates in a pattern list.
#[derive(Debug)]
pub struct Pattern {
    raw: String,
    negated: bool,
    glob: GlobMatcher,
}

impl Pattern {
    pub fn compile(raw: &str) -> Result<Pattern> {
        let (negated, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        // Names are opaque strings, not paths: `*` and `?` may cross any
        // character, including separators.
        let glob = GlobBuilder::new(body)
            .literal_separator(false)
            .backslash_escape(true)
            .build()
            .with_context(|| format!("invalid pattern `{raw}`"))?
            .compile_matcher();
        Ok(Pattern {
            raw: raw.to_string(),
            negated,
            glob,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    fn is_match(&self, subject: &str) -> bool {
        self.glob.is_match(subject)
    }
}

/// Memoized match results keyed by (pattern, subject). The same
/// declaration-name or field-name pair recurs for every member of a large
/// file, so lookups dominate; the cache is an optimization only, never a
/// correctness dependency. One instance per file-processing call, owned by
/// a single worker, no synchronization.
#[derive(Debug, Default)]
pub struct PatternCache {
    memo: HashMap<String, HashMap<String, bool>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match one pattern against a subject, consulting the memo first.
    /// Negation is ignored here; it is a list-level concern.
    pub fn matches(&mut self, pattern: &Pattern, subject: &str) -> bool {
        if let Some(by_subject) = self.memo.get(pattern.raw()) {
            if let Some(&hit) = by_subject.get(subject) {
                return hit;
            }
        }
        let result = pattern.is_match(subject);
        self.memo
            .entry(pattern.raw().to_string())
            .or_default()
            .insert(subject.to_string(), result);
        result
    }

    #[cfg(test)]
    fn entries(&self) -> usize {
        self.memo.values().map(|m| m.len()).sum()
    }
}

/// An ordered list of compiled patterns with the canonical two-step
/// semantics: a subject is in scope iff it matches at least one
/// non-negated pattern AND matches no `!`-negated pattern. A list holding
/// only negated patterns therefore selects nothing.
#[derive(Debug, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    /// Compile every pattern, collecting all failures rather than stopping
    /// at the first.
    pub fn compile(raw: &[String]) -> Result<PatternList> {
        let mut patterns = Vec::with_capacity(raw.len());
        let mut errors = Vec::new();
        for r in raw {
            match Pattern::compile(r) {
                Ok(p) => patterns.push(p),
                Err(e) => errors.push(format!("{e:#}")),
            }
        }
        if !errors.is_empty() {
            anyhow::bail!("{}", errors.join("\n"));
        }
        Ok(PatternList { patterns })
    }

    pub fn matches_any(&self, subject: &str, cache: &mut PatternCache) -> bool {
        let mut positive = false;
        for p in self.patterns.iter().filter(|p| !p.is_negated()) {
            if cache.matches(p, subject) {
                positive = true;
                break;
            }
        }
        if !positive {
            return false;
        }
        for p in self.patterns.iter().filter(|p| p.is_negated()) {
            if cache.matches(p, subject) {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}
