/// A single source-level edit: replace byte range [start..end) with replacement.
#[derive(Debug, Clone)]
pub struct Edit {
    /// Byte offset, inclusive.
    pub start: usize,
    /// Byte offset, exclusive.
    pub end: usize,
    /// Replacement text (empty string = deletion).
    pub replacement: String,
}

impl Edit {
    pub fn replace(start: usize, end: usize, replacement: String) -> Self {
        Edit {
            start,
            end,
            replacement,
        }
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Edit {
            start,
            end,
            replacement: String::new(),
        }
    }
}

/// A set of non-overlapping edits, sorted by start offset.
///
/// Built from an unsorted vec. Overlapping edits are resolved by dropping
/// the later one (first edit wins); ties on start offset keep insertion
/// order.
#[derive(Debug)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn from_vec(mut raw: Vec<Edit>) -> Self {
        // Stable sort: equal starts keep the order edits were produced in.
        raw.sort_by_key(|e| e.start);

        let mut accepted: Vec<Edit> = Vec::with_capacity(raw.len());
        for e in raw {
            if let Some(last) = accepted.last() {
                if e.start < last.end {
                    continue;
                }
            }
            accepted.push(e);
        }

        Self { edits: accepted }
    }

    /// Apply the edits to the source, returning the rewritten text.
    ///
    /// Single O(n) linear scan:
    /// ```text
    /// cursor = 0
    /// for each edit e (sorted by start):
    ///     copy source[cursor..e.start]
    ///     copy e.replacement
    ///     cursor = e.end
    /// copy source[cursor..]
    /// ```
    pub fn apply(&self, source: &str) -> String {
        let mut result = String::with_capacity(source.len());
        let mut cursor = 0;

        for e in &self.edits {
            if e.start > cursor {
                result.push_str(&source[cursor..e.start]);
            }
            result.push_str(&e.replacement);
            cursor = e.end;
        }

        if cursor < source.len() {
            result.push_str(&source[cursor..]);
        }

        result
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_edits_return_source_unchanged() {
        let es = EditSet::from_vec(vec![]);
        assert_eq!(es.apply("hello world"), "hello world");
        assert!(es.is_empty());
        assert_eq!(es.len(), 0);
    }

    #[test]
    fn single_deletion() {
        let es = EditSet::from_vec(vec![Edit::delete(5, 6)]);
        assert_eq!(es.apply("hello world"), "helloworld");
        assert_eq!(es.len(), 1);
    }

    #[test]
    fn single_insertion() {
        let es = EditSet::from_vec(vec![Edit::replace(5, 5, ",".into())]);
        assert_eq!(es.apply("hello world"), "hello, world");
    }

    #[test]
    fn single_replacement() {
        let es = EditSet::from_vec(vec![Edit::replace(6, 11, "rust".into())]);
        assert_eq!(es.apply("hello world"), "hello rust");
    }

    #[test]
    fn multiple_non_overlapping_sorted_by_start() {
        let es = EditSet::from_vec(vec![
            Edit::replace(8, 11, "GHI".into()),
            Edit::replace(0, 3, "ABC".into()),
        ]);
        assert_eq!(es.apply("abc def ghi"), "ABC def GHI");
        assert_eq!(es.len(), 2);
    }

    #[test]
    fn overlapping_drops_second() {
        let es = EditSet::from_vec(vec![
            Edit::replace(2, 6, "XX".into()), // replace "cdef"
            Edit::replace(4, 8, "YY".into()), // overlaps, dropped
        ]);
        assert_eq!(es.apply("abcdefgh"), "abXXgh");
        assert_eq!(es.len(), 1);
    }

    #[test]
    fn same_start_keeps_first_inserted() {
        let es = EditSet::from_vec(vec![
            Edit::replace(0, 3, "WIN".into()),
            Edit::replace(0, 3, "LOSE".into()),
        ]);
        assert_eq!(es.apply("abc"), "WIN");
        assert_eq!(es.len(), 1);
    }

    #[test]
    fn edit_at_start() {
        let es = EditSet::from_vec(vec![Edit::replace(0, 1, "X".into())]);
        assert_eq!(es.apply("abc"), "Xbc");
    }

    #[test]
    fn edit_at_end() {
        let es = EditSet::from_vec(vec![Edit::replace(2, 3, "X".into())]);
        assert_eq!(es.apply("abc"), "abX");
    }

    #[test]
    fn insertion_at_end() {
        let es = EditSet::from_vec(vec![Edit::replace(3, 3, "X".into())]);
        assert_eq!(es.apply("abc"), "abcX");
    }

    #[test]
    fn adjacent_edits_both_apply() {
        let es = EditSet::from_vec(vec![
            Edit::replace(0, 3, "X".into()),
            Edit::replace(3, 6, "Y".into()),
        ]);
        assert_eq!(es.apply("abcdef"), "XY");
        assert_eq!(es.len(), 2);
    }

    #[test]
    fn delete_entire_source() {
        let es = EditSet::from_vec(vec![Edit::delete(0, 3)]);
        assert_eq!(es.apply("abc"), "");
    }
}
