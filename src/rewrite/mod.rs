pub mod edit;

use crate::config::Action;
use crate::parse::{Composite, Declaration, Member, MemberState, SourceFile};
use crate::pattern::PatternCache;
use crate::rules::RuleSet;
use edit::{Edit, EditSet};

/// Result of rewriting one file's declaration tree.
#[derive(Debug)]
pub struct FileRewrite {
    /// Rewritten text, or None when no member was mutated.
    pub output: Option<String>,
    /// Top-level declarations with at least one mutation in their subtree.
    pub declarations_modified: usize,
    /// Mutated members, counted at the depth they were mutated.
    pub members_modified: usize,
    /// One line per mutation, for verbose output.
    pub notes: Vec<String>,
}

/// Walk every declaration of a file, mutate in-scope members, and apply
/// the resulting edits. The tree is tombstoned in place; the original
/// text is never modified.
pub fn rewrite_file(
    source: &SourceFile,
    declarations: &mut [Declaration],
    rules: &RuleSet,
    cache: &mut PatternCache,
) -> FileRewrite {
    let mut edits = Vec::new();
    let mut notes = Vec::new();
    let mut declarations_modified = 0;
    let mut members_modified = 0;

    for decl in declarations.iter_mut() {
        if !rules.declaration_in_scope(&decl.name, cache) {
            continue;
        }
        let count = process_composite(
            &mut decl.body,
            &decl.name,
            source,
            rules,
            cache,
            &mut edits,
            &mut notes,
        );
        if count > 0 {
            declarations_modified += 1;
            members_modified += count;
        }
    }

    let output = if edits.is_empty() {
        None
    } else {
        Some(EditSet::from_vec(edits).apply(source.content()))
    };

    FileRewrite {
        output,
        declarations_modified,
        members_modified,
        notes,
    }
}

/// Process one composite's direct members, then recurse into nested
/// composites of members that are still live. Nested composites are
/// anonymous, so the enclosing declaration's name stays the scope context
/// all the way down. Returns the number of members mutated in this
/// subtree.
fn process_composite(
    composite: &mut Composite,
    declaration_name: &str,
    source: &SourceFile,
    rules: &RuleSet,
    cache: &mut PatternCache,
    edits: &mut Vec<Edit>,
    notes: &mut Vec<String>,
) -> usize {
    // Stable snapshot of what to mutate; never iterate the live list while
    // mutating it.
    let to_mutate: Vec<usize> = composite
        .members
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            m.is_live()
                && m.name
                    .as_deref()
                    .is_some_and(|name| rules.member_in_scope(name, declaration_name, cache))
        })
        .map(|(index, _)| index)
        .collect();

    let mut count = 0;
    for index in to_mutate {
        let member = &mut composite.members[index];
        if !member.is_live() {
            continue;
        }
        apply_action(member, declaration_name, source, rules.action(), edits, notes);
        count += 1;
    }

    for member in composite.members.iter_mut() {
        if !member.is_live() {
            continue;
        }
        if let Some(nested) = member.nested.as_mut() {
            count += process_composite(nested, declaration_name, source, rules, cache, edits, notes);
        }
    }

    count
}

/// Mutate one member: flip its tombstone and emit the matching edit.
/// Callers guarantee the member is live and call this at most once per
/// member per run.
fn apply_action(
    member: &mut Member,
    declaration_name: &str,
    source: &SourceFile,
    action: Action,
    edits: &mut Vec<Edit>,
    notes: &mut Vec<String>,
) {
    let span = member.span;
    let name = member.name.as_deref().unwrap_or("<unnamed>");
    let (line, _) = source.line_col(span.start);

    match action {
        Action::Comment => {
            member.state = MemberState::Commented;
            let text = span.text(source.content());
            let commented = text
                .split('\n')
                .map(|l| format!("// {l}"))
                .collect::<Vec<_>>()
                .join("\n");
            edits.push(Edit::replace(span.start, span.end, commented));
            notes.push(format!(
                "commented `{name}` in `{declaration_name}` (line {line})"
            ));
        }
        Action::Delete => {
            member.state = MemberState::Removed;
            let (start, end) = delete_extent(source, span.start, span.end);
            edits.push(Edit::delete(start, end));
            notes.push(format!(
                "removed `{name}` in `{declaration_name}` (line {line})"
            ));
        }
    }
}

/// Extent to remove for a deleted member. When the member's lines hold
/// nothing else, the whole lines go (including the trailing newline) so
/// no blank hole is left behind; otherwise only the member text itself.
fn delete_extent(source: &SourceFile, start: usize, end: usize) -> (usize, usize) {
    let content = source.content();
    let line_start = source.line_start(start);
    let line_end = source.line_end(end - 1);
    let prefix_blank = content[line_start..start].chars().all(char::is_whitespace);
    let suffix_blank = content[end..line_end].chars().all(char::is_whitespace);
    if prefix_blank && suffix_blank {
        (line_start, line_end)
    } else {
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HideRule, On, OneOrMany};
    use crate::parse::parse_declarations;
    use std::path::PathBuf;

    fn config(action: Action, hide: Vec<HideRule>) -> Config {
        Config {
            origin_file: OneOrMany::One("*.ts".to_string()),
            output_dir: "out".to_string(),
            hide,
            action,
            delete_origin_file: false,
            generate_omit_types: false,
            generated_omit_types_output_path: None,
            input_marker: "Input".to_string(),
        }
    }

    fn rule(field: &[&str], target: Option<&[&str]>) -> HideRule {
        HideRule {
            field: OneOrMany::Many(field.iter().map(|s| s.to_string()).collect()),
            target: target.map(|t| OneOrMany::Many(t.iter().map(|s| s.to_string()).collect())),
            on: On::Both,
        }
    }

    fn run(text: &str, config: &Config) -> FileRewrite {
        let source = SourceFile::from_string(PathBuf::from("test.ts"), text.to_string());
        let mut decls = parse_declarations(&source).unwrap();
        let rules = RuleSet::compile(config).unwrap();
        let mut cache = PatternCache::new();
        rewrite_file(&source, &mut decls, &rules, &mut cache)
    }

    #[test]
    fn comment_action_neutralizes_matching_member() {
        let text = "export type User = {\n  createdAt: Date;\n  email: string;\n};\n";
        let cfg = config(Action::Comment, vec![rule(&["*At"], None)]);
        let result = run(text, &cfg);
        let output = result.output.unwrap();
        assert_eq!(
            output,
            "export type User = {\n  // createdAt: Date;\n  email: string;\n};\n"
        );
        assert_eq!(result.members_modified, 1);
        assert_eq!(result.declarations_modified, 1);
    }

    #[test]
    fn delete_action_removes_whole_line() {
        let text = "type User = {\n  id: string;\n  password: string;\n  email: string;\n};\n";
        let cfg = config(Action::Delete, vec![rule(&["id", "password"], Some(&["User"]))]);
        let result = run(text, &cfg);
        assert_eq!(result.output.unwrap(), "type User = {\n  email: string;\n};\n");
        assert_eq!(result.declarations_modified, 1);
        assert_eq!(result.members_modified, 2);
    }

    #[test]
    fn inline_delete_removes_only_the_member() {
        let text = "type P = { x: number, y: number };\n";
        let cfg = config(Action::Delete, vec![rule(&["x"], None)]);
        let result = run(text, &cfg);
        assert_eq!(result.output.unwrap(), "type P = {  y: number };\n");
    }

    #[test]
    fn scope_conjunction_respects_rule_pairing() {
        let text = "type PostInput = {\n  authorId: string;\n  title: string;\n};\n";
        let cfg = config(
            Action::Comment,
            vec![
                rule(&["authorId"], Some(&["PostInput"])),
                rule(&["title"], Some(&["UserInput"])),
            ],
        );
        let result = run(text, &cfg);
        let output = result.output.unwrap();
        assert!(output.contains("// authorId: string;"), "{output}");
        assert!(output.contains("\n  title: string;"), "{output}");
        assert_eq!(result.members_modified, 1);
    }

    #[test]
    fn nested_members_are_reached_without_direct_matches() {
        let text = "type User = {\n  profile: {\n    lastLoginAt: Date;\n    bio: string;\n  };\n  email: string;\n};\n";
        let cfg = config(Action::Comment, vec![rule(&["*At"], None)]);
        let result = run(text, &cfg);
        let output = result.output.unwrap();
        assert!(output.contains("// lastLoginAt: Date;"), "{output}");
        assert!(output.contains("profile: {"), "{output}");
        assert_eq!(result.members_modified, 1);
        assert_eq!(result.declarations_modified, 1);
    }

    #[test]
    fn nested_inside_generic_is_reached() {
        let text = "type Feed = {\n  entries: Array<{ seenAt: Date; id: string }>;\n};\n";
        let cfg = config(Action::Delete, vec![rule(&["seenAt"], None)]);
        let result = run(text, &cfg);
        let output = result.output.unwrap();
        assert!(!output.contains("seenAt"), "{output}");
        assert!(output.contains("id: string"), "{output}");
        assert_eq!(result.members_modified, 1);
    }

    #[test]
    fn mutated_parent_subtree_is_not_recursed() {
        let text = "type User = {\n  profile: {\n    lastLoginAt: Date;\n  };\n};\n";
        let cfg = config(Action::Delete, vec![rule(&["profile", "*At"], None)]);
        let result = run(text, &cfg);
        // profile is removed whole; lastLoginAt must not be counted again
        // inside the removed subtree.
        assert_eq!(result.members_modified, 1);
        assert_eq!(result.output.unwrap(), "type User = {\n};\n");
    }

    #[test]
    fn commented_member_keeps_subtree_text() {
        let text = "type User = {\n  profile: {\n    bio: string;\n  };\n};\n";
        let cfg = config(Action::Comment, vec![rule(&["profile"], None)]);
        let result = run(text, &cfg);
        assert_eq!(
            result.output.unwrap(),
            "type User = {\n  // profile: {\n//     bio: string;\n//   };\n};\n"
        );
        assert_eq!(result.members_modified, 1);
    }

    #[test]
    fn out_of_scope_declaration_is_untouched() {
        let text = "type Post = {\n  id: string;\n};\ntype User = {\n  id: string;\n};\n";
        let cfg = config(Action::Delete, vec![rule(&["id"], Some(&["User"]))]);
        let result = run(text, &cfg);
        let output = result.output.unwrap();
        assert!(output.contains("type Post = {\n  id: string;\n};"), "{output}");
        assert!(output.contains("type User = {\n};"), "{output}");
        assert_eq!(result.declarations_modified, 1);
    }

    #[test]
    fn no_matches_produces_no_output() {
        let text = "type User = {\n  email: string;\n};\n";
        let cfg = config(Action::Comment, vec![rule(&["*At"], None)]);
        let result = run(text, &cfg);
        assert!(result.output.is_none());
        assert_eq!(result.declarations_modified, 0);
        assert_eq!(result.members_modified, 0);
        assert!(result.notes.is_empty());
    }

    #[test]
    fn rewrite_is_deterministic() {
        let text = "type User = {\n  createdAt: Date;\n  updatedAt: Date;\n  email: string;\n};\n";
        let cfg = config(Action::Comment, vec![rule(&["*At"], None)]);
        let first = run(text, &cfg).output.unwrap();
        let second = run(text, &cfg).output.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn delete_is_idempotent() {
        let text = "type User = {\n  password: string;\n  email: string;\n};\n";
        let cfg = config(Action::Delete, vec![rule(&["password"], None)]);
        let once = run(text, &cfg).output.unwrap();
        let again = run(&once, &cfg);
        assert!(again.output.is_none(), "second run must be a no-op");
    }

    #[test]
    fn comment_is_not_reapplied() {
        let text = "type User = {\n  secret: string;\n  email: string;\n};\n";
        let cfg = config(Action::Comment, vec![rule(&["secret"], None)]);
        let once = run(text, &cfg).output.unwrap();
        assert!(once.contains("// secret: string;"), "{once}");
        let again = run(&once, &cfg);
        assert!(again.output.is_none(), "commented member must not match again");
    }

    #[test]
    fn notes_describe_each_mutation() {
        let text = "type User = {\n  createdAt: Date;\n};\n";
        let cfg = config(Action::Comment, vec![rule(&["*At"], None)]);
        let result = run(text, &cfg);
        assert_eq!(result.notes.len(), 1);
        assert!(result.notes[0].contains("createdAt"), "{}", result.notes[0]);
        assert!(result.notes[0].contains("User"), "{}", result.notes[0]);
    }
}
