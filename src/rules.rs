use anyhow::Result;

use crate::config::{Action, Config, HideRule, On, OneOrMany};
use crate::pattern::{PatternCache, PatternList};

/// One hide rule with its pattern lists compiled. Target and field lists
/// stay paired: a member is only in scope when a single rule matches both
/// the declaration name and the member name.
#[derive(Debug)]
struct CompiledRule {
    targets: PatternList,
    fields: PatternList,
    on: On,
}

/// The compiled, immutable rule set for one run.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    action: Action,
    input_marker: String,
}

impl RuleSet {
    /// Compile every rule's patterns, aggregating all failures with their
    /// 1-based rule numbers.
    pub fn compile(config: &Config) -> Result<RuleSet> {
        let mut rules = Vec::with_capacity(config.hide.len());
        let mut errors = Vec::new();

        for (index, rule) in config.hide.iter().enumerate() {
            let number = index + 1;
            let targets = match PatternList::compile(&target_patterns(rule)) {
                Ok(list) => list,
                Err(e) => {
                    errors.push(format!("Hide rule #{number}: {e:#}"));
                    PatternList::default()
                }
            };
            let fields = match PatternList::compile(&rule.field.to_vec()) {
                Ok(list) => list,
                Err(e) => {
                    errors.push(format!("Hide rule #{number}: {e:#}"));
                    PatternList::default()
                }
            };
            rules.push(CompiledRule {
                targets,
                fields,
                on: rule.on,
            });
        }

        if !errors.is_empty() {
            anyhow::bail!("{}", errors.join("\n"));
        }

        Ok(RuleSet {
            rules,
            action: config.action,
            input_marker: config.input_marker.clone(),
        })
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule could select members of this declaration. Gate for
    /// the per-declaration walk; also applied while recursing so nested
    /// composites inherit the enclosing declaration's scope.
    pub fn declaration_in_scope(&self, name: &str, cache: &mut PatternCache) -> bool {
        self.rules
            .iter()
            .any(|rule| self.rule_applies(rule, name, cache))
    }

    /// Per-rule conjunction: some rule must match the declaration name with
    /// its own targets AND the member name with its own fields.
    pub fn member_in_scope(
        &self,
        member_name: &str,
        declaration_name: &str,
        cache: &mut PatternCache,
    ) -> bool {
        self.rules.iter().any(|rule| {
            self.rule_applies(rule, declaration_name, cache)
                && rule.fields.matches_any(member_name, cache)
        })
    }

    fn rule_applies(
        &self,
        rule: &CompiledRule,
        declaration_name: &str,
        cache: &mut PatternCache,
    ) -> bool {
        let on_matches = match rule.on {
            On::Both => true,
            On::Input => declaration_name.contains(&self.input_marker),
            On::Output => !declaration_name.contains(&self.input_marker),
        };
        on_matches && rule.targets.matches_any(declaration_name, cache)
    }
}

/// Flatten one rule's target into patterns: a missing target and the
/// literal scalar "all" both mean every declaration; array entries are
/// taken verbatim.
fn target_patterns(rule: &HideRule) -> Vec<String> {
    match &rule.target {
        None => vec!["*".to_string()],
        Some(OneOrMany::One(s)) if s == "all" => vec!["*".to_string()],
        Some(other) => other.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(field: &[&str], target: Option<&[&str]>, on: On) -> HideRule {
        HideRule {
            field: OneOrMany::Many(field.iter().map(|s| s.to_string()).collect()),
            target: target.map(|t| OneOrMany::Many(t.iter().map(|s| s.to_string()).collect())),
            on,
        }
    }

    fn config_with(hide: Vec<HideRule>, input_marker: &str) -> Config {
        Config {
            origin_file: OneOrMany::One("*.ts".to_string()),
            output_dir: "out".to_string(),
            hide,
            action: Action::Comment,
            delete_origin_file: false,
            generate_omit_types: false,
            generated_omit_types_output_path: None,
            input_marker: input_marker.to_string(),
        }
    }

    fn rule_set(hide: Vec<HideRule>) -> RuleSet {
        RuleSet::compile(&config_with(hide, "Input")).unwrap()
    }

    #[test]
    fn missing_target_matches_every_declaration() {
        let rules = rule_set(vec![rule(&["*At"], None, On::Both)]);
        let mut cache = PatternCache::new();
        assert!(rules.declaration_in_scope("User", &mut cache));
        assert!(rules.declaration_in_scope("AnythingAtAll", &mut cache));
    }

    #[test]
    fn scalar_all_matches_every_declaration() {
        let rules = rule_set(vec![HideRule {
            field: OneOrMany::One("x".to_string()),
            target: Some(OneOrMany::One("all".to_string())),
            on: On::Both,
        }]);
        assert!(rules.declaration_in_scope("User", &mut PatternCache::new()));
    }

    #[test]
    fn scalar_target_is_a_pattern() {
        let rules = rule_set(vec![HideRule {
            field: OneOrMany::One("x".to_string()),
            target: Some(OneOrMany::One("User*".to_string())),
            on: On::Both,
        }]);
        let mut cache = PatternCache::new();
        assert!(rules.declaration_in_scope("UserInput", &mut cache));
        assert!(!rules.declaration_in_scope("Post", &mut cache));
    }

    #[test]
    fn member_scope_pairs_within_one_rule() {
        let rules = rule_set(vec![
            rule(&["authorId"], Some(&["PostInput"]), On::Both),
            rule(&["title"], Some(&["UserInput"]), On::Both),
        ]);
        let mut cache = PatternCache::new();
        assert!(rules.member_in_scope("authorId", "PostInput", &mut cache));
        // `title` is only paired with UserInput; PostInput must not pick
        // it up through the other rule's target.
        assert!(!rules.member_in_scope("title", "PostInput", &mut cache));
        assert!(rules.member_in_scope("title", "UserInput", &mut cache));
        assert!(!rules.member_in_scope("authorId", "UserInput", &mut cache));
    }

    #[test]
    fn negated_targets_exclude() {
        let rules = rule_set(vec![rule(
            &["secret"],
            Some(&["!Test*Input", "*Input"]),
            On::Both,
        )]);
        let mut cache = PatternCache::new();
        assert!(rules.declaration_in_scope("CreateUserInput", &mut cache));
        assert!(!rules.declaration_in_scope("TestCreateInput", &mut cache));
        assert!(rules.member_in_scope("secret", "CreateUserInput", &mut cache));
        assert!(!rules.member_in_scope("secret", "TestCreateInput", &mut cache));
    }

    #[test]
    fn on_input_requires_marker() {
        let rules = rule_set(vec![rule(&["*"], None, On::Input)]);
        let mut cache = PatternCache::new();
        assert!(rules.declaration_in_scope("CreateUserInput", &mut cache));
        assert!(rules.member_in_scope("id", "CreateUserInput", &mut cache));
        assert!(!rules.declaration_in_scope("User", &mut cache));
        assert!(!rules.member_in_scope("id", "User", &mut cache));
    }

    #[test]
    fn on_output_requires_marker_absent() {
        let rules = rule_set(vec![rule(&["*"], None, On::Output)]);
        let mut cache = PatternCache::new();
        assert!(rules.declaration_in_scope("User", &mut cache));
        assert!(!rules.declaration_in_scope("CreateUserInput", &mut cache));
    }

    #[test]
    fn input_marker_is_configurable() {
        let rules =
            RuleSet::compile(&config_with(vec![rule(&["*"], None, On::Input)], "Args")).unwrap();
        let mut cache = PatternCache::new();
        assert!(rules.declaration_in_scope("FindUserArgs", &mut cache));
        assert!(!rules.declaration_in_scope("CreateUserInput", &mut cache));
    }

    #[test]
    fn empty_rule_set_selects_nothing() {
        let rules = rule_set(vec![]);
        assert!(rules.is_empty());
        assert!(!rules.declaration_in_scope("User", &mut PatternCache::new()));
    }

    #[test]
    fn compile_errors_carry_rule_numbers() {
        let config = config_with(
            vec![
                rule(&["ok"], None, On::Both),
                rule(&["[bad"], Some(&["{worse,"]), On::Both),
            ],
            "Input",
        );
        let err = RuleSet::compile(&config).unwrap_err().to_string();
        assert!(err.contains("Hide rule #2"), "{err}");
        assert!(err.contains("[bad"), "{err}");
        assert!(err.contains("{worse,"), "{err}");
    }
}
