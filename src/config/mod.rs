use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;

/// A JSON value that is either one string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }
}

/// What to do with a member once a rule selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Comment,
    Delete,
}

/// Which side of the type surface a rule applies to. Input-likeness is a
/// naming convention, checked against the configured `inputMarker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum On {
    Input,
    Output,
    #[default]
    Both,
}

/// One hide instruction: which members (`field`) of which declarations
/// (`target`) to suppress. A missing target means every declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct HideRule {
    pub field: OneOrMany,
    #[serde(default)]
    pub target: Option<OneOrMany>,
    #[serde(default)]
    pub on: On,
}

/// The JSON configuration document. Loaded once per run, read-only after.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Glob pattern(s) selecting the input files.
    pub origin_file: OneOrMany,
    pub output_dir: String,
    pub hide: Vec<HideRule>,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub delete_origin_file: bool,
    #[serde(default)]
    pub generate_omit_types: bool,
    #[serde(default)]
    pub generated_omit_types_output_path: Option<String>,
    /// Substring marking a declaration name as input-like for `on`
    /// filtering.
    #[serde(default = "default_input_marker")]
    pub input_marker: String,
}

fn default_input_marker() -> String {
    "Input".to_string()
}

impl Config {
    pub fn origin_patterns(&self) -> Vec<String> {
        self.origin_file.to_vec()
    }
}

/// Load and validate the config document. Validation failures are
/// aggregated: the error lists every violation found, not just the first.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let raw: Value = serde_json::from_str(&contents)
        .with_context(|| format!("config {} is not valid JSON", path.display()))?;

    let errors = validate(&raw);
    if !errors.is_empty() {
        bail!(
            "invalid config {}:\n  {}",
            path.display(),
            errors.join("\n  ")
        );
    }

    let config: Config = serde_json::from_value(raw)
        .with_context(|| format!("failed to decode config {}", path.display()))?;
    Ok(config)
}

const REQUIRED_FIELDS: [&str; 3] = ["originFile", "outputDir", "hide"];

/// Collect every schema violation in the raw document.
fn validate(raw: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        if raw.get(field).is_none_or(Value::is_null) {
            errors.push(format!("Missing required field: {field}"));
        }
    }

    if let Some(origin) = non_null(raw, "originFile") {
        if !is_string_or_string_array(origin) {
            errors.push("originFile must be a string or array of strings".to_string());
        }
    }

    if let Some(out) = non_null(raw, "outputDir") {
        if !out.is_string() {
            errors.push("outputDir must be a string".to_string());
        }
    }

    match non_null(raw, "hide") {
        Some(Value::Array(rules)) => {
            for (index, rule) in rules.iter().enumerate() {
                validate_rule(rule, index + 1, &mut errors);
            }
        }
        Some(_) => errors.push("hide must be an array of rules".to_string()),
        None => {}
    }

    if let Some(action) = non_null(raw, "action") {
        if !matches!(action.as_str(), Some("comment" | "delete")) {
            errors.push("Invalid action value. Must be comment or delete".to_string());
        }
    }

    if let Some(marker) = non_null(raw, "inputMarker") {
        if !marker.is_string() {
            errors.push("inputMarker must be a string".to_string());
        }
    }

    let omit_types = non_null(raw, "generateOmitTypes")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if omit_types && non_null(raw, "generatedOmitTypesOutputPath").is_none() {
        errors.push("generatedOmitTypesOutputPath is required when generateOmitTypes is true".to_string());
    }

    errors
}

fn validate_rule(rule: &Value, number: usize, errors: &mut Vec<String>) {
    if !rule.is_object() {
        errors.push(format!("Hide rule #{number}: must be an object"));
        return;
    }

    let Some(field) = non_null(rule, "field") else {
        errors.push(format!("Hide rule #{number}: Missing required field field"));
        return;
    };
    if !is_string_or_string_array(field) {
        errors.push(format!(
            "Hide rule #{number}: field must be a string or array of strings"
        ));
    }

    if let Some(target) = non_null(rule, "target") {
        if !is_string_or_string_array(target) {
            errors.push(format!(
                "Hide rule #{number}: target must be 'all', a string, or array of patterns"
            ));
        }
    }

    if let Some(on) = non_null(rule, "on") {
        if !matches!(on.as_str(), Some("input" | "output" | "both")) {
            errors.push(format!(
                "Hide rule #{number}: Invalid 'on' value. Must be input, output, both"
            ));
        }
    }
}

fn non_null<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    value.get(key).filter(|v| !v.is_null())
}

fn is_string_or_string_array(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}
