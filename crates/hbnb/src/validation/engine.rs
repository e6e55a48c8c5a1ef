//! The validation pass.
//!
//! Order of checks per field: presence, null handling, type, then the
//! type-specific constraints (length and pattern for strings, bounds for
//! numbers, choices), and finally the reference lookup. A reference is only
//! looked up once the value is otherwise well formed, so a malformed id reports
//! `Rule::Type` while a well-formed id with no target reports `Rule::Reference`.

use super::rules::FieldRule;
use super::{Rule, ValidationErrors};
use crate::error::{HbnbError, Result};
use crate::model::{EntityKind, FieldMap};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Read-only existence checks for reference rules.
pub trait ReferenceLookup {
    /// True if an entity of `kind` with `id` exists and is not deleted.
    fn exists(&self, kind: EntityKind, id: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Creation: required fields enforced, defaults applied.
    Full,
    /// Update: only the supplied fields are checked.
    Partial,
}

static PATTERNS: Lazy<Mutex<HashMap<&'static str, Regex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn pattern_matches(pattern: &'static str, text: &str) -> Result<bool> {
    let mut cache = PATTERNS
        .lock()
        .map_err(|_| HbnbError::Store("pattern cache poisoned".to_string()))?;
    if let Some(re) = cache.get(pattern) {
        return Ok(re.is_match(text));
    }
    let re = Regex::new(pattern)
        .map_err(|e| HbnbError::Store(format!("invalid pattern {pattern}: {e}")))?;
    let matched = re.is_match(text);
    cache.insert(pattern, re);
    Ok(matched)
}

/// Validates `input` against `rules`.
///
/// Returns the normalized map on success. All violations are collected before
/// failing; lookup errors from storage are returned as-is.
pub fn validate(
    rules: &[FieldRule],
    input: &FieldMap,
    mode: Mode,
    lookup: &dyn ReferenceLookup,
) -> Result<FieldMap> {
    let mut errors = ValidationErrors::default();
    let mut output = FieldMap::new();

    for (name, _) in input.iter() {
        if !rules.iter().any(|rule| rule.name == name) {
            errors.push(name.as_str(), Rule::Unknown, format!("Unknown field: {name}"));
        }
    }

    for rule in rules {
        match input.get(rule.name) {
            None => {
                if mode == Mode::Partial {
                    continue;
                }
                if rule.required {
                    errors.push(rule.name, Rule::Required, format!("{} is required", rule.name));
                } else if let Some(default) = rule.default {
                    output.insert(rule.name.to_string(), default.to_value());
                }
            }
            Some(Value::Null) => {
                if rule.nullable {
                    output.insert(rule.name.to_string(), Value::Null);
                } else if rule.required {
                    errors.push(rule.name, Rule::Required, format!("{} is required", rule.name));
                } else {
                    errors.push(rule.name, Rule::Type, format!("{} cannot be null", rule.name));
                }
            }
            Some(value) => {
                if let Some(normalized) = check_value(rule, value, lookup, &mut errors)? {
                    output.insert(rule.name.to_string(), normalized);
                }
            }
        }
    }

    errors.into_result()?;
    Ok(output)
}

/// Checks one present, non-null value. Returns the normalized value, or
/// `None` if a violation was recorded.
fn check_value(
    rule: &FieldRule,
    value: &Value,
    lookup: &dyn ReferenceLookup,
    errors: &mut ValidationErrors,
) -> Result<Option<Value>> {
    let name = rule.name;
    if !rule.accepts_type(value) {
        errors.push(name, Rule::Type, format!("{name} must be a {}", rule.type_names()));
        return Ok(None);
    }
    let before = errors.len();

    let normalized = match value {
        Value::String(raw) => {
            let text = if rule.trim { raw.trim() } else { raw.as_str() };
            let len = text.chars().count();
            if let Some(min) = rule.min_len {
                if len < min {
                    errors.push(
                        name,
                        Rule::MinLength,
                        format!("{name} must be at least {min} characters long"),
                    );
                }
            }
            if let Some(max) = rule.max_len {
                if len > max {
                    errors.push(
                        name,
                        Rule::MaxLength,
                        format!("{name} must be at most {max} characters long"),
                    );
                }
            }
            if let Some(pattern) = rule.pattern {
                if !pattern_matches(pattern, text)? {
                    errors.push(name, Rule::Pattern, format!("{name} has an invalid format"));
                }
            }
            if !rule.choices.is_empty() && !rule.choices.contains(&text) {
                errors.push(
                    name,
                    Rule::Choice,
                    format!("{name} must be one of: {}", rule.choices.join(", ")),
                );
            }
            Value::String(text.to_string())
        }
        Value::Number(n) => {
            let v = n.as_f64().unwrap_or_default();
            if let Some(min) = rule.min {
                if v < min {
                    errors.push(name, Rule::Range, format!("{name} must be at least {min}"));
                }
            }
            if let Some(max) = rule.max {
                if v > max {
                    errors.push(name, Rule::Range, format!("{name} must be at most {max}"));
                }
            }
            if let Some(bound) = rule.greater_than {
                if v <= bound {
                    errors.push(name, Rule::Range, format!("{name} must be greater than {bound}"));
                }
            }
            value.clone()
        }
        other => other.clone(),
    };

    if errors.len() > before {
        return Ok(None);
    }

    if let (Some(kind), Some(id)) = (rule.exists, normalized.as_str()) {
        if !lookup.exists(kind, id)? {
            errors.push(
                name,
                Rule::Reference,
                format!("Invalid reference: {kind} not found with ID: {id}"),
            );
            return Ok(None);
        }
    }

    Ok(Some(normalized))
}
