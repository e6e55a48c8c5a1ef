//! # Validation
//!
//! Declarative field validation. Each entity kind owns a static table of
//! [`FieldRule`]s; the [`engine`] checks a proposed field map against that table
//! and either returns the validated map (trimmed strings, defaults applied) or
//! one [`ValidationErrors`] value listing every violation found in the pass.
//!
//! The engine never mutates storage. Reference rules look up their targets
//! through the read-only [`ReferenceLookup`] capability.

pub mod engine;
pub mod rules;

pub use engine::{validate, Mode, ReferenceLookup};
pub use rules::{DefaultValue, FieldRule, FieldType};

use crate::error::{HbnbError, Result};
use std::fmt;

/// Which check a violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Unknown,
    Type,
    MinLength,
    MaxLength,
    Pattern,
    Range,
    Choice,
    /// Well-formed identifier that points at nothing (or at a deleted entity).
    Reference,
    Unique,
    Immutable,
    Format,
    Credential,
    SelfReview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

/// Every violation collected during one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, rule, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, rule: Rule, message: impl Into<String>) {
        self.violations.push(Violation {
            field: field.into(),
            rule,
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// True if `field` failed `rule`.
    pub fn has(&self, field: &str, rule: Rule) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.rule == rule)
    }

    /// `Ok(())` when empty, otherwise the aggregated error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HbnbError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.violations.iter().map(|v| v.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}
