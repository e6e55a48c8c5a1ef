//! Field rule specifications.
//!
//! A rule table is a `const` slice of [`FieldRule`]s built with `const fn`
//! builders, so each entity's schema reads as a single declaration:
//!
//! ```ignore
//! pub const RULES: &[FieldRule] = &[
//!     FieldRule::string("name").required().trim().length(3, 120),
//!     FieldRule::number("price_per_night").required().positive(),
//! ];
//! ```

use crate::model::EntityKind;
use serde_json::Value;

/// JSON value types a field may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Bool,
}

impl FieldType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_f64(),
            FieldType::Bool => value.is_boolean(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "number",
            FieldType::Bool => "boolean",
        }
    }
}

/// A default that can live in a `const` table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    pub fn to_value(&self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(*b),
            DefaultValue::Int(i) => Value::from(*i),
            DefaultValue::Str(s) => Value::from(*s),
        }
    }
}

/// Specification for a single field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,

    /// Accepted types; any one of them passes the type check.
    pub types: &'static [FieldType],

    /// Must be present on creation. Updates skip this check.
    pub required: bool,

    /// `null` is accepted (and stored) as a value.
    pub nullable: bool,

    /// Strings are trimmed before length and pattern checks.
    pub trim: bool,

    pub min_len: Option<usize>,
    pub max_len: Option<usize>,

    /// Inclusive bounds.
    pub min: Option<f64>,
    pub max: Option<f64>,

    /// Value must be strictly greater than this.
    pub greater_than: Option<f64>,

    pub pattern: Option<&'static str>,

    /// Allowed values for enumerated strings. Empty means unrestricted.
    pub choices: &'static [&'static str],

    /// The value is the id of an existing, non-deleted entity of this kind.
    pub exists: Option<EntityKind>,

    /// No other live entity of the same kind may hold the same value.
    pub unique: bool,

    /// Applied on creation when the field is absent.
    pub default: Option<DefaultValue>,
}

const STRING: &[FieldType] = &[FieldType::String];
const INTEGER: &[FieldType] = &[FieldType::Integer];
const NUMBER: &[FieldType] = &[FieldType::Integer, FieldType::Float];
const BOOL: &[FieldType] = &[FieldType::Bool];

impl FieldRule {
    pub const fn new(name: &'static str, types: &'static [FieldType]) -> Self {
        Self {
            name,
            types,
            required: false,
            nullable: false,
            trim: false,
            min_len: None,
            max_len: None,
            min: None,
            max: None,
            greater_than: None,
            pattern: None,
            choices: &[],
            exists: None,
            unique: false,
            default: None,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, STRING)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, INTEGER)
    }

    /// Integer or real.
    pub const fn number(name: &'static str) -> Self {
        Self::new(name, NUMBER)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, BOOL)
    }

    /// A string id pointing at an entity of `kind`.
    pub const fn reference(name: &'static str, kind: EntityKind) -> Self {
        let mut rule = Self::new(name, STRING);
        rule.exists = Some(kind);
        rule
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub const fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }

    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Strictly greater than zero.
    pub const fn positive(mut self) -> Self {
        self.greater_than = Some(0.0);
        self
    }

    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn accepts_type(&self, value: &Value) -> bool {
        self.types.iter().any(|t| t.accepts(value))
    }

    pub fn type_names(&self) -> String {
        let names: Vec<&str> = self.types.iter().map(|t| t.name()).collect();
        names.join(" or ")
    }
}

/// Look up a rule by field name.
pub fn get_rule<'a>(rules: &'a [FieldRule], name: &str) -> Option<&'a FieldRule> {
    rules.iter().find(|rule| rule.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: &[FieldRule] = &[
        FieldRule::string("name").required().trim().length(3, 10),
        FieldRule::number("price").positive(),
        FieldRule::reference("owner_id", EntityKind::Account).required(),
    ];

    #[test]
    fn builders_set_flags() {
        let name = get_rule(TABLE, "name").unwrap();
        assert!(name.required && name.trim);
        assert_eq!(name.min_len, Some(3));
        assert_eq!(name.max_len, Some(10));

        let owner = get_rule(TABLE, "owner_id").unwrap();
        assert_eq!(owner.exists, Some(EntityKind::Account));
        assert!(get_rule(TABLE, "missing").is_none());
    }

    #[test]
    fn number_accepts_integers_and_reals() {
        let price = get_rule(TABLE, "price").unwrap();
        assert!(price.accepts_type(&json!(5)));
        assert!(price.accepts_type(&json!(5.5)));
        assert!(!price.accepts_type(&json!("5")));
        assert_eq!(price.type_names(), "integer or number");
    }

    #[test]
    fn integer_rejects_reals() {
        let rule = FieldRule::integer("rooms");
        assert!(rule.accepts_type(&json!(2)));
        assert!(!rule.accepts_type(&json!(2.5)));
    }

    #[test]
    fn defaults_convert_to_json() {
        assert_eq!(DefaultValue::Str("active").to_value(), json!("active"));
        assert_eq!(DefaultValue::Int(2).to_value(), json!(2));
        assert_eq!(DefaultValue::Null.to_value(), Value::Null);
    }
}
