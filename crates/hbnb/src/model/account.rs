use super::cascade::CascadeAction;
use super::{AnyEntity, Entity, EntityKind, FieldMap, Meta};
use crate::context::Context;
use crate::credentials::CredentialHasher;
use crate::error::Result;
use crate::store::DataStore;
use crate::validation::{DefaultValue, FieldRule, Rule, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NAME_PATTERN: &str = r"^[a-zA-Z\s-]+$";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(flatten)]
    pub meta: Meta,
    pub username: String,
    pub email: String,
    /// Serialized with the rest of the account, including through
    /// [`crate::model::AnyEntity`]. Strip it before exposing an account.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Account {
    /// Listings follow the owner into the paused state.
    pub const PAUSE_CASCADE: &'static [CascadeAction] =
        &[CascadeAction::set_active(EntityKind::Listing, "owner_id", false)];

    pub const REACTIVATE_CASCADE: &'static [CascadeAction] =
        &[CascadeAction::set_active(EntityKind::Listing, "owner_id", true)];

    pub fn verify_credential(&self, hasher: &dyn CredentialHasher, password: &str) -> bool {
        hasher.verify(password, &self.password_hash)
    }
}

/// Checks credential strength beyond the length rule.
fn credential_violations(password: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("password", Rule::Credential, "password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("password", Rule::Credential, "password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password", Rule::Credential, "password must contain a digit");
    }
    errors
}

impl Entity for Account {
    const KIND: EntityKind = EntityKind::Account;

    const RULES: &'static [FieldRule] = &[
        FieldRule::string("username")
            .required()
            .trim()
            .length(3, 32)
            .pattern(r"^[a-zA-Z0-9_-]+$")
            .unique(),
        FieldRule::string("email")
            .required()
            .trim()
            .max_len(254)
            .pattern(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .unique(),
        FieldRule::string("password").required().min_len(8),
        FieldRule::string("first_name").required().trim().length(2, 50).pattern(NAME_PATTERN),
        FieldRule::string("last_name").required().trim().length(2, 50).pattern(NAME_PATTERN),
        FieldRule::string("address").nullable().trim().length(0, 200),
        FieldRule::string("postal_code").nullable().trim().length(0, 20),
        FieldRule::string("city").nullable().trim().length(0, 100),
        FieldRule::string("phone").nullable().pattern(r"^\+?1?\d{10,14}$"),
        FieldRule::boolean("is_admin").default(DefaultValue::Bool(false)),
    ];

    const SOFT_DELETE_CASCADE: &'static [CascadeAction] = &[
        CascadeAction::hard_delete(EntityKind::Listing, "owner_id"),
        CascadeAction::anonymize(EntityKind::Review, "author_id"),
    ];

    const HARD_DELETE_CASCADE: &'static [CascadeAction] = Self::SOFT_DELETE_CASCADE;

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Account(self)
    }

    /// Replaces the plain `password` with its hash.
    fn prepare<S: DataStore>(
        ctx: &Context<'_, S>,
        fields: &mut FieldMap,
        _current: Option<&Self>,
    ) -> Result<()> {
        if let Some(Value::String(password)) = fields.remove("password") {
            credential_violations(&password).into_result()?;
            fields.insert(
                "password_hash".to_string(),
                Value::String(ctx.hasher.hash(&password)),
            );
        }
        Ok(())
    }
}
