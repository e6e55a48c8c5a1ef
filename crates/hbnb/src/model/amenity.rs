use super::cascade::CascadeAction;
use super::{AnyEntity, Entity, EntityKind, Meta};
use crate::validation::{DefaultValue, FieldRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmenityCategory {
    Safety,
    Comfort,
    Entertainment,
    #[default]
    Supernatural,
    /// Only reachable through soft delete.
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    #[serde(flatten)]
    pub meta: Meta,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: AmenityCategory,
}

impl Amenity {
    pub fn is_blocked(&self) -> bool {
        self.category == AmenityCategory::Blocked
    }
}

impl Entity for Amenity {
    const KIND: EntityKind = EntityKind::Amenity;

    const RULES: &'static [FieldRule] = &[
        FieldRule::string("name")
            .required()
            .trim()
            .length(2, 120)
            .pattern(r"^[\w\s-]+$")
            .unique(),
        FieldRule::string("description").trim().max_len(500).default(DefaultValue::Str("")),
        FieldRule::string("category")
            .choices(&["safety", "comfort", "entertainment", "supernatural"])
            .default(DefaultValue::Str("supernatural")),
    ];

    const HARD_DELETE_CASCADE: &'static [CascadeAction] =
        &[CascadeAction::hard_delete(EntityKind::ListingAmenityLink, "amenity_id")];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Amenity(self)
    }

    fn mark_deleted(&mut self) {
        self.category = AmenityCategory::Blocked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_delete_blocks_category() {
        let mut amenity = Amenity {
            meta: Meta::new(),
            name: "Wifi".into(),
            description: String::new(),
            category: AmenityCategory::Comfort,
        };
        amenity.mark_deleted();
        assert!(amenity.is_blocked());
        assert!(!amenity.meta.is_deleted);
    }

    #[test]
    fn blocked_is_not_a_choice() {
        let rule = crate::validation::rules::get_rule(Amenity::RULES, "category").unwrap();
        assert!(!rule.choices.contains(&"blocked"));
    }
}
