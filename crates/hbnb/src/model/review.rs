use super::{AnyEntity, Entity, EntityKind, FieldMap, Listing, Meta};
use crate::context::Context;
use crate::error::Result;
use crate::store::DataStore;
use crate::validation::{FieldRule, Rule, ValidationErrors};
use serde::{Deserialize, Serialize};

pub const DELETED_REVIEW_TEXT: &str = "[This review has been deleted]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub meta: Meta,
    pub listing_id: String,
    /// `None` once the author account is gone.
    #[serde(default)]
    pub author_id: Option<String>,
    pub text: String,
    /// `None` once the review is soft-deleted.
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Review {
    /// Detach the review from its author, keeping text and rating.
    pub fn anonymize(&mut self) {
        self.author_id = None;
    }

    pub fn is_anonymous(&self) -> bool {
        self.author_id.is_none()
    }
}

impl Entity for Review {
    const KIND: EntityKind = EntityKind::Review;

    const RULES: &'static [FieldRule] = &[
        FieldRule::reference("listing_id", EntityKind::Listing).required(),
        FieldRule::reference("author_id", EntityKind::Account).required(),
        FieldRule::string("text").required().trim().length(10, 2000),
        FieldRule::integer("rating").required().range(1.0, 5.0),
    ];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Review(self)
    }

    fn mark_deleted(&mut self) {
        self.rating = None;
        self.text = DELETED_REVIEW_TEXT.to_string();
        self.meta.is_deleted = true;
    }

    /// Nobody reviews their own listing.
    fn prepare<S: DataStore>(
        ctx: &Context<'_, S>,
        fields: &mut FieldMap,
        current: Option<&Self>,
    ) -> Result<()> {
        if current.is_some() && !fields.contains_key("listing_id") && !fields.contains_key("author_id") {
            return Ok(());
        }
        let listing_id = fields
            .get("listing_id")
            .and_then(|v| v.as_str())
            .or(current.map(|r| r.listing_id.as_str()));
        let author_id = fields
            .get("author_id")
            .and_then(|v| v.as_str())
            .or(current.and_then(|r| r.author_id.as_deref()));

        if let (Some(listing_id), Some(author_id)) = (listing_id, author_id) {
            if let Some(listing) = ctx.store.get::<Listing>(listing_id)? {
                if listing.owner_id == author_id {
                    return ValidationErrors::single(
                        "author_id",
                        Rule::SelfReview,
                        "Cannot review your own listing",
                    )
                    .into_result();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review() -> Review {
        Review {
            meta: Meta::new(),
            listing_id: "l1".into(),
            author_id: Some("a1".into()),
            text: "Great place to stay".into(),
            rating: Some(4),
        }
    }

    #[test]
    fn soft_delete_clears_rating_and_text() {
        let mut r = review();
        r.mark_deleted();
        assert_eq!(r.rating, None);
        assert_eq!(r.text, DELETED_REVIEW_TEXT);
        assert!(r.meta.is_deleted);
        assert_eq!(r.author_id.as_deref(), Some("a1"));
    }

    #[test]
    fn anonymize_keeps_content() {
        let mut r = review();
        r.anonymize();
        assert!(r.is_anonymous());
        assert_eq!(r.rating, Some(4));
        assert_eq!(r.text, "Great place to stay");
    }

    #[test]
    fn anonymized_review_round_trips_null_author() {
        let mut r = review();
        r.anonymize();
        let json = serde_json::to_value(&r).unwrap();
        assert!(json["author_id"].is_null());
        let back: Review = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
