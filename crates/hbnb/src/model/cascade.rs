//! Cascade plans.
//!
//! A cascade is an ordered list of actions, each naming the dependent kind,
//! the foreign key on that kind pointing back at the entity being removed, and
//! what to do with every match. Plans are plain data; `commands::cascade`
//! executes them.

use super::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeEffect {
    /// Remove the dependent, running its own hard-delete cascade first.
    HardDelete,
    /// Null the foreign key, keeping the dependent.
    Anonymize,
    /// Set the dependent's `is_active` flag.
    SetActive(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeAction {
    pub target: EntityKind,
    pub foreign_key: &'static str,
    pub effect: CascadeEffect,
}

impl CascadeAction {
    pub const fn new(target: EntityKind, foreign_key: &'static str, effect: CascadeEffect) -> Self {
        Self {
            target,
            foreign_key,
            effect,
        }
    }

    pub const fn hard_delete(target: EntityKind, foreign_key: &'static str) -> Self {
        Self::new(target, foreign_key, CascadeEffect::HardDelete)
    }

    pub const fn anonymize(target: EntityKind, foreign_key: &'static str) -> Self {
        Self::new(target, foreign_key, CascadeEffect::Anonymize)
    }

    pub const fn set_active(target: EntityKind, foreign_key: &'static str, active: bool) -> Self {
        Self::new(target, foreign_key, CascadeEffect::SetActive(active))
    }
}
