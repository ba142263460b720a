//! Abilities: named bundles of ability attributes.
//!
//! An [`Ability`] owns an ordered list of [`AbilityAttr`]s. Each attribute is a
//! parameterized rule fragment that belongs to one capability category
//! ([`AbAttrKind`]); the dispatch functions in [`dispatch`] select a holder's
//! attributes by category and apply them in declaration order against shared
//! value holders.
//!
//! # Architecture
//!
//! Capability categories are traits ([`PreDefendAttr`], [`PostDefendAttr`],
//! [`PostSummonAttr`] and so on). Each concrete attribute is a small struct
//! implementing the traits of the categories it belongs to, and [`AbAttr`]
//! closes the set so abilities stay plain data that can be cloned, compared
//! and shared behind an `Arc`.
//!
//! # Example
//!
//! ```
//! use skirmish_core::ability::{AbAttr, AbAttrKind, Ability, AbilityAttr, TypeImmunity};
//! use skirmish_core::element::Element;
//!
//! let levitate = Ability::new("levitate", "Levitate")
//!     .ignorable()
//!     .with_attr(AbilityAttr::new(AbAttr::TypeImmunity(TypeImmunity::new(Element::Ground))));
//!
//! assert!(levitate.is_ignorable());
//! assert!(levitate.has_attr(AbAttrKind::TypeImmunity));
//! ```

mod attrs;
pub mod dispatch;

pub use attrs::{
    AbAttr, AbAttrKind, AbilityAttr, AttrCondition, BattlerTagImmunity, BlockStatusEffect,
    ContactDamage, ContactStatus, DefendArgs, EffectChanceAttr, FullHpResistType,
    IgnoreMoveEffects, IgnoreOpponentStatStages, IgnoreStagesAttr, MoveEffectChanceMultiplier,
    MoveImmunity, MovePowerAttr, MoveTypePowerBoost, PostDefendAttr, PostDefendStatStageChange,
    PostStatStageChangeAttr, PostStatStageChangeBoost, PostSummonAttr, PostSummonMessage,
    PostSummonStatStageChange, PreDefendAttr, PreStatStageChangeAttr, ProtectStat,
    ReceivedMoveDamageMultiplier, StatMultiplier, StatMultiplierAttr, StatusImmunityAttr,
    TagImmunityAttr, TypeImmunity, TypeImmunityAddTag, TypeImmunityHeal,
    TypeImmunityStatStageChange, WonderSkin,
};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog identifier of an ability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(String);

impl AbilityId {
    /// Creates an id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named list of ability attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    id: AbilityId,
    name: String,
    attrs: Vec<AbilityAttr>,
    ignorable: bool,
}

impl Ability {
    /// Creates an ability with no attributes.
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: AbilityId::new(id),
            name: name.to_string(),
            attrs: Vec::new(),
            ignorable: false,
        }
    }

    /// The empty ability.
    #[must_use]
    pub fn none() -> Self {
        Self::new("none", "No Ability")
    }

    /// Marks the ability as ignorable by ability-bypassing moves.
    #[must_use]
    pub fn ignorable(mut self) -> Self {
        self.ignorable = true;
        self
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attr(mut self, attr: AbilityAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &AbilityId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attributes in declaration order.
    #[must_use]
    pub fn attrs(&self) -> &[AbilityAttr] {
        &self.attrs
    }

    /// Returns `true` if ability-bypassing moves ignore it.
    #[must_use]
    pub const fn is_ignorable(&self) -> bool {
        self.ignorable
    }

    /// Returns `true` if any attribute belongs to `kind`.
    #[must_use]
    pub fn has_attr(&self, kind: AbAttrKind) -> bool {
        self.attrs.iter().any(|a| a.kind() == kind)
    }
}
