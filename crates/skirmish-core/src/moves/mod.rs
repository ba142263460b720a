//! Moves: static move data plus move attribute fragments.
//!
//! A [`Move`] is immutable catalog data shared behind an `Arc`. Its behavior
//! beyond the damage formula lives in its [`MoveAttr`] list: secondary
//! effects with their triggers and scoping, accuracy rewrites, multi-hit
//! counts and two-turn charges. [`dispatch`] applies them.
//!
//! # Example
//!
//! ```
//! use skirmish_core::element::Element;
//! use skirmish_core::moves::{
//!     Accuracy, Move, MoveAttr, MoveCategory, MoveEffect, MoveEffectAttr, MoveFlags,
//! };
//! use skirmish_core::combatant::StatusKind;
//!
//! let spark = Move::new("spark", "Spark", Element::Electric, MoveCategory::Physical)
//!     .with_power(65)
//!     .with_accuracy(Accuracy::Percent(100))
//!     .with_flags(MoveFlags::MAKES_CONTACT)
//!     .with_chance(30)
//!     .with_attr(MoveAttr::Effect(MoveEffectAttr::on_target(MoveEffect::Status(
//!         StatusKind::Paralysis,
//!     ))));
//!
//! assert!(spark.makes_contact());
//! assert_eq!(spark.chance(), Some(30));
//! assert_eq!(spark.effect_attrs().count(), 1);
//! ```

mod attrs;
pub mod dispatch;

pub use attrs::{
    EffectApplication, EffectAttr, EffectScope, EffectTrigger, HitFlags, MoveAttr, MoveAttrKind,
    MoveEffect, MoveEffectAttr, MultiHitKind, VariableAccuracyAttr,
};

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Catalog identifier of a move.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(String);

impl MoveId {
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

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MoveId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Damage class of a move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCategory {
    /// Attack against Defense.
    Physical,
    /// Sp. Atk against Sp. Def.
    Special,
    /// No damage.
    Status,
}

/// Who a move is aimed at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveTarget {
    /// The user only.
    User,
    /// One chosen combatant other than the user.
    NearOther,
    /// One chosen opponent.
    NearEnemy,
    /// One random opponent.
    RandomNearEnemy,
    /// Every active opponent.
    AllNearEnemies,
    /// Every other active combatant.
    AllNearOthers,
    /// One ally.
    NearAlly,
    /// The user's side of the field.
    UserSide,
    /// The opposing side of the field.
    EnemySide,
    /// The whole field.
    BothSides,
}

impl MoveTarget {
    /// Returns `true` for moves aimed at several combatants at once.
    #[must_use]
    pub const fn is_spread(self) -> bool {
        matches!(self, MoveTarget::AllNearEnemies | MoveTarget::AllNearOthers)
    }

    /// Returns `true` for moves aimed at a side of the field rather than a combatant.
    #[must_use]
    pub const fn is_field(self) -> bool {
        matches!(
            self,
            MoveTarget::UserSide | MoveTarget::EnemySide | MoveTarget::BothSides
        )
    }

    /// Returns `true` for moves that resolve on the user without a hit check.
    #[must_use]
    pub const fn skips_hit_check(self) -> bool {
        matches!(self, MoveTarget::User) || self.is_field()
    }
}

bitflags! {
    /// Properties of a move that other rules react to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MoveFlags: u16 {
        /// Physical contact with the target.
        const MAKES_CONTACT = 1 << 0;
        /// Goes through protection.
        const IGNORE_PROTECT = 1 << 1;
        /// Sound-based.
        const SOUND_BASED = 1 << 2;
        /// Ball or bomb.
        const BALLISTIC = 1 << 3;
        /// Each strike of a multi-hit move rolls accuracy.
        const CHECK_ALL_HITS = 1 << 4;
        /// Status move that still respects type immunities.
        const RESPECT_TYPE_IMMUNITY = 1 << 5;
        /// Ignores ignorable abilities regardless of the user's ability.
        const IGNORE_ABILITIES = 1 << 6;
        /// Raised critical-hit ratio.
        const HIGH_CRIT = 1 << 7;
    }
}

/// Base accuracy of a move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    /// Never misses.
    Sure,
    /// Hits with this percent chance before modifiers.
    Percent(u32),
}

/// A precondition a move checks before it executes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCondition {
    /// Success chance divides by three for each consecutive successful protection.
    ProtectStreak,
    /// Only works on the user's first turn out.
    FirstTurnOnly,
    /// Fails at full HP.
    UserNotFullHp,
}

/// Static data of one move.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    id: MoveId,
    name: String,
    element: Element,
    category: MoveCategory,
    power: u32,
    accuracy: Accuracy,
    pp: u32,
    chance: Option<u32>,
    priority: i8,
    target: MoveTarget,
    flags: MoveFlags,
    attrs: Vec<MoveAttr>,
    conditions: Vec<MoveCondition>,
}

impl Move {
    /// Creates a move aimed at one other combatant with 100 accuracy and 10 PP.
    #[must_use]
    pub fn new(id: &str, name: &str, element: Element, category: MoveCategory) -> Self {
        Self {
            id: MoveId::new(id),
            name: name.to_string(),
            element,
            category,
            power: 0,
            accuracy: Accuracy::Percent(100),
            pp: 10,
            chance: None,
            priority: 0,
            target: MoveTarget::NearOther,
            flags: MoveFlags::empty(),
            attrs: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Sets base power.
    #[must_use]
    pub fn with_power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    /// Sets base accuracy.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Sets max PP.
    #[must_use]
    pub fn with_pp(mut self, pp: u32) -> Self {
        self.pp = pp;
        self
    }

    /// Sets the secondary effect chance in percent.
    #[must_use]
    pub fn with_chance(mut self, chance: u32) -> Self {
        self.chance = Some(chance);
        self
    }

    /// Sets priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the target.
    #[must_use]
    pub fn with_target(mut self, target: MoveTarget) -> Self {
        self.target = target;
        self
    }

    /// Adds flags.
    #[must_use]
    pub fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attr(mut self, attr: MoveAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Appends a precondition.
    #[must_use]
    pub fn with_condition(mut self, condition: MoveCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &MoveId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type.
    #[must_use]
    pub const fn element(&self) -> Element {
        self.element
    }

    /// Returns the damage class.
    #[must_use]
    pub const fn category(&self) -> MoveCategory {
        self.category
    }

    /// Returns `true` for status moves.
    #[must_use]
    pub fn is_status(&self) -> bool {
        self.category == MoveCategory::Status
    }

    /// Returns base power.
    #[must_use]
    pub const fn power(&self) -> u32 {
        self.power
    }

    /// Returns base accuracy.
    #[must_use]
    pub const fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Returns max PP.
    #[must_use]
    pub const fn pp(&self) -> u32 {
        self.pp
    }

    /// Returns the secondary effect chance; `None` means effects are guaranteed.
    #[must_use]
    pub const fn chance(&self) -> Option<u32> {
        self.chance
    }

    /// Returns priority.
    #[must_use]
    pub const fn priority(&self) -> i8 {
        self.priority
    }

    /// Returns the target.
    #[must_use]
    pub const fn target(&self) -> MoveTarget {
        self.target
    }

    /// Returns the flags.
    #[must_use]
    pub const fn flags(&self) -> MoveFlags {
        self.flags
    }

    /// Returns `true` if the move makes contact.
    #[must_use]
    pub const fn makes_contact(&self) -> bool {
        self.flags.contains(MoveFlags::MAKES_CONTACT)
    }

    /// Returns every attribute in declaration order.
    #[must_use]
    pub fn attrs(&self) -> &[MoveAttr] {
        &self.attrs
    }

    /// Returns the preconditions.
    #[must_use]
    pub fn conditions(&self) -> &[MoveCondition] {
        &self.conditions
    }

    /// Returns `true` if any attribute belongs to `kind`.
    #[must_use]
    pub fn has_attr(&self, kind: MoveAttrKind) -> bool {
        self.attrs.iter().any(|a| a.kind() == kind)
    }

    /// Iterates effect attributes in declaration order.
    pub fn effect_attrs(&self) -> impl Iterator<Item = &MoveEffectAttr> {
        self.attrs.iter().filter_map(|a| match a {
            MoveAttr::Effect(effect) => Some(effect),
            _ => None,
        })
    }

    /// Returns `true` if the move raises a protection on its user.
    #[must_use]
    pub fn is_protection(&self) -> bool {
        self.effect_attrs()
            .any(|a| matches!(a.effect, MoveEffect::Protect(_)))
    }

    /// Returns `true` if the move pierces the given semi-invulnerable tag.
    #[must_use]
    pub fn hits_tag(&self, tag: crate::combatant::BattlerTagKind) -> bool {
        self.attrs
            .iter()
            .any(|a| matches!(a, MoveAttr::HitsTag { tag: t, .. } if *t == tag))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::BattlerTagKind;

    #[test]
    fn defaults_are_single_target_and_accurate() {
        let mv = Move::new("probe", "Probe", Element::Normal, MoveCategory::Physical);
        assert_eq!(mv.target(), MoveTarget::NearOther);
        assert_eq!(mv.accuracy(), Accuracy::Percent(100));
        assert_eq!(mv.chance(), None);
        assert!(!mv.makes_contact());
    }

    #[test]
    fn flags_accumulate() {
        let mv = Move::new("probe", "Probe", Element::Normal, MoveCategory::Physical)
            .with_flags(MoveFlags::MAKES_CONTACT)
            .with_flags(MoveFlags::IGNORE_PROTECT);
        assert!(mv.flags().contains(MoveFlags::MAKES_CONTACT | MoveFlags::IGNORE_PROTECT));
    }

    #[test]
    fn hits_tag_matches_only_named_tag() {
        let mv = Move::new("quake", "Quake", Element::Ground, MoveCategory::Physical).with_attr(
            MoveAttr::HitsTag {
                tag: BattlerTagKind::Underground,
                double_damage: true,
            },
        );
        assert!(mv.hits_tag(BattlerTagKind::Underground));
        assert!(!mv.hits_tag(BattlerTagKind::Flying));
    }

    #[test]
    fn field_targets_skip_hit_check() {
        assert!(MoveTarget::User.skips_hit_check());
        assert!(MoveTarget::BothSides.skips_hit_check());
        assert!(!MoveTarget::AllNearEnemies.skips_hit_check());
        assert!(MoveTarget::AllNearEnemies.is_spread());
    }
}
