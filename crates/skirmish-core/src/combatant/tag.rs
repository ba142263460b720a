//! Volatile battler tags.
//!
//! A tag is a temporary condition attached to one combatant (protection,
//! confusion, a semi-invulnerable charge). Tags lapse on the triggers their
//! kind subscribes to; a turn-limited tag loses one turn per lapse and is
//! removed when it reaches zero. A `turns_left` of zero means the tag lasts
//! until something removes it explicitly.

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::element::Element;
use crate::moves::{Move, MoveId};

/// When a tag is asked to lapse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LapseTrigger {
    /// Before the holder executes a move.
    PreMove,
    /// After the holder's move finishes.
    AfterMove,
    /// At the end of every turn.
    TurnEnd,
    /// A kind-specific event, such as a protection blocking a hit.
    Custom,
}

/// What a protection tag blocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProtectionScope {
    /// Every move aimed at the holder.
    All,
    /// Only damaging moves.
    Damaging,
}

impl ProtectionScope {
    /// Returns `true` if a protection of this scope stops `mv`.
    #[must_use]
    pub fn covers(self, mv: &Move) -> bool {
        match self {
            ProtectionScope::All => true,
            ProtectionScope::Damaging => !mv.is_status(),
        }
    }
}

/// Kinds of volatile tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlerTagKind {
    /// Hits itself instead of moving one time in three.
    Confused,
    /// Cannot move this turn.
    Flinched,
    /// Blocks every move aimed at the holder this turn.
    Protected,
    /// Blocks every move and hurts contact attackers.
    SpikyShield,
    /// Blocks damaging moves and lowers a contact attacker's Attack.
    KingsShield,
    /// Semi-invulnerable in the air.
    Flying,
    /// Semi-invulnerable underground.
    Underground,
    /// Semi-invulnerable underwater.
    Underwater,
    /// Inside an ally; every move aimed at it misses.
    Commanding,
    /// The holder's next move cannot miss the recorded target.
    LockOn,
    /// Every move aimed at the holder connects.
    AlwaysGetHit,
    /// Lifted: immune to Ground moves and easy to hit.
    Telekinesis,
    /// Evasion boosts are ignored and Ghost loses its Normal/Fighting immunity.
    Exposed,
    /// Fire moves are powered up after absorbing one.
    FlashFire,
    /// Ability is suppressed.
    AbilitySuppressed,
    /// Storing energy for a two-turn move.
    Charging,
}

impl BattlerTagKind {
    /// Triggers this kind lapses on.
    #[must_use]
    pub const fn lapse_triggers(self) -> &'static [LapseTrigger] {
        match self {
            BattlerTagKind::Confused => &[LapseTrigger::PreMove],
            BattlerTagKind::Flinched => &[LapseTrigger::PreMove, LapseTrigger::TurnEnd],
            BattlerTagKind::Protected | BattlerTagKind::SpikyShield | BattlerTagKind::KingsShield => {
                &[LapseTrigger::Custom, LapseTrigger::TurnEnd]
            }
            BattlerTagKind::LockOn | BattlerTagKind::AlwaysGetHit => &[LapseTrigger::AfterMove],
            BattlerTagKind::Telekinesis => &[LapseTrigger::TurnEnd],
            BattlerTagKind::Flying
            | BattlerTagKind::Underground
            | BattlerTagKind::Underwater
            | BattlerTagKind::Charging
            | BattlerTagKind::Commanding
            | BattlerTagKind::Exposed
            | BattlerTagKind::FlashFire
            | BattlerTagKind::AbilitySuppressed => &[],
        }
    }

    /// Turns a freshly added tag lasts when the adder does not say otherwise.
    #[must_use]
    pub const fn default_turns(self) -> u32 {
        match self {
            BattlerTagKind::Flinched
            | BattlerTagKind::Protected
            | BattlerTagKind::SpikyShield
            | BattlerTagKind::KingsShield => 1,
            BattlerTagKind::LockOn | BattlerTagKind::AlwaysGetHit => 2,
            BattlerTagKind::Telekinesis => 3,
            BattlerTagKind::Confused => 4,
            _ => 0,
        }
    }

    /// Returns `true` for the semi-invulnerable charge states.
    #[must_use]
    pub const fn is_semi_invulnerable(self) -> bool {
        matches!(
            self,
            BattlerTagKind::Flying | BattlerTagKind::Underground | BattlerTagKind::Underwater
        )
    }

    /// Returns what this tag blocks if it is a protection.
    #[must_use]
    pub const fn protection_scope(self) -> Option<ProtectionScope> {
        match self {
            BattlerTagKind::Protected | BattlerTagKind::SpikyShield => Some(ProtectionScope::All),
            BattlerTagKind::KingsShield => Some(ProtectionScope::Damaging),
            _ => None,
        }
    }

    /// Returns the attack type this tag makes the holder immune to.
    #[must_use]
    pub const fn immune_type(self) -> Option<Element> {
        match self {
            BattlerTagKind::Telekinesis => Some(Element::Ground),
            _ => None,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BattlerTagKind::Confused => "confusion",
            BattlerTagKind::Flinched => "flinch",
            BattlerTagKind::Protected => "protection",
            BattlerTagKind::SpikyShield => "Spiky Shield",
            BattlerTagKind::KingsShield => "King's Shield",
            BattlerTagKind::Flying => "flight",
            BattlerTagKind::Underground => "digging",
            BattlerTagKind::Underwater => "diving",
            BattlerTagKind::Commanding => "commanding",
            BattlerTagKind::LockOn => "Lock-On",
            BattlerTagKind::AlwaysGetHit => "exposure",
            BattlerTagKind::Telekinesis => "Telekinesis",
            BattlerTagKind::Exposed => "identification",
            BattlerTagKind::FlashFire => "Flash Fire",
            BattlerTagKind::AbilitySuppressed => "ability suppression",
            BattlerTagKind::Charging => "charge",
        }
    }

    /// Returns the message shown when `name` gains this tag, if any.
    #[must_use]
    pub fn added_message(self, name: &str) -> Option<String> {
        match self {
            BattlerTagKind::Confused => Some(format!("{name} became confused!")),
            BattlerTagKind::Protected | BattlerTagKind::SpikyShield | BattlerTagKind::KingsShield => {
                Some(format!("{name} protected itself!"))
            }
            BattlerTagKind::Telekinesis => Some(format!("{name} was hurled into the air!")),
            BattlerTagKind::Exposed => Some(format!("{name} was identified!")),
            BattlerTagKind::AbilitySuppressed => Some(format!("{name}'s ability was suppressed!")),
            BattlerTagKind::FlashFire => Some(format!("The power of {name}'s Fire-type moves rose!")),
            _ => None,
        }
    }

    /// Returns the message shown when the tag expires on `name`, if any.
    #[must_use]
    pub fn removed_message(self, name: &str) -> Option<String> {
        match self {
            BattlerTagKind::Confused => Some(format!("{name} snapped out of confusion!")),
            BattlerTagKind::Telekinesis => Some(format!("{name} was freed from the telekinesis!")),
            _ => None,
        }
    }
}

/// A tag instance attached to a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlerTag {
    /// Tag kind.
    pub kind: BattlerTagKind,
    /// Remaining turns; 0 lasts until removed.
    pub turns_left: u32,
    /// Move that created the tag.
    pub source_move: Option<MoveId>,
    /// Combatant that created the tag.
    pub source_id: Option<CombatantId>,
    /// Combatant the tag refers to (the locked-on target, the charge target).
    pub target: Option<CombatantId>,
}

impl BattlerTag {
    /// Creates a tag with the kind's default duration.
    #[must_use]
    pub const fn new(kind: BattlerTagKind) -> Self {
        Self {
            kind,
            turns_left: kind.default_turns(),
            source_move: None,
            source_id: None,
            target: None,
        }
    }

    /// Sets the duration.
    #[must_use]
    pub const fn with_turns(mut self, turns: u32) -> Self {
        self.turns_left = turns;
        self
    }

    /// Records the move and combatant that created the tag.
    #[must_use]
    pub fn from_source(mut self, move_id: MoveId, source: CombatantId) -> Self {
        self.source_move = Some(move_id);
        self.source_id = Some(source);
        self
    }

    /// Records the combatant the tag refers to.
    #[must_use]
    pub const fn targeting(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }

    /// Lapses the tag on `trigger`.
    ///
    /// Returns `true` if the tag should stay attached. `Custom` lapses never
    /// remove a tag; the caller reacts to them instead.
    pub fn lapse(&mut self, trigger: LapseTrigger) -> bool {
        if trigger == LapseTrigger::Custom || !self.kind.lapse_triggers().contains(&trigger) {
            return true;
        }
        if self.turns_left == 0 {
            return true;
        }
        self.turns_left -= 1;
        self.turns_left > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protection_expires_at_turn_end() {
        let mut tag = BattlerTag::new(BattlerTagKind::Protected);
        assert!(tag.lapse(LapseTrigger::Custom));
        assert!(tag.lapse(LapseTrigger::PreMove));
        assert!(!tag.lapse(LapseTrigger::TurnEnd));
    }

    #[test]
    fn lock_on_survives_one_move() {
        let mut tag = BattlerTag::new(BattlerTagKind::LockOn);
        assert!(tag.lapse(LapseTrigger::AfterMove));
        assert!(!tag.lapse(LapseTrigger::AfterMove));
    }

    #[test]
    fn indefinite_tags_never_lapse() {
        let mut tag = BattlerTag::new(BattlerTagKind::Underground);
        for trigger in [LapseTrigger::PreMove, LapseTrigger::AfterMove, LapseTrigger::TurnEnd] {
            assert!(tag.lapse(trigger));
        }
    }

    #[test]
    fn unsubscribed_triggers_are_ignored() {
        let mut tag = BattlerTag::new(BattlerTagKind::Telekinesis).with_turns(1);
        assert!(tag.lapse(LapseTrigger::AfterMove));
        assert!(!tag.lapse(LapseTrigger::TurnEnd));
    }

    #[test]
    fn kings_shield_only_blocks_damage() {
        assert_eq!(
            BattlerTagKind::KingsShield.protection_scope(),
            Some(ProtectionScope::Damaging)
        );
        assert_eq!(BattlerTagKind::Protected.protection_scope(), Some(ProtectionScope::All));
        assert_eq!(BattlerTagKind::Confused.protection_scope(), None);
    }
}
