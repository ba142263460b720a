//! Arena tags: conditions attached to one side of the field or to both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, Side};
use crate::holder::{BoolHolder, NumberHolder};
use crate::moves::Move;

/// Which part of the field an arena tag covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaTagSide {
    /// The player's side.
    Player,
    /// The enemy's side.
    Enemy,
    /// The whole field.
    Both,
}

impl ArenaTagSide {
    /// Returns `true` if the tag applies to combatants on `side`.
    #[must_use]
    pub fn covers(self, side: Side) -> bool {
        match self {
            ArenaTagSide::Both => true,
            ArenaTagSide::Player => side == Side::Player,
            ArenaTagSide::Enemy => side == Side::Enemy,
        }
    }
}

impl From<Side> for ArenaTagSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => ArenaTagSide::Player,
            Side::Enemy => ArenaTagSide::Enemy,
        }
    }
}

/// Kinds of arena tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaTagKind {
    /// Blocks moves with raised priority aimed at the side.
    QuickGuard,
    /// Blocks spread moves aimed at the side.
    WideGuard,
    /// Blocks damaging moves aimed at the side.
    MatBlock,
    /// Blocks status moves aimed at the side, even ones that bypass protection.
    CraftyShield,
    /// Doubles secondary effect chances for the side's moves.
    Rainbow,
    /// Raises accuracy and grounds airborne combatants.
    Gravity,
}

impl ArenaTagKind {
    /// Turns a new tag of this kind lasts.
    #[must_use]
    pub const fn default_turns(self) -> u32 {
        match self {
            ArenaTagKind::QuickGuard
            | ArenaTagKind::WideGuard
            | ArenaTagKind::MatBlock
            | ArenaTagKind::CraftyShield => 1,
            ArenaTagKind::Rainbow => 4,
            ArenaTagKind::Gravity => 5,
        }
    }

    /// Returns `true` for the conditional protection kinds.
    #[must_use]
    pub const fn is_conditional_protection(self) -> bool {
        matches!(
            self,
            ArenaTagKind::QuickGuard
                | ArenaTagKind::WideGuard
                | ArenaTagKind::MatBlock
                | ArenaTagKind::CraftyShield
        )
    }

    /// Returns `true` if this protection also blocks moves that ignore protection.
    #[must_use]
    pub const fn ignores_bypass(self) -> bool {
        matches!(self, ArenaTagKind::CraftyShield)
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ArenaTagKind::QuickGuard => "Quick Guard",
            ArenaTagKind::WideGuard => "Wide Guard",
            ArenaTagKind::MatBlock => "Mat Block",
            ArenaTagKind::CraftyShield => "Crafty Shield",
            ArenaTagKind::Rainbow => "rainbow",
            ArenaTagKind::Gravity => "gravity",
        }
    }

    fn blocks(self, mv: &Move) -> bool {
        match self {
            ArenaTagKind::QuickGuard => mv.priority() > 0,
            ArenaTagKind::WideGuard => mv.target().is_spread(),
            ArenaTagKind::MatBlock => !mv.is_status(),
            ArenaTagKind::CraftyShield => mv.is_status() && !mv.target().is_field(),
            ArenaTagKind::Rainbow | ArenaTagKind::Gravity => false,
        }
    }
}

impl fmt::Display for ArenaTagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An arena tag instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaTag {
    /// Tag kind.
    pub kind: ArenaTagKind,
    /// Covered part of the field.
    pub side: ArenaTagSide,
    /// Remaining turns.
    pub turns_left: u32,
    /// Combatant that set it.
    pub source_id: Option<CombatantId>,
}

impl ArenaTag {
    /// Creates a tag with the kind's default duration.
    #[must_use]
    pub const fn new(kind: ArenaTagKind, side: ArenaTagSide) -> Self {
        Self {
            kind,
            side,
            turns_left: kind.default_turns(),
            source_id: None,
        }
    }

    /// Records who set the tag.
    #[must_use]
    pub const fn from_source(mut self, source: CombatantId) -> Self {
        self.source_id = Some(source);
        self
    }

    /// Applies a conditional protection against `mv`.
    ///
    /// Raises `protected` when the tag blocks the move, and raises
    /// `ignores_bypass` as well when the block cannot be bypassed. Returns
    /// `true` if the tag blocked the move.
    pub fn apply_conditional_protect(
        &self,
        mv: &Move,
        protected: &mut BoolHolder,
        ignores_bypass: &mut BoolHolder,
    ) -> bool {
        if protected.value || !self.kind.is_conditional_protection() || !self.kind.blocks(mv) {
            return false;
        }
        protected.set(true);
        ignores_bypass.raise(self.kind.ignores_bypass());
        true
    }

    /// Applies a secondary-effect chance modifier. Returns `true` if it fired.
    pub fn apply_chance_multiplier(&self, chance: &mut NumberHolder) -> bool {
        if self.kind != ArenaTagKind::Rainbow {
            return false;
        }
        chance.scale(2.0);
        true
    }

    /// Counts down one turn. Returns `true` while the tag stays up.
    pub fn lapse(&mut self) -> bool {
        self.turns_left = self.turns_left.saturating_sub(1);
        self.turns_left > 0
    }
}
