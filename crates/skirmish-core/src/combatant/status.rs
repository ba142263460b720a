//! Non-volatile status conditions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// A non-volatile status condition. A combatant holds at most one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum StatusKind {
    Burn,
    Paralysis,
    Poison,
    Toxic,
    Sleep,
    Freeze,
}

impl StatusKind {
    /// Returns the types that can never receive this status.
    #[must_use]
    pub const fn immune_types(self) -> &'static [Element] {
        match self {
            StatusKind::Burn => &[Element::Fire],
            StatusKind::Paralysis => &[Element::Electric],
            StatusKind::Poison | StatusKind::Toxic => &[Element::Poison, Element::Steel],
            StatusKind::Freeze => &[Element::Ice],
            StatusKind::Sleep => &[],
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StatusKind::Burn => "burn",
            StatusKind::Paralysis => "paralysis",
            StatusKind::Poison => "poison",
            StatusKind::Toxic => "bad poison",
            StatusKind::Sleep => "sleep",
            StatusKind::Freeze => "freeze",
        }
    }

    /// Returns the message shown when `name` receives this status.
    #[must_use]
    pub fn inflicted_message(self, name: &str) -> String {
        match self {
            StatusKind::Burn => format!("{name} was burned!"),
            StatusKind::Paralysis => format!("{name} is paralyzed! It may be unable to move!"),
            StatusKind::Poison => format!("{name} was poisoned!"),
            StatusKind::Toxic => format!("{name} was badly poisoned!"),
            StatusKind::Sleep => format!("{name} fell asleep!"),
            StatusKind::Freeze => format!("{name} was frozen solid!"),
        }
    }

    /// Returns the fraction of max HP lost at turn end, if this status chips.
    ///
    /// Toxic scales with its counter and is handled by [`StatusEffect::chip_fraction`].
    #[must_use]
    pub const fn chip_divisor(self) -> Option<u32> {
        match self {
            StatusKind::Burn => Some(16),
            StatusKind::Poison => Some(8),
            StatusKind::Toxic => Some(16),
            StatusKind::Paralysis | StatusKind::Sleep | StatusKind::Freeze => None,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A status condition with its counter.
///
/// The counter is the remaining sleep turns for [`StatusKind::Sleep`] and the
/// number of turns poisoned for [`StatusKind::Toxic`]; other kinds ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// The condition.
    pub kind: StatusKind,
    /// Kind-specific counter.
    pub turns: u32,
}

impl StatusEffect {
    /// Creates a status with a zero counter.
    #[must_use]
    pub const fn new(kind: StatusKind) -> Self {
        Self { kind, turns: 0 }
    }

    /// Creates a status with the given counter.
    #[must_use]
    pub const fn with_turns(kind: StatusKind, turns: u32) -> Self {
        Self { kind, turns }
    }

    /// Returns `(numerator, denominator)` of max HP lost at turn end.
    ///
    /// Advances the toxic counter as a side effect.
    pub fn chip_fraction(&mut self) -> Option<(u32, u32)> {
        let divisor = self.kind.chip_divisor()?;
        if self.kind == StatusKind::Toxic {
            self.turns = (self.turns + 1).min(15);
            Some((self.turns, divisor))
        } else {
            Some((1, divisor))
        }
    }
}
