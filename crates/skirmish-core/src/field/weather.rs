//! Weather.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Kinds of weather.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum WeatherKind {
    Sun,
    Rain,
    Sandstorm,
    Hail,
}

impl WeatherKind {
    /// Multiplier applied to damage of moves of `element`.
    #[must_use]
    pub const fn damage_multiplier(self, element: Element) -> f64 {
        match (self, element) {
            (WeatherKind::Sun, Element::Fire) | (WeatherKind::Rain, Element::Water) => 1.5,
            (WeatherKind::Sun, Element::Water) | (WeatherKind::Rain, Element::Fire) => 0.5,
            _ => 1.0,
        }
    }

    /// Returns `true` if a combatant of `types` takes turn-end chip damage.
    #[must_use]
    pub fn chips(self, types: &[Element]) -> bool {
        let immune: &[Element] = match self {
            WeatherKind::Sandstorm => &[Element::Rock, Element::Ground, Element::Steel],
            WeatherKind::Hail => &[Element::Ice],
            WeatherKind::Sun | WeatherKind::Rain => return false,
        };
        !types.iter().any(|t| immune.contains(t))
    }

    /// Message shown when the weather starts.
    #[must_use]
    pub const fn start_message(self) -> &'static str {
        match self {
            WeatherKind::Sun => "The sunlight turned harsh!",
            WeatherKind::Rain => "It started to rain!",
            WeatherKind::Sandstorm => "A sandstorm kicked up!",
            WeatherKind::Hail => "It started to hail!",
        }
    }

    /// Message shown when the weather ends.
    #[must_use]
    pub const fn end_message(self) -> &'static str {
        match self {
            WeatherKind::Sun => "The sunlight faded.",
            WeatherKind::Rain => "The rain stopped.",
            WeatherKind::Sandstorm => "The sandstorm subsided.",
            WeatherKind::Hail => "The hail stopped.",
        }
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherKind::Sun => "sun",
            WeatherKind::Rain => "rain",
            WeatherKind::Sandstorm => "sandstorm",
            WeatherKind::Hail => "hail",
        };
        f.write_str(name)
    }
}

/// Active weather with its remaining duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    /// Weather kind.
    pub kind: WeatherKind,
    /// Remaining turns.
    pub turns_left: u32,
}

impl Weather {
    /// Turns weather lasts when set by a move.
    pub const DEFAULT_TURNS: u32 = 5;

    /// Creates weather with the default duration.
    #[must_use]
    pub const fn new(kind: WeatherKind) -> Self {
        Self {
            kind,
            turns_left: Self::DEFAULT_TURNS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandstorm_spares_rock_ground_steel() {
        assert!(!WeatherKind::Sandstorm.chips(&[Element::Rock]));
        assert!(!WeatherKind::Sandstorm.chips(&[Element::Water, Element::Steel]));
        assert!(WeatherKind::Sandstorm.chips(&[Element::Water]));
        assert!(!WeatherKind::Rain.chips(&[Element::Fire]));
    }

    #[test]
    fn rain_boosts_water_and_weakens_fire() {
        assert_eq!(WeatherKind::Rain.damage_multiplier(Element::Water), 1.5);
        assert_eq!(WeatherKind::Rain.damage_multiplier(Element::Fire), 0.5);
        assert_eq!(WeatherKind::Rain.damage_multiplier(Element::Grass), 1.0);
    }
}
