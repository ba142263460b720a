//! Elemental types and the type effectiveness chart.
//!
//! Each move has one [`Element`]; each combatant has one or two. The
//! effectiveness of a move against a combatant is the product of the chart
//! entries for every defending type.
//!
//! # Example
//!
//! ```
//! use skirmish_core::element::Element;
//!
//! assert_eq!(Element::Water.effectiveness_against(Element::Fire), 2.0);
//! assert_eq!(Element::Electric.effectiveness_against(Element::Ground), 0.0);
//! assert_eq!(
//!     Element::Ice.effectiveness_against_all(&[Element::Grass, Element::Flying]),
//!     4.0,
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the eighteen elemental types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Element {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

/// Chart row for one attacking type: `(doubled, halved, immune)`.
type ChartRow = (&'static [Element], &'static [Element], &'static [Element]);

impl Element {
    /// Every element, in chart order.
    pub const ALL: [Element; 18] = [
        Element::Normal,
        Element::Fire,
        Element::Water,
        Element::Electric,
        Element::Grass,
        Element::Ice,
        Element::Fighting,
        Element::Poison,
        Element::Ground,
        Element::Flying,
        Element::Psychic,
        Element::Bug,
        Element::Rock,
        Element::Ghost,
        Element::Dragon,
        Element::Dark,
        Element::Steel,
        Element::Fairy,
    ];

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Element::Normal => "Normal",
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Electric => "Electric",
            Element::Grass => "Grass",
            Element::Ice => "Ice",
            Element::Fighting => "Fighting",
            Element::Poison => "Poison",
            Element::Ground => "Ground",
            Element::Flying => "Flying",
            Element::Psychic => "Psychic",
            Element::Bug => "Bug",
            Element::Rock => "Rock",
            Element::Ghost => "Ghost",
            Element::Dragon => "Dragon",
            Element::Dark => "Dark",
            Element::Steel => "Steel",
            Element::Fairy => "Fairy",
        }
    }

    /// Returns the multiplier of an attack of this type against one defending type.
    #[must_use]
    pub fn effectiveness_against(self, defender: Element) -> f64 {
        let (doubled, halved, immune) = self.chart_row();
        if immune.contains(&defender) {
            0.0
        } else if doubled.contains(&defender) {
            2.0
        } else if halved.contains(&defender) {
            0.5
        } else {
            1.0
        }
    }

    /// Returns the product of the multipliers against every defending type.
    #[must_use]
    pub fn effectiveness_against_all(self, defenders: &[Element]) -> f64 {
        defenders
            .iter()
            .map(|&defender| self.effectiveness_against(defender))
            .product()
    }

    #[allow(clippy::enum_glob_use)]
    fn chart_row(self) -> ChartRow {
        use Element::*;
        match self {
            Normal => (&[], &[Rock, Steel], &[Ghost]),
            Fire => (&[Grass, Ice, Bug, Steel], &[Fire, Water, Rock, Dragon], &[]),
            Water => (&[Fire, Ground, Rock], &[Water, Grass, Dragon], &[]),
            Electric => (&[Water, Flying], &[Electric, Grass, Dragon], &[Ground]),
            Grass => (
                &[Water, Ground, Rock],
                &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
                &[],
            ),
            Ice => (&[Grass, Ground, Flying, Dragon], &[Fire, Water, Ice, Steel], &[]),
            Fighting => (
                &[Normal, Ice, Rock, Dark, Steel],
                &[Poison, Flying, Psychic, Bug, Fairy],
                &[Ghost],
            ),
            Poison => (&[Grass, Fairy], &[Poison, Ground, Rock, Ghost], &[Steel]),
            Ground => (
                &[Fire, Electric, Poison, Rock, Steel],
                &[Grass, Bug],
                &[Flying],
            ),
            Flying => (&[Grass, Fighting, Bug], &[Electric, Rock, Steel], &[]),
            Psychic => (&[Fighting, Poison], &[Psychic, Steel], &[Dark]),
            Bug => (
                &[Grass, Psychic, Dark],
                &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy],
                &[],
            ),
            Rock => (&[Fire, Ice, Flying, Bug], &[Fighting, Ground, Steel], &[]),
            Ghost => (&[Psychic, Ghost], &[Dark], &[Normal]),
            Dragon => (&[Dragon], &[Steel], &[Fairy]),
            Dark => (&[Psychic, Ghost], &[Fighting, Dark, Fairy], &[]),
            Steel => (&[Ice, Rock, Fairy], &[Fire, Water, Electric, Steel], &[]),
            Fairy => (&[Fighting, Dragon, Dark], &[Fire, Poison, Steel], &[]),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod chart_tests {
        use super::*;

        #[test]
        fn neutral_by_default() {
            assert_eq!(Element::Normal.effectiveness_against(Element::Normal), 1.0);
            assert_eq!(Element::Fire.effectiveness_against(Element::Electric), 1.0);
        }

        #[test]
        fn immunities() {
            assert_eq!(Element::Normal.effectiveness_against(Element::Ghost), 0.0);
            assert_eq!(Element::Ghost.effectiveness_against(Element::Normal), 0.0);
            assert_eq!(Element::Ground.effectiveness_against(Element::Flying), 0.0);
            assert_eq!(Element::Dragon.effectiveness_against(Element::Fairy), 0.0);
            assert_eq!(Element::Poison.effectiveness_against(Element::Steel), 0.0);
            assert_eq!(Element::Psychic.effectiveness_against(Element::Dark), 0.0);
        }

        #[test]
        fn dual_types_multiply() {
            assert_eq!(
                Element::Ground.effectiveness_against_all(&[Element::Fire, Element::Rock]),
                4.0
            );
            assert_eq!(
                Element::Grass.effectiveness_against_all(&[Element::Fire, Element::Flying]),
                0.25
            );
            assert_eq!(
                Element::Electric.effectiveness_against_all(&[Element::Water, Element::Ground]),
                0.0
            );
        }

        #[test]
        fn every_row_is_disjoint() {
            for attacker in Element::ALL {
                let (doubled, halved, immune) = attacker.chart_row();
                for defender in doubled {
                    assert!(!halved.contains(defender) && !immune.contains(defender));
                }
                for defender in halved {
                    assert!(!immune.contains(defender));
                }
            }
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Element::Psychic).unwrap();
        assert_eq!(json, "\"psychic\"");
        let back: Element = serde_json::from_str("\"steel\"").unwrap();
        assert_eq!(back, Element::Steel);
    }
}
