//! The battle field: combatants, slots, arena tags and weather.
//!
//! The Field is the container for all combatants in a battle. It provides:
//! - Combatant storage with deterministic iteration order (`BTreeMap`)
//! - Slot placement (who is active on each side)
//! - The single entry points for HP changes ([`Field::apply_damage`], [`Field::heal`])
//! - Field-wide conditions: arena tags, weather and the ability-bypass marker
//!
//! # Architecture
//!
//! Combatant ids are monotonically increasing and the `BTreeMap`'s natural
//! ordering gives every scan (active combatants, benches, tag lapses) the same
//! order on every run. Active lists are ordered player side first, then by
//! slot.
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::{CombatantTemplate, Side};
//! use skirmish_core::field::Field;
//!
//! let mut field = Field::new(1);
//! let hero = field.spawn(CombatantTemplate::new("Hero", Side::Player, 50));
//! let foe = field.spawn(CombatantTemplate::new("Foe", Side::Enemy, 50));
//! assert!(field.summon(hero, 0));
//! assert!(field.summon(foe, 0));
//!
//! assert_eq!(field.opponents_of(hero), vec![foe]);
//! field.apply_damage(foe, 10);
//! assert!(!field.get(foe).unwrap().is_full_hp());
//! ```

mod arena_tag;
mod weather;

pub use arena_tag::{ArenaTag, ArenaTagKind, ArenaTagSide};
pub use weather::{Weather, WeatherKind};

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::ability::Ability;
use crate::combatant::{BattlerTagKind, Combatant, CombatantId, CombatantTemplate, Side};

/// Combatants and field-wide conditions.
#[derive(Debug, Clone)]
pub struct Field {
    next_id: u64,
    combatants: BTreeMap<CombatantId, Combatant>,
    active_per_side: usize,
    arena_tags: Vec<ArenaTag>,
    weather: Option<Weather>,
    ignore_abilities: Option<CombatantId>,
}

impl Field {
    /// Creates an empty field with the given number of slots per side.
    #[must_use]
    pub fn new(active_per_side: usize) -> Self {
        Self {
            next_id: 1,
            combatants: BTreeMap::new(),
            active_per_side: active_per_side.max(1),
            arena_tags: Vec::new(),
            weather: None,
            ignore_abilities: None,
        }
    }

    /// Returns the number of slots per side.
    #[must_use]
    pub const fn active_per_side(&self) -> usize {
        self.active_per_side
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Adds a combatant (benched) and returns its id.
    pub fn spawn(&mut self, template: CombatantTemplate) -> CombatantId {
        let id = CombatantId::new(self.next_id);
        self.next_id += 1;
        trace!(%id, name = %template.name, side = %template.side, "spawned combatant");
        self.combatants.insert(id, Combatant::from_template(id, template));
        id
    }

    /// Returns a combatant.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Returns a combatant mutably.
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// Returns `true` if the id names a combatant.
    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.combatants.contains_key(&id)
    }

    /// Iterates every combatant in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    /// Returns a combatant's name, or `"?"` for unknown ids.
    #[must_use]
    pub fn name_of(&self, id: CombatantId) -> String {
        self.get(id).map_or_else(|| "?".to_string(), |c| c.name().to_string())
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Places a benched, conscious combatant into a free slot on its side.
    ///
    /// Returns `false` if the combatant is unknown, fainted, already out, or
    /// the slot is out of range or taken.
    pub fn summon(&mut self, id: CombatantId, slot: usize) -> bool {
        let Some(side) = self.get(id).map(Combatant::side) else {
            return false;
        };
        if slot >= self.active_per_side || self.occupant(side, slot).is_some() {
            return false;
        }
        match self.combatants.get_mut(&id) {
            Some(c) if !c.is_fainted() && !c.is_on_field() => {
                c.place(slot);
                true
            }
            _ => false,
        }
    }

    /// Removes a combatant from its slot and clears its volatile state.
    pub fn withdraw(&mut self, id: CombatantId) {
        if let Some(c) = self.combatants.get_mut(&id) {
            c.withdraw();
        }
    }

    /// Returns the combatant in a slot.
    #[must_use]
    pub fn occupant(&self, side: Side, slot: usize) -> Option<CombatantId> {
        self.combatants
            .values()
            .find(|c| c.side() == side && c.slot() == Some(slot))
            .map(Combatant::id)
    }

    /// Returns `true` if the combatant is out and conscious.
    #[must_use]
    pub fn is_active(&self, id: CombatantId) -> bool {
        self.get(id).is_some_and(|c| c.is_on_field() && !c.is_fainted())
    }

    /// Returns the active combatants on one side, in slot order.
    #[must_use]
    pub fn active(&self, side: Side) -> Vec<CombatantId> {
        let mut out: Vec<&Combatant> = self
            .combatants
            .values()
            .filter(|c| c.side() == side && c.is_on_field() && !c.is_fainted())
            .collect();
        out.sort_by_key(|c| c.slot());
        out.into_iter().map(Combatant::id).collect()
    }

    /// Returns every active combatant, player side first.
    #[must_use]
    pub fn all_active(&self) -> Vec<CombatantId> {
        let mut out = self.active(Side::Player);
        out.extend(self.active(Side::Enemy));
        out
    }

    /// Returns the active opponents of a combatant.
    #[must_use]
    pub fn opponents_of(&self, id: CombatantId) -> Vec<CombatantId> {
        self.get(id)
            .map(|c| self.active(c.side().opposite()))
            .unwrap_or_default()
    }

    /// Returns the active allies of a combatant, excluding itself.
    #[must_use]
    pub fn allies_of(&self, id: CombatantId) -> Vec<CombatantId> {
        self.get(id)
            .map(|c| {
                self.active(c.side())
                    .into_iter()
                    .filter(|&other| other != id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the conscious benched combatants on one side, in id order.
    #[must_use]
    pub fn bench(&self, side: Side) -> Vec<CombatantId> {
        self.combatants
            .values()
            .filter(|c| c.side() == side && !c.is_on_field() && !c.is_fainted())
            .map(Combatant::id)
            .collect()
    }

    /// Returns how many conscious combatants a side has left.
    #[must_use]
    pub fn remaining(&self, side: Side) -> usize {
        self.combatants
            .values()
            .filter(|c| c.side() == side && !c.is_fainted())
            .count()
    }

    /// Returns how many combatants a side started with.
    #[must_use]
    pub fn roster_size(&self, side: Side) -> usize {
        self.combatants.values().filter(|c| c.side() == side).count()
    }

    // =========================================================================
    // HP
    // =========================================================================

    /// Removes HP from a combatant. Returns the amount actually removed.
    pub fn apply_damage(&mut self, id: CombatantId, amount: u32) -> u32 {
        let Some(c) = self.combatants.get_mut(&id) else {
            return 0;
        };
        let dealt = c.take_damage(amount);
        c.turn_data_mut().damage_taken += dealt;
        trace!(%id, dealt, hp = c.hp(), "damage applied");
        dealt
    }

    /// Restores HP to a combatant. Returns the amount actually restored.
    pub fn heal(&mut self, id: CombatantId, amount: u32) -> u32 {
        self.combatants
            .get_mut(&id)
            .filter(|c| !c.is_fainted())
            .map_or(0, |c| c.restore_hp(amount))
    }

    // =========================================================================
    // Abilities
    // =========================================================================

    /// Marks a combatant whose move ignores other combatants' ignorable abilities.
    pub fn set_ignore_abilities(&mut self, source: Option<CombatantId>) {
        self.ignore_abilities = source;
    }

    /// Returns the combatant currently ignoring abilities.
    #[must_use]
    pub const fn ignore_abilities(&self) -> Option<CombatantId> {
        self.ignore_abilities
    }

    /// Returns the holder's ability if it can currently take effect.
    ///
    /// An ability is inert while its holder has fainted or is suppressed,
    /// and an ignorable ability is inert while another combatant is marked
    /// as ignoring abilities.
    #[must_use]
    pub fn active_ability(&self, holder: CombatantId) -> Option<Arc<Ability>> {
        let c = self.get(holder)?;
        if c.is_fainted() || c.has_tag(BattlerTagKind::AbilitySuppressed) {
            return None;
        }
        let ability = c.ability();
        if ability.is_ignorable() && self.ignore_abilities.is_some_and(|source| source != holder) {
            return None;
        }
        Some(Arc::clone(ability))
    }

    // =========================================================================
    // Arena tags
    // =========================================================================

    /// Adds an arena tag. Returns `false` if one of the same kind already covers that side.
    pub fn add_arena_tag(&mut self, tag: ArenaTag) -> bool {
        if self.arena_tag(tag.kind, tag.side).is_some() {
            return false;
        }
        self.arena_tags.push(tag);
        true
    }

    /// Returns the tag of a kind set for exactly `side`.
    #[must_use]
    pub fn arena_tag(&self, kind: ArenaTagKind, side: ArenaTagSide) -> Option<&ArenaTag> {
        self.arena_tags
            .iter()
            .find(|t| t.kind == kind && t.side == side)
    }

    /// Returns `true` if a tag of `kind` covers `side` (directly or field-wide).
    #[must_use]
    pub fn has_arena_tag_covering(&self, kind: ArenaTagKind, side: Side) -> bool {
        self.arena_tags_covering(side).any(|t| t.kind == kind)
    }

    /// Iterates tags covering `side`, in the order they were added.
    pub fn arena_tags_covering(&self, side: Side) -> impl Iterator<Item = &ArenaTag> {
        self.arena_tags.iter().filter(move |t| t.side.covers(side))
    }

    /// Returns every arena tag.
    #[must_use]
    pub fn arena_tags(&self) -> &[ArenaTag] {
        &self.arena_tags
    }

    /// Removes the tag of a kind set for exactly `side`.
    pub fn remove_arena_tag(&mut self, kind: ArenaTagKind, side: ArenaTagSide) -> Option<ArenaTag> {
        let index = self
            .arena_tags
            .iter()
            .position(|t| t.kind == kind && t.side == side)?;
        Some(self.arena_tags.remove(index))
    }

    /// Counts every arena tag down one turn and returns the ones that expired.
    pub fn lapse_arena_tags(&mut self) -> Vec<ArenaTag> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.arena_tags.len());
        for mut tag in self.arena_tags.drain(..) {
            if tag.lapse() {
                kept.push(tag);
            } else {
                expired.push(tag);
            }
        }
        self.arena_tags = kept;
        expired
    }

    // =========================================================================
    // Weather
    // =========================================================================

    /// Returns the active weather.
    #[must_use]
    pub const fn weather(&self) -> Option<Weather> {
        self.weather
    }

    /// Returns the active weather kind.
    #[must_use]
    pub fn weather_kind(&self) -> Option<WeatherKind> {
        self.weather.map(|w| w.kind)
    }

    /// Sets the weather. Returns `false` if that weather is already active.
    pub fn set_weather(&mut self, weather: Weather) -> bool {
        if self.weather_kind() == Some(weather.kind) {
            return false;
        }
        self.weather = Some(weather);
        true
    }

    /// Counts the weather down one turn and returns it if it just ended.
    pub fn lapse_weather(&mut self) -> Option<WeatherKind> {
        let weather = self.weather.as_mut()?;
        weather.turns_left = weather.turns_left.saturating_sub(1);
        if weather.turns_left > 0 {
            return None;
        }
        self.weather.take().map(|w| w.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubles_field() -> (Field, Vec<CombatantId>) {
        let mut field = Field::new(2);
        let ids = vec![
            field.spawn(CombatantTemplate::new("P1", Side::Player, 50)),
            field.spawn(CombatantTemplate::new("P2", Side::Player, 50)),
            field.spawn(CombatantTemplate::new("P3", Side::Player, 50)),
            field.spawn(CombatantTemplate::new("E1", Side::Enemy, 50)),
            field.spawn(CombatantTemplate::new("E2", Side::Enemy, 50)),
        ];
        assert!(field.summon(ids[0], 1));
        assert!(field.summon(ids[1], 0));
        assert!(field.summon(ids[3], 0));
        assert!(field.summon(ids[4], 1));
        (field, ids)
    }

    mod placement_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic() {
            let (_, ids) = doubles_field();
            let raw: Vec<u64> = ids.iter().map(|id| id.as_u64()).collect();
            assert_eq!(raw, vec![1, 2, 3, 4, 5]);
        }

        #[test]
        fn active_is_slot_ordered() {
            let (field, ids) = doubles_field();
            assert_eq!(field.active(Side::Player), vec![ids[1], ids[0]]);
            assert_eq!(field.all_active(), vec![ids[1], ids[0], ids[3], ids[4]]);
        }

        #[test]
        fn summon_rejects_taken_or_invalid_slots() {
            let (mut field, ids) = doubles_field();
            assert!(!field.summon(ids[2], 0));
            assert!(!field.summon(ids[2], 2));
            assert_eq!(field.bench(Side::Player), vec![ids[2]]);
        }

        #[test]
        fn allies_exclude_self() {
            let (field, ids) = doubles_field();
            assert_eq!(field.allies_of(ids[0]), vec![ids[1]]);
            assert_eq!(field.opponents_of(ids[0]), vec![ids[3], ids[4]]);
        }

        #[test]
        fn fainted_combatants_leave_active_lists() {
            let (mut field, ids) = doubles_field();
            field.apply_damage(ids[3], u32::MAX);
            assert!(!field.is_active(ids[3]));
            assert_eq!(field.active(Side::Enemy), vec![ids[4]]);
            assert_eq!(field.remaining(Side::Enemy), 1);
        }
    }

    mod hp_tests {
        use super::*;

        #[test]
        fn damage_is_recorded_in_turn_data() {
            let (mut field, ids) = doubles_field();
            let dealt = field.apply_damage(ids[0], 30);
            assert_eq!(dealt, 30);
            assert_eq!(field.get(ids[0]).unwrap().turn_data().damage_taken, 30);
        }

        #[test]
        fn fainted_combatants_cannot_be_healed() {
            let (mut field, ids) = doubles_field();
            field.apply_damage(ids[0], u32::MAX);
            assert_eq!(field.heal(ids[0], 50), 0);
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn duplicate_arena_tags_are_rejected() {
            let mut field = Field::new(1);
            let tag = ArenaTag::new(ArenaTagKind::WideGuard, ArenaTagSide::Player);
            assert!(field.add_arena_tag(tag.clone()));
            assert!(!field.add_arena_tag(tag));
            assert!(field.add_arena_tag(ArenaTag::new(ArenaTagKind::WideGuard, ArenaTagSide::Enemy)));
        }

        #[test]
        fn field_wide_tags_cover_both_sides() {
            let mut field = Field::new(1);
            field.add_arena_tag(ArenaTag::new(ArenaTagKind::Gravity, ArenaTagSide::Both));
            assert!(field.has_arena_tag_covering(ArenaTagKind::Gravity, Side::Player));
            assert!(field.has_arena_tag_covering(ArenaTagKind::Gravity, Side::Enemy));
        }

        #[test]
        fn arena_tags_expire() {
            let mut field = Field::new(1);
            field.add_arena_tag(ArenaTag::new(ArenaTagKind::QuickGuard, ArenaTagSide::Player));
            field.add_arena_tag(ArenaTag::new(ArenaTagKind::Gravity, ArenaTagSide::Both));
            let expired = field.lapse_arena_tags();
            assert_eq!(expired.len(), 1);
            assert_eq!(expired[0].kind, ArenaTagKind::QuickGuard);
            assert_eq!(field.arena_tags().len(), 1);
        }

        #[test]
        fn weather_counts_down() {
            let mut field = Field::new(1);
            assert!(field.set_weather(Weather {
                kind: WeatherKind::Rain,
                turns_left: 2
            }));
            assert!(!field.set_weather(Weather::new(WeatherKind::Rain)));
            assert_eq!(field.lapse_weather(), None);
            assert_eq!(field.lapse_weather(), Some(WeatherKind::Rain));
            assert_eq!(field.weather(), None);
        }
    }
}
