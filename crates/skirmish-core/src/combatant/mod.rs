//! Combatants and their battle state.
//!
//! This module provides the per-combatant state the engine reads and writes:
//! - [`CombatantId`]: Unique identifier, assigned by the [`Field`](crate::field::Field)
//! - [`Side`]: Which team a combatant fights for
//! - [`CombatantTemplate`]: Roster data a combatant is spawned from
//! - [`Combatant`]: Stats, stages, status, tags, moves and per-turn bookkeeping
//!
//! # Architecture
//!
//! A combatant is plain data. It never calls into dispatch or the scheduler;
//! phases and effect fragments read it through the field and write it back
//! through the field. HP only moves through [`Field::apply_damage`] and
//! [`Field::heal`] so the faint check has a single entry point.
//!
//! [`Field::apply_damage`]: crate::field::Field::apply_damage
//! [`Field::heal`]: crate::field::Field::heal
//!
//! # Example
//!
//! ```
//! use skirmish_core::catalog::Catalog;
//! use skirmish_core::combatant::{CombatantTemplate, Side};
//! use skirmish_core::element::Element;
//! use skirmish_core::field::Field;
//! use skirmish_core::stat::BaseStats;
//!
//! let catalog = Catalog::standard();
//! let template = CombatantTemplate::new("Sparkit", Side::Player, 50)
//!     .with_types(&[Element::Electric])
//!     .with_base(BaseStats::new(60, 55, 50, 90, 60, 110))
//!     .with_ability(catalog.ability("static").unwrap())
//!     .with_move(catalog.move_by_id("thunderbolt").unwrap());
//!
//! let mut field = Field::new(1);
//! let id = field.spawn(template);
//! let sparkit = field.get(id).unwrap();
//! assert!(sparkit.is_of_type(Element::Electric));
//! assert!(sparkit.is_full_hp());
//! ```

mod status;
mod tag;

pub use status::{StatusEffect, StatusKind};
pub use tag::{BattlerTag, BattlerTagKind, LapseTrigger, ProtectionScope};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::element::Element;
use crate::moves::{Move, MoveId};
use crate::stat::{stage_multiplier, BaseStats, BattleStat, Stat, StatBlock, StatStages};

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for a combatant.
///
/// Ids are assigned monotonically by the field and order combatants
/// deterministically wherever a tie needs breaking.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// The team a combatant fights for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The side a caller may control manually.
    Player,
    /// The side always driven by the command policy.
    Enemy,
}

impl Side {
    /// Both sides, player first.
    pub const BOTH: [Side; 2] = [Side::Player, Side::Enemy];

    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Enemy => f.write_str("enemy"),
        }
    }
}

// =============================================================================
// Moves and history
// =============================================================================

/// A known move and its remaining power points.
#[derive(Debug, Clone)]
pub struct MoveSlot {
    mv: Arc<Move>,
    pp: u32,
}

impl MoveSlot {
    /// Creates a slot with full PP.
    #[must_use]
    pub fn new(mv: Arc<Move>) -> Self {
        let pp = mv.pp();
        Self { mv, pp }
    }

    /// Returns the move.
    #[must_use]
    pub fn mv(&self) -> &Arc<Move> {
        &self.mv
    }

    /// Returns remaining PP.
    #[must_use]
    pub const fn pp(&self) -> u32 {
        self.pp
    }

    /// Returns `true` if the move can still be selected.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.pp > 0
    }

    /// Spends one PP. Returns `false` if none was left.
    pub fn spend_pp(&mut self) -> bool {
        if self.pp == 0 {
            return false;
        }
        self.pp -= 1;
        true
    }
}

/// How a move execution ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// At least one target was hit.
    Success,
    /// The move failed before any hit check.
    Fail,
    /// Every target avoided it.
    Miss,
    /// The user began charging.
    Charging,
}

/// One entry of a combatant's move history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Move used.
    pub move_id: MoveId,
    /// Targets resolved at execution time.
    pub targets: Vec<CombatantId>,
    /// How it ended.
    pub outcome: MoveOutcome,
    /// Turn it was used on.
    pub turn: u32,
}

/// Bookkeeping reset at the start of every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnData {
    /// The combatant has executed (or tried to execute) its move.
    pub acted: bool,
    /// Total strikes of the current multi-hit move.
    pub hit_count: u32,
    /// Strikes not yet delivered, including the one in progress.
    pub hits_left: u32,
    /// Damage this combatant dealt this turn.
    pub damage_dealt: u32,
    /// Damage this combatant took this turn.
    pub damage_taken: u32,
    /// Most recent combatant that damaged this one.
    pub last_attacker: Option<CombatantId>,
}

// =============================================================================
// Template
// =============================================================================

/// Roster data a combatant is spawned from.
#[derive(Debug, Clone)]
pub struct CombatantTemplate {
    /// Display name.
    pub name: String,
    /// Team.
    pub side: Side,
    /// Level (1-100).
    pub level: u32,
    /// One or two types.
    pub types: Vec<Element>,
    /// Species base stats.
    pub base: BaseStats,
    /// Ability.
    pub ability: Arc<Ability>,
    /// Known moves, in slot order.
    pub moves: Vec<Arc<Move>>,
}

impl CombatantTemplate {
    /// Creates a Normal-type template with flat base stats and no ability.
    #[must_use]
    pub fn new(name: impl Into<String>, side: Side, level: u32) -> Self {
        Self {
            name: name.into(),
            side,
            level,
            types: vec![Element::Normal],
            base: BaseStats::new(80, 80, 80, 80, 80, 80),
            ability: Arc::new(Ability::none()),
            moves: Vec::new(),
        }
    }

    /// Sets the types.
    #[must_use]
    pub fn with_types(mut self, types: &[Element]) -> Self {
        self.types = types.to_vec();
        self
    }

    /// Sets the base stats.
    #[must_use]
    pub fn with_base(mut self, base: BaseStats) -> Self {
        self.base = base;
        self
    }

    /// Sets the ability.
    #[must_use]
    pub fn with_ability(mut self, ability: Arc<Ability>) -> Self {
        self.ability = ability;
        self
    }

    /// Appends a move.
    #[must_use]
    pub fn with_move(mut self, mv: Arc<Move>) -> Self {
        self.moves.push(mv);
        self
    }
}

// =============================================================================
// Combatant
// =============================================================================

/// A combatant and its battle state.
#[derive(Debug, Clone)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    side: Side,
    level: u32,
    types: Vec<Element>,
    ability: Arc<Ability>,
    stats: StatBlock,
    hp: u32,
    stages: StatStages,
    status: Option<StatusEffect>,
    tags: Vec<BattlerTag>,
    moveset: Vec<MoveSlot>,
    history: Vec<MoveRecord>,
    turn_data: TurnData,
    slot: Option<usize>,
    turns_on_field: u32,
}

impl Combatant {
    /// Builds a combatant from a template.
    #[must_use]
    pub fn from_template(id: CombatantId, template: CombatantTemplate) -> Self {
        let stats = StatBlock::from_base(&template.base, template.level);
        Self {
            id,
            name: template.name,
            side: template.side,
            level: template.level,
            types: template.types,
            ability: template.ability,
            hp: stats.get(Stat::Hp),
            stats,
            stages: StatStages::default(),
            status: None,
            tags: Vec::new(),
            moveset: template.moves.into_iter().map(MoveSlot::new).collect(),
            history: Vec::new(),
            turn_data: TurnData::default(),
            slot: None,
            turns_on_field: 0,
        }
    }

    /// Returns the id.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the team.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Returns the level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Returns the types.
    #[must_use]
    pub fn types(&self) -> &[Element] {
        &self.types
    }

    /// Returns `true` if one of the combatant's types is `element`.
    #[must_use]
    pub fn is_of_type(&self, element: Element) -> bool {
        self.types.contains(&element)
    }

    /// Returns the ability.
    #[must_use]
    pub fn ability(&self) -> &Arc<Ability> {
        &self.ability
    }

    /// Returns a permanent stat.
    #[must_use]
    pub const fn stat(&self, stat: Stat) -> u32 {
        self.stats.get(stat)
    }

    /// Returns current HP.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Returns max HP.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.stats.get(Stat::Hp)
    }

    /// Returns current HP as a fraction of max HP.
    #[must_use]
    pub fn hp_ratio(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.max_hp().max(1))
    }

    /// Returns `true` at zero HP.
    #[must_use]
    pub const fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Returns `true` at max HP.
    #[must_use]
    pub const fn is_full_hp(&self) -> bool {
        self.hp == self.max_hp()
    }

    /// Returns the stage table.
    #[must_use]
    pub const fn stages(&self) -> &StatStages {
        &self.stages
    }

    /// Returns the stage table mutably.
    pub fn stages_mut(&mut self) -> &mut StatStages {
        &mut self.stages
    }

    /// Returns a stat scaled by its stage.
    ///
    /// Accuracy and evasion have no permanent value and return the bare
    /// stage multiplier. Paralysis halves speed.
    #[must_use]
    pub fn effective_stat(&self, stat: BattleStat) -> f64 {
        let stage = stage_multiplier(self.stages.get(stat));
        let Some(permanent) = stat.permanent() else {
            return stage;
        };
        let mut value = f64::from(self.stats.get(permanent)) * stage;
        if stat == BattleStat::Speed && self.has_status(StatusKind::Paralysis) {
            value /= 2.0;
        }
        value
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    /// Returns the status condition.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusEffect> {
        self.status.as_ref()
    }

    /// Returns the status condition mutably.
    pub fn status_mut(&mut self) -> Option<&mut StatusEffect> {
        self.status.as_mut()
    }

    /// Returns `true` if the combatant has the given status.
    #[must_use]
    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status.is_some_and(|s| s.kind == kind)
    }

    /// Replaces the status condition.
    pub fn set_status(&mut self, status: Option<StatusEffect>) {
        self.status = status;
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    /// Returns every tag.
    #[must_use]
    pub fn tags(&self) -> &[BattlerTag] {
        &self.tags
    }

    /// Returns the tag of the given kind.
    #[must_use]
    pub fn tag(&self, kind: BattlerTagKind) -> Option<&BattlerTag> {
        self.tags.iter().find(|t| t.kind == kind)
    }

    /// Returns the tag of the given kind mutably.
    pub fn tag_mut(&mut self, kind: BattlerTagKind) -> Option<&mut BattlerTag> {
        self.tags.iter_mut().find(|t| t.kind == kind)
    }

    /// Returns `true` if the combatant has a tag of the given kind.
    #[must_use]
    pub fn has_tag(&self, kind: BattlerTagKind) -> bool {
        self.tag(kind).is_some()
    }

    /// Returns the semi-invulnerable tag the combatant is in, if any.
    #[must_use]
    pub fn semi_invulnerable_tag(&self) -> Option<BattlerTagKind> {
        self.tags
            .iter()
            .map(|t| t.kind)
            .find(|k| k.is_semi_invulnerable())
    }

    /// Attaches a tag. Returns `false` if one of the same kind is present.
    pub fn add_tag(&mut self, tag: BattlerTag) -> bool {
        if self.has_tag(tag.kind) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Detaches the tag of the given kind.
    pub fn remove_tag(&mut self, kind: BattlerTagKind) -> Option<BattlerTag> {
        let index = self.tags.iter().position(|t| t.kind == kind)?;
        Some(self.tags.remove(index))
    }

    /// Lapses every tag on `trigger` and returns the ones that expired.
    pub fn lapse_tags(&mut self, trigger: LapseTrigger) -> Vec<BattlerTag> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.tags.len());
        for mut tag in self.tags.drain(..) {
            if tag.lapse(trigger) {
                kept.push(tag);
            } else {
                expired.push(tag);
            }
        }
        self.tags = kept;
        expired
    }

    /// Lapses the tag of `kind` on `trigger`, leaving the others alone.
    ///
    /// Returns the tag if it expired and was detached.
    pub fn lapse_tag(&mut self, kind: BattlerTagKind, trigger: LapseTrigger) -> Option<BattlerTag> {
        let index = self.tags.iter().position(|t| t.kind == kind)?;
        if self.tags[index].lapse(trigger) {
            return None;
        }
        Some(self.tags.remove(index))
    }

    /// Detaches every tag.
    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    /// Returns the move slots.
    #[must_use]
    pub fn moveset(&self) -> &[MoveSlot] {
        &self.moveset
    }

    /// Returns one move slot.
    #[must_use]
    pub fn move_slot(&self, index: usize) -> Option<&MoveSlot> {
        self.moveset.get(index)
    }

    /// Returns one move slot mutably.
    pub fn move_slot_mut(&mut self, index: usize) -> Option<&mut MoveSlot> {
        self.moveset.get_mut(index)
    }

    /// Returns the index of the slot holding `move_id`.
    #[must_use]
    pub fn slot_of(&self, move_id: &MoveId) -> Option<usize> {
        self.moveset.iter().position(|s| s.mv.id() == move_id)
    }

    /// Returns the indices of slots with PP left.
    #[must_use]
    pub fn usable_slots(&self) -> Vec<usize> {
        self.moveset
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_usable())
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns the move history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Returns the most recent move record.
    #[must_use]
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// Appends a move record.
    pub fn record_move(&mut self, record: MoveRecord) {
        self.history.push(record);
    }

    // -------------------------------------------------------------------------
    // Turn bookkeeping and placement
    // -------------------------------------------------------------------------

    /// Returns this turn's bookkeeping.
    #[must_use]
    pub const fn turn_data(&self) -> &TurnData {
        &self.turn_data
    }

    /// Returns this turn's bookkeeping mutably.
    pub fn turn_data_mut(&mut self) -> &mut TurnData {
        &mut self.turn_data
    }

    /// Clears this turn's bookkeeping.
    pub fn reset_turn_data(&mut self) {
        self.turn_data = TurnData::default();
    }

    /// Returns the field slot, if the combatant is out.
    #[must_use]
    pub const fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// Returns `true` if the combatant occupies a field slot.
    #[must_use]
    pub const fn is_on_field(&self) -> bool {
        self.slot.is_some()
    }

    /// Returns how many turn ends the combatant has been out for.
    #[must_use]
    pub const fn turns_on_field(&self) -> u32 {
        self.turns_on_field
    }

    pub(crate) fn bump_turns_on_field(&mut self) {
        self.turns_on_field += 1;
    }

    pub(crate) fn place(&mut self, slot: usize) {
        self.slot = Some(slot);
        self.turns_on_field = 0;
        self.turn_data = TurnData::default();
    }

    pub(crate) fn withdraw(&mut self) {
        self.slot = None;
        self.stages.reset();
        self.tags.clear();
    }

    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    pub(crate) fn restore_hp(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp() - self.hp);
        self.hp += healed;
        healed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u64) -> Combatant {
        Combatant::from_template(
            CombatantId::new(id),
            CombatantTemplate::new("Sample", Side::Player, 50)
                .with_base(BaseStats::new(100, 100, 100, 100, 100, 100)),
        )
    }

    mod combatant_id_tests {
        use super::*;

        #[test]
        fn ordering_follows_raw_value() {
            assert!(CombatantId::new(1) < CombatantId::new(2));
            assert_eq!(CombatantId::from(7).as_u64(), 7);
        }

        #[test]
        fn debug_and_display() {
            assert_eq!(format!("{:?}", CombatantId::new(3)), "CombatantId(3)");
            assert_eq!(format!("{}", CombatantId::new(3)), "3");
        }
    }

    mod hp_tests {
        use super::*;

        #[test]
        fn damage_saturates_at_zero() {
            let mut c = sample(1);
            let dealt = c.take_damage(10_000);
            assert_eq!(dealt, 160);
            assert!(c.is_fainted());
        }

        #[test]
        fn healing_caps_at_max() {
            let mut c = sample(1);
            c.take_damage(50);
            assert_eq!(c.restore_hp(80), 50);
            assert!(c.is_full_hp());
        }
    }

    mod tag_tests {
        use super::*;

        #[test]
        fn duplicate_tags_are_rejected() {
            let mut c = sample(1);
            assert!(c.add_tag(BattlerTag::new(BattlerTagKind::Confused)));
            assert!(!c.add_tag(BattlerTag::new(BattlerTagKind::Confused)));
            assert_eq!(c.tags().len(), 1);
        }

        #[test]
        fn lapse_returns_expired_tags() {
            let mut c = sample(1);
            c.add_tag(BattlerTag::new(BattlerTagKind::Protected));
            c.add_tag(BattlerTag::new(BattlerTagKind::Underground));
            let expired = c.lapse_tags(LapseTrigger::TurnEnd);
            assert_eq!(expired.len(), 1);
            assert_eq!(expired[0].kind, BattlerTagKind::Protected);
            assert_eq!(c.semi_invulnerable_tag(), Some(BattlerTagKind::Underground));
        }

        #[test]
        fn lapse_tag_touches_only_its_kind() {
            let mut c = sample(1);
            c.add_tag(BattlerTag::new(BattlerTagKind::Protected));
            c.add_tag(BattlerTag::new(BattlerTagKind::Confused));
            assert!(c.lapse_tag(BattlerTagKind::Protected, LapseTrigger::Custom).is_none());
            assert!(c.lapse_tag(BattlerTagKind::Underground, LapseTrigger::TurnEnd).is_none());

            let expired = c.lapse_tag(BattlerTagKind::Protected, LapseTrigger::TurnEnd).unwrap();
            assert_eq!(expired.kind, BattlerTagKind::Protected);
            assert!(c.has_tag(BattlerTagKind::Confused));
            assert_eq!(c.tags().len(), 1);
        }

        #[test]
        fn withdraw_clears_volatile_state() {
            let mut c = sample(1);
            c.place(0);
            c.stages_mut().change(BattleStat::Attack, 2);
            c.add_tag(BattlerTag::new(BattlerTagKind::Confused));
            c.withdraw();
            assert!(!c.is_on_field());
            assert!(c.tags().is_empty());
            assert_eq!(c.stages().get(BattleStat::Attack), 0);
        }
    }

    #[test]
    fn paralysis_halves_speed() {
        let mut c = sample(1);
        let before = c.effective_stat(BattleStat::Speed);
        c.set_status(Some(StatusEffect::new(StatusKind::Paralysis)));
        assert!((c.effective_stat(BattleStat::Speed) - before / 2.0).abs() < f64::EPSILON);
    }
}
