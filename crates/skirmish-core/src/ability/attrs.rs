//! Ability attribute fragments and their capability traits.

use crate::combatant::{BattlerTag, BattlerTagKind, Combatant, CombatantId, StatusKind};
use crate::effects;
use crate::element::Element;
use crate::engine::EngineContext;
use crate::field::{Field, WeatherKind};
use crate::holder::{BoolHolder, NumberHolder};
use crate::moves::{Move, MoveCategory, MoveFlags};
use crate::stat::BattleStat;

// =============================================================================
// Conditions
// =============================================================================

/// Extra gate an attribute checks before it may fire.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrCondition {
    /// Holder's HP is at or below this fraction of max HP.
    HpAtMost(f64),
    /// Holder is at max HP.
    FullHp,
    /// The given weather is active.
    Weather(WeatherKind),
    /// Holder has any status condition.
    HasStatus,
}

impl AttrCondition {
    /// Returns `true` if the condition holds for `holder`.
    #[must_use]
    pub fn holds(&self, holder: &Combatant, field: &Field) -> bool {
        match self {
            AttrCondition::HpAtMost(fraction) => holder.hp_ratio() <= *fraction,
            AttrCondition::FullHp => holder.is_full_hp(),
            AttrCondition::Weather(kind) => field.weather_kind() == Some(*kind),
            AttrCondition::HasStatus => holder.status().is_some(),
        }
    }
}

// =============================================================================
// Capability traits
// =============================================================================

/// The parties of a move hitting a defender.
#[derive(Debug, Clone, Copy)]
pub struct DefendArgs<'a> {
    /// Combatant being hit (the attribute holder).
    pub defender: CombatantId,
    /// Combatant using the move.
    pub attacker: CombatantId,
    /// The move.
    pub mv: &'a Move,
}

/// Fires while a move is being resolved against the holder.
///
/// `value` is whatever quantity the caller is computing: the type
/// multiplier for immunity kinds, the accuracy for [`WonderSkin`], the damage
/// multiplier for [`ReceivedMoveDamageMultiplier`]. Setting `cancelled`
/// makes the move a silent no-effect.
pub trait PreDefendAttr {
    /// Applies the attribute. Returns `true` if it fired.
    fn apply_pre_defend(
        &self,
        ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        simulated: bool,
    ) -> bool;
}

/// Fires after a damaging move hit the holder.
pub trait PostDefendAttr {
    /// Applies the attribute. Returns `true` if it fired.
    fn apply_post_defend(&self, ctx: &mut EngineContext, args: &DefendArgs<'_>, simulated: bool)
        -> bool;
}

/// Fires when the holder enters the field.
pub trait PostSummonAttr {
    /// Applies the attribute. Returns `true` if it fired.
    fn apply_post_summon(&self, ctx: &mut EngineContext, holder: CombatantId, simulated: bool)
        -> bool;
}

/// Fires before another combatant lowers one of the holder's stages.
pub trait PreStatStageChangeAttr {
    /// Applies the attribute. Setting `cancelled` blocks the change.
    fn apply_pre_stat_change(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        stat: BattleStat,
        cancelled: &mut BoolHolder,
        simulated: bool,
    ) -> bool;
}

/// Fires after the holder's stages changed.
pub trait PostStatStageChangeAttr {
    /// Applies the attribute. Returns `true` if it fired.
    fn apply_post_stat_change(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        stats: &[BattleStat],
        delta: i8,
        self_inflicted: bool,
        simulated: bool,
    ) -> bool;
}

/// Rewrites a secondary effect's chance.
pub trait EffectChanceAttr {
    /// Applies the attribute. Returns `true` if it fired.
    fn apply_effect_chance(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        mv: &Move,
        chance: &mut NumberHolder,
        simulated: bool,
    ) -> bool;
}

/// Scales one of the holder's stats.
pub trait StatMultiplierAttr {
    /// Applies the attribute. Returns `true` if it fired.
    fn apply_stat_multiplier(
        &self,
        stat: BattleStat,
        mv: Option<&Move>,
        multiplier: &mut NumberHolder,
    ) -> bool;
}

/// Scales the power of the holder's moves.
pub trait MovePowerAttr {
    /// Applies the attribute. Returns `true` if it fired.
    fn apply_move_power(&self, mv: &Move, power: &mut NumberHolder) -> bool;
}

/// Blocks status conditions on the holder.
pub trait StatusImmunityAttr {
    /// Applies the attribute. Setting `cancelled` blocks the status.
    fn apply_status_immunity(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        status: StatusKind,
        cancelled: &mut BoolHolder,
        simulated: bool,
    ) -> bool;
}

/// Blocks battler tags on the holder.
pub trait TagImmunityAttr {
    /// Applies the attribute. Setting `cancelled` blocks the tag.
    fn apply_tag_immunity(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        tag: BattlerTagKind,
        cancelled: &mut BoolHolder,
        simulated: bool,
    ) -> bool;
}

/// Makes the holder disregard an opponent's stages.
pub trait IgnoreStagesAttr {
    /// Returns `true` if the opponent's stage for `stat` is ignored.
    fn ignores(&self, stat: BattleStat) -> bool;
}

fn unaffected_message(ctx: &mut EngineContext, holder: CombatantId, simulated: bool) {
    if !simulated {
        let name = ctx.field.name_of(holder);
        ctx.message(format!("It doesn't affect {name}!"));
    }
}

// =============================================================================
// Pre-defend attributes
// =============================================================================

/// Nullifies moves of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeImmunity {
    /// Type the holder is immune to.
    pub element: Element,
}

impl TypeImmunity {
    /// Creates the attribute.
    #[must_use]
    pub const fn new(element: Element) -> Self {
        Self { element }
    }

    fn matches(self, args: &DefendArgs<'_>) -> bool {
        args.attacker != args.defender && args.mv.element() == self.element
    }
}

impl PreDefendAttr for TypeImmunity {
    fn apply_pre_defend(
        &self,
        _ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        _cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        _simulated: bool,
    ) -> bool {
        if !self.matches(args) {
            return false;
        }
        value.set(0.0);
        true
    }
}

/// Absorbs moves of one type to restore a quarter of max HP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeImmunityHeal {
    /// Absorbed type.
    pub element: Element,
}

impl PreDefendAttr for TypeImmunityHeal {
    fn apply_pre_defend(
        &self,
        ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        simulated: bool,
    ) -> bool {
        if !TypeImmunity::new(self.element).matches(args) {
            return false;
        }
        value.set(0.0);
        cancelled.set(true);
        if !simulated {
            let max_hp = ctx.field.get(args.defender).map_or(0, Combatant::max_hp);
            let healed = effects::heal(ctx, args.defender, (max_hp / 4).max(1));
            let name = ctx.field.name_of(args.defender);
            if healed > 0 {
                ctx.message(format!("{name}'s HP was restored."));
            } else {
                ctx.message(format!("{name} is unaffected!"));
            }
        }
        true
    }
}

/// Absorbs moves of one type and gains a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeImmunityAddTag {
    /// Absorbed type.
    pub element: Element,
    /// Tag gained.
    pub tag: BattlerTagKind,
}

impl PreDefendAttr for TypeImmunityAddTag {
    fn apply_pre_defend(
        &self,
        ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        simulated: bool,
    ) -> bool {
        if !TypeImmunity::new(self.element).matches(args) {
            return false;
        }
        value.set(0.0);
        cancelled.set(true);
        if !simulated {
            effects::try_add_tag(ctx, args.defender, BattlerTag::new(self.tag), false);
        }
        true
    }
}

/// Absorbs moves of one type and raises a stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeImmunityStatStageChange {
    /// Absorbed type.
    pub element: Element,
    /// Raised stat.
    pub stat: BattleStat,
    /// Stages gained.
    pub stages: i8,
}

impl PreDefendAttr for TypeImmunityStatStageChange {
    fn apply_pre_defend(
        &self,
        ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        simulated: bool,
    ) -> bool {
        if !TypeImmunity::new(self.element).matches(args) {
            return false;
        }
        value.set(0.0);
        cancelled.set(true);
        if !simulated {
            effects::queue_stat_change(
                ctx,
                args.defender,
                Some(args.defender),
                vec![self.stat],
                self.stages,
            );
        }
        true
    }
}

/// Nullifies moves carrying a flag (sound, ballistic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveImmunity {
    /// Flag the holder is immune to.
    pub flag: MoveFlags,
}

impl PreDefendAttr for MoveImmunity {
    fn apply_pre_defend(
        &self,
        ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        cancelled: &mut BoolHolder,
        _value: &mut NumberHolder,
        simulated: bool,
    ) -> bool {
        if args.attacker == args.defender || !args.mv.flags().intersects(self.flag) {
            return false;
        }
        cancelled.set(true);
        unaffected_message(ctx, args.defender, simulated);
        true
    }
}

/// Makes every damaging hit not very effective while at full HP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullHpResistType;

impl PreDefendAttr for FullHpResistType {
    fn apply_pre_defend(
        &self,
        ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        _cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        simulated: bool,
    ) -> bool {
        if args.mv.is_status() || value.value <= 0.0 || args.attacker == args.defender {
            return false;
        }
        if !ctx.field.get(args.defender).is_some_and(Combatant::is_full_hp) {
            return false;
        }
        value.set(value.value.min(0.5));
        if !simulated {
            let name = ctx.field.name_of(args.defender);
            ctx.message(format!("{name} made its shell gleam! It's distorting type matchups!"));
        }
        true
    }
}

/// Scales the damage the holder receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceivedMoveDamageMultiplier {
    /// Factor applied to the damage multiplier.
    pub factor: f64,
}

impl PreDefendAttr for ReceivedMoveDamageMultiplier {
    fn apply_pre_defend(
        &self,
        _ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        _cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        _simulated: bool,
    ) -> bool {
        if args.mv.is_status() {
            return false;
        }
        value.scale(self.factor);
        true
    }
}

/// Caps the accuracy of status moves aimed at the holder at 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WonderSkin;

impl PreDefendAttr for WonderSkin {
    fn apply_pre_defend(
        &self,
        _ctx: &mut EngineContext,
        args: &DefendArgs<'_>,
        _cancelled: &mut BoolHolder,
        value: &mut NumberHolder,
        _simulated: bool,
    ) -> bool {
        if !args.mv.is_status() || value.value < 50.0 {
            return false;
        }
        value.set(50.0);
        true
    }
}

// =============================================================================
// Post-defend attributes
// =============================================================================

/// May inflict a status on a contact attacker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactStatus {
    /// Percent chance per contact hit.
    pub chance: u32,
    /// Candidate statuses, one picked at random.
    pub statuses: Vec<StatusKind>,
}

impl PostDefendAttr for ContactStatus {
    fn apply_post_defend(&self, ctx: &mut EngineContext, args: &DefendArgs<'_>, simulated: bool) -> bool {
        if !args.mv.makes_contact() || args.attacker == args.defender || self.statuses.is_empty() {
            return false;
        }
        if ctx.field.get(args.attacker).map_or(true, |c| c.is_fainted() || c.status().is_some()) {
            return false;
        }
        if simulated {
            return true;
        }
        if ctx.rng.random_int(100) >= self.chance {
            return false;
        }
        #[allow(clippy::cast_possible_truncation)]
        let pick = ctx.rng.random_int(self.statuses.len() as u32) as usize;
        effects::try_set_status(ctx, args.attacker, self.statuses[pick], Some(args.defender), false)
    }
}

/// Hurts a contact attacker by a fraction of its max HP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactDamage {
    /// The attacker loses `max_hp / divisor`.
    pub divisor: u32,
}

impl PostDefendAttr for ContactDamage {
    fn apply_post_defend(&self, ctx: &mut EngineContext, args: &DefendArgs<'_>, simulated: bool) -> bool {
        if !args.mv.makes_contact() || args.attacker == args.defender {
            return false;
        }
        let Some(max_hp) = ctx
            .field
            .get(args.attacker)
            .filter(|c| !c.is_fainted())
            .map(Combatant::max_hp)
        else {
            return false;
        };
        if !simulated {
            let name = ctx.field.name_of(args.attacker);
            ctx.message(format!("{name} was hurt!"));
            effects::deal_damage(ctx, args.attacker, (max_hp / self.divisor.max(1)).max(1), Some(args.defender));
        }
        true
    }
}

/// Changes a stat whenever the holder takes a damaging hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostDefendStatStageChange {
    /// Stat changed.
    pub stat: BattleStat,
    /// Stages applied.
    pub stages: i8,
}

impl PostDefendAttr for PostDefendStatStageChange {
    fn apply_post_defend(&self, ctx: &mut EngineContext, args: &DefendArgs<'_>, simulated: bool) -> bool {
        if args.mv.is_status() || !ctx.field.is_active(args.defender) {
            return false;
        }
        if !simulated {
            effects::queue_stat_change(ctx, args.defender, Some(args.defender), vec![self.stat], self.stages);
        }
        true
    }
}

// =============================================================================
// Summon attributes
// =============================================================================

/// Changes stats of the holder or its opponents on entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummonStatStageChange {
    /// Stats changed.
    pub stats: Vec<BattleStat>,
    /// Stages applied.
    pub stages: i8,
    /// Apply to every active opponent instead of the holder.
    pub opponents: bool,
}

impl PostSummonAttr for PostSummonStatStageChange {
    fn apply_post_summon(&self, ctx: &mut EngineContext, holder: CombatantId, simulated: bool) -> bool {
        let targets = if self.opponents {
            ctx.field.opponents_of(holder)
        } else {
            vec![holder]
        };
        if targets.is_empty() {
            return false;
        }
        if !simulated {
            for target in targets {
                effects::queue_stat_change(ctx, target, Some(holder), self.stats.clone(), self.stages);
            }
        }
        true
    }
}

/// Announces the holder on entry. `{name}` is replaced with the holder's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummonMessage {
    /// Message template.
    pub template: String,
}

impl PostSummonAttr for PostSummonMessage {
    fn apply_post_summon(&self, ctx: &mut EngineContext, holder: CombatantId, simulated: bool) -> bool {
        if !simulated {
            let name = ctx.field.name_of(holder);
            ctx.message(self.template.replace("{name}", &name));
        }
        true
    }
}

// =============================================================================
// Stat stage attributes
// =============================================================================

/// Prevents other combatants from lowering one stat (or all of them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectStat {
    /// Protected stat; `None` protects every stat.
    pub stat: Option<BattleStat>,
}

impl PreStatStageChangeAttr for ProtectStat {
    fn apply_pre_stat_change(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        stat: BattleStat,
        cancelled: &mut BoolHolder,
        simulated: bool,
    ) -> bool {
        if self.stat.is_some_and(|protected| protected != stat) {
            return false;
        }
        cancelled.set(true);
        if !simulated {
            let name = ctx.field.name_of(holder);
            ctx.message(format!("{name}'s {stat} was not lowered!"));
        }
        true
    }
}

/// Raises a stat when an opponent lowers any of the holder's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostStatStageChangeBoost {
    /// Raised stat.
    pub stat: BattleStat,
    /// Stages gained.
    pub stages: i8,
}

impl PostStatStageChangeAttr for PostStatStageChangeBoost {
    fn apply_post_stat_change(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        stats: &[BattleStat],
        delta: i8,
        self_inflicted: bool,
        simulated: bool,
    ) -> bool {
        if delta >= 0 || self_inflicted || stats.is_empty() {
            return false;
        }
        if !simulated {
            effects::queue_stat_change(ctx, holder, Some(holder), vec![self.stat], self.stages);
        }
        true
    }
}

// =============================================================================
// Effect chance attributes
// =============================================================================

/// Scales the chance of the holder's secondary effects, capped at 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEffectChanceMultiplier {
    /// Factor applied.
    pub factor: f64,
}

impl EffectChanceAttr for MoveEffectChanceMultiplier {
    fn apply_effect_chance(
        &self,
        _ctx: &mut EngineContext,
        _holder: CombatantId,
        _mv: &Move,
        chance: &mut NumberHolder,
        _simulated: bool,
    ) -> bool {
        if chance.value <= 0.0 {
            return false;
        }
        chance.scale(self.factor);
        chance.set(chance.value.min(100.0));
        true
    }
}

/// Shields the holder from secondary effects of moves aimed at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IgnoreMoveEffects;

impl EffectChanceAttr for IgnoreMoveEffects {
    fn apply_effect_chance(
        &self,
        _ctx: &mut EngineContext,
        _holder: CombatantId,
        _mv: &Move,
        chance: &mut NumberHolder,
        _simulated: bool,
    ) -> bool {
        if chance.value <= 0.0 {
            return false;
        }
        chance.set(0.0);
        true
    }
}

// =============================================================================
// Passive attributes
// =============================================================================

/// Scales one of the holder's stats, optionally only for one move category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatMultiplier {
    /// Scaled stat.
    pub stat: BattleStat,
    /// Factor applied.
    pub factor: f64,
    /// Only applies to moves of this category.
    pub category: Option<MoveCategory>,
}

impl StatMultiplierAttr for StatMultiplier {
    fn apply_stat_multiplier(
        &self,
        stat: BattleStat,
        mv: Option<&Move>,
        multiplier: &mut NumberHolder,
    ) -> bool {
        if stat != self.stat {
            return false;
        }
        if let Some(category) = self.category {
            if mv.map(Move::category) != Some(category) {
                return false;
            }
        }
        multiplier.scale(self.factor);
        true
    }
}

/// Scales the power of the holder's moves of one type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTypePowerBoost {
    /// Boosted type.
    pub element: Element,
    /// Factor applied.
    pub factor: f64,
}

impl MovePowerAttr for MoveTypePowerBoost {
    fn apply_move_power(&self, mv: &Move, power: &mut NumberHolder) -> bool {
        if mv.element() != self.element || mv.is_status() {
            return false;
        }
        power.scale(self.factor);
        true
    }
}

/// Prevents the listed status conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStatusEffect {
    /// Blocked statuses.
    pub statuses: Vec<StatusKind>,
}

impl StatusImmunityAttr for BlockStatusEffect {
    fn apply_status_immunity(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        status: StatusKind,
        cancelled: &mut BoolHolder,
        simulated: bool,
    ) -> bool {
        if !self.statuses.contains(&status) {
            return false;
        }
        cancelled.set(true);
        if !simulated {
            let name = ctx.field.name_of(holder);
            ctx.message(format!("{name} cannot be afflicted with {status}!"));
        }
        true
    }
}

/// Prevents the listed battler tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattlerTagImmunity {
    /// Blocked tags.
    pub tags: Vec<BattlerTagKind>,
}

impl TagImmunityAttr for BattlerTagImmunity {
    fn apply_tag_immunity(
        &self,
        ctx: &mut EngineContext,
        holder: CombatantId,
        tag: BattlerTagKind,
        cancelled: &mut BoolHolder,
        simulated: bool,
    ) -> bool {
        if !self.tags.contains(&tag) {
            return false;
        }
        cancelled.set(true);
        if !simulated && tag != BattlerTagKind::Flinched {
            let name = ctx.field.name_of(holder);
            ctx.message(format!("{name} is unaffected by {}!", tag.name()));
        }
        true
    }
}

/// Disregards an opponent's stages for the listed stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreOpponentStatStages {
    /// Stats whose opposing stages are ignored.
    pub stats: Vec<BattleStat>,
}

impl IgnoreOpponentStatStages {
    /// Ignores every opposing stage.
    #[must_use]
    pub fn all() -> Self {
        Self {
            stats: BattleStat::ALL.to_vec(),
        }
    }
}

impl IgnoreStagesAttr for IgnoreOpponentStatStages {
    fn ignores(&self, stat: BattleStat) -> bool {
        self.stats.contains(&stat)
    }
}

// =============================================================================
// Attribute set
// =============================================================================

/// Every ability attribute fragment.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum AbAttr {
    TypeImmunity(TypeImmunity),
    TypeImmunityHeal(TypeImmunityHeal),
    TypeImmunityAddTag(TypeImmunityAddTag),
    TypeImmunityStatStageChange(TypeImmunityStatStageChange),
    MoveImmunity(MoveImmunity),
    FullHpResistType(FullHpResistType),
    ReceivedMoveDamageMultiplier(ReceivedMoveDamageMultiplier),
    WonderSkin(WonderSkin),
    ContactStatus(ContactStatus),
    ContactDamage(ContactDamage),
    PostDefendStatStageChange(PostDefendStatStageChange),
    PostSummonStatStageChange(PostSummonStatStageChange),
    PostSummonMessage(PostSummonMessage),
    ProtectStat(ProtectStat),
    PostStatStageChangeBoost(PostStatStageChangeBoost),
    MoveEffectChanceMultiplier(MoveEffectChanceMultiplier),
    IgnoreMoveEffects(IgnoreMoveEffects),
    StatMultiplier(StatMultiplier),
    MoveTypePowerBoost(MoveTypePowerBoost),
    BlockStatusEffect(BlockStatusEffect),
    BattlerTagImmunity(BattlerTagImmunity),
    IgnoreOpponentStatStages(IgnoreOpponentStatStages),
    /// Moves used by or aimed at the holder never miss.
    AlwaysHit,
    /// Multi-hit moves always strike the maximum number of times and skip per-hit checks.
    MaxMultiHit,
    /// Contact moves go through protection.
    IgnoreProtectOnContact,
    /// The holder's moves ignore ignorable abilities.
    MoveAbilityBypass,
    /// The holder takes no recoil.
    BlockRecoil,
}

/// Capability category of an [`AbAttr`], used to select attributes for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AbAttrKind {
    TypeImmunity,
    TypeImmunityHeal,
    TypeImmunityAddTag,
    TypeImmunityStatStageChange,
    MoveImmunity,
    FullHpResistType,
    ReceivedMoveDamageMultiplier,
    WonderSkin,
    ContactStatus,
    ContactDamage,
    PostDefendStatStageChange,
    PostSummonStatStageChange,
    PostSummonMessage,
    ProtectStat,
    PostStatStageChangeBoost,
    MoveEffectChanceMultiplier,
    IgnoreMoveEffects,
    StatMultiplier,
    MoveTypePowerBoost,
    BlockStatusEffect,
    BattlerTagImmunity,
    IgnoreOpponentStatStages,
    AlwaysHit,
    MaxMultiHit,
    IgnoreProtectOnContact,
    MoveAbilityBypass,
    BlockRecoil,
}

impl AbAttrKind {
    /// The type-immunity family, dispatched together in declaration order.
    pub const TYPE_IMMUNITY: &'static [AbAttrKind] = &[
        AbAttrKind::TypeImmunity,
        AbAttrKind::TypeImmunityHeal,
        AbAttrKind::TypeImmunityAddTag,
        AbAttrKind::TypeImmunityStatStageChange,
    ];

    /// Every post-defend kind.
    pub const POST_DEFEND: &'static [AbAttrKind] = &[
        AbAttrKind::ContactStatus,
        AbAttrKind::ContactDamage,
        AbAttrKind::PostDefendStatStageChange,
    ];

    /// Every post-summon kind.
    pub const POST_SUMMON: &'static [AbAttrKind] = &[
        AbAttrKind::PostSummonStatStageChange,
        AbAttrKind::PostSummonMessage,
    ];
}

impl AbAttr {
    /// Returns the capability category.
    #[must_use]
    pub const fn kind(&self) -> AbAttrKind {
        match self {
            AbAttr::TypeImmunity(_) => AbAttrKind::TypeImmunity,
            AbAttr::TypeImmunityHeal(_) => AbAttrKind::TypeImmunityHeal,
            AbAttr::TypeImmunityAddTag(_) => AbAttrKind::TypeImmunityAddTag,
            AbAttr::TypeImmunityStatStageChange(_) => AbAttrKind::TypeImmunityStatStageChange,
            AbAttr::MoveImmunity(_) => AbAttrKind::MoveImmunity,
            AbAttr::FullHpResistType(_) => AbAttrKind::FullHpResistType,
            AbAttr::ReceivedMoveDamageMultiplier(_) => AbAttrKind::ReceivedMoveDamageMultiplier,
            AbAttr::WonderSkin(_) => AbAttrKind::WonderSkin,
            AbAttr::ContactStatus(_) => AbAttrKind::ContactStatus,
            AbAttr::ContactDamage(_) => AbAttrKind::ContactDamage,
            AbAttr::PostDefendStatStageChange(_) => AbAttrKind::PostDefendStatStageChange,
            AbAttr::PostSummonStatStageChange(_) => AbAttrKind::PostSummonStatStageChange,
            AbAttr::PostSummonMessage(_) => AbAttrKind::PostSummonMessage,
            AbAttr::ProtectStat(_) => AbAttrKind::ProtectStat,
            AbAttr::PostStatStageChangeBoost(_) => AbAttrKind::PostStatStageChangeBoost,
            AbAttr::MoveEffectChanceMultiplier(_) => AbAttrKind::MoveEffectChanceMultiplier,
            AbAttr::IgnoreMoveEffects(_) => AbAttrKind::IgnoreMoveEffects,
            AbAttr::StatMultiplier(_) => AbAttrKind::StatMultiplier,
            AbAttr::MoveTypePowerBoost(_) => AbAttrKind::MoveTypePowerBoost,
            AbAttr::BlockStatusEffect(_) => AbAttrKind::BlockStatusEffect,
            AbAttr::BattlerTagImmunity(_) => AbAttrKind::BattlerTagImmunity,
            AbAttr::IgnoreOpponentStatStages(_) => AbAttrKind::IgnoreOpponentStatStages,
            AbAttr::AlwaysHit => AbAttrKind::AlwaysHit,
            AbAttr::MaxMultiHit => AbAttrKind::MaxMultiHit,
            AbAttr::IgnoreProtectOnContact => AbAttrKind::IgnoreProtectOnContact,
            AbAttr::MoveAbilityBypass => AbAttrKind::MoveAbilityBypass,
            AbAttr::BlockRecoil => AbAttrKind::BlockRecoil,
        }
    }

    /// Returns the fragment as a pre-defend attribute, if it is one.
    #[must_use]
    pub fn as_pre_defend(&self) -> Option<&dyn PreDefendAttr> {
        match self {
            AbAttr::TypeImmunity(a) => Some(a),
            AbAttr::TypeImmunityHeal(a) => Some(a),
            AbAttr::TypeImmunityAddTag(a) => Some(a),
            AbAttr::TypeImmunityStatStageChange(a) => Some(a),
            AbAttr::MoveImmunity(a) => Some(a),
            AbAttr::FullHpResistType(a) => Some(a),
            AbAttr::ReceivedMoveDamageMultiplier(a) => Some(a),
            AbAttr::WonderSkin(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a post-defend attribute, if it is one.
    #[must_use]
    pub fn as_post_defend(&self) -> Option<&dyn PostDefendAttr> {
        match self {
            AbAttr::ContactStatus(a) => Some(a),
            AbAttr::ContactDamage(a) => Some(a),
            AbAttr::PostDefendStatStageChange(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a post-summon attribute, if it is one.
    #[must_use]
    pub fn as_post_summon(&self) -> Option<&dyn PostSummonAttr> {
        match self {
            AbAttr::PostSummonStatStageChange(a) => Some(a),
            AbAttr::PostSummonMessage(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a pre-stat-change attribute, if it is one.
    #[must_use]
    pub fn as_pre_stat_change(&self) -> Option<&dyn PreStatStageChangeAttr> {
        match self {
            AbAttr::ProtectStat(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a post-stat-change attribute, if it is one.
    #[must_use]
    pub fn as_post_stat_change(&self) -> Option<&dyn PostStatStageChangeAttr> {
        match self {
            AbAttr::PostStatStageChangeBoost(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as an effect-chance attribute, if it is one.
    #[must_use]
    pub fn as_effect_chance(&self) -> Option<&dyn EffectChanceAttr> {
        match self {
            AbAttr::MoveEffectChanceMultiplier(a) => Some(a),
            AbAttr::IgnoreMoveEffects(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a stat-multiplier attribute, if it is one.
    #[must_use]
    pub fn as_stat_multiplier(&self) -> Option<&dyn StatMultiplierAttr> {
        match self {
            AbAttr::StatMultiplier(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a move-power attribute, if it is one.
    #[must_use]
    pub fn as_move_power(&self) -> Option<&dyn MovePowerAttr> {
        match self {
            AbAttr::MoveTypePowerBoost(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a status-immunity attribute, if it is one.
    #[must_use]
    pub fn as_status_immunity(&self) -> Option<&dyn StatusImmunityAttr> {
        match self {
            AbAttr::BlockStatusEffect(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a tag-immunity attribute, if it is one.
    #[must_use]
    pub fn as_tag_immunity(&self) -> Option<&dyn TagImmunityAttr> {
        match self {
            AbAttr::BattlerTagImmunity(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fragment as a stage-ignoring attribute, if it is one.
    #[must_use]
    pub fn as_ignore_stages(&self) -> Option<&dyn IgnoreStagesAttr> {
        match self {
            AbAttr::IgnoreOpponentStatStages(a) => Some(a),
            _ => None,
        }
    }

    /// Whether firing this fragment reveals the ability unless told otherwise.
    const fn shown_by_default(&self) -> bool {
        !matches!(
            self,
            AbAttr::StatMultiplier(_)
                | AbAttr::MoveTypePowerBoost(_)
                | AbAttr::MoveEffectChanceMultiplier(_)
                | AbAttr::IgnoreMoveEffects(_)
                | AbAttr::IgnoreOpponentStatStages(_)
                | AbAttr::ReceivedMoveDamageMultiplier(_)
                | AbAttr::WonderSkin(_)
                | AbAttr::AlwaysHit
                | AbAttr::MaxMultiHit
                | AbAttr::IgnoreProtectOnContact
                | AbAttr::MoveAbilityBypass
                | AbAttr::BlockRecoil
        )
    }
}

/// An attribute as declared on an ability: fragment, gate and visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityAttr {
    attr: AbAttr,
    condition: Option<AttrCondition>,
    show_ability: bool,
}

impl AbilityAttr {
    /// Wraps a fragment with its default visibility and no condition.
    #[must_use]
    pub fn new(attr: AbAttr) -> Self {
        let show_ability = attr.shown_by_default();
        Self {
            attr,
            condition: None,
            show_ability,
        }
    }

    /// Gates the fragment on a condition.
    #[must_use]
    pub fn when(mut self, condition: AttrCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Overrides visibility.
    #[must_use]
    pub fn shown(mut self, show: bool) -> Self {
        self.show_ability = show;
        self
    }

    /// Returns the fragment.
    #[must_use]
    pub const fn attr(&self) -> &AbAttr {
        &self.attr
    }

    /// Returns the capability category.
    #[must_use]
    pub const fn kind(&self) -> AbAttrKind {
        self.attr.kind()
    }

    /// Returns the gate.
    #[must_use]
    pub const fn condition(&self) -> Option<&AttrCondition> {
        self.condition.as_ref()
    }

    /// Returns `true` if firing reveals the ability.
    #[must_use]
    pub const fn show_ability(&self) -> bool {
        self.show_ability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        let attr = AbAttr::TypeImmunity(TypeImmunity::new(Element::Ground));
        assert_eq!(attr.kind(), AbAttrKind::TypeImmunity);
        assert!(attr.as_pre_defend().is_some());
        assert!(attr.as_post_defend().is_none());
        assert!(AbAttrKind::TYPE_IMMUNITY.contains(&attr.kind()));
    }

    #[test]
    fn passive_fragments_are_hidden_by_default() {
        let hidden = AbilityAttr::new(AbAttr::StatMultiplier(StatMultiplier {
            stat: BattleStat::Accuracy,
            factor: 1.3,
            category: None,
        }));
        assert!(!hidden.show_ability());

        let shown = AbilityAttr::new(AbAttr::ProtectStat(ProtectStat { stat: None }));
        assert!(shown.show_ability());
        assert!(!shown.shown(false).show_ability());
    }

    #[test]
    fn stat_multiplier_respects_category() {
        let hustle = StatMultiplier {
            stat: BattleStat::Accuracy,
            factor: 0.8,
            category: Some(MoveCategory::Physical),
        };
        let mut multiplier = NumberHolder::new(1.0);
        assert!(!hustle.apply_stat_multiplier(BattleStat::Accuracy, None, &mut multiplier));
        assert!(!hustle.apply_stat_multiplier(BattleStat::Evasion, None, &mut multiplier));
        assert_eq!(multiplier.value, 1.0);
    }

    #[test]
    fn chance_multiplier_skips_zero_and_caps() {
        let serene = MoveEffectChanceMultiplier { factor: 2.0 };
        let mut ctx = EngineContext::new(crate::config::BattleConfig::default(), Field::new(1));
        let mv = Move::new("probe", "Probe", Element::Normal, MoveCategory::Special);

        let mut zero = NumberHolder::new(0.0);
        assert!(!serene.apply_effect_chance(&mut ctx, CombatantId::new(1), &mv, &mut zero, true));

        let mut high = NumberHolder::new(70.0);
        assert!(serene.apply_effect_chance(&mut ctx, CombatantId::new(1), &mv, &mut high, true));
        assert_eq!(high.value, 100.0);
    }

    #[test]
    fn conditions_read_holder_state() {
        let mut field = Field::new(1);
        let id = field.spawn(crate::combatant::CombatantTemplate::new(
            "Holder",
            crate::combatant::Side::Player,
            50,
        ));
        let holder = field.get(id).unwrap().clone();
        assert!(AttrCondition::FullHp.holds(&holder, &field));
        assert!(!AttrCondition::HpAtMost(0.33).holds(&holder, &field));
        assert!(!AttrCondition::Weather(WeatherKind::Sandstorm).holds(&holder, &field));
    }
}
