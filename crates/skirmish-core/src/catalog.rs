//! Static move and ability tables.
//!
//! A [`Catalog`] maps ids to shared, immutable [`Move`] and [`Ability`]
//! definitions. Roster entries name moves and abilities by id; the engine
//! resolves them here when a battle is assembled.
//!
//! # Example
//!
//! ```
//! use skirmish_core::catalog::Catalog;
//!
//! let catalog = Catalog::standard();
//! let surf = catalog.move_by_id("surf").unwrap();
//! assert!(surf.target().is_spread());
//! assert!(catalog.ability("levitate").unwrap().is_ignorable());
//! assert!(catalog.move_by_id("splash_kick").is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ability::{
    AbAttr, Ability, AbilityAttr, AbilityId, AttrCondition, BattlerTagImmunity, BlockStatusEffect,
    ContactDamage, ContactStatus, FullHpResistType, IgnoreMoveEffects, IgnoreOpponentStatStages,
    MoveEffectChanceMultiplier, MoveImmunity, MoveTypePowerBoost, PostDefendStatStageChange,
    PostStatStageChangeBoost, PostSummonMessage, PostSummonStatStageChange, ProtectStat,
    ReceivedMoveDamageMultiplier, StatMultiplier, TypeImmunity, TypeImmunityAddTag,
    TypeImmunityHeal, TypeImmunityStatStageChange, WonderSkin,
};
use crate::combatant::{BattlerTagKind, StatusKind};
use crate::element::Element;
use crate::field::{ArenaTagKind, WeatherKind};
use crate::moves::{
    Accuracy, Move, MoveAttr, MoveCategory, MoveCondition, MoveEffect, MoveEffectAttr, MoveFlags,
    MoveId, MoveTarget, MultiHitKind,
};
use crate::stat::BattleStat;

use MoveCategory::{Physical, Special, Status};

/// Registry of move and ability definitions, keyed by id.
#[derive(Default, Clone)]
pub struct Catalog {
    moves: BTreeMap<MoveId, Arc<Move>>,
    abilities: BTreeMap<AbilityId, Arc<Ability>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a move, replacing any move with the same id.
    pub fn register_move(&mut self, mv: Move) {
        self.moves.insert(mv.id().clone(), Arc::new(mv));
    }

    /// Registers an ability, replacing any ability with the same id.
    pub fn register_ability(&mut self, ability: Ability) {
        self.abilities.insert(ability.id().clone(), Arc::new(ability));
    }

    /// Returns the move with the given id.
    #[must_use]
    pub fn move_by_id(&self, id: &str) -> Option<Arc<Move>> {
        self.moves.get(&MoveId::new(id)).cloned()
    }

    /// Returns the ability with the given id.
    #[must_use]
    pub fn ability(&self, id: &str) -> Option<Arc<Ability>> {
        self.abilities.get(&AbilityId::new(id)).cloned()
    }

    /// Iterates registered move ids in order.
    pub fn move_ids(&self) -> impl Iterator<Item = &MoveId> {
        self.moves.keys()
    }

    /// Iterates registered ability ids in order.
    pub fn ability_ids(&self) -> impl Iterator<Item = &AbilityId> {
        self.abilities.keys()
    }

    /// Creates a catalog pre-populated with the standard moves and abilities.
    ///
    /// The set is small but covers every move and ability attribute the
    /// engine knows.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for mv in standard_moves() {
            catalog.register_move(mv);
        }
        for ability in standard_abilities() {
            catalog.register_ability(ability);
        }
        catalog
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("move_count", &self.moves.len())
            .field("ability_count", &self.abilities.len())
            .finish()
    }
}

// =============================================================================
// Moves
// =============================================================================

fn effect(attr: MoveEffectAttr) -> MoveAttr {
    MoveAttr::Effect(attr)
}

fn target_status(kind: StatusKind) -> MoveAttr {
    effect(MoveEffectAttr::on_target(MoveEffect::Status(kind)))
}

fn target_tag(kind: BattlerTagKind) -> MoveAttr {
    effect(MoveEffectAttr::on_target(MoveEffect::AddTag(kind)))
}

fn target_stages(stats: &[BattleStat], stages: i8) -> MoveAttr {
    effect(MoveEffectAttr::on_target(MoveEffect::StatStages {
        stats: stats.to_vec(),
        stages,
    }))
}

fn user_stages(stats: &[BattleStat], stages: i8) -> MoveAttr {
    effect(MoveEffectAttr::on_user(MoveEffect::StatStages {
        stats: stats.to_vec(),
        stages,
    }))
}

fn protection(id: &str, name: &str, element: Element, tag: BattlerTagKind) -> Move {
    Move::new(id, name, element, Status)
        .with_accuracy(Accuracy::Sure)
        .with_pp(10)
        .with_priority(4)
        .with_target(MoveTarget::User)
        .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::Protect(tag))))
        .with_condition(MoveCondition::ProtectStreak)
}

fn side_guard(id: &str, name: &str, element: Element, kind: ArenaTagKind) -> Move {
    Move::new(id, name, element, Status)
        .with_accuracy(Accuracy::Sure)
        .with_pp(10)
        .with_priority(3)
        .with_target(MoveTarget::UserSide)
        .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::ArenaTag {
            kind,
            both_sides: false,
        })))
}

fn weather_move(id: &str, name: &str, element: Element, weather: WeatherKind) -> Move {
    Move::new(id, name, element, Status)
        .with_accuracy(Accuracy::Sure)
        .with_pp(5)
        .with_target(MoveTarget::BothSides)
        .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::Weather(weather))))
}

fn charge(tag: BattlerTagKind, message: &str) -> MoveAttr {
    MoveAttr::Charge {
        tag: Some(tag),
        message: message.to_string(),
    }
}

#[allow(clippy::too_many_lines)]
fn standard_moves() -> Vec<Move> {
    use BattleStat::{Accuracy as Acc, Attack, Defense, Evasion, SpDefense};
    use Element::{
        Dragon, Electric, Fairy, Fighting, Fire, Flying, Ghost, Grass, Ground, Ice, Normal,
        Poison, Psychic, Rock, Steel, Water,
    };
    let contact = MoveFlags::MAKES_CONTACT;

    vec![
        // Plain attacks.
        Move::new("tackle", "Tackle", Normal, Physical)
            .with_power(40)
            .with_pp(35)
            .with_flags(contact),
        Move::new("quick_attack", "Quick Attack", Normal, Physical)
            .with_power(40)
            .with_pp(30)
            .with_priority(1)
            .with_flags(contact),
        Move::new("vine_whip", "Vine Whip", Grass, Physical)
            .with_power(45)
            .with_pp(25)
            .with_flags(contact),
        Move::new("water_gun", "Water Gun", Water, Special)
            .with_power(40)
            .with_pp(25),
        Move::new("swift", "Swift", Normal, Special)
            .with_power(60)
            .with_accuracy(Accuracy::Sure)
            .with_pp(20)
            .with_target(MoveTarget::AllNearEnemies),
        Move::new("hyper_voice", "Hyper Voice", Normal, Special)
            .with_power(90)
            .with_target(MoveTarget::AllNearEnemies)
            .with_flags(MoveFlags::SOUND_BASED),
        Move::new("feint", "Feint", Normal, Physical)
            .with_power(30)
            .with_priority(2)
            .with_flags(MoveFlags::IGNORE_PROTECT),
        // Secondary effects.
        Move::new("thunderbolt", "Thunderbolt", Electric, Special)
            .with_power(90)
            .with_pp(15)
            .with_chance(10)
            .with_attr(target_status(StatusKind::Paralysis)),
        Move::new("thunder", "Thunder", Electric, Special)
            .with_power(110)
            .with_accuracy(Accuracy::Percent(70))
            .with_chance(30)
            .with_attr(target_status(StatusKind::Paralysis))
            .with_attr(MoveAttr::WeatherAccuracy {
                weather: WeatherKind::Rain,
                accuracy: Accuracy::Sure,
            })
            .with_attr(MoveAttr::WeatherAccuracy {
                weather: WeatherKind::Sun,
                accuracy: Accuracy::Percent(50),
            })
            .with_attr(MoveAttr::HitsTag {
                tag: BattlerTagKind::Flying,
                double_damage: false,
            }),
        Move::new("flamethrower", "Flamethrower", Fire, Special)
            .with_power(90)
            .with_pp(15)
            .with_chance(10)
            .with_attr(target_status(StatusKind::Burn)),
        Move::new("ember", "Ember", Fire, Special)
            .with_power(40)
            .with_pp(25)
            .with_chance(10)
            .with_attr(target_status(StatusKind::Burn)),
        Move::new("ice_beam", "Ice Beam", Ice, Special)
            .with_power(90)
            .with_chance(10)
            .with_attr(target_status(StatusKind::Freeze)),
        Move::new("psychic", "Psychic", Psychic, Special)
            .with_power(90)
            .with_chance(10)
            .with_attr(target_stages(&[SpDefense], -1)),
        Move::new("sludge_bomb", "Sludge Bomb", Poison, Special)
            .with_power(90)
            .with_chance(30)
            .with_flags(MoveFlags::BALLISTIC)
            .with_attr(target_status(StatusKind::Poison)),
        Move::new("rock_slide", "Rock Slide", Rock, Physical)
            .with_power(75)
            .with_accuracy(Accuracy::Percent(90))
            .with_chance(30)
            .with_target(MoveTarget::AllNearEnemies)
            .with_attr(target_tag(BattlerTagKind::Flinched)),
        Move::new("iron_head", "Iron Head", Steel, Physical)
            .with_power(80)
            .with_pp(15)
            .with_chance(30)
            .with_flags(contact)
            .with_attr(target_tag(BattlerTagKind::Flinched)),
        Move::new("fake_out", "Fake Out", Normal, Physical)
            .with_power(40)
            .with_priority(3)
            .with_flags(contact)
            .with_attr(target_tag(BattlerTagKind::Flinched))
            .with_condition(MoveCondition::FirstTurnOnly),
        // User-side effects.
        Move::new("close_combat", "Close Combat", Fighting, Physical)
            .with_power(120)
            .with_pp(5)
            .with_flags(contact)
            .with_attr(user_stages(&[Defense, SpDefense], -1)),
        Move::new("giga_drain", "Giga Drain", Grass, Special)
            .with_power(75)
            .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::Drain { divisor: 2 }))),
        Move::new("double_edge", "Double-Edge", Normal, Physical)
            .with_power(120)
            .with_pp(15)
            .with_flags(contact)
            .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::Recoil { divisor: 3 }))),
        Move::new("glaive_rush", "Glaive Rush", Dragon, Physical)
            .with_power(120)
            .with_pp(5)
            .with_flags(contact)
            .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::AddTag(
                BattlerTagKind::AlwaysGetHit,
            )))),
        Move::new("water_pledge", "Water Pledge", Water, Special)
            .with_power(80)
            .with_attr(effect(
                MoveEffectAttr::on_user(MoveEffect::ArenaTag {
                    kind: ArenaTagKind::Rainbow,
                    both_sides: false,
                })
                .first_target_only(),
            )),
        // Spread and semi-invulnerable interactions.
        Move::new("surf", "Surf", Water, Special)
            .with_power(90)
            .with_pp(15)
            .with_target(MoveTarget::AllNearOthers)
            .with_attr(MoveAttr::HitsTag {
                tag: BattlerTagKind::Underwater,
                double_damage: true,
            }),
        Move::new("earthquake", "Earthquake", Ground, Physical)
            .with_power(100)
            .with_target(MoveTarget::AllNearOthers)
            .with_attr(MoveAttr::HitsTag {
                tag: BattlerTagKind::Underground,
                double_damage: true,
            }),
        Move::new("fly", "Fly", Flying, Physical)
            .with_power(90)
            .with_accuracy(Accuracy::Percent(95))
            .with_pp(15)
            .with_flags(contact)
            .with_attr(charge(BattlerTagKind::Flying, "{name} flew up high!")),
        Move::new("dig", "Dig", Ground, Physical)
            .with_power(80)
            .with_flags(contact)
            .with_attr(charge(
                BattlerTagKind::Underground,
                "{name} burrowed its way under the ground!",
            )),
        Move::new("dive", "Dive", Water, Physical)
            .with_power(80)
            .with_flags(contact)
            .with_attr(charge(BattlerTagKind::Underwater, "{name} hid underwater!")),
        // Multi-hit.
        Move::new("double_kick", "Double Kick", Fighting, Physical)
            .with_power(30)
            .with_pp(30)
            .with_flags(contact)
            .with_attr(MoveAttr::MultiHit(MultiHitKind::Fixed(2))),
        Move::new("bullet_seed", "Bullet Seed", Grass, Physical)
            .with_power(25)
            .with_pp(30)
            .with_flags(MoveFlags::BALLISTIC)
            .with_attr(MoveAttr::MultiHit(MultiHitKind::TwoToFive)),
        Move::new("triple_axel", "Triple Axel", Ice, Physical)
            .with_power(20)
            .with_accuracy(Accuracy::Percent(90))
            .with_flags(contact | MoveFlags::CHECK_ALL_HITS)
            .with_attr(MoveAttr::MultiHit(MultiHitKind::Fixed(3))),
        // Accuracy rewrites.
        Move::new("fissure", "Fissure", Ground, Physical)
            .with_accuracy(Accuracy::Percent(30))
            .with_pp(5)
            .with_attr(MoveAttr::OneHitKo)
            .with_attr(MoveAttr::HitsTag {
                tag: BattlerTagKind::Underground,
                double_damage: false,
            }),
        Move::new("toxic", "Toxic", Poison, Status)
            .with_accuracy(Accuracy::Percent(90))
            .with_attr(target_status(StatusKind::Toxic))
            .with_attr(MoveAttr::ToxicAccuracy { element: Poison }),
        Move::new("sacred_sword", "Sacred Sword", Fighting, Physical)
            .with_power(90)
            .with_pp(15)
            .with_flags(contact)
            .with_attr(MoveAttr::IgnoreOpponentStatStages),
        // Status moves on the target.
        Move::new("thunder_wave", "Thunder Wave", Electric, Status)
            .with_accuracy(Accuracy::Percent(90))
            .with_pp(20)
            .with_flags(MoveFlags::RESPECT_TYPE_IMMUNITY)
            .with_attr(target_status(StatusKind::Paralysis)),
        Move::new("will_o_wisp", "Will-O-Wisp", Fire, Status)
            .with_accuracy(Accuracy::Percent(85))
            .with_pp(15)
            .with_attr(target_status(StatusKind::Burn)),
        Move::new("confuse_ray", "Confuse Ray", Ghost, Status)
            .with_attr(target_tag(BattlerTagKind::Confused)),
        Move::new("sand_attack", "Sand Attack", Ground, Status)
            .with_pp(15)
            .with_attr(target_stages(&[Acc], -1)),
        Move::new("growl", "Growl", Normal, Status)
            .with_pp(40)
            .with_target(MoveTarget::AllNearEnemies)
            .with_flags(MoveFlags::SOUND_BASED)
            .with_attr(target_stages(&[Attack], -1)),
        Move::new("lock_on", "Lock-On", Normal, Status)
            .with_accuracy(Accuracy::Sure)
            .with_pp(5)
            .with_attr(effect(MoveEffectAttr::on_target(MoveEffect::LockOn))),
        Move::new("foresight", "Foresight", Normal, Status)
            .with_accuracy(Accuracy::Sure)
            .with_pp(40)
            .with_attr(target_tag(BattlerTagKind::Exposed)),
        Move::new("telekinesis", "Telekinesis", Psychic, Status)
            .with_accuracy(Accuracy::Sure)
            .with_pp(15)
            .with_attr(target_tag(BattlerTagKind::Telekinesis)),
        Move::new("gastro_acid", "Gastro Acid", Poison, Status)
            .with_attr(target_tag(BattlerTagKind::AbilitySuppressed)),
        // Status moves on the user.
        Move::new("swords_dance", "Swords Dance", Normal, Status)
            .with_accuracy(Accuracy::Sure)
            .with_pp(20)
            .with_target(MoveTarget::User)
            .with_attr(user_stages(&[Attack], 2)),
        Move::new("double_team", "Double Team", Normal, Status)
            .with_accuracy(Accuracy::Sure)
            .with_pp(15)
            .with_target(MoveTarget::User)
            .with_attr(user_stages(&[Evasion], 1)),
        Move::new("recover", "Recover", Normal, Status)
            .with_accuracy(Accuracy::Sure)
            .with_pp(5)
            .with_target(MoveTarget::User)
            .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::Heal { divisor: 2 })))
            .with_condition(MoveCondition::UserNotFullHp),
        protection("protect", "Protect", Normal, BattlerTagKind::Protected),
        protection("spiky_shield", "Spiky Shield", Grass, BattlerTagKind::SpikyShield),
        protection("kings_shield", "King's Shield", Steel, BattlerTagKind::KingsShield),
        // Field.
        side_guard("quick_guard", "Quick Guard", Fighting, ArenaTagKind::QuickGuard),
        side_guard("wide_guard", "Wide Guard", Rock, ArenaTagKind::WideGuard),
        side_guard("crafty_shield", "Crafty Shield", Fairy, ArenaTagKind::CraftyShield),
        side_guard("mat_block", "Mat Block", Fighting, ArenaTagKind::MatBlock)
            .with_priority(0)
            .with_condition(MoveCondition::FirstTurnOnly),
        Move::new("gravity", "Gravity", Psychic, Status)
            .with_accuracy(Accuracy::Sure)
            .with_pp(5)
            .with_target(MoveTarget::BothSides)
            .with_attr(effect(MoveEffectAttr::on_user(MoveEffect::ArenaTag {
                kind: ArenaTagKind::Gravity,
                both_sides: true,
            }))),
        weather_move("rain_dance", "Rain Dance", Water, WeatherKind::Rain),
        weather_move("sunny_day", "Sunny Day", Fire, WeatherKind::Sun),
        weather_move("sandstorm", "Sandstorm", Rock, WeatherKind::Sandstorm),
    ]
}

// =============================================================================
// Abilities
// =============================================================================

fn attr(attr: AbAttr) -> AbilityAttr {
    AbilityAttr::new(attr)
}

fn ability(id: &str, name: &str, attrs: Vec<AbilityAttr>) -> Ability {
    attrs
        .into_iter()
        .fold(Ability::new(id, name), Ability::with_attr)
}

fn stat_multiplier(stat: BattleStat, factor: f64, category: Option<MoveCategory>) -> AbilityAttr {
    attr(AbAttr::StatMultiplier(StatMultiplier {
        stat,
        factor,
        category,
    }))
}

fn pinch_boost(id: &str, name: &str, element: Element) -> Ability {
    ability(
        id,
        name,
        vec![attr(AbAttr::MoveTypePowerBoost(MoveTypePowerBoost {
            element,
            factor: 1.5,
        }))
        .when(AttrCondition::HpAtMost(1.0 / 3.0))],
    )
}

fn contact_status(id: &str, name: &str, status: StatusKind) -> Ability {
    ability(
        id,
        name,
        vec![attr(AbAttr::ContactStatus(ContactStatus {
            chance: 30,
            statuses: vec![status],
        }))],
    )
}

fn absorb(id: &str, name: &str, element: Element) -> Ability {
    ability(
        id,
        name,
        vec![attr(AbAttr::TypeImmunityHeal(TypeImmunityHeal { element }))],
    )
    .ignorable()
}

fn absorb_boost(id: &str, name: &str, element: Element, stat: BattleStat) -> Ability {
    ability(
        id,
        name,
        vec![attr(AbAttr::TypeImmunityStatStageChange(
            TypeImmunityStatStageChange {
                element,
                stat,
                stages: 1,
            },
        ))],
    )
    .ignorable()
}

fn status_block(id: &str, name: &str, statuses: &[StatusKind]) -> Ability {
    ability(
        id,
        name,
        vec![attr(AbAttr::BlockStatusEffect(BlockStatusEffect {
            statuses: statuses.to_vec(),
        }))],
    )
    .ignorable()
}

fn tag_block(id: &str, name: &str, tag: BattlerTagKind) -> Ability {
    ability(
        id,
        name,
        vec![attr(AbAttr::BattlerTagImmunity(BattlerTagImmunity { tags: vec![tag] }))],
    )
    .ignorable()
}

fn summon_message(template: &str) -> AbilityAttr {
    attr(AbAttr::PostSummonMessage(PostSummonMessage {
        template: template.to_string(),
    }))
}

#[allow(clippy::too_many_lines)]
fn standard_abilities() -> Vec<Ability> {
    use BattleStat::{Accuracy as Acc, Attack, Defense, Evasion, SpAttack, Speed};

    vec![
        Ability::none(),
        // Accuracy and evasion.
        ability("no_guard", "No Guard", vec![attr(AbAttr::AlwaysHit)]),
        ability(
            "compound_eyes",
            "Compound Eyes",
            vec![stat_multiplier(Acc, 1.3, None)],
        ),
        ability(
            "hustle",
            "Hustle",
            vec![
                stat_multiplier(Attack, 1.5, Some(Physical)),
                stat_multiplier(Acc, 0.8, Some(Physical)),
            ],
        ),
        ability(
            "sand_veil",
            "Sand Veil",
            vec![stat_multiplier(Evasion, 1.25, None)
                .when(AttrCondition::Weather(WeatherKind::Sandstorm))],
        )
        .ignorable(),
        ability(
            "keen_eye",
            "Keen Eye",
            vec![
                attr(AbAttr::ProtectStat(ProtectStat { stat: Some(Acc) })),
                attr(AbAttr::IgnoreOpponentStatStages(IgnoreOpponentStatStages {
                    stats: vec![Evasion],
                })),
            ],
        )
        .ignorable(),
        ability(
            "unaware",
            "Unaware",
            vec![attr(AbAttr::IgnoreOpponentStatStages(
                IgnoreOpponentStatStages::all(),
            ))],
        )
        .ignorable(),
        ability("wonder_skin", "Wonder Skin", vec![attr(AbAttr::WonderSkin(WonderSkin))]).ignorable(),
        // Secondary effect chance.
        ability(
            "serene_grace",
            "Serene Grace",
            vec![attr(AbAttr::MoveEffectChanceMultiplier(
                MoveEffectChanceMultiplier { factor: 2.0 },
            ))],
        ),
        ability(
            "shield_dust",
            "Shield Dust",
            vec![attr(AbAttr::IgnoreMoveEffects(IgnoreMoveEffects))],
        )
        .ignorable(),
        // Immunities.
        ability(
            "levitate",
            "Levitate",
            vec![attr(AbAttr::TypeImmunity(TypeImmunity::new(Element::Ground)))],
        )
        .ignorable(),
        absorb("water_absorb", "Water Absorb", Element::Water),
        absorb("volt_absorb", "Volt Absorb", Element::Electric),
        ability(
            "flash_fire",
            "Flash Fire",
            vec![attr(AbAttr::TypeImmunityAddTag(TypeImmunityAddTag {
                element: Element::Fire,
                tag: BattlerTagKind::FlashFire,
            }))],
        )
        .ignorable(),
        absorb_boost("motor_drive", "Motor Drive", Element::Electric, Speed),
        absorb_boost("sap_sipper", "Sap Sipper", Element::Grass, Attack),
        ability(
            "soundproof",
            "Soundproof",
            vec![attr(AbAttr::MoveImmunity(MoveImmunity {
                flag: MoveFlags::SOUND_BASED,
            }))],
        )
        .ignorable(),
        ability(
            "bulletproof",
            "Bulletproof",
            vec![attr(AbAttr::MoveImmunity(MoveImmunity {
                flag: MoveFlags::BALLISTIC,
            }))],
        )
        .ignorable(),
        // Damage taken.
        ability(
            "tera_shell",
            "Tera Shell",
            vec![attr(AbAttr::FullHpResistType(FullHpResistType))],
        )
        .ignorable(),
        ability(
            "multiscale",
            "Multiscale",
            vec![attr(AbAttr::ReceivedMoveDamageMultiplier(
                ReceivedMoveDamageMultiplier { factor: 0.5 },
            ))
            .when(AttrCondition::FullHp)],
        )
        .ignorable(),
        // Attacker markers.
        ability("skill_link", "Skill Link", vec![attr(AbAttr::MaxMultiHit)]),
        ability(
            "unseen_fist",
            "Unseen Fist",
            vec![attr(AbAttr::IgnoreProtectOnContact)],
        ),
        ability(
            "mold_breaker",
            "Mold Breaker",
            vec![
                attr(AbAttr::MoveAbilityBypass),
                summon_message("{name} breaks the mold!"),
            ],
        ),
        ability("rock_head", "Rock Head", vec![attr(AbAttr::BlockRecoil)]),
        // Entry.
        ability(
            "intimidate",
            "Intimidate",
            vec![attr(AbAttr::PostSummonStatStageChange(
                PostSummonStatStageChange {
                    stats: vec![Attack],
                    stages: -1,
                    opponents: true,
                },
            ))],
        ),
        ability(
            "pressure",
            "Pressure",
            vec![summon_message("{name} is exerting its pressure!")],
        ),
        // Stat stage guards and reactions.
        ability(
            "clear_body",
            "Clear Body",
            vec![attr(AbAttr::ProtectStat(ProtectStat { stat: None }))],
        )
        .ignorable(),
        ability(
            "hyper_cutter",
            "Hyper Cutter",
            vec![attr(AbAttr::ProtectStat(ProtectStat { stat: Some(Attack) }))],
        )
        .ignorable(),
        ability(
            "defiant",
            "Defiant",
            vec![attr(AbAttr::PostStatStageChangeBoost(
                PostStatStageChangeBoost {
                    stat: Attack,
                    stages: 2,
                },
            ))],
        ),
        ability(
            "competitive",
            "Competitive",
            vec![attr(AbAttr::PostStatStageChangeBoost(
                PostStatStageChangeBoost {
                    stat: SpAttack,
                    stages: 2,
                },
            ))],
        ),
        // Contact punishment.
        contact_status("static", "Static", StatusKind::Paralysis),
        contact_status("flame_body", "Flame Body", StatusKind::Burn),
        contact_status("poison_point", "Poison Point", StatusKind::Poison),
        ability(
            "rough_skin",
            "Rough Skin",
            vec![attr(AbAttr::ContactDamage(ContactDamage { divisor: 8 }))],
        ),
        ability(
            "stamina",
            "Stamina",
            vec![attr(AbAttr::PostDefendStatStageChange(
                PostDefendStatStageChange {
                    stat: Defense,
                    stages: 1,
                },
            ))],
        ),
        // Status and tag immunity.
        status_block("limber", "Limber", &[StatusKind::Paralysis]),
        status_block("immunity", "Immunity", &[StatusKind::Poison, StatusKind::Toxic]),
        status_block("insomnia", "Insomnia", &[StatusKind::Sleep]),
        tag_block("own_tempo", "Own Tempo", BattlerTagKind::Confused),
        tag_block("inner_focus", "Inner Focus", BattlerTagKind::Flinched),
        // Pinch boosts.
        pinch_boost("blaze", "Blaze", Element::Fire),
        pinch_boost("torrent", "Torrent", Element::Water),
        pinch_boost("overgrow", "Overgrow", Element::Grass),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbAttrKind;
    use crate::moves::MoveAttrKind;

    #[test]
    fn lookups_resolve_registered_ids() {
        let catalog = Catalog::standard();
        let tackle = catalog.move_by_id("tackle").unwrap();
        assert_eq!(tackle.name(), "Tackle");
        assert!(tackle.makes_contact());
        assert!(catalog.move_by_id("unknown").is_none());
        assert!(catalog.ability("unknown").is_none());
    }

    #[test]
    fn registering_replaces_by_id() {
        let mut catalog = Catalog::new();
        catalog.register_move(Move::new("probe", "Probe", Element::Normal, Physical));
        catalog.register_move(Move::new("probe", "Probe II", Element::Normal, Physical));
        assert_eq!(catalog.move_ids().count(), 1);
        assert_eq!(catalog.move_by_id("probe").unwrap().name(), "Probe II");
    }

    #[test]
    fn every_move_attribute_kind_is_represented() {
        let catalog = Catalog::standard();
        let kinds = [
            MoveAttrKind::Effect,
            MoveAttrKind::HitsTag,
            MoveAttrKind::MultiHit,
            MoveAttrKind::OneHitKo,
            MoveAttrKind::WeatherAccuracy,
            MoveAttrKind::ToxicAccuracy,
            MoveAttrKind::IgnoreOpponentStatStages,
            MoveAttrKind::Charge,
        ];
        for kind in kinds {
            assert!(
                catalog
                    .move_ids()
                    .filter_map(|id| catalog.move_by_id(id.as_str()))
                    .any(|mv| mv.has_attr(kind)),
                "no move with {kind:?}"
            );
        }
    }

    #[test]
    fn marker_abilities_are_present() {
        let catalog = Catalog::standard();
        for (id, kind) in [
            ("no_guard", AbAttrKind::AlwaysHit),
            ("skill_link", AbAttrKind::MaxMultiHit),
            ("unseen_fist", AbAttrKind::IgnoreProtectOnContact),
            ("mold_breaker", AbAttrKind::MoveAbilityBypass),
            ("rock_head", AbAttrKind::BlockRecoil),
        ] {
            assert!(catalog.ability(id).unwrap().has_attr(kind), "{id}");
        }
    }

    #[test]
    fn protections_share_the_streak_condition() {
        let catalog = Catalog::standard();
        for id in ["protect", "spiky_shield", "kings_shield"] {
            let mv = catalog.move_by_id(id).unwrap();
            assert!(mv.is_protection());
            assert!(mv.conditions().contains(&MoveCondition::ProtectStreak));
        }
    }

    #[test]
    fn debug_reports_counts() {
        let text = format!("{:?}", Catalog::new());
        assert_eq!(text, "Catalog { move_count: 0, ability_count: 0 }");
    }
}
