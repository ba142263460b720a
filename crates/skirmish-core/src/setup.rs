//! Battle descriptions: configuration plus a roster written in catalog ids.
//!
//! A [`BattleSetup`] is what a battle file deserializes into. Its combatants
//! name their moves and ability by id; [`BattleSetup::resolve`] looks them up
//! in a [`Catalog`] and produces the templates the engine spawns.
//!
//! # Example
//!
//! ```
//! use skirmish_core::catalog::Catalog;
//! use skirmish_core::setup::BattleSetup;
//!
//! let setup = BattleSetup::from_json_str(r#"{
//!     "config": { "seed": 3 },
//!     "combatants": [
//!         { "name": "Hero", "side": "player", "level": 50, "moves": ["tackle"] },
//!         { "name": "Foe", "side": "enemy", "level": 50, "types": ["fire"], "moves": ["ember"] }
//!     ]
//! }"#).unwrap();
//!
//! let mut engine = setup.into_engine(&Catalog::standard()).unwrap();
//! engine.run_headless();
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ability::AbilityId;
use crate::catalog::Catalog;
use crate::combatant::{CombatantTemplate, Side};
use crate::config::BattleConfig;
use crate::element::Element;
use crate::engine::Engine;
use crate::error::{ConfigError, EngineError};
use crate::moves::MoveId;
use crate::stat::BaseStats;

/// One roster entry, by catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSpec {
    /// Display name.
    pub name: String,
    /// Team.
    pub side: Side,
    /// Level, 1 to 100.
    pub level: u32,
    /// Elemental types; Normal when omitted.
    #[serde(default = "default_types")]
    pub types: Vec<Element>,
    /// Base stats; flat 80s when omitted.
    #[serde(default)]
    pub base: Option<BaseStats>,
    /// Ability id; none when omitted.
    #[serde(default)]
    pub ability: Option<AbilityId>,
    /// Move ids, in slot order.
    pub moves: Vec<MoveId>,
}

fn default_types() -> Vec<Element> {
    vec![Element::Normal]
}

impl CombatantSpec {
    /// Looks up the entry's moves and ability.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownMove`] or [`EngineError::UnknownAbility`]
    /// for the first id the catalog does not know.
    pub fn resolve(&self, catalog: &Catalog) -> Result<CombatantTemplate, EngineError> {
        let mut template = CombatantTemplate::new(self.name.clone(), self.side, self.level)
            .with_types(&self.types);
        if let Some(base) = self.base {
            template = template.with_base(base);
        }
        if let Some(id) = &self.ability {
            let ability = catalog
                .ability(id.as_str())
                .ok_or_else(|| EngineError::UnknownAbility(id.clone()))?;
            template = template.with_ability(ability);
        }
        for id in &self.moves {
            let mv = catalog
                .move_by_id(id.as_str())
                .ok_or_else(|| EngineError::UnknownMove(id.clone()))?;
            template = template.with_move(mv);
        }
        Ok(template)
    }
}

/// A complete battle description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BattleSetup {
    /// Battle tunables.
    #[serde(default)]
    pub config: BattleConfig,
    /// Every combatant of both sides; each side's first entry leads.
    pub combatants: Vec<CombatantSpec>,
}

impl BattleSetup {
    /// Parses a description from JSON and validates its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any error
    /// [`BattleConfig::validate`] reports.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let setup: Self = serde_json::from_str(text)?;
        setup.config.validate()?;
        Ok(setup)
    }

    /// Resolves every roster entry against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Vec<CombatantTemplate>, EngineError> {
        self.combatants.iter().map(|spec| spec.resolve(catalog)).collect()
    }

    /// Resolves the roster and assembles an engine.
    ///
    /// # Errors
    ///
    /// Returns lookup failures and anything [`Engine::new`] rejects.
    pub fn into_engine(self, catalog: &Catalog) -> Result<Engine, EngineError> {
        let roster = self.resolve(catalog)?;
        debug!(combatants = roster.len(), seed = self.config.seed, "battle setup resolved");
        Engine::new(self.config, roster)
    }
}
