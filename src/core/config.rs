//! Tunable configuration for the combat core.
//!
//! Every section deserializes with `#[serde(default)]`, so a config file only
//! needs the values it wants to override.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::constants::*;
use super::error::GameError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub enable_critical_hits: bool,
    pub allow_negotiation: bool,
    /// Forces the flee success chance (debug/testing).
    pub flee_success_override: Option<f64>,
    pub pre_combat_delay: f64,
    pub enemy_turn_delay: f64,
    pub post_combat_cooldown: f64,
    pub defeat_money_loss_ratio: f64,
    pub defeat_injury_health_penalty: f64,
    pub defeat_injury_duration: f64,
    pub flee_mood_penalty: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            enable_critical_hits: true,
            allow_negotiation: true,
            flee_success_override: None,
            pre_combat_delay: PRE_COMBAT_DELAY_SECONDS,
            enemy_turn_delay: ENEMY_TURN_DELAY_SECONDS,
            post_combat_cooldown: POST_COMBAT_COOLDOWN_SECONDS,
            defeat_money_loss_ratio: DEFEAT_MONEY_LOSS_RATIO,
            defeat_injury_health_penalty: DEFEAT_INJURY_HEALTH_PENALTY,
            defeat_injury_duration: DEFEAT_INJURY_DURATION_SECONDS,
            flee_mood_penalty: FLEE_MOOD_PENALTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    pub enabled: bool,
    pub encounter_check_interval: f64,
    pub base_encounter_chance: f64,
    pub max_enemies_per_encounter: usize,
    pub base_group_chance: f64,
    pub enable_ambushes: bool,
    pub ambush_chance: f64,
    pub preparation_delay: f64,
    pub history_seconds: f64,
    /// Every check triggers an encounter (debug).
    pub force_encounters: bool,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            encounter_check_interval: ENCOUNTER_CHECK_INTERVAL_SECONDS,
            base_encounter_chance: BASE_ENCOUNTER_CHANCE,
            max_enemies_per_encounter: MAX_ENEMIES_PER_ENCOUNTER,
            base_group_chance: BASE_GROUP_CHANCE,
            enable_ambushes: true,
            ambush_chance: AMBUSH_CHANCE,
            preparation_delay: ENCOUNTER_PREPARATION_SECONDS,
            history_seconds: ENCOUNTER_HISTORY_SECONDS,
            force_encounters: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsequenceConfig {
    pub allow_injuries: bool,
    pub allow_retaliation: bool,
    pub enable_random_events: bool,
    pub base_reputation_gain: f64,
    pub base_reputation_loss: f64,
    pub hospital_chance: f64,
    pub hospital_cost: f64,
    pub base_injury_chance: f64,
    pub witness_report_chance: f64,
    pub event_check_interval: f64,
    pub base_event_chance: f64,
    /// Every eligible fight injures the player (debug).
    pub force_injury: bool,
}

impl Default for ConsequenceConfig {
    fn default() -> Self {
        Self {
            allow_injuries: true,
            allow_retaliation: true,
            enable_random_events: true,
            base_reputation_gain: BASE_REPUTATION_GAIN,
            base_reputation_loss: BASE_REPUTATION_LOSS,
            hospital_chance: HOSPITAL_CHANCE,
            hospital_cost: HOSPITAL_COST,
            base_injury_chance: BASE_INJURY_CHANCE,
            witness_report_chance: WITNESS_REPORT_CHANCE,
            event_check_interval: EVENT_CHECK_INTERVAL_SECONDS,
            base_event_chance: BASE_EVENT_CHANCE,
            force_injury: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub combat: CombatConfig,
    pub encounters: EncounterConfig,
    pub consequences: ConsequenceConfig,
}

impl GameConfig {
    /// Encounters on every check and guaranteed injuries, for exercising the
    /// whole pipeline quickly.
    pub fn debug() -> Self {
        Self {
            encounters: EncounterConfig {
                force_encounters: true,
                encounter_check_interval: 5.0,
                ..Default::default()
            },
            consequences: ConsequenceConfig {
                force_injury: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let probabilities = [
            ("encounters.base_encounter_chance", self.encounters.base_encounter_chance),
            ("encounters.base_group_chance", self.encounters.base_group_chance),
            ("encounters.ambush_chance", self.encounters.ambush_chance),
            ("consequences.hospital_chance", self.consequences.hospital_chance),
            ("consequences.base_injury_chance", self.consequences.base_injury_chance),
            ("consequences.witness_report_chance", self.consequences.witness_report_chance),
            ("consequences.base_event_chance", self.consequences.base_event_chance),
            ("combat.defeat_money_loss_ratio", self.combat.defeat_money_loss_ratio),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(GameError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if let Some(flee) = self.combat.flee_success_override {
            if !(0.0..=1.0).contains(&flee) {
                return Err(GameError::InvalidConfig(format!(
                    "combat.flee_success_override must be within [0, 1], got {}",
                    flee
                )));
            }
        }

        let intervals = [
            ("encounters.encounter_check_interval", self.encounters.encounter_check_interval),
            ("consequences.event_check_interval", self.consequences.event_check_interval),
        ];
        for (name, value) in intervals {
            if value <= 0.0 || value.is_nan() {
                return Err(GameError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.encounters.max_enemies_per_encounter == 0 {
            return Err(GameError::InvalidConfig(
                "encounters.max_enemies_per_encounter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
