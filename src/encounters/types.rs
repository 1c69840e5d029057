use serde::{Deserialize, Serialize};

use crate::combat::{CombatEventType, Enemy};
use crate::world::Location;

/// One generated encounter, from roll to resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyEncounter {
    pub event_type: CombatEventType,
    pub enemies: Vec<Enemy>,
    pub location: Location,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub player_level: u32,
    pub threat_level: f64,
    pub player_won: bool,
    /// False when the encounter closed without a fight (combat refused).
    pub combat_started: bool,
}

impl EnemyEncounter {
    pub fn new(
        event_type: CombatEventType,
        enemies: Vec<Enemy>,
        location: Location,
        start_time: f64,
        player_level: u32,
    ) -> Self {
        let threat_level = threat_of(&enemies);
        Self {
            event_type,
            enemies,
            location,
            start_time,
            end_time: start_time,
            duration: 0.0,
            player_level,
            threat_level,
            player_won: false,
            combat_started: false,
        }
    }

    pub(crate) fn close(&mut self, now: f64, player_won: bool) {
        self.end_time = now;
        self.duration = (now - self.start_time).max(0.0);
        self.player_won = player_won;
    }
}

/// Σ(difficulty·level + max_health/50 + max_damage/20)
pub fn threat_of(enemies: &[Enemy]) -> f64 {
    enemies.iter().map(Enemy::threat).sum()
}

/// Persisted encounter bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemySystemSaveData {
    pub recent_encounters: Vec<EnemyEncounter>,
    pub total_encounters: u32,
    pub encounters_won: u32,
    pub next_check_tick: u64,
    /// An encounter was open when saved. Restore drops it.
    #[serde(default)]
    pub had_active_encounter: bool,
}
