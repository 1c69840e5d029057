use serde::{Deserialize, Serialize};

use crate::core::constants::ENEMY_STANCE_BONUS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyType {
    Thug,
    Robber,
    DrunkPerson,
    Bully,
    Dealer,
    SecurityGuard,
    Bandit,
    GangMember,
    StreetFighter,
    Police,
}

impl EnemyType {
    pub const ALL: [EnemyType; 10] = [
        EnemyType::Thug,
        EnemyType::Robber,
        EnemyType::DrunkPerson,
        EnemyType::Bully,
        EnemyType::Dealer,
        EnemyType::SecurityGuard,
        EnemyType::Bandit,
        EnemyType::GangMember,
        EnemyType::StreetFighter,
        EnemyType::Police,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EnemyType::Thug => "Thug",
            EnemyType::Robber => "Robber",
            EnemyType::DrunkPerson => "Drunk Person",
            EnemyType::Bully => "Bully",
            EnemyType::Dealer => "Dealer",
            EnemyType::SecurityGuard => "Security Guard",
            EnemyType::Bandit => "Bandit",
            EnemyType::GangMember => "Gang Member",
            EnemyType::StreetFighter => "Street Fighter",
            EnemyType::Police => "Police Officer",
        }
    }
}

/// Action-selection policy of an enemy, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiType {
    Aggressive,
    Defensive,
    Balanced,
    Cowardly,
    Tactical,
    Berserker,
    Police,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatState {
    NotInCombat,
    PreCombat,
    PlayerTurn,
    EnemyTurn,
    PlayerWon,
    PlayerLost,
    PlayerFled,
}

impl CombatState {
    pub fn is_in_combat(&self) -> bool {
        matches!(
            self,
            CombatState::PreCombat | CombatState::PlayerTurn | CombatState::EnemyTurn
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CombatState::PlayerWon | CombatState::PlayerLost | CombatState::PlayerFled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatAction {
    Attack,
    Defend,
    Dodge,
    UseItem,
    Flee,
    Negotiate,
    Intimidate,
}

impl CombatAction {
    pub const ALL: [CombatAction; 7] = [
        CombatAction::Attack,
        CombatAction::Defend,
        CombatAction::Dodge,
        CombatAction::UseItem,
        CombatAction::Flee,
        CombatAction::Negotiate,
        CombatAction::Intimidate,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatResult {
    Hit,
    Miss,
    Critical,
    Blocked,
    Dodged,
    Fled,
    Stunned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatEventType {
    Ambush,
    RandomEncounter,
    Robbery,
    TerritoryDispute,
    GangConflict,
    Revenge,
}

/// Who performed a resolved combat action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combatant {
    Player,
    Enemy(usize),
}

/// One combat opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub enemy_type: EnemyType,
    pub level: u32,
    pub difficulty: f64,
    pub max_health: f64,
    pub current_health: f64,
    pub min_damage: f64,
    pub max_damage: f64,
    pub accuracy: f64,
    pub critical_chance: f64,
    pub block_chance: f64,
    pub dodge_chance: f64,
    pub aggressiveness: f64,
    pub ai_type: AiType,
    pub money_reward: f64,
    pub experience_reward: f64,
    #[serde(default)]
    pub is_defending: bool,
    #[serde(default)]
    pub is_dodging: bool,
    #[serde(default)]
    pub has_fled: bool,
}

impl Enemy {
    pub fn name(&self) -> &'static str {
        self.enemy_type.name()
    }

    /// Still fighting: health above zero and has not run away.
    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0 && !self.has_fled
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health <= 0.0
    }

    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.current_health / self.max_health
    }

    /// Subtracts `amount`, keeping health within `[0, max_health]`.
    pub fn take_damage(&mut self, amount: f64) {
        self.current_health = (self.current_health - amount.max(0.0)).clamp(0.0, self.max_health);
    }

    pub fn reset_for_combat(&mut self) {
        self.current_health = self.max_health;
        self.is_defending = false;
        self.is_dodging = false;
        self.has_fled = false;
    }

    pub fn effective_block_chance(&self) -> f64 {
        if self.is_defending {
            self.block_chance + ENEMY_STANCE_BONUS
        } else {
            self.block_chance
        }
    }

    pub fn effective_dodge_chance(&self) -> f64 {
        if self.is_dodging {
            self.dodge_chance + ENEMY_STANCE_BONUS
        } else {
            self.dodge_chance
        }
    }

    /// Contribution of this enemy to an encounter's threat score.
    pub fn threat(&self) -> f64 {
        self.difficulty * f64::from(self.level) + self.max_health / 50.0 + self.max_damage / 20.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Game time in seconds.
    pub time: f64,
    pub message: String,
}

/// Record of one combat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatData {
    pub event_type: CombatEventType,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub player_start_health: f64,
    pub enemies: Vec<Enemy>,
    pub combat_log: Vec<CombatLogEntry>,
    pub player_defending: bool,
    pub player_dodging: bool,
    pub surprise_attack: bool,
    pub turn_number: u32,
    pub total_damage_dealt: f64,
    pub total_damage_received: f64,
    pub money_gained: f64,
    pub money_lost: f64,
    pub experience_gained: f64,
    pub player_criticals: u32,
    /// Set when the fight ended through a paid negotiation.
    pub negotiated: bool,
}

impl CombatData {
    pub fn new(
        event_type: CombatEventType,
        enemies: Vec<Enemy>,
        start_time: f64,
        player_start_health: f64,
    ) -> Self {
        Self {
            event_type,
            start_time,
            end_time: start_time,
            duration: 0.0,
            player_start_health,
            enemies,
            combat_log: Vec::new(),
            player_defending: false,
            player_dodging: false,
            surprise_attack: false,
            turn_number: 0,
            total_damage_dealt: 0.0,
            total_damage_received: 0.0,
            money_gained: 0.0,
            money_lost: 0.0,
            experience_gained: 0.0,
            player_criticals: 0,
            negotiated: false,
        }
    }

    pub fn log(&mut self, time: f64, message: impl Into<String>) {
        self.combat_log.push(CombatLogEntry {
            time,
            message: message.into(),
        });
    }

    pub fn living_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn all_enemies_down(&self) -> bool {
        self.enemies.iter().all(|e| !e.is_alive())
    }

    /// Index of the first living enemy, if any.
    pub fn first_living_enemy(&self) -> Option<usize> {
        self.enemies.iter().position(|e| e.is_alive())
    }

    /// First living enemy strictly after `index`.
    pub fn next_living_enemy_after(&self, index: usize) -> Option<usize> {
        self.enemies
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, e)| e.is_alive())
            .map(|(i, _)| i)
    }
}

/// Read-only snapshot for UI and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStatus {
    pub state: CombatState,
    pub turn_number: u32,
    pub player_health: f64,
    pub player_max_health: f64,
    /// `(type, current health, max health, still fighting)` in turn order.
    pub enemies: Vec<(EnemyType, f64, f64, bool)>,
    pub acting_enemy: Option<usize>,
}
