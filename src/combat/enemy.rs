//! Enemy stat tables and factories.

use rand::Rng;

use super::types::{AiType, Enemy, EnemyType};
use crate::core::constants::*;
use crate::core::rng::{pick_index, range};

/// Level-1 stat row for an enemy type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTemplate {
    pub difficulty: f64,
    pub health: f64,
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
}

#[allow(clippy::too_many_arguments)]
fn row(
    difficulty: f64,
    health: f64,
    damage: (f64, f64),
    accuracy: f64,
    critical_chance: f64,
    block_chance: f64,
    dodge_chance: f64,
    aggressiveness: f64,
    ai_type: AiType,
    rewards: (f64, f64),
) -> EnemyTemplate {
    EnemyTemplate {
        difficulty,
        health,
        min_damage: damage.0,
        max_damage: damage.1,
        accuracy,
        critical_chance,
        block_chance,
        dodge_chance,
        aggressiveness,
        ai_type,
        money_reward: rewards.0,
        experience_reward: rewards.1,
    }
}

/// Base stats per enemy type.
pub fn template(enemy_type: EnemyType) -> EnemyTemplate {
    use AiType::*;
    match enemy_type {
        EnemyType::Thug => row(0.3, 30.0, (3.0, 8.0), 0.6, 0.05, 0.1, 0.1, 0.6, Aggressive, (15.0, 10.0)),
        EnemyType::Robber => row(0.4, 35.0, (4.0, 9.0), 0.65, 0.08, 0.05, 0.2, 0.5, Tactical, (30.0, 15.0)),
        EnemyType::DrunkPerson => row(0.2, 25.0, (2.0, 6.0), 0.4, 0.03, 0.0, 0.05, 0.4, Balanced, (5.0, 5.0)),
        EnemyType::Bully => row(0.25, 30.0, (3.0, 7.0), 0.55, 0.05, 0.1, 0.1, 0.7, Cowardly, (10.0, 8.0)),
        EnemyType::Dealer => row(0.5, 40.0, (5.0, 10.0), 0.65, 0.1, 0.1, 0.15, 0.5, Defensive, (60.0, 20.0)),
        EnemyType::SecurityGuard => row(0.6, 60.0, (6.0, 12.0), 0.75, 0.08, 0.25, 0.1, 0.4, Defensive, (20.0, 25.0)),
        EnemyType::Bandit => row(0.7, 55.0, (7.0, 14.0), 0.7, 0.12, 0.1, 0.2, 0.8, Aggressive, (50.0, 30.0)),
        EnemyType::GangMember => row(0.75, 60.0, (8.0, 15.0), 0.7, 0.1, 0.15, 0.15, 0.8, Berserker, (40.0, 30.0)),
        EnemyType::StreetFighter => row(0.8, 70.0, (8.0, 16.0), 0.8, 0.15, 0.2, 0.25, 0.7, Balanced, (35.0, 40.0)),
        EnemyType::Police => row(1.0, 80.0, (6.0, 12.0), 0.85, 0.05, 0.3, 0.1, 0.3, AiType::Police, (0.0, 40.0)),
    }
}

impl Enemy {
    fn from_template(enemy_type: EnemyType, level: u32, t: &EnemyTemplate) -> Self {
        Self {
            enemy_type,
            level,
            difficulty: t.difficulty,
            max_health: t.health,
            current_health: t.health,
            min_damage: t.min_damage,
            max_damage: t.max_damage,
            accuracy: t.accuracy,
            critical_chance: t.critical_chance,
            block_chance: t.block_chance,
            dodge_chance: t.dodge_chance,
            aggressiveness: t.aggressiveness,
            ai_type: t.ai_type,
            money_reward: t.money_reward,
            experience_reward: t.experience_reward,
            is_defending: false,
            is_dodging: false,
            has_fled: false,
        }
    }

    /// Level-1 enemy with the exact base stats of its type.
    pub fn create_test(enemy_type: EnemyType) -> Self {
        Self::from_template(enemy_type, 1, &template(enemy_type))
    }

    /// Enemy at a random level in `[min_level, max_level]` with level scaling
    /// and small health/money variance applied.
    pub fn create_random(
        enemy_type: EnemyType,
        min_level: u32,
        max_level: u32,
        rng: &mut impl Rng,
    ) -> Self {
        let min_level = min_level.max(1);
        let max_level = max_level.max(min_level);
        let level = min_level + pick_index(rng, (max_level - min_level + 1) as usize) as u32;
        let steps = f64::from(level - 1);

        let t = template(enemy_type);
        let mut enemy = Self::from_template(enemy_type, level, &t);

        let health_var = range(rng, 1.0 - ENEMY_HEALTH_VARIANCE, 1.0 + ENEMY_HEALTH_VARIANCE);
        enemy.max_health = (t.health * (1.0 + ENEMY_HEALTH_PER_LEVEL * steps) * health_var)
            .round()
            .max(1.0);
        enemy.current_health = enemy.max_health;

        let damage_scale = 1.0 + ENEMY_DAMAGE_PER_LEVEL * steps;
        enemy.min_damage = t.min_damage * damage_scale;
        enemy.max_damage = t.max_damage * damage_scale;

        let money_var = range(rng, 1.0 - ENEMY_MONEY_VARIANCE, 1.0 + ENEMY_MONEY_VARIANCE);
        enemy.money_reward = t.money_reward * (1.0 + ENEMY_MONEY_PER_LEVEL * steps) * money_var;
        enemy.experience_reward = t.experience_reward * (1.0 + ENEMY_XP_PER_LEVEL * steps);

        enemy
    }
}
