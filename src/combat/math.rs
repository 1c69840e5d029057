//! Combat math shared by the combat system and the simulator.
//!
//! Every chance returned here is clamped to `[0, 1]` so callers can roll
//! against it directly, whatever skill values (including negative ones from
//! injuries) are fed in.

use rand::Rng;

use super::types::{AiType, CombatEventType, CombatResult, Enemy};
use crate::core::constants::*;
use crate::core::rng::{chance, clamp_probability, range};
use crate::world::{TimePeriod, Weapon};

/// Outcome of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOutcome {
    pub result: CombatResult,
    /// Damage actually dealt (0 unless `Hit` or `Critical`).
    pub damage: f64,
}

impl AttackOutcome {
    fn no_damage(result: CombatResult) -> Self {
        Self { result, damage: 0.0 }
    }

    pub fn landed(&self) -> bool {
        matches!(self.result, CombatResult::Hit | CombatResult::Critical)
    }
}

/// Player inputs to an attack roll.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerAttackProfile<'a> {
    pub fitness: f64,
    pub luck: f64,
    pub weapon: Option<&'a Weapon>,
    pub critical_hits_enabled: bool,
}

pub fn calculate_hit_chance(fitness: f64, weapon_accuracy_bonus: f64, target_difficulty: f64) -> f64 {
    clamp_probability(
        BASE_HIT_CHANCE + fitness * HIT_CHANCE_PER_FITNESS + weapon_accuracy_bonus
            - target_difficulty * HIT_PENALTY_PER_DIFFICULTY,
    )
}

pub fn calculate_crit_chance(luck: f64, weapon_crit_bonus: f64) -> f64 {
    clamp_probability(BASE_CRIT_CHANCE + luck * CRIT_CHANCE_PER_LUCK + weapon_crit_bonus)
}

/// Flee success chance; `enemy_count` counts enemies still fighting.
pub fn calculate_flee_chance(fitness: f64, enemy_count: usize) -> f64 {
    let extra_enemies = enemy_count.saturating_sub(1) as f64;
    clamp_probability(
        BASE_FLEE_CHANCE + fitness * FLEE_CHANCE_PER_FITNESS
            - extra_enemies * FLEE_PENALTY_PER_EXTRA_ENEMY,
    )
}

pub fn calculate_negotiation_chance(charisma: f64, ai_type: AiType) -> f64 {
    let base = BASE_NEGOTIATION_CHANCE + charisma * NEGOTIATION_PER_CHARISMA;
    let factor = match ai_type {
        AiType::Aggressive | AiType::Berserker => NEGOTIATION_HOSTILE_FACTOR,
        AiType::Cowardly => NEGOTIATION_COWARDLY_FACTOR,
        _ => 1.0,
    };
    clamp_probability(base * factor)
}

pub fn calculate_intimidation_chance(fitness: f64, charisma: f64, target_difficulty: f64) -> f64 {
    clamp_probability(
        BASE_INTIMIDATION_CHANCE + (fitness + charisma) * INTIMIDATION_PER_SKILL
            - target_difficulty * INTIMIDATION_PENALTY_PER_DIFFICULTY,
    )
}

pub fn calculate_bribe(target_difficulty: f64) -> f64 {
    (target_difficulty * BRIBE_PER_DIFFICULTY).max(0.0)
}

/// Chance that the enemies get a free opening strike.
pub fn calculate_surprise_chance(event_type: CombatEventType, period: TimePeriod) -> f64 {
    if event_type == CombatEventType::Ambush {
        return 1.0;
    }
    let factor = match period {
        TimePeriod::EarlyMorning => 1.2,
        TimePeriod::Morning => 0.5,
        TimePeriod::Afternoon => 0.8,
        TimePeriod::Evening => 1.5,
        TimePeriod::Night => 2.0,
    };
    clamp_probability(BASE_SURPRISE_CHANCE * factor)
}

/// Whole-number damage, at least 1.
fn finalize_damage(raw: f64) -> f64 {
    raw.round().max(1.0)
}

/// Resolve a player attack against `target`.
///
/// Roll order: hit, enemy block, enemy dodge, weapon damage, variation, crit.
pub fn resolve_player_attack(
    profile: &PlayerAttackProfile<'_>,
    target: &Enemy,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let accuracy_bonus = profile.weapon.map_or(0.0, |w| w.accuracy_bonus);
    let hit_chance = calculate_hit_chance(profile.fitness, accuracy_bonus, target.difficulty);
    if !chance(rng, hit_chance) {
        return AttackOutcome::no_damage(CombatResult::Miss);
    }
    if chance(rng, target.effective_block_chance()) {
        return AttackOutcome::no_damage(CombatResult::Blocked);
    }
    if chance(rng, target.effective_dodge_chance()) {
        return AttackOutcome::no_damage(CombatResult::Dodged);
    }

    let weapon_damage = profile
        .weapon
        .map_or(0.0, |w| range(rng, w.min_damage, w.max_damage));
    let variation = range(rng, DAMAGE_VARIATION_MIN, DAMAGE_VARIATION_MAX);
    let mut damage =
        (BASE_FIST_DAMAGE + profile.fitness * DAMAGE_PER_FITNESS + weapon_damage) * variation;

    let crit_bonus = profile.weapon.map_or(0.0, |w| w.critical_bonus);
    let crit_chance = calculate_crit_chance(profile.luck, crit_bonus);
    if profile.critical_hits_enabled && chance(rng, crit_chance) {
        damage *= PLAYER_CRIT_MULTIPLIER;
        return AttackOutcome {
            result: CombatResult::Critical,
            damage: finalize_damage(damage),
        };
    }

    AttackOutcome {
        result: CombatResult::Hit,
        damage: finalize_damage(damage),
    }
}

/// Resolve an enemy attack against the player, honouring the player's stance.
pub fn resolve_enemy_attack(
    enemy: &Enemy,
    player_defending: bool,
    player_dodging: bool,
    critical_hits_enabled: bool,
    rng: &mut impl Rng,
) -> AttackOutcome {
    if player_defending && chance(rng, DEFEND_BLOCK_CHANCE) {
        return AttackOutcome::no_damage(CombatResult::Blocked);
    }
    if player_dodging && chance(rng, DODGE_EVADE_CHANCE) {
        return AttackOutcome::no_damage(CombatResult::Dodged);
    }
    if !chance(rng, enemy.accuracy) {
        return AttackOutcome::no_damage(CombatResult::Miss);
    }

    let mut damage = range(rng, enemy.min_damage, enemy.max_damage);
    if critical_hits_enabled && chance(rng, enemy.critical_chance) {
        damage *= ENEMY_CRIT_MULTIPLIER;
        return AttackOutcome {
            result: CombatResult::Critical,
            damage: finalize_damage(damage),
        };
    }
    AttackOutcome {
        result: CombatResult::Hit,
        damage: finalize_damage(damage),
    }
}
