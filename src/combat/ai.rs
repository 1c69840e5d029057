//! Enemy action selection.

use rand::Rng;

use super::types::{AiType, CombatAction, Enemy};
use crate::core::constants::COWARDLY_FLEE_HEALTH_RATIO;
use crate::core::rng::roll;

/// Pick the next action for `enemy` from its AI table.
///
/// Aggressive and Berserker never roll; every other policy consumes one roll
/// (Cowardly skips it when it decides to run).
pub fn choose_enemy_action(enemy: &Enemy, rng: &mut impl Rng) -> CombatAction {
    match enemy.ai_type {
        AiType::Aggressive | AiType::Berserker => CombatAction::Attack,
        AiType::Defensive => {
            if roll(rng) < 0.3 {
                CombatAction::Attack
            } else {
                CombatAction::Defend
            }
        }
        AiType::Balanced => {
            let r = roll(rng);
            if r < 0.6 {
                CombatAction::Attack
            } else if r < 0.8 {
                CombatAction::Defend
            } else {
                CombatAction::Dodge
            }
        }
        AiType::Cowardly => {
            if enemy.health_ratio() < COWARDLY_FLEE_HEALTH_RATIO {
                CombatAction::Flee
            } else if roll(rng) < 0.4 {
                CombatAction::Attack
            } else {
                CombatAction::Defend
            }
        }
        AiType::Tactical => {
            if roll(rng) < 0.2 {
                CombatAction::UseItem
            } else {
                CombatAction::Attack
            }
        }
        AiType::Police => {
            if roll(rng) < 0.1 {
                CombatAction::Negotiate
            } else {
                CombatAction::Attack
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::types::EnemyType;
    use crate::core::rng::ScriptedRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    fn with_ai(ai_type: AiType) -> Enemy {
        let mut enemy = Enemy::create_test(EnemyType::Thug);
        enemy.ai_type = ai_type;
        enemy
    }

    #[test]
    fn test_aggressive_and_berserker_always_attack() {
        let mut rng = ScriptedRng::constant(0.99);
        for _ in 0..10 {
            assert_eq!(choose_enemy_action(&with_ai(AiType::Aggressive), &mut rng), CombatAction::Attack);
            assert_eq!(choose_enemy_action(&with_ai(AiType::Berserker), &mut rng), CombatAction::Attack);
        }
    }

    #[test]
    fn test_balanced_bands() {
        let enemy = with_ai(AiType::Balanced);
        let cases = [(0.1, CombatAction::Attack), (0.7, CombatAction::Defend), (0.9, CombatAction::Dodge)];
        for (value, expected) in cases {
            let mut rng = ScriptedRng::constant(value);
            assert_eq!(choose_enemy_action(&enemy, &mut rng), expected);
        }
    }

    #[test]
    fn test_cowardly_flees_when_hurt() {
        let mut enemy = with_ai(AiType::Cowardly);
        let mut rng = ScriptedRng::constant(0.1);
        assert_eq!(choose_enemy_action(&enemy, &mut rng), CombatAction::Attack);

        enemy.current_health = enemy.max_health * 0.2;
        assert_eq!(choose_enemy_action(&enemy, &mut rng), CombatAction::Flee);
    }

    #[test]
    fn test_police_rarely_negotiates() {
        let enemy = with_ai(AiType::Police);
        let mut rng = ScriptedRng::constant(0.05);
        assert_eq!(choose_enemy_action(&enemy, &mut rng), CombatAction::Negotiate);
        let mut rng = ScriptedRng::constant(0.5);
        assert_eq!(choose_enemy_action(&enemy, &mut rng), CombatAction::Attack);
    }

    #[test]
    fn test_defensive_distribution_roughly_thirty_seventy() {
        let enemy = with_ai(AiType::Defensive);
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let mut counts: HashMap<CombatAction, u32> = HashMap::new();
        for _ in 0..10_000 {
            *counts.entry(choose_enemy_action(&enemy, &mut rng)).or_insert(0) += 1;
        }
        let attacks = counts.get(&CombatAction::Attack).copied().unwrap_or(0);
        assert!(attacks > 2_500 && attacks < 3_500, "attacks = {}", attacks);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_tactical_uses_items_sometimes() {
        let enemy = with_ai(AiType::Tactical);
        let mut rng = ScriptedRng::constant(0.1);
        assert_eq!(choose_enemy_action(&enemy, &mut rng), CombatAction::UseItem);
    }
}
