//! Injury odds, type distribution and stat penalties.

use super::types::InjuryType;
use crate::core::constants::*;
use crate::core::rng::clamp_probability;
use crate::world::{StatModifier, StatType};

/// Chance that a finished fight leaves an injury.
pub fn injury_threshold(
    base_chance: f64,
    damage_received: f64,
    max_health: f64,
    lost: bool,
    fitness: f64,
) -> f64 {
    let ratio = damage_ratio(damage_received, max_health);
    let defeat_bonus = if lost { INJURY_DEFEAT_BONUS } else { 0.0 };
    clamp_probability(
        base_chance + ratio * INJURY_DAMAGE_RATIO_WEIGHT + defeat_bonus
            - fitness * INJURY_FITNESS_REDUCTION,
    )
}

pub fn damage_ratio(damage_received: f64, max_health: f64) -> f64 {
    if max_health <= 0.0 {
        return 0.0;
    }
    (damage_received / max_health).max(0.0)
}

impl InjuryType {
    /// Bruises 30%, Cut 20%, Sprain 20%, Fracture 20%, Concussion 10%.
    pub fn from_roll(roll: f64) -> InjuryType {
        if roll < 0.3 {
            InjuryType::Bruises
        } else if roll < 0.5 {
            InjuryType::Cut
        } else if roll < 0.7 {
            InjuryType::Sprain
        } else if roll < 0.9 {
            InjuryType::Fracture
        } else {
            InjuryType::Concussion
        }
    }

    pub fn base_duration(&self) -> f64 {
        match self {
            InjuryType::Bruises => 300.0,
            InjuryType::Cut => 600.0,
            InjuryType::Sprain => 900.0,
            InjuryType::Fracture => 1800.0,
            InjuryType::Concussion => 1200.0,
        }
    }

    /// Full-severity stat penalties.
    fn base_penalties(&self) -> &'static [(StatType, f64)] {
        match self {
            InjuryType::Bruises => &[(StatType::Health, -5.0)],
            InjuryType::Cut => &[(StatType::Health, -10.0), (StatType::Mood, -5.0)],
            InjuryType::Sprain => &[(StatType::Fitness, -3.0), (StatType::Mood, -5.0)],
            InjuryType::Fracture => &[
                (StatType::Health, -20.0),
                (StatType::Fitness, -5.0),
                (StatType::Mood, -10.0),
            ],
            InjuryType::Concussion => &[(StatType::Intelligence, -3.0), (StatType::Mood, -15.0)],
        }
    }

    /// `base × (0.5 + severity)`
    pub fn duration(&self, severity: f64) -> f64 {
        self.base_duration() * (0.5 + severity)
    }

    /// Penalties scaled by `severity`, lasting [`InjuryType::duration`].
    pub fn modifiers(&self, severity: f64) -> Vec<StatModifier> {
        let duration = self.duration(severity);
        let source = format!("Injury: {}", self.name());
        self.base_penalties()
            .iter()
            .map(|&(stat, amount)| StatModifier::new(stat, amount * severity, duration, source.clone()))
            .collect()
    }
}

/// `0.3 + roll·0.7 + ratio·0.5`, capped at 1.
pub fn injury_severity(roll: f64, damage_ratio: f64) -> f64 {
    (0.3 + roll * 0.7 + damage_ratio * 0.5).min(1.0)
}
