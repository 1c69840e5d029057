use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::combat::EnemyType;
use crate::world::{Location, StatModifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsequenceType {
    Injury,
    ReputationGain,
    ReputationLoss,
    Hospitalization,
    MoneyLoss,
    WitnessReport,
    Pursuit,
    Retaliation,
    ItemFound,
    JobOffer,
    RandomHelp,
    MedicalAssistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InjuryType {
    Bruises,
    Cut,
    Sprain,
    Fracture,
    Concussion,
}

impl InjuryType {
    pub fn name(&self) -> &'static str {
        match self {
            InjuryType::Bruises => "Bruises",
            InjuryType::Cut => "Cut",
            InjuryType::Sprain => "Sprain",
            InjuryType::Fracture => "Fracture",
            InjuryType::Concussion => "Concussion",
        }
    }
}

/// Data carried by each consequence kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsequencePayload {
    Injury {
        injury: InjuryType,
        modifiers: Vec<StatModifier>,
    },
    Reputation {
        amount: f64,
    },
    Hospitalization {
        cost: f64,
    },
    MoneyLoss {
        amount: f64,
    },
    WitnessReport {
        location: Location,
    },
    Pursuit,
    Retaliation {
        enemy_type: EnemyType,
    },
    ItemFound {
        value: f64,
    },
    JobOffer {
        hourly_wage: f64,
    },
    RandomHelp {
        health: f64,
    },
    MedicalAssistance {
        cost: f64,
        health: f64,
    },
}

impl ConsequencePayload {
    pub fn consequence_type(&self) -> ConsequenceType {
        match self {
            ConsequencePayload::Injury { .. } => ConsequenceType::Injury,
            ConsequencePayload::Reputation { amount } if *amount < 0.0 => {
                ConsequenceType::ReputationLoss
            }
            ConsequencePayload::Reputation { .. } => ConsequenceType::ReputationGain,
            ConsequencePayload::Hospitalization { .. } => ConsequenceType::Hospitalization,
            ConsequencePayload::MoneyLoss { .. } => ConsequenceType::MoneyLoss,
            ConsequencePayload::WitnessReport { .. } => ConsequenceType::WitnessReport,
            ConsequencePayload::Pursuit => ConsequenceType::Pursuit,
            ConsequencePayload::Retaliation { .. } => ConsequenceType::Retaliation,
            ConsequencePayload::ItemFound { .. } => ConsequenceType::ItemFound,
            ConsequencePayload::JobOffer { .. } => ConsequenceType::JobOffer,
            ConsequencePayload::RandomHelp { .. } => ConsequenceType::RandomHelp,
            ConsequencePayload::MedicalAssistance { .. } => ConsequenceType::MedicalAssistance,
        }
    }
}

/// One after-effect of a fight (or of idle time on the streets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConsequence {
    pub consequence_type: ConsequenceType,
    pub start_time: f64,
    /// Seconds; 0 means instantaneous.
    pub duration: f64,
    /// 0..=1
    pub severity: f64,
    pub payload: ConsequencePayload,
}

impl CombatConsequence {
    pub fn new(payload: ConsequencePayload, start_time: f64, duration: f64, severity: f64) -> Self {
        Self {
            consequence_type: payload.consequence_type(),
            start_time,
            duration: duration.max(0.0),
            severity: severity.clamp(0.0, 1.0),
            payload,
        }
    }

    pub fn instant(payload: ConsequencePayload, start_time: f64, severity: f64) -> Self {
        Self::new(payload, start_time, 0.0, severity)
    }

    pub fn is_lasting(&self) -> bool {
        self.duration > 0.0
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.start_time >= self.duration
    }
}

/// Persisted consequence state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatEventsSaveData {
    pub reputation: f64,
    pub active_consequences: Vec<CombatConsequence>,
    pub victories_by_type: BTreeMap<EnemyType, u32>,
    pub relationships: BTreeMap<EnemyType, f64>,
    #[serde(default)]
    pub critical_hits: u32,
    #[serde(default)]
    pub hits_taken: u32,
    pub next_event_tick: u64,
}
