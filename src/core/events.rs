//! Typed game events and the subscriber bus that fans them out.
//!
//! Components queue [`GameEvent`]s while they run; the game loop drains them,
//! routes the ones other components react to, and publishes every event to
//! the [`EventBus`] subscribers (UI, achievements, logging).

use crate::combat::{CombatAction, CombatData, CombatResult, CombatState, Combatant, EnemyType};
use crate::consequences::{CombatConsequence, InjuryType};
use crate::encounters::EnemyEncounter;

#[derive(Debug, Clone)]
pub enum GameEvent {
    // ── Combat ──────────────────────────────────────────────────
    CombatStateChanged {
        state: CombatState,
    },
    CombatStarted {
        data: CombatData,
    },
    CombatEnded {
        data: CombatData,
        end_state: CombatState,
    },
    CombatAction {
        actor: Combatant,
        action: CombatAction,
        result: CombatResult,
        damage: f64,
    },
    PlayerHealthChanged {
        health: f64,
    },
    EnemyHealthChanged {
        index: usize,
        health: f64,
    },

    // ── Encounters ──────────────────────────────────────────────
    EnemyEncounterStarted {
        encounter: EnemyEncounter,
    },
    EnemyEncounterEnded {
        encounter: EnemyEncounter,
    },

    // ── Consequences ────────────────────────────────────────────
    PlayerInjured {
        injury: InjuryType,
        severity: f64,
    },
    PlayerHealed {
        injury: InjuryType,
    },
    ReputationChanged {
        reputation: f64,
        delta: f64,
    },
    CombatConsequence {
        consequence: CombatConsequence,
    },
    EnemyRelationshipChanged {
        enemy_type: EnemyType,
        relationship: f64,
    },
    /// A scheduled retaliation fell due and wants a Revenge encounter.
    RetaliationDue {
        enemy_type: EnemyType,
    },
}

pub type SubscriptionId = u64;

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Multicast dispatcher with explicit subscribe/unsubscribe.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Handler)>,
    next_id: SubscriptionId,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Delivers `event` to every subscriber in subscription order.
    pub fn publish(&mut self, event: &GameEvent) {
        for (_, handler) in &mut self.subscribers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
