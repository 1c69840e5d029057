//! Game orchestrator: one fixed tick drives encounters, combat and consequences.
//!
//! Components never call each other directly. Each queues [`GameEvent`]s; the
//! orchestrator drains them after every step, routes the ones that other
//! components react to, and publishes everything to [`EventBus`] subscribers in the order it happened.

use std::collections::VecDeque;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::GameConfig;
use super::error::GameError;
use super::events::{EventBus, GameEvent, SubscriptionId};
use super::scheduler::GameClock;
use crate::combat::{CombatAction, CombatEventType, CombatState, CombatSystem};
use crate::consequences::{CombatEvents, CombatEventsSaveData};
use crate::encounters::{EnemySystem, EnemySystemSaveData};
use crate::utils::persistence;
use crate::world::Services;

pub const SAVE_VERSION: u32 = 1;

/// Everything that happened during one tick (or one player action).
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    /// Events in the order they were published.
    pub events: Vec<GameEvent>,
    pub combat_started: bool,
    /// Terminal state if a fight ended during this step.
    pub combat_ended: Option<CombatState>,
    /// Combat is waiting on the player.
    pub awaiting_player: bool,
}

/// Persisted game state. Combat in progress is not saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSaveData {
    pub version: u32,
    /// RFC 3339 wall-clock time of the save.
    pub saved_at: String,
    pub tick: u64,
    pub encounters: EnemySystemSaveData,
    pub consequences: CombatEventsSaveData,
}

pub struct Game {
    clock: GameClock,
    combat: CombatSystem,
    encounters: EnemySystem,
    consequences: CombatEvents,
    services: Services,
    bus: EventBus,
}

impl Game {
    pub fn new(config: GameConfig, services: Services) -> Self {
        Self {
            clock: GameClock::new(),
            combat: CombatSystem::new(config.combat),
            encounters: EnemySystem::new(config.encounters),
            consequences: CombatEvents::new(config.consequences),
            services,
            bus: EventBus::new(),
        }
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn combat(&self) -> &CombatSystem {
        &self.combat
    }

    pub fn encounters(&self) -> &EnemySystem {
        &self.encounters
    }

    pub fn consequences(&self) -> &CombatEvents {
        &self.consequences
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Advance the world by one 100 ms tick.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickResult {
        self.clock.advance();
        self.services.player.tick_modifiers(self.clock.delta_seconds());

        self.encounters
            .update(&self.clock, &mut self.combat, &self.services, rng);
        self.combat.update(&self.clock, &mut self.services, rng);
        self.consequences.update(&self.clock, &mut self.services, rng);

        self.dispatch(rng)
    }

    /// Submit a player action to the running fight.
    ///
    /// Returns `None` when the action was rejected.
    pub fn perform_player_action(
        &mut self,
        action: CombatAction,
        target_index: usize,
        rng: &mut impl Rng,
    ) -> Option<TickResult> {
        let accepted = self.combat.perform_player_action(
            action,
            target_index,
            &self.clock,
            &mut self.services,
            rng,
        );
        if !accepted {
            return None;
        }
        Some(self.dispatch(rng))
    }

    /// Debug path: roll an encounter right now.
    pub fn trigger_random_encounter(&mut self, rng: &mut impl Rng) -> TickResult {
        self.encounters
            .trigger_random_encounter(&self.clock, &self.combat, &self.services, rng);
        self.dispatch(rng)
    }

    fn drain_components(&mut self, queue: &mut VecDeque<GameEvent>) {
        queue.extend(self.encounters.drain_events());
        queue.extend(self.combat.drain_events());
        queue.extend(self.consequences.drain_events());
    }

    /// Route and publish every queued event, including the ones routing produces.
    fn dispatch(&mut self, rng: &mut impl Rng) -> TickResult {
        let mut result = TickResult::default();
        let mut queue = VecDeque::new();
        self.drain_components(&mut queue);

        while let Some(event) = queue.pop_front() {
            match &event {
                GameEvent::CombatStarted { .. } => result.combat_started = true,
                GameEvent::CombatAction {
                    actor,
                    result: action_result,
                    damage,
                    ..
                } => {
                    self.consequences
                        .on_combat_action(*actor, *action_result, *damage);
                }
                GameEvent::CombatEnded { data, end_state } => {
                    result.combat_ended = Some(*end_state);
                    self.consequences.on_combat_ended(
                        data,
                        *end_state,
                        &self.clock,
                        &mut self.services,
                        rng,
                    );
                    self.encounters.on_combat_ended(data, *end_state, &self.clock);
                }
                GameEvent::RetaliationDue { enemy_type } => {
                    if self.combat.can_start_combat() {
                        self.encounters.trigger_encounter_with(
                            *enemy_type,
                            CombatEventType::Revenge,
                            &self.clock,
                            &self.combat,
                            &self.services,
                            rng,
                        );
                    } else {
                        debug!(?enemy_type, "Retaliation skipped: player busy");
                    }
                }
                _ => {}
            }

            self.bus.publish(&event);
            result.events.push(event);
            self.drain_components(&mut queue);
        }

        result.awaiting_player = self.combat.state() == CombatState::PlayerTurn;
        result
    }

    pub fn save_data(&self) -> GameSaveData {
        GameSaveData {
            version: SAVE_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            tick: self.clock.tick(),
            encounters: self.encounters.save_data(),
            consequences: self.consequences.save_data(),
        }
    }

    /// Restores persisted state. Any fight in progress is abandoned.
    pub fn restore(&mut self, save: GameSaveData) {
        info!(tick = save.tick, saved_at = %save.saved_at, "Restoring game");
        self.clock = GameClock::at_tick(save.tick);
        self.combat = CombatSystem::new(self.combat.config().clone());
        self.encounters.restore(save.encounters);
        self.consequences.restore(save.consequences);
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), GameError> {
        persistence::save_json_to(path, &self.save_data())
    }

    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let save: GameSaveData = persistence::load_json_from(path)?;
        self.restore(save);
        Ok(())
    }
}
