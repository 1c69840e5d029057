//! Turn-based combat state machine.
//!
//! `NotInCombat → PreCombat → PlayerTurn ⇄ EnemyTurn →
//! {PlayerWon | PlayerLost | PlayerFled} → NotInCombat`
//!
//! Staged work (lead-in, per-enemy pacing, post-combat cooldown) goes through
//! a [`Scheduler`] drained once per tick. Terminal checks run at the top of
//! every tick and before every player action, so a lethal blow ends the fight
//! before anyone else gets to act.

use rand::Rng;
use tracing::{debug, info};

use super::ai::choose_enemy_action;
use super::math::*;
use super::types::*;
use crate::core::config::CombatConfig;
use crate::core::events::GameEvent;
use crate::core::rng::chance;
use crate::core::scheduler::{GameClock, Scheduler};
use crate::world::{Services, SkillType, StatModifier, StatType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombatStep {
    /// Lead-in finished: roll surprise, then hand the turn to the player.
    OpenCombat,
    /// Enemy at this index takes its action.
    EnemyAct(usize),
    /// Cooldown elapsed: back to `NotInCombat`.
    Reset,
}

pub struct CombatSystem {
    config: CombatConfig,
    state: CombatState,
    active_combat: Option<CombatData>,
    acting_enemy: Option<usize>,
    scheduler: Scheduler<CombatStep>,
    events: Vec<GameEvent>,
}

impl Default for CombatSystem {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl CombatSystem {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            state: CombatState::NotInCombat,
            active_combat: None,
            acting_enemy: None,
            scheduler: Scheduler::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn is_in_combat(&self) -> bool {
        self.state.is_in_combat()
    }

    /// True only when idle: not fighting and not in the post-combat cooldown.
    pub fn can_start_combat(&self) -> bool {
        self.state == CombatState::NotInCombat && self.active_combat.is_none()
    }

    pub fn active_combat(&self) -> Option<&CombatData> {
        self.active_combat.as_ref()
    }

    /// Events queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_state(&mut self, state: CombatState) {
        if self.state == state {
            return;
        }
        debug!(from = ?self.state, to = ?state, "Combat state changed");
        self.state = state;
        self.events.push(GameEvent::CombatStateChanged { state });
    }

    /// Begin a fight against `enemies`. Rejected while another combat (or its
    /// cooldown) is active, or when the roster is empty.
    pub fn start_combat(
        &mut self,
        mut enemies: Vec<Enemy>,
        event_type: CombatEventType,
        clock: &GameClock,
        services: &Services,
    ) -> bool {
        if !self.can_start_combat() {
            debug!(state = ?self.state, "start_combat rejected: already in combat");
            return false;
        }
        if enemies.is_empty() {
            debug!("start_combat rejected: no enemies");
            return false;
        }

        for enemy in &mut enemies {
            enemy.reset_for_combat();
        }

        let now = clock.now();
        let mut data = CombatData::new(
            event_type,
            enemies,
            now,
            services.player.current_health(),
        );
        let roster = data
            .enemies
            .iter()
            .map(|e| format!("{} (Lv {})", e.name(), e.level))
            .collect::<Vec<_>>()
            .join(", ");
        data.log(now, format!("{:?} begins against {}", event_type, roster));
        info!(?event_type, enemies = data.enemies.len(), "Combat started");

        self.events.push(GameEvent::CombatStarted { data: data.clone() });
        self.active_combat = Some(data);
        self.acting_enemy = None;
        self.set_state(CombatState::PreCombat);
        self.scheduler
            .schedule(clock.tick_after(self.config.pre_combat_delay), CombatStep::OpenCombat);
        true
    }

    /// Advance one simulation tick.
    pub fn update(&mut self, clock: &GameClock, services: &mut Services, rng: &mut impl Rng) {
        if self.is_in_combat() && self.check_terminal(clock, services) {
            // Combat just ended; only the cooldown reset remains scheduled.
            return;
        }

        for step in self.scheduler.drain_due(clock.tick()) {
            match step {
                CombatStep::OpenCombat => self.open_combat(clock, services, rng),
                CombatStep::EnemyAct(index) => self.run_enemy_step(index, clock, services, rng),
                CombatStep::Reset => self.reset(),
            }
        }
    }

    /// Player loss takes precedence over victory when both hold.
    fn check_terminal(&mut self, clock: &GameClock, services: &mut Services) -> bool {
        let Some(combat) = self.active_combat.as_ref() else {
            return false;
        };
        if services.player.current_health() <= 0.0 {
            self.end_combat(CombatState::PlayerLost, clock, services);
            return true;
        }
        if combat.all_enemies_down() {
            self.end_combat(CombatState::PlayerWon, clock, services);
            return true;
        }
        false
    }

    fn open_combat(&mut self, clock: &GameClock, services: &mut Services, rng: &mut impl Rng) {
        if self.state != CombatState::PreCombat {
            return;
        }
        let Some(combat) = self.active_combat.as_mut() else {
            return;
        };

        let surprise = calculate_surprise_chance(combat.event_type, services.time_period());
        if chance(rng, surprise) {
            combat.surprise_attack = true;
            combat.log(clock.now(), "Surprise attack!");
            if let Some(index) = combat.first_living_enemy() {
                debug!(index, "Surprise attack");
                self.enemy_attack(index, clock, services, rng);
            }
        }
        if services.player.current_health() <= 0.0 {
            // Next tick's terminal check ends the fight.
            return;
        }
        self.begin_player_turn();
    }

    fn begin_player_turn(&mut self) {
        if let Some(combat) = self.active_combat.as_mut() {
            combat.player_defending = false;
            combat.player_dodging = false;
            combat.turn_number += 1;
        }
        self.acting_enemy = None;
        self.set_state(CombatState::PlayerTurn);
    }

    /// Resolve a player action. Returns false (with no state change) when it is
    /// not the player's turn, the combat already ended, no enemy is left to
    /// target, or negotiation is not allowed against this roster.
    pub fn perform_player_action(
        &mut self,
        action: CombatAction,
        target_index: usize,
        clock: &GameClock,
        services: &mut Services,
        rng: &mut impl Rng,
    ) -> bool {
        if self.state != CombatState::PlayerTurn {
            debug!(?action, state = ?self.state, "Player action rejected: not player turn");
            return false;
        }
        if self.check_terminal(clock, services) {
            return false;
        }
        if action == CombatAction::Negotiate && !self.negotiation_allowed() {
            debug!("Negotiation rejected");
            return false;
        }
        let Some(target) = self.resolve_target(target_index) else {
            debug!(target_index, "Player action rejected: no living target");
            return false;
        };

        let now = clock.now();
        let fitness = services.skill_level(SkillType::Fitness);
        let charisma = services.skill_level(SkillType::Charisma);
        let luck = services.skill_level(SkillType::Luck);

        let mut ended_by: Option<CombatState> = None;
        let Some(combat) = self.active_combat.as_mut() else {
            return false;
        };

        let (result, damage) = match action {
            CombatAction::Attack => {
                let profile = PlayerAttackProfile {
                    fitness,
                    luck,
                    weapon: services.weapon(),
                    critical_hits_enabled: self.config.enable_critical_hits,
                };
                let outcome = resolve_player_attack(&profile, &combat.enemies[target], rng);
                if outcome.landed() {
                    let enemy = &mut combat.enemies[target];
                    enemy.take_damage(outcome.damage);
                    combat.total_damage_dealt += outcome.damage;
                    if outcome.result == CombatResult::Critical {
                        combat.player_criticals += 1;
                    }
                    self.events.push(GameEvent::EnemyHealthChanged {
                        index: target,
                        health: combat.enemies[target].current_health,
                    });
                }
                (outcome.result, outcome.damage)
            }
            CombatAction::Defend => {
                combat.player_defending = true;
                (CombatResult::Blocked, 0.0)
            }
            CombatAction::Dodge => {
                combat.player_dodging = true;
                (CombatResult::Dodged, 0.0)
            }
            // No inventory contract: the turn is spent with no effect.
            CombatAction::UseItem => (CombatResult::Hit, 0.0),
            CombatAction::Flee => {
                let flee_chance = self
                    .config
                    .flee_success_override
                    .unwrap_or_else(|| calculate_flee_chance(fitness, combat.living_enemy_count()));
                if chance(rng, flee_chance) {
                    ended_by = Some(CombatState::PlayerFled);
                    (CombatResult::Fled, 0.0)
                } else {
                    (CombatResult::Miss, 0.0)
                }
            }
            CombatAction::Negotiate => {
                let enemy = &combat.enemies[target];
                let negotiation = calculate_negotiation_chance(charisma, enemy.ai_type);
                let bribe = calculate_bribe(enemy.difficulty);
                if chance(rng, negotiation) && services.spend_money(bribe, "Combat bribe") {
                    combat.negotiated = true;
                    combat.money_lost += bribe;
                    ended_by = Some(CombatState::PlayerWon);
                    (CombatResult::Hit, 0.0)
                } else {
                    (CombatResult::Miss, 0.0)
                }
            }
            CombatAction::Intimidate => {
                let enemy = &mut combat.enemies[target];
                let intimidation = calculate_intimidation_chance(fitness, charisma, enemy.difficulty);
                if chance(rng, intimidation) {
                    let loss = enemy.current_health * crate::core::constants::INTIMIDATION_HEALTH_LOSS;
                    enemy.take_damage(loss);
                    let health = enemy.current_health;
                    self.events.push(GameEvent::EnemyHealthChanged {
                        index: target,
                        health,
                    });
                    (CombatResult::Stunned, loss)
                } else {
                    (CombatResult::Miss, 0.0)
                }
            }
        };

        combat.log(
            now,
            format!(
                "You {:?} {} -> {:?}{}",
                action,
                combat.enemies[target].name(),
                result,
                if damage > 0.0 {
                    format!(" ({:.0} dmg)", damage)
                } else {
                    String::new()
                }
            ),
        );
        debug!(?action, target, ?result, damage, "Player action resolved");
        self.events.push(GameEvent::CombatAction {
            actor: Combatant::Player,
            action,
            result,
            damage,
        });

        if let Some(end_state) = ended_by {
            self.end_combat(end_state, clock, services);
            return true;
        }

        self.set_state(CombatState::EnemyTurn);
        let first = self.active_combat.as_ref().and_then(|c| c.first_living_enemy());
        if let Some(index) = first {
            self.scheduler.schedule(
                clock.tick_after(self.config.enemy_turn_delay),
                CombatStep::EnemyAct(index),
            );
        }
        true
    }

    fn negotiation_allowed(&self) -> bool {
        if !self.config.allow_negotiation {
            return false;
        }
        self.active_combat.as_ref().is_some_and(|c| {
            !c.enemies
                .iter()
                .any(|e| e.is_alive() && e.enemy_type == EnemyType::Police)
        })
    }

    /// Requested target if it is still fighting, else the first living enemy.
    fn resolve_target(&self, requested: usize) -> Option<usize> {
        let combat = self.active_combat.as_ref()?;
        match combat.enemies.get(requested) {
            Some(enemy) if enemy.is_alive() => Some(requested),
            _ => combat.first_living_enemy(),
        }
    }

    fn run_enemy_step(
        &mut self,
        index: usize,
        clock: &GameClock,
        services: &mut Services,
        rng: &mut impl Rng,
    ) {
        if self.state != CombatState::EnemyTurn {
            return;
        }
        let Some(combat) = self.active_combat.as_ref() else {
            return;
        };

        let acts = combat.enemies.get(index).is_some_and(|e| e.is_alive());
        if acts {
            self.acting_enemy = Some(index);
            self.enemy_take_turn(index, clock, services, rng);
        }
        if services.player.current_health() <= 0.0 {
            return;
        }

        let next = self
            .active_combat
            .as_ref()
            .and_then(|c| c.next_living_enemy_after(index));
        match next {
            Some(next_index) => self.scheduler.schedule(
                clock.tick_after(self.config.enemy_turn_delay),
                CombatStep::EnemyAct(next_index),
            ),
            None => self.begin_player_turn(),
        }
    }

    fn enemy_take_turn(
        &mut self,
        index: usize,
        clock: &GameClock,
        services: &mut Services,
        rng: &mut impl Rng,
    ) {
        let Some(combat) = self.active_combat.as_mut() else {
            return;
        };
        let enemy = &mut combat.enemies[index];
        enemy.is_defending = false;
        enemy.is_dodging = false;

        let action = choose_enemy_action(enemy, rng);
        let now = clock.now();
        let result = match action {
            CombatAction::Attack => {
                self.enemy_attack(index, clock, services, rng);
                return;
            }
            CombatAction::Defend => {
                enemy.is_defending = true;
                CombatResult::Blocked
            }
            CombatAction::Dodge => {
                enemy.is_dodging = true;
                CombatResult::Dodged
            }
            CombatAction::Flee => {
                enemy.has_fled = true;
                CombatResult::Fled
            }
            CombatAction::UseItem | CombatAction::Negotiate | CombatAction::Intimidate => {
                CombatResult::Miss
            }
        };

        let name = enemy.name();
        combat.log(now, format!("{} chooses {:?} -> {:?}", name, action, result));
        debug!(index, ?action, ?result, "Enemy action resolved");
        self.events.push(GameEvent::CombatAction {
            actor: Combatant::Enemy(index),
            action,
            result,
            damage: 0.0,
        });
    }

    fn enemy_attack(
        &mut self,
        index: usize,
        clock: &GameClock,
        services: &mut Services,
        rng: &mut impl Rng,
    ) {
        let Some(combat) = self.active_combat.as_mut() else {
            return;
        };
        let enemy = &combat.enemies[index];
        let outcome = resolve_enemy_attack(
            enemy,
            combat.player_defending,
            combat.player_dodging,
            self.config.enable_critical_hits,
            rng,
        );
        let name = enemy.name();

        if outcome.landed() {
            services.player.change_health(-outcome.damage);
            combat.total_damage_received += outcome.damage;
            self.events.push(GameEvent::PlayerHealthChanged {
                health: services.player.current_health(),
            });
        }
        combat.log(
            clock.now(),
            format!(
                "{} attacks -> {:?}{}",
                name,
                outcome.result,
                if outcome.damage > 0.0 {
                    format!(" ({:.0} dmg)", outcome.damage)
                } else {
                    String::new()
                }
            ),
        );
        debug!(index, result = ?outcome.result, damage = outcome.damage, "Enemy attack resolved");
        self.events.push(GameEvent::CombatAction {
            actor: Combatant::Enemy(index),
            action: CombatAction::Attack,
            result: outcome.result,
            damage: outcome.damage,
        });
    }

    /// End the active fight immediately through the normal cleanup path.
    /// Only terminal states are accepted.
    pub fn force_end_combat(
        &mut self,
        end_state: CombatState,
        clock: &GameClock,
        services: &mut Services,
    ) -> bool {
        if !self.is_in_combat() || !end_state.is_terminal() {
            return false;
        }
        self.end_combat(end_state, clock, services);
        true
    }

    fn end_combat(&mut self, end_state: CombatState, clock: &GameClock, services: &mut Services) {
        self.scheduler.clear();
        self.acting_enemy = None;
        let now = clock.now();
        let Some(combat) = self.active_combat.as_mut() else {
            return;
        };
        combat.end_time = now;
        combat.duration = now - combat.start_time;

        match end_state {
            CombatState::PlayerWon => {
                if !combat.negotiated {
                    let defeated = combat.enemies.iter().filter(|e| e.is_defeated());
                    let (money, xp) = defeated.fold((0.0, 0.0), |(m, x), e| {
                        (m + e.money_reward, x + e.experience_reward)
                    });
                    services.add_money(money, "Combat victory");
                    services.add_skill_experience(SkillType::Fitness, xp);
                    combat.money_gained += money;
                    combat.experience_gained += xp;
                }
                combat.log(now, "You won the fight");
            }
            CombatState::PlayerLost => {
                let loss = services.money() * self.config.defeat_money_loss_ratio;
                if loss > 0.0 && services.spend_money(loss, "Lost a fight") {
                    combat.money_lost += loss;
                }
                services.player.add_stat_modifier(StatModifier::new(
                    StatType::Health,
                    self.config.defeat_injury_health_penalty,
                    self.config.defeat_injury_duration,
                    "Beaten up",
                ));
                combat.log(now, "You were beaten");
            }
            CombatState::PlayerFled => {
                services.player.change_mood(self.config.flee_mood_penalty);
                combat.log(now, "You got away");
            }
            _ => {}
        }

        info!(
            ?end_state,
            duration = combat.duration,
            dealt = combat.total_damage_dealt,
            received = combat.total_damage_received,
            "Combat ended"
        );
        let data = combat.clone();
        self.set_state(end_state);
        self.events.push(GameEvent::CombatEnded { data, end_state });
        self.scheduler
            .schedule(clock.tick_after(self.config.post_combat_cooldown), CombatStep::Reset);
    }

    fn reset(&mut self) {
        if !self.state.is_terminal() {
            return;
        }
        self.active_combat = None;
        self.set_state(CombatState::NotInCombat);
    }

    /// Actions the player may submit right now; empty outside the player's turn.
    pub fn available_actions(&self) -> Vec<CombatAction> {
        if self.state != CombatState::PlayerTurn {
            return Vec::new();
        }
        let negotiation = self.negotiation_allowed();
        CombatAction::ALL
            .into_iter()
            .filter(|a| *a != CombatAction::Negotiate || negotiation)
            .collect()
    }

    pub fn combat_status(&self, services: &Services) -> Option<CombatStatus> {
        let combat = self.active_combat.as_ref()?;
        Some(CombatStatus {
            state: self.state,
            turn_number: combat.turn_number,
            player_health: services.player.current_health(),
            player_max_health: services.player.max_health(),
            enemies: combat
                .enemies
                .iter()
                .map(|e| (e.enemy_type, e.current_health, e.max_health, e.is_alive()))
                .collect(),
            acting_enemy: self.acting_enemy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedRng;
    use crate::world::{PlayerState, Wallet};

    fn services_with(health: f64, money: f64) -> Services {
        Services::new(Box::new(PlayerState::new(health))).with_money(Box::new(Wallet::new(money)))
    }

    fn quiet_thug() -> Enemy {
        let mut thug = Enemy::create_test(EnemyType::Thug);
        thug.block_chance = 0.0;
        thug.dodge_chance = 0.0;
        thug
    }

    /// Tick until the system reaches `state` or the tick budget runs out.
    fn run_until(
        system: &mut CombatSystem,
        clock: &mut GameClock,
        services: &mut Services,
        rng: &mut ScriptedRng,
        state: CombatState,
        max_ticks: u32,
    ) -> bool {
        for _ in 0..max_ticks {
            if system.state() == state {
                return true;
            }
            clock.advance();
            system.update(clock, services, rng);
        }
        system.state() == state
    }

    #[test]
    fn test_start_combat_rejects_empty_roster() {
        let mut system = CombatSystem::default();
        let services = services_with(100.0, 0.0);
        assert!(!system.start_combat(Vec::new(), CombatEventType::Robbery, &GameClock::new(), &services));
        assert_eq!(system.state(), CombatState::NotInCombat);
        assert!(system.active_combat().is_none());
    }

    #[test]
    fn test_start_combat_rejected_while_in_combat() {
        let mut system = CombatSystem::default();
        let services = services_with(100.0, 0.0);
        let clock = GameClock::new();
        assert!(system.start_combat(vec![quiet_thug()], CombatEventType::Robbery, &clock, &services));
        let before = system.active_combat().map(|c| c.enemies.len());

        assert!(!system.start_combat(
            vec![quiet_thug(), quiet_thug()],
            CombatEventType::Ambush,
            &clock,
            &services
        ));
        assert_eq!(system.active_combat().map(|c| c.enemies.len()), before);
        assert_eq!(system.active_combat().map(|c| c.event_type), Some(CombatEventType::Robbery));
    }

    #[test]
    fn test_start_combat_restores_enemy_health() {
        let mut system = CombatSystem::default();
        let services = services_with(100.0, 0.0);
        let mut hurt = quiet_thug();
        hurt.current_health = 3.0;
        assert!(system.start_combat(vec![hurt], CombatEventType::Robbery, &GameClock::new(), &services));
        let combat = system.active_combat().expect("active");
        assert_eq!(combat.enemies[0].current_health, 30.0);
        assert_eq!(system.state(), CombatState::PreCombat);
        assert!(system.is_in_combat());
    }

    #[test]
    fn test_lead_in_then_player_turn() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        system.start_combat(vec![quiet_thug()], CombatEventType::Robbery, &clock, &services);

        // Lead-in is 1 s = 10 ticks
        for _ in 0..9 {
            clock.advance();
            system.update(&clock, &mut services, &mut rng);
            assert_eq!(system.state(), CombatState::PreCombat);
        }
        clock.advance();
        system.update(&clock, &mut services, &mut rng);
        assert_eq!(system.state(), CombatState::PlayerTurn);
        assert!(!system.active_combat().map_or(true, |c| c.surprise_attack));
    }

    #[test]
    fn test_ambush_gives_enemy_free_hit() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        system.start_combat(vec![quiet_thug()], CombatEventType::Ambush, &clock, &services);
        assert!(run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20));

        let combat = system.active_combat().expect("active");
        assert!(combat.surprise_attack);
        // Thug midpoint damage 5.5 rounds to 6
        assert_eq!(services.player.current_health(), 94.0);
        assert_eq!(combat.total_damage_received, 6.0);
    }

    #[test]
    fn test_actions_rejected_outside_player_turn() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 50.0);
        let clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);

        for action in CombatAction::ALL {
            assert!(!system.perform_player_action(action, 0, &clock, &mut services, &mut rng));
        }
        assert_eq!(system.state(), CombatState::NotInCombat);

        system.start_combat(vec![quiet_thug()], CombatEventType::Robbery, &clock, &services);
        system.drain_events();
        for action in CombatAction::ALL {
            assert!(!system.perform_player_action(action, 0, &clock, &mut services, &mut rng));
            assert_eq!(system.state(), CombatState::PreCombat);
        }
        assert!(system.drain_events().is_empty());
        assert_eq!(services.money(), 50.0);
    }

    #[test]
    fn test_dead_target_retargets_first_living() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        system.start_combat(vec![quiet_thug(), quiet_thug()], CombatEventType::Robbery, &clock, &services);
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        if let Some(combat) = system.active_combat.as_mut() {
            combat.enemies[0].current_health = 0.0;
        }
        assert!(system.perform_player_action(CombatAction::Attack, 0, &clock, &mut services, &mut rng));
        let combat = system.active_combat().expect("active");
        assert_eq!(combat.enemies[1].current_health, 20.0);

        // Out-of-range target also retargets
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 40);
        assert!(system.perform_player_action(CombatAction::Attack, 99, &clock, &mut services, &mut rng));
        assert_eq!(system.active_combat().map(|c| c.enemies[1].current_health), Some(10.0));
    }

    #[test]
    fn test_negotiation_blocked_against_police() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 500.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.0);
        system.start_combat(
            vec![Enemy::create_test(EnemyType::Police)],
            CombatEventType::RandomEncounter,
            &clock,
            &services,
        );
        // Roll 0.0 would surprise; that only costs health.
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        assert!(!system.available_actions().contains(&CombatAction::Negotiate));
        assert!(!system.perform_player_action(CombatAction::Negotiate, 0, &clock, &mut services, &mut rng));
        assert_eq!(system.state(), CombatState::PlayerTurn);
        assert_eq!(services.money(), 500.0);
    }

    #[test]
    fn test_negotiation_pays_bribe_and_wins() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 100.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        let mut bully = Enemy::create_test(EnemyType::Bully);
        bully.block_chance = 0.0;
        system.start_combat(vec![bully], CombatEventType::RandomEncounter, &clock, &services);
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        // Cowardly: 0.3 * 1.5 = 0.45 < 0.5, fails
        assert!(system.perform_player_action(CombatAction::Negotiate, 0, &clock, &mut services, &mut rng));
        assert_eq!(system.state(), CombatState::EnemyTurn);

        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 40);
        let mut lucky = ScriptedRng::constant(0.1);
        assert!(system.perform_player_action(CombatAction::Negotiate, 0, &clock, &mut services, &mut lucky));
        assert_eq!(system.state(), CombatState::PlayerWon);
        // Bribe = 0.25 * 10
        assert_eq!(services.money(), 97.5);
        let combat = system.active_combat().expect("kept through cooldown");
        assert!(combat.negotiated);
        assert_eq!(combat.money_gained, 0.0);
    }

    #[test]
    fn test_negotiation_fails_without_funds() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        system.start_combat(vec![quiet_thug()], CombatEventType::RandomEncounter, &clock, &services);
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        let mut lucky = ScriptedRng::constant(0.01);
        assert!(system.perform_player_action(CombatAction::Negotiate, 0, &clock, &mut services, &mut lucky));
        assert_eq!(system.state(), CombatState::EnemyTurn);
    }

    #[test]
    fn test_intimidate_removes_fifth_of_health() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        system.start_combat(vec![quiet_thug()], CombatEventType::RandomEncounter, &clock, &services);
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        let mut lucky = ScriptedRng::constant(0.05);
        assert!(system.perform_player_action(CombatAction::Intimidate, 0, &clock, &mut services, &mut lucky));
        assert_eq!(system.active_combat().map(|c| c.enemies[0].current_health), Some(24.0));
        let stunned = system.drain_events().into_iter().any(|e| {
            matches!(
                e,
                GameEvent::CombatAction {
                    actor: Combatant::Player,
                    result: CombatResult::Stunned,
                    ..
                }
            )
        });
        assert!(stunned);
    }

    #[test]
    fn test_defend_flag_cleared_on_next_player_turn() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        system.start_combat(vec![quiet_thug()], CombatEventType::RandomEncounter, &clock, &services);
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        assert!(system.perform_player_action(CombatAction::Defend, 0, &clock, &mut services, &mut rng));
        assert!(system.active_combat().is_some_and(|c| c.player_defending));
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);
        let combat = system.active_combat().expect("active");
        assert!(!combat.player_defending);
        assert_eq!(combat.turn_number, 2);
    }

    #[test]
    fn test_cooldown_then_reset() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        system.start_combat(vec![quiet_thug()], CombatEventType::RandomEncounter, &clock, &services);
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        assert!(system.force_end_combat(CombatState::PlayerFled, &clock, &mut services));
        assert_eq!(system.state(), CombatState::PlayerFled);
        assert!(!system.can_start_combat());
        assert!(system.active_combat().is_some());

        assert!(run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::NotInCombat, 25));
        assert!(system.active_combat().is_none());
        assert!(system.can_start_combat());
    }

    #[test]
    fn test_force_end_requires_terminal_state() {
        let mut system = CombatSystem::default();
        let mut services = services_with(100.0, 0.0);
        let clock = GameClock::new();
        assert!(!system.force_end_combat(CombatState::PlayerWon, &clock, &mut services));
        system.start_combat(vec![quiet_thug()], CombatEventType::RandomEncounter, &clock, &services);
        assert!(!system.force_end_combat(CombatState::PlayerTurn, &clock, &mut services));
        assert!(system.is_in_combat());
    }

    #[test]
    fn test_available_actions_only_on_player_turn() {
        let mut system = CombatSystem::new(CombatConfig {
            allow_negotiation: false,
            ..Default::default()
        });
        let mut services = services_with(100.0, 0.0);
        let mut clock = GameClock::new();
        let mut rng = ScriptedRng::constant(0.5);
        assert!(system.available_actions().is_empty());
        system.start_combat(vec![quiet_thug()], CombatEventType::RandomEncounter, &clock, &services);
        assert!(system.available_actions().is_empty());
        run_until(&mut system, &mut clock, &mut services, &mut rng, CombatState::PlayerTurn, 20);

        let actions = system.available_actions();
        assert_eq!(actions.len(), 6);
        assert!(!actions.contains(&CombatAction::Negotiate));
    }

    #[test]
    fn test_combat_status_snapshot() {
        let mut system = CombatSystem::default();
        let services = services_with(80.0, 0.0);
        assert!(system.combat_status(&services).is_none());
        system.start_combat(vec![quiet_thug()], CombatEventType::Robbery, &GameClock::new(), &services);
        let status = system.combat_status(&services).expect("status");
        assert_eq!(status.state, CombatState::PreCombat);
        assert_eq!(status.player_health, 80.0);
        assert_eq!(status.enemies, vec![(EnemyType::Thug, 30.0, 30.0, true)]);
    }
}
