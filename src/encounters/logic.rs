//! Encounter scheduler and enemy roster generation.
//!
//! Every check interval the system rolls whether trouble finds the player.
//! A successful roll builds a roster for the current location and time,
//! announces the encounter, waits out a short preparation delay, then hands
//! the roster to the [`CombatSystem`].

use rand::Rng;
use tracing::{debug, info};

use super::tables::*;
use super::types::{EnemyEncounter, EnemySystemSaveData};
use crate::combat::{template, CombatData, CombatEventType, CombatState, CombatSystem, Enemy, EnemyType};
use crate::core::config::EncounterConfig;
use crate::core::constants::*;
use crate::core::events::GameEvent;
use crate::core::rng::{chance, clamp_probability, pick_index, roll};
use crate::core::scheduler::{ticks_for, GameClock, Scheduler};
use crate::world::{Location, Services, SkillType, TimePeriod};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncounterStep {
    /// Preparation delay elapsed: try to start the fight.
    Engage,
}

pub struct EnemySystem {
    config: EncounterConfig,
    next_check_tick: u64,
    active: Option<EnemyEncounter>,
    recent: Vec<EnemyEncounter>,
    total_encounters: u32,
    encounters_won: u32,
    scheduler: Scheduler<EncounterStep>,
    events: Vec<GameEvent>,
}

impl Default for EnemySystem {
    fn default() -> Self {
        Self::new(EncounterConfig::default())
    }
}

impl EnemySystem {
    pub fn new(config: EncounterConfig) -> Self {
        let next_check_tick = ticks_for(config.encounter_check_interval);
        Self {
            config,
            next_check_tick,
            active: None,
            recent: Vec::new(),
            total_encounters: 0,
            encounters_won: 0,
            scheduler: Scheduler::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    pub fn active_encounter(&self) -> Option<&EnemyEncounter> {
        self.active.as_ref()
    }

    pub fn has_active_encounter(&self) -> bool {
        self.active.is_some()
    }

    pub fn recent_encounters(&self) -> &[EnemyEncounter] {
        &self.recent
    }

    pub fn total_encounters(&self) -> u32 {
        self.total_encounters
    }

    pub fn encounters_won(&self) -> u32 {
        self.encounters_won
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn update(
        &mut self,
        clock: &GameClock,
        combat: &mut CombatSystem,
        services: &Services,
        rng: &mut impl Rng,
    ) {
        self.prune_history(clock.now());

        for step in self.scheduler.drain_due(clock.tick()) {
            match step {
                EncounterStep::Engage => self.engage(clock, combat, services),
            }
        }

        if clock.tick() < self.next_check_tick {
            return;
        }
        self.next_check_tick = clock.tick() + ticks_for(self.config.encounter_check_interval).max(1);

        if !self.config.enabled || !self.is_ready(combat, services) {
            return;
        }
        let encounter_chance = self.calculate_encounter_chance(services);
        let r = roll(rng);
        debug!(chance = encounter_chance, roll = r, "Encounter check");
        if self.config.force_encounters || r < encounter_chance {
            self.generate_encounter(None, None, clock, services, rng);
        }
    }

    /// No open encounter, combat idle, and the player still standing.
    fn is_ready(&self, combat: &CombatSystem, services: &Services) -> bool {
        self.active.is_none() && combat.can_start_combat() && services.player.current_health() > 0.0
    }

    /// `base × danger × time × wealth × (1 − luck·0.02) × wanted`, clamped.
    pub fn calculate_encounter_chance(&self, services: &Services) -> f64 {
        let luck = services.skill_level(SkillType::Luck);
        let wanted = if services.is_wanted() {
            1.0 + WANTED_ENCOUNTER_FACTOR * f64::from(services.wanted_level())
        } else {
            1.0
        };
        clamp_probability(
            self.config.base_encounter_chance
                * location_danger(services.location())
                * time_multiplier(services.time_period())
                * wealth_multiplier(services.money())
                * (1.0 - luck * ENCOUNTER_LUCK_REDUCTION)
                * wanted,
        )
    }

    /// Generate an encounter now, skipping the chance roll.
    pub fn trigger_random_encounter(
        &mut self,
        clock: &GameClock,
        combat: &CombatSystem,
        services: &Services,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.is_ready(combat, services) {
            debug!("trigger_random_encounter rejected: busy or downed");
            return false;
        }
        self.generate_encounter(None, None, clock, services, rng);
        true
    }

    /// Generate an encounter against a single enemy of `enemy_type`.
    pub fn trigger_encounter_with(
        &mut self,
        enemy_type: EnemyType,
        event_type: CombatEventType,
        clock: &GameClock,
        combat: &CombatSystem,
        services: &Services,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.is_ready(combat, services) {
            debug!(?enemy_type, "trigger_encounter_with rejected: busy or downed");
            return false;
        }
        self.generate_encounter(Some(enemy_type), Some(event_type), clock, services, rng);
        true
    }

    fn generate_encounter(
        &mut self,
        forced_type: Option<EnemyType>,
        forced_event: Option<CombatEventType>,
        clock: &GameClock,
        services: &Services,
        rng: &mut impl Rng,
    ) {
        let location = services.location();
        let period = services.time_period();
        let player_level = services.player.level().max(1);

        let enemies: Vec<Enemy> = match forced_type {
            Some(enemy_type) => vec![self.create_enemy(enemy_type, player_level, location, period, rng)],
            None => {
                let count = self.determine_enemy_count(location, period, rng);
                (0..count)
                    .map(|_| {
                        let enemy_type = choose_enemy_type(location, player_level, rng);
                        self.create_enemy(enemy_type, player_level, location, period, rng)
                    })
                    .collect()
            }
        };
        let event_type = forced_event.unwrap_or_else(|| self.determine_event_type(rng));

        let encounter = EnemyEncounter::new(event_type, enemies, location, clock.now(), player_level);
        info!(
            ?event_type,
            ?location,
            enemies = encounter.enemies.len(),
            threat = encounter.threat_level,
            "Encounter started"
        );
        self.total_encounters += 1;
        self.events.push(GameEvent::EnemyEncounterStarted {
            encounter: encounter.clone(),
        });
        self.active = Some(encounter);
        self.scheduler
            .schedule(clock.tick_after(self.config.preparation_delay), EncounterStep::Engage);
    }

    fn determine_enemy_count(&self, location: Location, period: TimePeriod, rng: &mut impl Rng) -> usize {
        let mut group_chance = self.config.base_group_chance;
        if location_danger(location) >= DANGEROUS_LOCATION_THRESHOLD {
            group_chance *= DANGEROUS_GROUP_FACTOR;
        }
        if period == TimePeriod::Night {
            group_chance *= NIGHT_GROUP_FACTOR;
        }

        let mut count = 1;
        while count < self.config.max_enemies_per_encounter && chance(rng, group_chance) {
            count += 1;
            group_chance /= 2.0;
        }
        count
    }

    fn create_enemy(
        &self,
        enemy_type: EnemyType,
        player_level: u32,
        location: Location,
        period: TimePeriod,
        rng: &mut impl Rng,
    ) -> Enemy {
        let min_level = player_level.saturating_sub(1).max(1);
        let mut enemy = Enemy::create_random(enemy_type, min_level, player_level + 2, rng);
        apply_location_modifiers(&mut enemy, location);
        apply_time_modifiers(&mut enemy, period, rng);
        enemy
    }

    fn determine_event_type(&self, rng: &mut impl Rng) -> CombatEventType {
        if self.config.enable_ambushes && chance(rng, self.config.ambush_chance) {
            return CombatEventType::Ambush;
        }
        let r = roll(rng);
        if r < 0.4 {
            CombatEventType::RandomEncounter
        } else if r < 0.65 {
            CombatEventType::Robbery
        } else if r < 0.8 {
            CombatEventType::TerritoryDispute
        } else if r < 0.9 {
            CombatEventType::GangConflict
        } else {
            CombatEventType::Revenge
        }
    }

    fn engage(&mut self, clock: &GameClock, combat: &mut CombatSystem, services: &Services) {
        if services.player.current_health() <= 0.0 {
            debug!("Player down before the fight; closing encounter");
            self.close_active(clock.now(), false);
            return;
        }
        let Some(encounter) = self.active.as_mut() else {
            return;
        };
        if combat.start_combat(encounter.enemies.clone(), encounter.event_type, clock, services) {
            encounter.combat_started = true;
            return;
        }
        debug!("Combat refused; closing encounter without a fight");
        self.close_active(clock.now(), false);
    }

    /// Close the open encounter that produced this combat.
    ///
    /// Fights that did not come from an encounter (or whose start falls
    /// outside the preparation window) are ignored.
    pub fn on_combat_ended(&mut self, data: &CombatData, end_state: CombatState, clock: &GameClock) {
        let Some(encounter) = self.active.as_ref() else {
            return;
        };
        let window = encounter.start_time
            + self.config.preparation_delay
            + clock.delta_seconds();
        let correlated = encounter.combat_started
            && data.start_time >= encounter.start_time
            && data.start_time <= window + f64::EPSILON;
        if !correlated {
            debug!(combat_start = data.start_time, "Combat ended with no matching encounter");
            return;
        }
        let won = end_state == CombatState::PlayerWon;
        if won {
            self.encounters_won += 1;
        }
        self.close_active(clock.now(), won);
    }

    fn close_active(&mut self, now: f64, player_won: bool) {
        let Some(mut encounter) = self.active.take() else {
            return;
        };
        self.scheduler.clear();
        encounter.close(now, player_won);
        info!(
            won = player_won,
            fought = encounter.combat_started,
            duration = encounter.duration,
            "Encounter ended"
        );
        self.events.push(GameEvent::EnemyEncounterEnded {
            encounter: encounter.clone(),
        });
        self.recent.push(encounter);
    }

    fn prune_history(&mut self, now: f64) {
        let horizon = self.config.history_seconds;
        self.recent.retain(|e| now - e.end_time <= horizon);
    }

    pub fn save_data(&self) -> EnemySystemSaveData {
        EnemySystemSaveData {
            recent_encounters: self.recent.clone(),
            total_encounters: self.total_encounters,
            encounters_won: self.encounters_won,
            next_check_tick: self.next_check_tick,
            had_active_encounter: self.active.is_some(),
        }
    }

    /// Restores bookkeeping. Any open encounter is dropped.
    pub fn restore(&mut self, save: EnemySystemSaveData) {
        if save.had_active_encounter {
            info!("Saved mid-encounter; the encounter is abandoned");
        }
        self.active = None;
        self.scheduler.clear();
        self.recent = save.recent_encounters;
        self.total_encounters = save.total_encounters;
        self.encounters_won = save.encounters_won;
        self.next_check_tick = save.next_check_tick;
    }
}

/// Weighted pick favouring enemies whose difficulty matches the player level.
fn choose_enemy_type(location: Location, player_level: u32, rng: &mut impl Rng) -> EnemyType {
    let candidates = get_possible_enemies_for_location(location);
    let mut pool = Vec::new();
    for &enemy_type in candidates {
        let gap = (template(enemy_type).difficulty * 10.0 - f64::from(player_level)).abs();
        let weight = 1.0 / (1.0 + gap);
        let entries = ((weight * ENEMY_POOL_RESOLUTION).ceil() as usize).max(1);
        pool.extend(std::iter::repeat(enemy_type).take(entries));
    }
    pool.get(pick_index(rng, pool.len()))
        .copied()
        .unwrap_or(EnemyType::Thug)
}

fn apply_location_modifiers(enemy: &mut Enemy, location: Location) {
    match location {
        Location::Abandoned => {
            enemy.max_health = (enemy.max_health * 1.3).round();
            enemy.current_health = enemy.max_health;
            enemy.difficulty *= 1.4;
        }
        Location::Industrial => {
            enemy.min_damage *= 1.2;
            enemy.max_damage *= 1.2;
        }
        Location::Downtown => {
            enemy.accuracy = (enemy.accuracy * 1.1).min(1.0);
        }
        _ => {}
    }
}

fn apply_time_modifiers(enemy: &mut Enemy, period: TimePeriod, rng: &mut impl Rng) {
    match period {
        TimePeriod::Night => {
            enemy.aggressiveness = (enemy.aggressiveness + 0.2).min(1.0);
            enemy.money_reward *= 1.5;
            enemy.difficulty *= 1.2;
        }
        TimePeriod::Evening => {
            enemy.aggressiveness = (enemy.aggressiveness + 0.1).min(1.0);
        }
        TimePeriod::EarlyMorning => {
            if chance(rng, 0.3) {
                enemy.accuracy *= 0.8;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedRng;
    use crate::world::{FixedLocation, FixedTimeOfDay, PlayerState, PoliceRecord, PoliceSystem, Wallet};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn services_at(location: Location, period: TimePeriod) -> Services {
        Services::new(Box::new(PlayerState::new(100.0)))
            .with_money(Box::new(Wallet::new(0.0)))
            .with_location(Box::new(FixedLocation(location)))
            .with_time(Box::new(FixedTimeOfDay(period)))
    }

    fn tick_until(
        system: &mut EnemySystem,
        combat: &mut CombatSystem,
        clock: &mut GameClock,
        services: &Services,
        rng: &mut impl Rng,
        ticks: u32,
    ) {
        for _ in 0..ticks {
            clock.advance();
            system.update(clock, combat, services, rng);
        }
    }

    #[test]
    fn test_encounter_chance_formula() {
        let system = EnemySystem::default();
        let services = services_at(Location::Abandoned, TimePeriod::Night);
        // 0.05 * 2.0 * 2.0 * 0.8
        assert!((system.calculate_encounter_chance(&services) - 0.16).abs() < 1e-9);
    }

    #[test]
    fn test_wanted_raises_encounter_chance() {
        let system = EnemySystem::default();
        let mut police = PoliceRecord::default();
        police.report_fighting(Location::Street, 1.0);
        police.report_fighting(Location::Street, 1.0);
        let services = services_at(Location::Street, TimePeriod::Afternoon).with_police(Box::new(police));
        // 0.05 * 1.0 * 0.7 * 0.8 * 1.5
        assert!((system.calculate_encounter_chance(&services) - 0.042).abs() < 1e-9);
    }

    #[test]
    fn test_encounter_chance_is_clamped() {
        let system = EnemySystem::new(EncounterConfig {
            base_encounter_chance: 1.0,
            ..Default::default()
        });
        let services = services_at(Location::Abandoned, TimePeriod::Night)
            .with_money(Box::new(Wallet::new(1_000_000.0)));
        assert_eq!(system.calculate_encounter_chance(&services), 1.0);
    }

    #[test]
    fn test_hospital_roster_only_guards_and_police() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let t = choose_enemy_type(Location::Hospital, 1, &mut rng);
            assert!(matches!(t, EnemyType::SecurityGuard | EnemyType::Police));
        }
    }

    #[test]
    fn test_weighting_prefers_matched_difficulty() {
        // Level 2 player in the Park: DrunkPerson (2.0) should beat Dealer (5.0)
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut drunk = 0;
        let mut dealer = 0;
        for _ in 0..5_000 {
            match choose_enemy_type(Location::Park, 2, &mut rng) {
                EnemyType::DrunkPerson => drunk += 1,
                EnemyType::Dealer => dealer += 1,
                _ => {}
            }
        }
        assert!(drunk > dealer * 2, "drunk={} dealer={}", drunk, dealer);
    }

    #[test]
    fn test_enemy_count_respects_max() {
        let system = EnemySystem::new(EncounterConfig {
            base_group_chance: 1.0,
            max_enemies_per_encounter: 2,
            ..Default::default()
        });
        let mut rng = ScriptedRng::constant(0.0);
        assert_eq!(system.determine_enemy_count(Location::Abandoned, TimePeriod::Night, &mut rng), 2);

        let mut rng = ScriptedRng::constant(0.99);
        assert_eq!(system.determine_enemy_count(Location::Street, TimePeriod::Morning, &mut rng), 1);
    }

    #[test]
    fn test_levels_stay_near_player() {
        let system = EnemySystem::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let enemy = system.create_enemy(EnemyType::Thug, 5, Location::Street, TimePeriod::Afternoon, &mut rng);
            assert!((4..=7).contains(&enemy.level));
            seen.insert(enemy.level);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_abandoned_and_night_modifiers() {
        let mut enemy = Enemy::create_test(EnemyType::Thug);
        apply_location_modifiers(&mut enemy, Location::Abandoned);
        assert_eq!(enemy.max_health, 39.0);
        assert_eq!(enemy.current_health, 39.0);
        assert!((enemy.difficulty - 0.42).abs() < 1e-9);

        let mut rng = ScriptedRng::constant(0.5);
        apply_time_modifiers(&mut enemy, TimePeriod::Night, &mut rng);
        assert!((enemy.aggressiveness - 0.8).abs() < 1e-9);
        assert_eq!(enemy.money_reward, 22.5);
    }

    #[test]
    fn test_downtown_accuracy_capped() {
        let mut enemy = Enemy::create_test(EnemyType::Police);
        enemy.accuracy = 0.95;
        apply_location_modifiers(&mut enemy, Location::Downtown);
        assert_eq!(enemy.accuracy, 1.0);
    }

    #[test]
    fn test_event_type_bands() {
        let system = EnemySystem::new(EncounterConfig {
            enable_ambushes: false,
            ..Default::default()
        });
        let cases = [
            (0.1, CombatEventType::RandomEncounter),
            (0.5, CombatEventType::Robbery),
            (0.7, CombatEventType::TerritoryDispute),
            (0.85, CombatEventType::GangConflict),
            (0.95, CombatEventType::Revenge),
        ];
        for (value, expected) in cases {
            let mut rng = ScriptedRng::constant(value);
            assert_eq!(system.determine_event_type(&mut rng), expected);
        }

        let ambushing = EnemySystem::default();
        let mut rng = ScriptedRng::constant(0.1);
        assert_eq!(ambushing.determine_event_type(&mut rng), CombatEventType::Ambush);
    }

    #[test]
    fn test_forced_encounter_flows_into_combat() {
        let mut system = EnemySystem::new(EncounterConfig {
            force_encounters: true,
            ..Default::default()
        });
        let mut combat = CombatSystem::default();
        let services = services_at(Location::Street, TimePeriod::Afternoon);
        let mut clock = GameClock::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        // First check at 30 s
        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 299);
        assert!(!system.has_active_encounter());
        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 1);
        assert!(system.has_active_encounter());
        assert!(!combat.is_in_combat());
        let started = system
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::EnemyEncounterStarted { .. }));
        assert!(started);

        // 2 s preparation
        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 20);
        assert!(combat.is_in_combat());
        assert!(system.active_encounter().is_some_and(|e| e.combat_started));
        assert_eq!(system.total_encounters(), 1);
    }

    #[test]
    fn test_refused_combat_closes_encounter() {
        let mut system = EnemySystem::default();
        let mut combat = CombatSystem::default();
        let services = services_at(Location::Street, TimePeriod::Afternoon);
        let mut clock = GameClock::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        assert!(system.trigger_random_encounter(&clock, &combat, &services, &mut rng));
        assert!(!system.trigger_random_encounter(&clock, &combat, &services, &mut rng));

        // Someone else starts a fight during the preparation window.
        combat.start_combat(
            vec![Enemy::create_test(EnemyType::Thug)],
            CombatEventType::Robbery,
            &clock,
            &services,
        );
        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 20);

        assert!(!system.has_active_encounter());
        let last = system.recent_encounters().last().expect("closed encounter");
        assert!(!last.combat_started);
        assert!(!last.player_won);
    }

    #[test]
    fn test_combat_end_closes_matching_encounter() {
        let mut system = EnemySystem::default();
        let mut combat = CombatSystem::default();
        let mut services = services_at(Location::Street, TimePeriod::Afternoon);
        let mut clock = GameClock::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        assert!(system.trigger_encounter_with(
            EnemyType::Bully,
            CombatEventType::Revenge,
            &clock,
            &combat,
            &services,
            &mut rng
        ));
        let encounter = system.active_encounter().expect("active");
        assert_eq!(encounter.enemies.len(), 1);
        assert_eq!(encounter.enemies[0].enemy_type, EnemyType::Bully);
        assert_eq!(encounter.event_type, CombatEventType::Revenge);

        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 20);
        assert!(combat.force_end_combat(CombatState::PlayerWon, &clock, &mut services));
        let data = combat.active_combat().cloned().expect("combat data");
        system.on_combat_ended(&data, CombatState::PlayerWon, &clock);

        assert!(!system.has_active_encounter());
        assert_eq!(system.encounters_won(), 1);
        assert!(system.recent_encounters()[0].player_won);
    }

    #[test]
    fn test_unrelated_combat_end_ignored() {
        let mut system = EnemySystem::default();
        let combat = CombatSystem::default();
        let services = services_at(Location::Street, TimePeriod::Afternoon);
        let clock = GameClock::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        system.trigger_random_encounter(&clock, &combat, &services, &mut rng);

        let stray = CombatData::new(CombatEventType::Robbery, Vec::new(), 500.0, 100.0);
        system.on_combat_ended(&stray, CombatState::PlayerLost, &GameClock::at_tick(5_000));
        assert!(system.has_active_encounter());
    }

    #[test]
    fn test_history_pruned_after_an_hour() {
        let mut system = EnemySystem::new(EncounterConfig {
            enabled: false,
            ..Default::default()
        });
        let mut encounter = EnemyEncounter::new(
            CombatEventType::Robbery,
            vec![Enemy::create_test(EnemyType::Thug)],
            Location::Street,
            0.0,
            1,
        );
        encounter.close(10.0, true);
        system.restore(EnemySystemSaveData {
            recent_encounters: vec![encounter],
            total_encounters: 1,
            encounters_won: 1,
            next_check_tick: 0,
            had_active_encounter: false,
        });

        let mut combat = CombatSystem::default();
        let services = services_at(Location::Street, TimePeriod::Afternoon);
        let mut rng = ScriptedRng::constant(0.5);
        system.update(&GameClock::at_tick(36_000), &mut combat, &services, &mut rng);
        assert_eq!(system.recent_encounters().len(), 1);
        system.update(&GameClock::at_tick(36_200), &mut combat, &services, &mut rng);
        assert!(system.recent_encounters().is_empty());
        assert_eq!(system.save_data().total_encounters, 1);
    }

    #[test]
    fn test_no_check_while_in_combat() {
        let mut system = EnemySystem::new(EncounterConfig {
            force_encounters: true,
            ..Default::default()
        });
        let mut combat = CombatSystem::default();
        let services = services_at(Location::Street, TimePeriod::Afternoon);
        let clock = GameClock::new();
        combat.start_combat(
            vec![Enemy::create_test(EnemyType::Thug)],
            CombatEventType::Robbery,
            &clock,
            &services,
        );
        let mut rng = ScriptedRng::constant(0.0);
        system.update(&GameClock::at_tick(300), &mut combat, &services, &mut rng);
        assert!(!system.has_active_encounter());
    }

    #[test]
    fn test_downed_player_gets_no_encounters() {
        let mut system = EnemySystem::new(EncounterConfig {
            force_encounters: true,
            ..Default::default()
        });
        let mut combat = CombatSystem::default();
        let mut services = services_at(Location::Abandoned, TimePeriod::Night);
        services.player.change_health(-100.0);
        let mut clock = GameClock::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 3_000);
        assert_eq!(system.total_encounters(), 0);
        assert!(!combat.is_in_combat());
        assert!(!system.trigger_random_encounter(&clock, &combat, &services, &mut rng));
        assert!(!system.trigger_encounter_with(
            EnemyType::Thug,
            CombatEventType::Revenge,
            &clock,
            &combat,
            &services,
            &mut rng
        ));

        // Back on their feet, trouble finds them again
        services.player.change_health(50.0);
        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 300);
        assert!(system.total_encounters() > 0);
    }

    #[test]
    fn test_player_downed_during_preparation_skips_the_fight() {
        let mut system = EnemySystem::default();
        let mut combat = CombatSystem::default();
        let mut services = services_at(Location::Street, TimePeriod::Afternoon);
        let mut clock = GameClock::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        assert!(system.trigger_random_encounter(&clock, &combat, &services, &mut rng));
        services.player.change_health(-100.0);
        tick_until(&mut system, &mut combat, &mut clock, &services, &mut rng, 20);

        assert!(!combat.is_in_combat());
        assert!(!system.has_active_encounter());
        let last = system.recent_encounters().last().expect("closed encounter");
        assert!(!last.combat_started);
    }

    #[test]
    fn test_industrial_damage_bonus() {
        let base = Enemy::create_test(EnemyType::GangMember);
        let cases = [
            (Location::Industrial, 1.2),
            (Location::Street, 1.0),
            (Location::Park, 1.0),
        ];
        for (location, factor) in cases {
            let mut enemy = base.clone();
            apply_location_modifiers(&mut enemy, location);
            assert!((enemy.min_damage - base.min_damage * factor).abs() < 1e-9, "{:?}", location);
            assert!((enemy.max_damage - base.max_damage * factor).abs() < 1e-9, "{:?}", location);
            assert_eq!(enemy.max_health, base.max_health);
        }
    }

    #[test]
    fn test_early_morning_accuracy_penalty() {
        let base = Enemy::create_test(EnemyType::Robber);
        // (period, roll, accuracy factor)
        let cases = [
            (TimePeriod::EarlyMorning, 0.1, 0.8),
            (TimePeriod::EarlyMorning, 0.29, 0.8),
            (TimePeriod::EarlyMorning, 0.3, 1.0),
            (TimePeriod::EarlyMorning, 0.9, 1.0),
            (TimePeriod::Morning, 0.1, 1.0),
        ];
        for (period, value, factor) in cases {
            let mut enemy = base.clone();
            let mut rng = ScriptedRng::constant(value);
            apply_time_modifiers(&mut enemy, period, &mut rng);
            assert!(
                (enemy.accuracy - base.accuracy * factor).abs() < 1e-9,
                "{:?} at roll {}",
                period,
                value
            );
        }
    }

    #[test]
    fn test_save_records_open_encounter() {
        let mut system = EnemySystem::default();
        let combat = CombatSystem::default();
        let services = services_at(Location::Street, TimePeriod::Afternoon);
        let clock = GameClock::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(!system.save_data().had_active_encounter);

        system.trigger_random_encounter(&clock, &combat, &services, &mut rng);
        let save = system.save_data();
        assert!(save.had_active_encounter);
        let json = serde_json::to_string(&save).expect("serialize");
        let save: EnemySystemSaveData = serde_json::from_str(&json).expect("deserialize");
        assert!(save.had_active_encounter);

        let mut restored = EnemySystem::default();
        restored.restore(save);
        assert!(!restored.has_active_encounter());
        assert_eq!(restored.total_encounters(), 1);
        assert!(!restored.save_data().had_active_encounter);
    }
}
