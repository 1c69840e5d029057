//! Post-combat consequence engine.
//!
//! Reacts to a finished fight (rewards, losses, injuries, witnesses, grudges),
//! rolls occasional street events while idle, and expires lasting
//! consequences as game time passes.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, info};

use super::injury::{damage_ratio, injury_severity, injury_threshold};
use super::types::*;
use crate::combat::{CombatData, CombatResult, CombatState, Combatant, EnemyType};
use crate::core::config::ConsequenceConfig;
use crate::core::constants::*;
use crate::core::events::GameEvent;
use crate::core::rng::{chance, range, roll};
use crate::core::scheduler::{ticks_for, GameClock};
use crate::encounters::location_witness_multiplier;
use crate::world::{NotificationKind, Services, SkillType};

const REPUTATION_MIN: f64 = -100.0;
const REPUTATION_MAX: f64 = 100.0;
const RELATIONSHIP_MIN: f64 = -1.0;
const RELATIONSHIP_MAX: f64 = 1.0;
/// Severity passed to the police when someone reports the fight.
const REPORT_SEVERITY: f64 = 0.5;

pub struct CombatEvents {
    config: ConsequenceConfig,
    reputation: f64,
    active: Vec<CombatConsequence>,
    victories_by_type: BTreeMap<EnemyType, u32>,
    relationships: BTreeMap<EnemyType, f64>,
    critical_hits: u32,
    hits_taken: u32,
    next_event_tick: u64,
    events: Vec<GameEvent>,
}

impl Default for CombatEvents {
    fn default() -> Self {
        Self::new(ConsequenceConfig::default())
    }
}

impl CombatEvents {
    pub fn new(config: ConsequenceConfig) -> Self {
        let next_event_tick = ticks_for(config.event_check_interval);
        Self {
            config,
            reputation: 0.0,
            active: Vec::new(),
            victories_by_type: BTreeMap::new(),
            relationships: BTreeMap::new(),
            critical_hits: 0,
            hits_taken: 0,
            next_event_tick,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConsequenceConfig {
        &self.config
    }

    pub fn reputation(&self) -> f64 {
        self.reputation
    }

    pub fn active_consequences(&self) -> &[CombatConsequence] {
        &self.active
    }

    /// −1 (avoids the player) ..= 1 (hunts the player). 0 when unknown.
    pub fn relationship(&self, enemy_type: EnemyType) -> f64 {
        self.relationships.get(&enemy_type).copied().unwrap_or(0.0)
    }

    pub fn victories_against(&self, enemy_type: EnemyType) -> u32 {
        self.victories_by_type.get(&enemy_type).copied().unwrap_or(0)
    }

    /// Lifetime critical hits landed by the player.
    pub fn critical_hits(&self) -> u32 {
        self.critical_hits
    }

    /// Lifetime enemy blows that did damage.
    pub fn hits_taken(&self) -> u32 {
        self.hits_taken
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Periodic street events, then expiry of lasting consequences.
    pub fn update(&mut self, clock: &GameClock, services: &mut Services, rng: &mut impl Rng) {
        if clock.tick() >= self.next_event_tick {
            self.next_event_tick = clock.tick() + ticks_for(self.config.event_check_interval).max(1);
            if self.config.enable_random_events && chance(rng, self.config.base_event_chance) {
                self.random_event(clock.now(), services, rng);
            }
        }
        self.expire_consequences(clock.now(), services);
    }

    /// Tally one resolved action from the running fight.
    pub fn on_combat_action(&mut self, actor: Combatant, result: CombatResult, damage: f64) {
        match (actor, result) {
            (Combatant::Player, CombatResult::Critical) => self.critical_hits += 1,
            (Combatant::Enemy(_), CombatResult::Hit | CombatResult::Critical) if damage > 0.0 => {
                self.hits_taken += 1
            }
            _ => return,
        }
        debug!(
            criticals = self.critical_hits,
            hits_taken = self.hits_taken,
            "Combat tally"
        );
    }

    /// Apply every after-effect of a finished fight.
    pub fn on_combat_ended(
        &mut self,
        data: &CombatData,
        end_state: CombatState,
        clock: &GameClock,
        services: &mut Services,
        rng: &mut impl Rng,
    ) {
        let now = clock.now();
        info!(?end_state, "Processing combat consequences");
        match end_state {
            CombatState::PlayerWon => self.handle_victory(data, now, services, rng),
            CombatState::PlayerLost => self.handle_defeat(now, services, rng),
            CombatState::PlayerFled => self.handle_flee(now, services, rng),
            _ => {
                debug!(?end_state, "Ignoring non-terminal combat end");
                return;
            }
        }

        let lost = end_state == CombatState::PlayerLost;
        self.check_injury(data, lost, now, services, rng);
        self.check_witnesses(data, now, services, rng);
        self.update_relationships(data, end_state);
        self.special_rolls(data, end_state, now, services, rng);
    }

    fn handle_victory(&mut self, data: &CombatData, now: f64, services: &mut Services, rng: &mut impl Rng) {
        let bonus: f64 = data
            .enemies
            .iter()
            .filter(|e| e.is_defeated())
            .map(|e| e.difficulty * REPUTATION_PER_DIFFICULTY)
            .sum();
        self.change_reputation(self.config.base_reputation_gain + bonus, now);

        let xp = data.total_damage_dealt * XP_PER_DAMAGE_DEALT
            + f64::from(data.player_criticals) * XP_PER_CRITICAL
            + data.duration * XP_PER_COMBAT_SECOND;
        services.add_skill_experience(SkillType::Fitness, xp);
        debug!(xp, "Combat experience awarded");

        if chance(rng, ITEM_FOUND_CHANCE) {
            self.item_found(now, services, rng);
        }
    }

    fn handle_defeat(&mut self, now: f64, services: &mut Services, rng: &mut impl Rng) {
        let ratio = range(rng, DEFEAT_MONEY_LOSS_MIN, DEFEAT_MONEY_LOSS_MAX);
        let amount = services.money() * ratio;
        if amount > 0.0 && services.spend_money(amount, "Robbed after losing a fight") {
            self.add_consequence(
                CombatConsequence::instant(ConsequencePayload::MoneyLoss { amount }, now, ratio),
            );
            services.notify(
                "Robbed",
                &format!("You lost ${:.2} while you were down.", amount),
                NotificationKind::Danger,
            );
        }

        self.change_reputation(-self.config.base_reputation_loss, now);

        if chance(rng, self.config.hospital_chance) {
            let cost = self.config.hospital_cost;
            let paid = services.spend_money(cost, "Hospital bill");
            let target = services.player.max_health() * HOSPITAL_HEALTH_RATIO;
            let current = services.player.current_health();
            if current < target {
                services.player.change_health(target - current);
            }
            self.add_consequence(CombatConsequence::instant(
                ConsequencePayload::Hospitalization {
                    cost: if paid { cost } else { 0.0 },
                },
                now,
                1.0,
            ));
            services.notify(
                "Hospitalized",
                "Someone called an ambulance. You wake up patched together.",
                NotificationKind::Warning,
            );
        }

        if chance(rng, DEFEAT_POLICE_REPORT_CHANCE) {
            let location = services.location();
            services.report_fighting(location, REPORT_SEVERITY);
            debug!(?location, "Defeat reported to police");
        }
    }

    fn handle_flee(&mut self, now: f64, services: &mut Services, rng: &mut impl Rng) {
        self.change_reputation(-self.config.base_reputation_loss / 2.0, now);
        services.player.change_mood(FLEE_CONSEQUENCE_MOOD_PENALTY);

        if chance(rng, PURSUIT_CHANCE) {
            self.add_consequence(CombatConsequence::new(
                ConsequencePayload::Pursuit,
                now,
                PURSUIT_DURATION_SECONDS,
                0.5,
            ));
            services.notify(
                "Pursued",
                "They're still after you. Keep moving.",
                NotificationKind::Warning,
            );
        }
    }

    fn check_injury(
        &mut self,
        data: &CombatData,
        lost: bool,
        now: f64,
        services: &mut Services,
        rng: &mut impl Rng,
    ) {
        if !self.config.allow_injuries || !(lost || data.total_damage_received > 0.0) {
            return;
        }
        let max_health = services.player.max_health();
        let threshold = injury_threshold(
            self.config.base_injury_chance,
            data.total_damage_received,
            max_health,
            lost,
            services.skill_level(SkillType::Fitness),
        );
        let injured = self.config.force_injury || roll(rng) < threshold;
        if !injured {
            return;
        }

        let injury = InjuryType::from_roll(roll(rng));
        let ratio = damage_ratio(data.total_damage_received, max_health);
        let mut severity = injury_severity(roll(rng), ratio);
        if lost && chance(rng, SEVERE_INJURY_CHANCE) {
            severity = 1.0;
        }

        let modifiers = injury.modifiers(severity);
        for modifier in &modifiers {
            services.player.add_stat_modifier(modifier.clone());
        }
        info!(?injury, severity, "Player injured");
        self.events.push(GameEvent::PlayerInjured { injury, severity });
        services.notify(
            "Injured",
            &format!("You suffered a {} (severity {:.0}%).", injury.name(), severity * 100.0),
            NotificationKind::Danger,
        );
        self.add_consequence(CombatConsequence::new(
            ConsequencePayload::Injury { injury, modifiers },
            now,
            injury.duration(severity),
            severity,
        ));
    }

    fn check_witnesses(&mut self, data: &CombatData, now: f64, services: &mut Services, rng: &mut impl Rng) {
        let location = services.location();
        let witness_chance = self.config.witness_report_chance * location_witness_multiplier(location);
        if !chance(rng, witness_chance) {
            return;
        }
        services.report_fighting(location, REPORT_SEVERITY);
        debug!(?location, enemies = data.enemies.len(), "Fight witnessed and reported");
        self.add_consequence(CombatConsequence::instant(
            ConsequencePayload::WitnessReport { location },
            now,
            REPORT_SEVERITY,
        ));
        services.notify(
            "Witnessed",
            "Someone saw the fight and called the police.",
            NotificationKind::Warning,
        );
    }

    fn update_relationships(&mut self, data: &CombatData, end_state: CombatState) {
        let mut types: Vec<EnemyType> = data.enemies.iter().map(|e| e.enemy_type).collect();
        types.sort();
        types.dedup();

        for enemy_type in types {
            let delta = match end_state {
                CombatState::PlayerWon => {
                    let wins = self.victories_by_type.entry(enemy_type).or_insert(0);
                    *wins += 1;
                    if *wins % VICTORIES_PER_RELATIONSHIP_STEP != 0 {
                        continue;
                    }
                    -RELATIONSHIP_AVOIDANCE_STEP
                }
                CombatState::PlayerLost => RELATIONSHIP_AGGRESSION_STEP,
                _ => continue,
            };
            let relationship = self.relationships.entry(enemy_type).or_insert(0.0);
            *relationship = (*relationship + delta).clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX);
            let relationship = *relationship;
            debug!(?enemy_type, relationship, "Enemy relationship changed");
            self.events.push(GameEvent::EnemyRelationshipChanged {
                enemy_type,
                relationship,
            });
        }
    }

    fn special_rolls(
        &mut self,
        data: &CombatData,
        end_state: CombatState,
        now: f64,
        services: &mut Services,
        rng: &mut impl Rng,
    ) {
        match end_state {
            CombatState::PlayerLost => {
                if chance(rng, RANDOM_HELP_CHANCE) {
                    services.player.change_health(RANDOM_HELP_HEALTH);
                    self.add_consequence(CombatConsequence::instant(
                        ConsequencePayload::RandomHelp {
                            health: RANDOM_HELP_HEALTH,
                        },
                        now,
                        0.3,
                    ));
                    services.notify(
                        "A stranger helps",
                        "A passer-by helps you up and patches you up a little.",
                        NotificationKind::Success,
                    );
                }
            }
            CombatState::PlayerWon => {
                if self.config.allow_retaliation && chance(rng, RETALIATION_CHANCE) {
                    let grudge = data
                        .enemies
                        .iter()
                        .find(|e| e.is_defeated())
                        .or_else(|| data.enemies.first())
                        .map(|e| e.enemy_type);
                    if let Some(enemy_type) = grudge {
                        let delay = range(
                            rng,
                            RETALIATION_MIN_DELAY_SECONDS,
                            RETALIATION_MAX_DELAY_SECONDS,
                        );
                        info!(?enemy_type, delay, "Retaliation scheduled");
                        self.add_consequence(CombatConsequence::new(
                            ConsequencePayload::Retaliation { enemy_type },
                            now,
                            delay,
                            0.5,
                        ));
                    }
                }
            }
            _ => {}
        }

        if data.total_damage_received > MEDICAL_ASSISTANCE_DAMAGE_THRESHOLD
            && chance(rng, MEDICAL_ASSISTANCE_CHANCE)
            && services.spend_money(MEDICAL_ASSISTANCE_COST, "Street medic")
        {
            services.player.change_health(MEDICAL_ASSISTANCE_HEALTH);
            self.add_consequence(CombatConsequence::instant(
                ConsequencePayload::MedicalAssistance {
                    cost: MEDICAL_ASSISTANCE_COST,
                    health: MEDICAL_ASSISTANCE_HEALTH,
                },
                now,
                0.5,
            ));
            services.notify(
                "Medical help",
                "A street medic cleans you up for a few bucks.",
                NotificationKind::Info,
            );
        }
    }

    fn random_event(&mut self, now: f64, services: &mut Services, rng: &mut impl Rng) {
        let r = roll(rng);
        debug!(roll = r, "Random street event");
        if r < 0.3 {
            self.change_reputation(RANDOM_EVENT_REPUTATION, now);
        } else if r < 0.6 {
            self.item_found(now, services, rng);
        } else if r < 0.9 {
            let hourly_wage = range(rng, JOB_OFFER_MIN_WAGE, JOB_OFFER_MAX_WAGE);
            self.add_consequence(CombatConsequence::instant(
                ConsequencePayload::JobOffer { hourly_wage },
                now,
                0.2,
            ));
            services.notify(
                "Job offer",
                &format!("Someone offers you work at ${:.2}/hour.", hourly_wage),
                NotificationKind::Info,
            );
        }
    }

    /// No inventory to hold it: the item is sold on the spot.
    fn item_found(&mut self, now: f64, services: &mut Services, rng: &mut impl Rng) {
        let value = range(rng, ITEM_FOUND_MIN_VALUE, ITEM_FOUND_MAX_VALUE);
        services.add_money(value, "Found item");
        self.add_consequence(CombatConsequence::instant(
            ConsequencePayload::ItemFound { value },
            now,
            0.2,
        ));
        services.notify(
            "Found something",
            &format!("You found something worth ${:.2}.", value),
            NotificationKind::Success,
        );
    }

    fn change_reputation(&mut self, delta: f64, now: f64) {
        let before = self.reputation;
        self.reputation = (self.reputation + delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
        let applied = self.reputation - before;
        debug!(delta = applied, reputation = self.reputation, "Reputation changed");
        self.events.push(GameEvent::ReputationChanged {
            reputation: self.reputation,
            delta: applied,
        });
        let severity = (delta.abs() / 10.0).min(1.0);
        self.add_consequence(CombatConsequence::instant(
            ConsequencePayload::Reputation { amount: applied },
            now,
            severity,
        ));
    }

    /// Publishes the consequence; lasting ones stay active until they expire.
    fn add_consequence(&mut self, consequence: CombatConsequence) {
        debug!(kind = ?consequence.consequence_type, duration = consequence.duration, "Consequence");
        self.events.push(GameEvent::CombatConsequence {
            consequence: consequence.clone(),
        });
        if consequence.is_lasting() {
            self.active.push(consequence);
        }
    }

    fn expire_consequences(&mut self, now: f64, services: &mut Services) {
        let (expired, still_active): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.active).into_iter().partition(|c| c.is_expired(now));
        self.active = still_active;

        for consequence in expired {
            match consequence.payload {
                ConsequencePayload::Injury { injury, .. } => {
                    info!(?injury, "Injury healed");
                    self.events.push(GameEvent::PlayerHealed { injury });
                    services.notify(
                        "Healed",
                        &format!("Your {} has healed.", injury.name()),
                        NotificationKind::Success,
                    );
                }
                ConsequencePayload::Retaliation { enemy_type } => {
                    info!(?enemy_type, "Retaliation due");
                    self.events.push(GameEvent::RetaliationDue { enemy_type });
                }
                ConsequencePayload::Pursuit => {
                    services.notify(
                        "Safe",
                        "You lost your pursuers.",
                        NotificationKind::Info,
                    );
                }
                _ => {}
            }
        }
    }

    pub fn save_data(&self) -> CombatEventsSaveData {
        CombatEventsSaveData {
            reputation: self.reputation,
            active_consequences: self.active.clone(),
            victories_by_type: self.victories_by_type.clone(),
            relationships: self.relationships.clone(),
            critical_hits: self.critical_hits,
            hits_taken: self.hits_taken,
            next_event_tick: self.next_event_tick,
        }
    }

    pub fn restore(&mut self, save: CombatEventsSaveData) {
        self.reputation = save.reputation.clamp(REPUTATION_MIN, REPUTATION_MAX);
        self.active = save.active_consequences;
        self.victories_by_type = save.victories_by_type;
        self.relationships = save.relationships;
        self.critical_hits = save.critical_hits;
        self.hits_taken = save.hits_taken;
        self.next_event_tick = save.next_event_tick;
    }
}
