//! In-memory collaborators used by the simulator and by tests.

use super::services::{
    LocationManager, MoneySystem, NotificationSystem, PlayerStats, PoliceSystem, SkillSystem,
    TimeOfDayManager, WeaponSystem,
};
use super::types::{Location, NotificationKind, SkillType, StatModifier, StatType, TimePeriod, Weapon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Experience needed per skill level.
const XP_PER_SKILL_LEVEL: f64 = 100.0;
/// Wanted level rises once this much fighting severity has been reported.
const WANTED_SEVERITY_PER_LEVEL: f64 = 1.0;
const MAX_WANTED_LEVEL: u32 = 5;
const MOOD_MIN: f64 = 0.0;
const MOOD_MAX: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActiveModifier {
    modifier: StatModifier,
    remaining: f64,
}

/// Health, mood and timed modifiers of the player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: f64,
    pub base_max_health: f64,
    pub mood: f64,
    pub level: u32,
    modifiers: Vec<ActiveModifier>,
}

impl PlayerState {
    pub fn new(max_health: f64) -> Self {
        Self {
            health: max_health,
            base_max_health: max_health,
            mood: 50.0,
            level: 1,
            modifiers: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn active_modifiers(&self) -> impl Iterator<Item = &StatModifier> {
        self.modifiers.iter().map(|m| &m.modifier)
    }

    fn clamp_health(&mut self) {
        let max = self.max_health();
        self.health = self.health.clamp(0.0, max);
    }
}

impl PlayerStats for PlayerState {
    fn current_health(&self) -> f64 {
        self.health
    }

    /// Base maximum adjusted by health modifiers, never below 1.
    fn max_health(&self) -> f64 {
        (self.base_max_health + self.stat_modifier_total(StatType::Health)).max(1.0)
    }

    fn mood(&self) -> f64 {
        self.mood + self.stat_modifier_total(StatType::Mood)
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn change_health(&mut self, amount: f64) {
        self.health += amount;
        self.clamp_health();
    }

    fn change_mood(&mut self, amount: f64) {
        self.mood = (self.mood + amount).clamp(MOOD_MIN, MOOD_MAX);
    }

    fn add_stat_modifier(&mut self, modifier: StatModifier) {
        let remaining = modifier.duration;
        self.modifiers.push(ActiveModifier {
            modifier,
            remaining,
        });
        self.clamp_health();
    }

    fn stat_modifier_total(&self, stat: StatType) -> f64 {
        self.modifiers
            .iter()
            .filter(|m| m.modifier.stat == stat)
            .map(|m| m.modifier.amount)
            .sum()
    }

    fn tick_modifiers(&mut self, delta_seconds: f64) {
        for active in &mut self.modifiers {
            active.remaining -= delta_seconds;
        }
        self.modifiers.retain(|m| m.remaining > 0.0);
    }
}

/// Skill experience ledger; level is `floor(xp / 100)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillBook {
    experience: HashMap<SkillType, f64>,
}

impl SkillBook {
    pub fn with_level(mut self, skill: SkillType, level: u32) -> Self {
        self.experience
            .insert(skill, f64::from(level) * XP_PER_SKILL_LEVEL);
        self
    }

    pub fn experience(&self, skill: SkillType) -> f64 {
        self.experience.get(&skill).copied().unwrap_or(0.0)
    }
}

impl SkillSystem for SkillBook {
    fn skill_level(&self, skill: SkillType) -> u32 {
        (self.experience(skill) / XP_PER_SKILL_LEVEL).floor().max(0.0) as u32
    }

    fn add_skill_experience(&mut self, skill: SkillType, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        *self.experience.entry(skill).or_insert(0.0) += amount;
    }
}

/// Holds the currently equipped weapon, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Armory {
    pub equipped: Option<Weapon>,
}

impl Armory {
    pub fn equipped(weapon: Weapon) -> Self {
        Self {
            equipped: Some(weapon),
        }
    }
}

impl WeaponSystem for Armory {
    fn current_weapon(&self) -> Option<&Weapon> {
        self.equipped.as_ref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: f64,
}

impl Wallet {
    pub fn new(balance: f64) -> Self {
        Self { balance }
    }
}

impl MoneySystem for Wallet {
    fn money(&self) -> f64 {
        self.balance
    }

    fn add_money(&mut self, amount: f64, _reason: &str) {
        if amount > 0.0 {
            self.balance += amount;
        }
    }

    fn spend_money(&mut self, amount: f64, _reason: &str) -> bool {
        if amount < 0.0 || !self.can_afford(amount) {
            return false;
        }
        self.balance -= amount;
        true
    }
}

/// Accumulates fighting reports into a wanted level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoliceRecord {
    pub reported_severity: f64,
    pub reports: Vec<Location>,
}

impl PoliceSystem for PoliceRecord {
    fn report_fighting(&mut self, location: Location, severity: f64) {
        self.reported_severity += severity.clamp(0.0, 1.0);
        self.reports.push(location);
    }

    fn is_wanted(&self) -> bool {
        self.wanted_level() > 0
    }

    fn wanted_level(&self) -> u32 {
        ((self.reported_severity / WANTED_SEVERITY_PER_LEVEL).floor() as u32).min(MAX_WANTED_LEVEL)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Location);

impl LocationManager for FixedLocation {
    fn current_location(&self) -> Location {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedTimeOfDay(pub TimePeriod);

impl TimeOfDayManager for FixedTimeOfDay {
    fn current_period(&self) -> TimePeriod {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
}

/// Keeps every notification; the simulator prints them in verbose mode.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    pub entries: Vec<Notification>,
}

impl NotificationSystem for NotificationLog {
    fn show_notification(&mut self, title: &str, body: &str, kind: NotificationKind) {
        tracing::debug!(title, body, ?kind, "Notification");
        self.entries.push(Notification {
            title: title.to_string(),
            body: body.to_string(),
            kind,
        });
    }
}
