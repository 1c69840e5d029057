//! Collaborator contracts consumed by the combat core.
//!
//! Every system the combat code talks to is reached through one of these
//! traits, handed in explicitly via [`Services`]. Optional collaborators that
//! are absent contribute zero to any formula that reads them.

use super::memory::{
    Armory, FixedLocation, FixedTimeOfDay, NotificationLog, PlayerState, PoliceRecord, SkillBook,
    Wallet,
};
use super::types::{Location, NotificationKind, SkillType, StatModifier, StatType, TimePeriod, Weapon};

pub trait PlayerStats {
    fn current_health(&self) -> f64;
    fn max_health(&self) -> f64;
    fn mood(&self) -> f64;
    /// Overall character level used to pick enemies of a matching difficulty.
    fn level(&self) -> u32;
    /// Adds `amount` (negative to damage), clamped to `[0, max_health]`.
    fn change_health(&mut self, amount: f64);
    fn change_mood(&mut self, amount: f64);
    fn add_stat_modifier(&mut self, modifier: StatModifier);
    /// Sum of all active modifiers touching `stat`.
    fn stat_modifier_total(&self, stat: StatType) -> f64;
    /// Ages active modifiers by `delta_seconds`, dropping expired ones.
    fn tick_modifiers(&mut self, delta_seconds: f64);
}

pub trait SkillSystem {
    fn skill_level(&self, skill: SkillType) -> u32;
    fn add_skill_experience(&mut self, skill: SkillType, amount: f64);
}

pub trait WeaponSystem {
    fn current_weapon(&self) -> Option<&Weapon>;
}

pub trait MoneySystem {
    fn money(&self) -> f64;
    fn add_money(&mut self, amount: f64, reason: &str);
    /// Returns false (and changes nothing) when the balance is too low.
    fn spend_money(&mut self, amount: f64, reason: &str) -> bool;
    fn can_afford(&self, amount: f64) -> bool {
        self.money() >= amount
    }
}

pub trait PoliceSystem {
    fn report_fighting(&mut self, location: Location, severity: f64);
    fn is_wanted(&self) -> bool;
    fn wanted_level(&self) -> u32;
}

pub trait LocationManager {
    fn current_location(&self) -> Location;
}

pub trait TimeOfDayManager {
    fn current_period(&self) -> TimePeriod;
}

pub trait NotificationSystem {
    fn show_notification(&mut self, title: &str, body: &str, kind: NotificationKind);
}

/// The set of collaborators injected into the combat core.
pub struct Services {
    pub player: Box<dyn PlayerStats>,
    pub money: Option<Box<dyn MoneySystem>>,
    pub skills: Option<Box<dyn SkillSystem>>,
    pub weapons: Option<Box<dyn WeaponSystem>>,
    pub police: Option<Box<dyn PoliceSystem>>,
    pub location: Option<Box<dyn LocationManager>>,
    pub time: Option<Box<dyn TimeOfDayManager>>,
    pub notifications: Option<Box<dyn NotificationSystem>>,
}

impl Services {
    /// Only a player; every optional collaborator is missing.
    pub fn new(player: Box<dyn PlayerStats>) -> Self {
        Self {
            player,
            money: None,
            skills: None,
            weapons: None,
            police: None,
            location: None,
            time: None,
            notifications: None,
        }
    }

    /// Full set of in-memory collaborators with a fresh 100 HP player.
    pub fn in_memory() -> Self {
        Self::new(Box::new(PlayerState::new(100.0)))
            .with_money(Box::new(Wallet::new(0.0)))
            .with_skills(Box::new(SkillBook::default()))
            .with_weapons(Box::new(Armory::default()))
            .with_police(Box::new(PoliceRecord::default()))
            .with_location(Box::new(FixedLocation(Location::Street)))
            .with_time(Box::new(FixedTimeOfDay(TimePeriod::Afternoon)))
            .with_notifications(Box::new(NotificationLog::default()))
    }

    pub fn with_money(mut self, money: Box<dyn MoneySystem>) -> Self {
        self.money = Some(money);
        self
    }

    pub fn with_skills(mut self, skills: Box<dyn SkillSystem>) -> Self {
        self.skills = Some(skills);
        self
    }

    pub fn with_weapons(mut self, weapons: Box<dyn WeaponSystem>) -> Self {
        self.weapons = Some(weapons);
        self
    }

    pub fn with_police(mut self, police: Box<dyn PoliceSystem>) -> Self {
        self.police = Some(police);
        self
    }

    pub fn with_location(mut self, location: Box<dyn LocationManager>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_time(mut self, time: Box<dyn TimeOfDayManager>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_notifications(mut self, notifications: Box<dyn NotificationSystem>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Effective skill level: trained level plus any active stat modifier.
    /// Zero when no skill system is present.
    pub fn skill_level(&self, skill: SkillType) -> f64 {
        let base = self
            .skills
            .as_ref()
            .map_or(0.0, |s| f64::from(s.skill_level(skill)));
        let modifier = match skill {
            SkillType::Fitness => self.player.stat_modifier_total(StatType::Fitness),
            SkillType::Charisma => self.player.stat_modifier_total(StatType::Charisma),
            SkillType::Intelligence => self.player.stat_modifier_total(StatType::Intelligence),
            SkillType::Luck => 0.0,
        };
        base + modifier
    }

    pub fn add_skill_experience(&mut self, skill: SkillType, amount: f64) {
        if let Some(skills) = self.skills.as_mut() {
            skills.add_skill_experience(skill, amount);
        }
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapons.as_ref().and_then(|w| w.current_weapon())
    }

    pub fn money(&self) -> f64 {
        self.money.as_ref().map_or(0.0, |m| m.money())
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        self.money.as_ref().is_some_and(|m| m.can_afford(amount))
    }

    pub fn add_money(&mut self, amount: f64, reason: &str) {
        if let Some(money) = self.money.as_mut() {
            money.add_money(amount, reason);
        }
    }

    pub fn spend_money(&mut self, amount: f64, reason: &str) -> bool {
        self.money
            .as_mut()
            .is_some_and(|m| m.spend_money(amount, reason))
    }

    /// Current location, `Street` when nothing tracks it.
    pub fn location(&self) -> Location {
        self.location
            .as_ref()
            .map_or(Location::Street, |l| l.current_location())
    }

    /// Current time period, `Afternoon` when no day cycle is present.
    pub fn time_period(&self) -> TimePeriod {
        self.time
            .as_ref()
            .map_or(TimePeriod::Afternoon, |t| t.current_period())
    }

    pub fn is_wanted(&self) -> bool {
        self.police.as_ref().is_some_and(|p| p.is_wanted())
    }

    pub fn wanted_level(&self) -> u32 {
        self.police.as_ref().map_or(0, |p| p.wanted_level())
    }

    pub fn report_fighting(&mut self, location: Location, severity: f64) {
        if let Some(police) = self.police.as_mut() {
            police.report_fighting(location, severity);
        }
    }

    pub fn notify(&mut self, title: &str, body: &str, kind: NotificationKind) {
        if let Some(notifications) = self.notifications.as_mut() {
            notifications.show_notification(title, body, kind);
        }
    }
}
