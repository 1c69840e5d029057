//! Shared world vocabulary: locations, time periods, skills, weapons, modifiers.

use serde::{Deserialize, Serialize};

/// Places the player can be when an encounter rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Street,
    Park,
    Downtown,
    BusinessDistrict,
    Residential,
    Industrial,
    Abandoned,
    Hospital,
    Shelter,
    Nightclub,
}

impl Location {
    pub const ALL: [Location; 10] = [
        Location::Street,
        Location::Park,
        Location::Downtown,
        Location::BusinessDistrict,
        Location::Residential,
        Location::Industrial,
        Location::Abandoned,
        Location::Hospital,
        Location::Shelter,
        Location::Nightclub,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Location::Street => "Street",
            Location::Park => "Park",
            Location::Downtown => "Downtown",
            Location::BusinessDistrict => "Business District",
            Location::Residential => "Residential",
            Location::Industrial => "Industrial",
            Location::Abandoned => "Abandoned",
            Location::Hospital => "Hospital",
            Location::Shelter => "Shelter",
            Location::Nightclub => "Nightclub",
        }
    }

    /// Case-insensitive parse used by the simulator CLI.
    pub fn parse(value: &str) -> Option<Location> {
        let wanted: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Location::ALL.into_iter().find(|loc| {
            let name: String = loc
                .name()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            name == wanted
        })
    }
}

/// Coarse time of day as reported by the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 5] = [
        TimePeriod::EarlyMorning,
        TimePeriod::Morning,
        TimePeriod::Afternoon,
        TimePeriod::Evening,
        TimePeriod::Night,
    ];

    pub fn parse(value: &str) -> Option<TimePeriod> {
        match value.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "earlymorning" | "dawn" => Some(TimePeriod::EarlyMorning),
            "morning" => Some(TimePeriod::Morning),
            "afternoon" => Some(TimePeriod::Afternoon),
            "evening" => Some(TimePeriod::Evening),
            "night" => Some(TimePeriod::Night),
            _ => None,
        }
    }
}

/// Skills the combat core reads or trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillType {
    Fitness,
    Charisma,
    Luck,
    Intelligence,
}

/// Stats a timed modifier can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Health,
    Mood,
    Fitness,
    Charisma,
    Intelligence,
}

/// A temporary additive change to one stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatType,
    pub amount: f64,
    /// Seconds of game time the modifier stays active.
    pub duration: f64,
    pub source: String,
}

impl StatModifier {
    pub fn new(stat: StatType, amount: f64, duration: f64, source: impl Into<String>) -> Self {
        Self {
            stat,
            amount,
            duration,
            source: source.into(),
        }
    }
}

/// Combat-relevant fields of the equipped weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub min_damage: f64,
    pub max_damage: f64,
    /// Added to the player's hit chance (0.1 = +10%).
    pub accuracy_bonus: f64,
    /// Added to the player's critical chance (0.05 = +5%).
    pub critical_bonus: f64,
}

impl Weapon {
    pub fn new(name: impl Into<String>, min_damage: f64, max_damage: f64) -> Self {
        Self {
            name: name.into(),
            min_damage,
            max_damage,
            accuracy_bonus: 0.0,
            critical_bonus: 0.0,
        }
    }
}

/// Severity bucket for player-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Danger,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse_ignores_case_and_spacing() {
        assert_eq!(Location::parse("hospital"), Some(Location::Hospital));
        assert_eq!(
            Location::parse("business_district"),
            Some(Location::BusinessDistrict)
        );
        assert_eq!(Location::parse("moon"), None);
    }

    #[test]
    fn test_time_period_parse() {
        assert_eq!(TimePeriod::parse("Night"), Some(TimePeriod::Night));
        assert_eq!(
            TimePeriod::parse("early-morning"),
            Some(TimePeriod::EarlyMorning)
        );
        assert_eq!(TimePeriod::parse("noon"), None);
    }
}
