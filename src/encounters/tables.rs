//! Location, time and wealth tables that shape encounter odds and rosters.

use crate::combat::EnemyType;
use crate::world::{Location, TimePeriod};

/// Danger multiplier applied to the encounter chance.
pub fn location_danger(location: Location) -> f64 {
    match location {
        Location::Street => 1.0,
        Location::Park => 0.8,
        Location::Downtown => 1.2,
        Location::BusinessDistrict => 0.6,
        Location::Residential => 0.7,
        Location::Industrial => 1.5,
        Location::Abandoned => 2.0,
        Location::Hospital => 0.2,
        Location::Shelter => 0.9,
        Location::Nightclub => 1.3,
    }
}

/// How many people are around to see a fight.
pub fn location_witness_multiplier(location: Location) -> f64 {
    match location {
        Location::Street => 1.0,
        Location::Park => 0.8,
        Location::Downtown => 1.8,
        Location::BusinessDistrict => 2.0,
        Location::Residential => 1.2,
        Location::Industrial => 0.5,
        Location::Abandoned => 0.2,
        Location::Hospital => 1.5,
        Location::Shelter => 0.6,
        Location::Nightclub => 1.3,
    }
}

/// Enemy types that can show up at `location`. Never empty.
pub fn get_possible_enemies_for_location(location: Location) -> &'static [EnemyType] {
    use EnemyType::*;
    match location {
        Location::Street => &[Thug, Robber, DrunkPerson, Bully, Dealer],
        Location::Park => &[DrunkPerson, Bully, Thug, Dealer],
        Location::Downtown => &[Robber, Thug, StreetFighter, SecurityGuard, Police],
        Location::BusinessDistrict => &[SecurityGuard, Robber, Police],
        Location::Residential => &[Bully, Thug, Robber],
        Location::Industrial => &[GangMember, Bandit, Thug, StreetFighter],
        Location::Abandoned => &[GangMember, Bandit, Dealer, Thug],
        Location::Hospital => &[SecurityGuard, Police],
        Location::Shelter => &[DrunkPerson, Bully, Thug],
        Location::Nightclub => &[DrunkPerson, SecurityGuard, StreetFighter, Dealer],
    }
}

pub fn time_multiplier(period: TimePeriod) -> f64 {
    match period {
        TimePeriod::EarlyMorning => 0.8,
        TimePeriod::Morning => 0.5,
        TimePeriod::Afternoon => 0.7,
        TimePeriod::Evening => 1.2,
        TimePeriod::Night => 2.0,
    }
}

/// Richer players attract more trouble.
pub fn wealth_multiplier(money: f64) -> f64 {
    if money < 100.0 {
        0.8
    } else if money < 1_000.0 {
        1.0
    } else if money < 10_000.0 {
        1.3
    } else if money < 100_000.0 {
        1.6
    } else {
        2.0
    }
}
