// Tick and timing
pub const TICK_INTERVAL_MS: u64 = 100;
pub const TICKS_PER_SECOND: u64 = 1000 / TICK_INTERVAL_MS;

// Combat pacing (seconds of game time)
pub const PRE_COMBAT_DELAY_SECONDS: f64 = 1.0;
pub const ENEMY_TURN_DELAY_SECONDS: f64 = 1.0;
pub const POST_COMBAT_COOLDOWN_SECONDS: f64 = 2.0;

// Player attack
pub const BASE_HIT_CHANCE: f64 = 0.8;
pub const HIT_CHANCE_PER_FITNESS: f64 = 0.02;
pub const HIT_PENALTY_PER_DIFFICULTY: f64 = 0.1;
pub const BASE_FIST_DAMAGE: f64 = 10.0;
pub const DAMAGE_PER_FITNESS: f64 = 0.1;
pub const DAMAGE_VARIATION_MIN: f64 = 0.8;
pub const DAMAGE_VARIATION_MAX: f64 = 1.2;
pub const BASE_CRIT_CHANCE: f64 = 0.05;
pub const CRIT_CHANCE_PER_LUCK: f64 = 0.01;
pub const PLAYER_CRIT_MULTIPLIER: f64 = 2.0;
pub const ENEMY_CRIT_MULTIPLIER: f64 = 1.5;

// Player defensive stances
pub const DEFEND_BLOCK_CHANCE: f64 = 0.5;
pub const DODGE_EVADE_CHANCE: f64 = 0.3;
/// Extra block/dodge an enemy gains from its own Defend/Dodge action.
pub const ENEMY_STANCE_BONUS: f64 = 0.3;

// Side mechanics
pub const BASE_FLEE_CHANCE: f64 = 0.6;
pub const FLEE_CHANCE_PER_FITNESS: f64 = 0.02;
pub const FLEE_PENALTY_PER_EXTRA_ENEMY: f64 = 0.1;
pub const BASE_NEGOTIATION_CHANCE: f64 = 0.3;
pub const NEGOTIATION_PER_CHARISMA: f64 = 0.05;
pub const NEGOTIATION_HOSTILE_FACTOR: f64 = 0.3;
pub const NEGOTIATION_COWARDLY_FACTOR: f64 = 1.5;
pub const BRIBE_PER_DIFFICULTY: f64 = 10.0;
pub const BASE_INTIMIDATION_CHANCE: f64 = 0.2;
pub const INTIMIDATION_PER_SKILL: f64 = 0.02;
pub const INTIMIDATION_PENALTY_PER_DIFFICULTY: f64 = 0.05;
pub const INTIMIDATION_HEALTH_LOSS: f64 = 0.2;
pub const COWARDLY_FLEE_HEALTH_RATIO: f64 = 0.3;

// Surprise attacks
pub const BASE_SURPRISE_CHANCE: f64 = 0.1;

// Combat outcome
pub const DEFEAT_MONEY_LOSS_RATIO: f64 = 0.2;
pub const DEFEAT_INJURY_HEALTH_PENALTY: f64 = -20.0;
pub const DEFEAT_INJURY_DURATION_SECONDS: f64 = 300.0;
pub const FLEE_MOOD_PENALTY: f64 = -5.0;

// Enemy level scaling per level above 1
pub const ENEMY_HEALTH_PER_LEVEL: f64 = 0.15;
pub const ENEMY_DAMAGE_PER_LEVEL: f64 = 0.10;
pub const ENEMY_MONEY_PER_LEVEL: f64 = 0.20;
pub const ENEMY_XP_PER_LEVEL: f64 = 0.25;
pub const ENEMY_HEALTH_VARIANCE: f64 = 0.1;
pub const ENEMY_MONEY_VARIANCE: f64 = 0.2;

// Encounter scheduling
pub const ENCOUNTER_CHECK_INTERVAL_SECONDS: f64 = 30.0;
pub const BASE_ENCOUNTER_CHANCE: f64 = 0.05;
pub const ENCOUNTER_PREPARATION_SECONDS: f64 = 2.0;
pub const MAX_ENEMIES_PER_ENCOUNTER: usize = 3;
pub const BASE_GROUP_CHANCE: f64 = 0.3;
pub const DANGEROUS_LOCATION_THRESHOLD: f64 = 1.5;
pub const DANGEROUS_GROUP_FACTOR: f64 = 1.5;
pub const NIGHT_GROUP_FACTOR: f64 = 1.3;
pub const AMBUSH_CHANCE: f64 = 0.15;
pub const ENCOUNTER_LUCK_REDUCTION: f64 = 0.02;
pub const WANTED_ENCOUNTER_FACTOR: f64 = 0.25;
pub const ENCOUNTER_HISTORY_SECONDS: f64 = 3600.0;
/// Selection pool entries per unit of type weight.
pub const ENEMY_POOL_RESOLUTION: f64 = 10.0;

// Consequences
pub const BASE_REPUTATION_GAIN: f64 = 5.0;
pub const BASE_REPUTATION_LOSS: f64 = 3.0;
pub const REPUTATION_PER_DIFFICULTY: f64 = 2.0;
pub const HOSPITAL_CHANCE: f64 = 0.2;
pub const HOSPITAL_COST: f64 = 200.0;
pub const HOSPITAL_HEALTH_RATIO: f64 = 0.5;
pub const BASE_INJURY_CHANCE: f64 = 0.3;
pub const INJURY_DAMAGE_RATIO_WEIGHT: f64 = 0.5;
pub const INJURY_DEFEAT_BONUS: f64 = 0.3;
pub const INJURY_FITNESS_REDUCTION: f64 = 0.02;
pub const SEVERE_INJURY_CHANCE: f64 = 0.2;
pub const WITNESS_REPORT_CHANCE: f64 = 0.25;
pub const EVENT_CHECK_INTERVAL_SECONDS: f64 = 60.0;
pub const BASE_EVENT_CHANCE: f64 = 0.1;
pub const ITEM_FOUND_CHANCE: f64 = 0.2;
pub const DEFEAT_POLICE_REPORT_CHANCE: f64 = 0.3;
pub const DEFEAT_MONEY_LOSS_MIN: f64 = 0.1;
pub const DEFEAT_MONEY_LOSS_MAX: f64 = 0.3;
pub const FLEE_CONSEQUENCE_MOOD_PENALTY: f64 = -10.0;
pub const PURSUIT_CHANCE: f64 = 0.3;
pub const PURSUIT_DURATION_SECONDS: f64 = 120.0;
pub const RANDOM_HELP_CHANCE: f64 = 0.1;
pub const RANDOM_HELP_HEALTH: f64 = 20.0;
pub const RETALIATION_CHANCE: f64 = 0.15;
pub const RETALIATION_MIN_DELAY_SECONDS: f64 = 300.0;
pub const RETALIATION_MAX_DELAY_SECONDS: f64 = 1200.0;
pub const MEDICAL_ASSISTANCE_CHANCE: f64 = 0.2;
pub const MEDICAL_ASSISTANCE_DAMAGE_THRESHOLD: f64 = 50.0;
pub const MEDICAL_ASSISTANCE_COST: f64 = 50.0;
pub const MEDICAL_ASSISTANCE_HEALTH: f64 = 30.0;
pub const VICTORIES_PER_RELATIONSHIP_STEP: u32 = 3;
pub const RELATIONSHIP_AVOIDANCE_STEP: f64 = 0.2;
pub const RELATIONSHIP_AGGRESSION_STEP: f64 = 0.1;
pub const RANDOM_EVENT_REPUTATION: f64 = 2.0;
pub const ITEM_FOUND_MIN_VALUE: f64 = 10.0;
pub const ITEM_FOUND_MAX_VALUE: f64 = 50.0;
pub const JOB_OFFER_MIN_WAGE: f64 = 8.0;
pub const JOB_OFFER_MAX_WAGE: f64 = 20.0;

// Victory skill experience
pub const XP_PER_DAMAGE_DEALT: f64 = 0.1;
pub const XP_PER_CRITICAL: f64 = 2.0;
pub const XP_PER_COMBAT_SECOND: f64 = 0.05;
