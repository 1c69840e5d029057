//! Hustle Headless Combat Simulator
//!
//! Runs the game tick loop without any UI and an auto-pilot player, collecting
//! fight and consequence metrics for balance analysis. Uses the same
//! `Game::tick()` as the real game.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Options:
//!   --ticks N         Ticks to simulate (default: 36000 = 1 hour game time)
//!   --seed N          RNG seed (default: 42)
//!   --runs N          Number of runs with incrementing seeds (default: 1)
//!   --location NAME   Where the player hangs out (default: Street)
//!   --time PERIOD     Fixed time of day (default: Night)
//!   --money N         Starting money (default: 250)
//!   --level N         Player level (default: 3)
//!   --config FILE     Load a GameConfig JSON file
//!   --save FILE       Write the final save data of the last run
//!   --debug           Forced encounters and injuries
//!   --verbose         Per-event logging (hustle=debug)

use hustle::build_info;
use hustle::combat::{CombatAction, CombatResult, CombatState, Combatant};
use hustle::core::{Game, GameConfig, GameEvent, TickResult};
use hustle::world::{
    FixedLocation, FixedTimeOfDay, Location, NotificationLog, PlayerState, PoliceRecord, Services,
    SkillBook, SkillType, TimePeriod, Wallet,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Below this share of max health the auto-pilot tries to run.
const AUTOPILOT_FLEE_RATIO: f64 = 0.25;

/// Health the auto-pilot recovers per tick while out of combat (1 HP/s).
const REST_HEAL_PER_TICK: f64 = 0.1;

// ── CLI Configuration ────────────────────────────────────────────────

struct SimConfig {
    ticks: u64,
    seed: u64,
    runs: u32,
    location: Location,
    period: TimePeriod,
    money: f64,
    level: u32,
    config_path: Option<String>,
    save_path: Option<String>,
    debug: bool,
    verbose: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks: 36_000,
            seed: 42,
            runs: 1,
            location: Location::Street,
            period: TimePeriod::Night,
            money: 250.0,
            level: 3,
            config_path: None,
            save_path: None,
            debug: false,
            verbose: false,
        }
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn number_of<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    value_of(args, i, flag)?
        .parse()
        .map_err(|_| format!("{flag} requires a number"))
}

fn parse_args() -> Result<SimConfig, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--ticks" => {
                i += 1;
                config.ticks = number_of(&args, i, "--ticks")?;
            }
            "--seed" => {
                i += 1;
                config.seed = number_of(&args, i, "--seed")?;
            }
            "--runs" => {
                i += 1;
                config.runs = number_of(&args, i, "--runs")?;
            }
            "--money" => {
                i += 1;
                config.money = number_of(&args, i, "--money")?;
            }
            "--level" => {
                i += 1;
                config.level = number_of(&args, i, "--level")?;
            }
            "--location" => {
                i += 1;
                let name = value_of(&args, i, "--location")?;
                config.location =
                    Location::parse(name).ok_or_else(|| format!("Unknown location: {name}"))?;
            }
            "--time" => {
                i += 1;
                let name = value_of(&args, i, "--time")?;
                config.period =
                    TimePeriod::parse(name).ok_or_else(|| format!("Unknown time of day: {name}"))?;
            }
            "--config" => {
                i += 1;
                config.config_path = Some(value_of(&args, i, "--config")?.to_string());
            }
            "--save" => {
                i += 1;
                config.save_path = Some(value_of(&args, i, "--save")?.to_string());
            }
            "--debug" => config.debug = true,
            "--verbose" => config.verbose = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(config)
}

fn print_usage() {
    eprintln!(
        "Hustle Headless Combat Simulator\n\
         \n\
         Usage: simulator [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --ticks N         Ticks to simulate (default: 36000 = 1 hour)\n\
         \x20 --seed N          RNG seed (default: 42)\n\
         \x20 --runs N          Number of runs with incrementing seeds (default: 1)\n\
         \x20 --location NAME   Street, Park, Downtown, ... (default: Street)\n\
         \x20 --time PERIOD     EarlyMorning, Morning, Afternoon, Evening, Night (default: Night)\n\
         \x20 --money N         Starting money (default: 250)\n\
         \x20 --level N         Player level (default: 3)\n\
         \x20 --config FILE     Load a GameConfig JSON file\n\
         \x20 --save FILE       Write the final save data of the last run\n\
         \x20 --debug           Forced encounters and injuries\n\
         \x20 --verbose         Per-event logging\n\
         \x20 --help, -h        Show this help"
    );
}

// ── Simulation Statistics ────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct SimStats {
    total_ticks: u64,
    encounters: u64,
    fights: u64,
    wins: u64,
    losses: u64,
    escapes: u64,
    player_hits: u64,
    player_crits: u64,
    player_misses: u64,
    enemy_hits: u64,
    damage_dealt: f64,
    damage_taken: f64,
    injuries: u64,
    retaliations: u64,
    fights_by_kind: HashMap<String, u64>,
    // Final state snapshot
    final_money: f64,
    final_health: f64,
    final_reputation: f64,
}

impl SimStats {
    fn process_tick(&mut self, tick: u64, result: &TickResult) {
        self.total_ticks = tick + 1;

        for event in &result.events {
            match event {
                GameEvent::EnemyEncounterStarted { .. } => self.encounters += 1,
                GameEvent::CombatStarted { .. } => self.fights += 1,
                GameEvent::CombatEnded { data, end_state } => {
                    match end_state {
                        CombatState::PlayerWon => self.wins += 1,
                        CombatState::PlayerLost => self.losses += 1,
                        CombatState::PlayerFled => self.escapes += 1,
                        _ => {}
                    }
                    self.damage_dealt += data.total_damage_dealt;
                    self.damage_taken += data.total_damage_received;
                    *self
                        .fights_by_kind
                        .entry(format!("{:?}", data.event_type))
                        .or_insert(0) += 1;
                }
                GameEvent::CombatAction {
                    actor: Combatant::Player,
                    action: CombatAction::Attack,
                    result,
                    ..
                } => match result {
                    CombatResult::Critical => {
                        self.player_hits += 1;
                        self.player_crits += 1;
                    }
                    CombatResult::Hit => self.player_hits += 1,
                    _ => self.player_misses += 1,
                },
                GameEvent::CombatAction {
                    actor: Combatant::Enemy(_),
                    result: CombatResult::Hit | CombatResult::Critical,
                    ..
                } => self.enemy_hits += 1,
                GameEvent::PlayerInjured { .. } => self.injuries += 1,
                GameEvent::RetaliationDue { .. } => self.retaliations += 1,
                _ => {}
            }
        }
    }

    fn finalize(&mut self, game: &Game) {
        self.final_money = game.services().money();
        self.final_health = game.services().player.current_health();
        self.final_reputation = game.consequences().reputation();
    }
}

// ── Auto-pilot ───────────────────────────────────────────────────────

/// Attack the weakest enemy; run when badly hurt.
fn autopilot_action(game: &Game) -> (CombatAction, usize) {
    let player = &game.services().player;
    let hurt = player.current_health() < player.max_health() * AUTOPILOT_FLEE_RATIO;
    if hurt {
        return (CombatAction::Flee, 0);
    }
    let target = game
        .combat()
        .active_combat()
        .and_then(|combat| {
            combat
                .enemies
                .iter()
                .enumerate()
                .filter(|(_, e)| e.is_alive())
                .min_by(|(_, a), (_, b)| a.current_health.total_cmp(&b.current_health))
                .map(|(i, _)| i)
        })
        .unwrap_or(0);
    (CombatAction::Attack, target)
}

// ── Core Simulation Loop ─────────────────────────────────────────────

fn build_services(config: &SimConfig) -> Services {
    Services::new(Box::new(PlayerState::new(100.0).with_level(config.level)))
        .with_money(Box::new(Wallet::new(config.money)))
        .with_skills(Box::new(
            SkillBook::default()
                .with_level(SkillType::Fitness, config.level)
                .with_level(SkillType::Charisma, 1)
                .with_level(SkillType::Luck, 1),
        ))
        .with_police(Box::new(PoliceRecord::default()))
        .with_location(Box::new(FixedLocation(config.location)))
        .with_time(Box::new(FixedTimeOfDay(config.period)))
        .with_notifications(Box::new(NotificationLog::default()))
}

fn run_simulation(config: &SimConfig, game_config: &GameConfig, seed: u64) -> (SimStats, Game) {
    let mut game = Game::new(game_config.clone(), build_services(config));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut stats = SimStats::default();

    for tick in 0..config.ticks {
        if !game.combat().is_in_combat() {
            game.services_mut().player.change_health(REST_HEAL_PER_TICK);
        }
        let result = game.tick(&mut rng);
        stats.process_tick(tick, &result);
        if config.verbose {
            print_tick_events(tick, &result);
        }

        let mut awaiting = result.awaiting_player;
        while awaiting {
            let (action, target) = autopilot_action(&game);
            let outcome = game
                .perform_player_action(action, target, &mut rng)
                .or_else(|| game.perform_player_action(CombatAction::Attack, 0, &mut rng));
            match outcome {
                Some(result) => {
                    stats.process_tick(tick, &result);
                    if config.verbose {
                        print_tick_events(tick, &result);
                    }
                    awaiting = result.awaiting_player;
                }
                None => awaiting = false,
            }
        }
    }

    stats.finalize(&game);
    (stats, game)
}

// ── Verbose Output ───────────────────────────────────────────────────

fn print_tick_events(tick: u64, result: &TickResult) {
    for event in &result.events {
        let label = match event {
            GameEvent::EnemyEncounterStarted { encounter } => format!(
                "Encounter: {:?} with {} enemies (threat {:.1})",
                encounter.event_type,
                encounter.enemies.len(),
                encounter.threat_level
            ),
            GameEvent::CombatAction {
                actor,
                action,
                result,
                damage,
            } => format!("{actor:?} {action:?} -> {result:?} ({damage:.0})"),
            GameEvent::CombatEnded { end_state, data } => format!(
                "Combat over: {end_state:?} after {:.1}s, {} turns",
                data.duration, data.turn_number
            ),
            GameEvent::PlayerInjured { injury, severity } => {
                format!("Injured: {injury:?} ({:.0}%)", severity * 100.0)
            }
            GameEvent::PlayerHealed { injury } => format!("Healed: {injury:?}"),
            GameEvent::ReputationChanged { reputation, delta } => {
                format!("Reputation {delta:+.1} -> {reputation:.1}")
            }
            GameEvent::RetaliationDue { enemy_type } => format!("{enemy_type:?} wants revenge"),
            _ => continue,
        };
        println!("[{:>6.1}s] {label}", tick as f64 / 10.0);
    }
}

// ── Summary ──────────────────────────────────────────────────────────

fn print_summary(run: u32, seed: u64, stats: &SimStats) {
    let hours = stats.total_ticks as f64 / 36_000.0;
    let swings = stats.player_hits + stats.player_misses;
    let hit_rate = if swings > 0 {
        stats.player_hits as f64 / swings as f64 * 100.0
    } else {
        0.0
    };
    println!("── Run {} (seed {}) ──", run + 1, seed);
    println!("  Game time:      {:.2} h", hours);
    println!(
        "  Encounters:     {} ({} fights, {:.1}/h)",
        stats.encounters,
        stats.fights,
        if hours > 0.0 { stats.fights as f64 / hours } else { 0.0 }
    );
    println!(
        "  Results:        {} won / {} lost / {} fled",
        stats.wins, stats.losses, stats.escapes
    );
    println!(
        "  Player attacks: {} hits ({} crits), {:.1}% hit rate",
        stats.player_hits, stats.player_crits, hit_rate
    );
    println!(
        "  Damage:         {:.0} dealt / {:.0} taken ({} enemy hits)",
        stats.damage_dealt, stats.damage_taken, stats.enemy_hits
    );
    println!(
        "  Aftermath:      {} injuries, {} retaliations",
        stats.injuries, stats.retaliations
    );
    let mut kinds: Vec<_> = stats.fights_by_kind.iter().collect();
    kinds.sort();
    for (kind, count) in kinds {
        println!("    {kind:<18} {count}");
    }
    println!(
        "  Final:          ${:.2}, {:.0} hp, reputation {:.1}",
        stats.final_money, stats.final_health, stats.final_reputation
    );
}

fn load_game_config(config: &SimConfig) -> Result<GameConfig, hustle::core::GameError> {
    let mut game_config = match &config.config_path {
        Some(path) => GameConfig::load(path)?,
        None if config.debug => GameConfig::debug(),
        None => GameConfig::default(),
    };
    if config.debug {
        game_config.encounters.force_encounters = true;
        game_config.consequences.force_injury = true;
    }
    Ok(game_config)
}

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            std::process::exit(1);
        }
    };

    let default_filter = if config.verbose { "hustle=debug" } else { "hustle=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    println!("{}", build_info::version_string());

    let game_config = match load_game_config(&config) {
        Ok(game_config) => game_config,
        Err(e) => {
            error!(error = %e, "Could not load config");
            std::process::exit(1);
        }
    };
    info!(
        ticks = config.ticks,
        runs = config.runs,
        location = config.location.name(),
        period = ?config.period,
        "Starting simulation"
    );

    let mut last_game = None;
    for run in 0..config.runs {
        let seed = config.seed + u64::from(run);
        let (stats, game) = run_simulation(&config, &game_config, seed);
        print_summary(run, seed, &stats);
        last_game = Some(game);
    }

    if let (Some(path), Some(game)) = (&config.save_path, &last_game) {
        match game.save_to(path) {
            Ok(()) => info!(path = %path, "Save written"),
            Err(e) => {
                error!(error = %e, "Could not write save");
                std::process::exit(1);
            }
        }
    }
}
