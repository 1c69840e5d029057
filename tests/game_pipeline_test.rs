//! Integration test: the full tick pipeline
//!
//! Runs `Game::tick()` with forced encounters and a simple auto-pilot for
//! many seeds, checking the cross-system contract: every fight that starts
//! ends, consequences follow combat ends, encounters close, state stays in
//! bounds, and saves survive a round-trip through disk.

use hustle::combat::{CombatAction, CombatState};
use hustle::core::rng::ScriptedRng;
use hustle::core::{Game, GameConfig, GameEvent, TickResult};
use hustle::world::{
    FixedLocation, FixedTimeOfDay, Location, NotificationLog, PlayerState, PoliceRecord, Services,
    SkillBook, TimePeriod, Wallet,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn street_services(money: f64) -> Services {
    Services::new(Box::new(PlayerState::new(100.0).with_level(2)))
        .with_money(Box::new(Wallet::new(money)))
        .with_skills(Box::new(SkillBook::default()))
        .with_police(Box::new(PoliceRecord::default()))
        .with_location(Box::new(FixedLocation(Location::Abandoned)))
        .with_time(Box::new(FixedTimeOfDay(TimePeriod::Night)))
        .with_notifications(Box::new(NotificationLog::default()))
}

/// Tick with an attack-first auto-pilot, collecting every published event.
fn play(game: &mut Game, rng: &mut ChaCha8Rng, ticks: u32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        // Rest between fights so a beaten player can fight again
        if !game.combat().is_in_combat() {
            game.services_mut().player.change_health(1.0);
        }
        let mut result: TickResult = game.tick(rng);
        events.append(&mut result.events);
        while result.awaiting_player {
            match game.perform_player_action(CombatAction::Attack, 0, rng) {
                Some(next) => {
                    result = next;
                    events.extend(result.events.iter().cloned());
                }
                None => break,
            }
        }
        assert_invariants(game);
    }
    events
}

fn assert_invariants(game: &Game) {
    let player = &game.services().player;
    assert!(player.current_health() >= 0.0);
    assert!(player.current_health() <= player.max_health());
    assert!(game.consequences().reputation().abs() <= 100.0);
    assert!(game.services().money() >= 0.0);
    for consequence in game.consequences().active_consequences() {
        assert!(consequence.duration > 0.0);
    }
    if game.combat().is_in_combat() {
        assert!(game.combat().active_combat().is_some());
    }
}

#[test]
fn test_every_started_fight_ends() {
    for seed in 0..10 {
        let mut game = Game::new(GameConfig::debug(), street_services(300.0));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let events = play(&mut game, &mut rng, 6_000);

        let started = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CombatStarted { .. }))
            .count();
        let ended = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CombatEnded { .. }))
            .count();
        assert!(started > 0, "seed {}: no fights", seed);
        // At most the last fight may still be running
        assert!(started - ended <= 1, "seed {}: {} started, {} ended", seed, started, ended);
        assert!(game.encounters().total_encounters() as usize >= started);
    }
}

#[test]
fn test_combat_end_is_followed_by_its_consequences() {
    let mut game = Game::new(GameConfig::debug(), street_services(300.0));
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let events = play(&mut game, &mut rng, 3_000);

    let first_end = events
        .iter()
        .position(|e| matches!(e, GameEvent::CombatEnded { .. }))
        .expect("a fight finished");
    let after = &events[first_end + 1..];
    assert!(after
        .iter()
        .any(|e| matches!(e, GameEvent::ReputationChanged { .. })));
    assert!(after
        .iter()
        .any(|e| matches!(e, GameEvent::EnemyEncounterEnded { .. })));
    // The encounter behind the first fight is still open until then
    assert!(!events[..first_end]
        .iter()
        .any(|e| matches!(e, GameEvent::EnemyEncounterEnded { .. })));
}

#[test]
fn test_forced_injuries_show_up_in_the_pipeline() {
    let mut game = Game::new(GameConfig::debug(), street_services(0.0));
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let events = play(&mut game, &mut rng, 6_000);

    // Every fight that hurt the player or was lost injures under force_injury
    let injuries = events
        .iter()
        .filter(|e| matches!(e, GameEvent::PlayerInjured { .. }))
        .count();
    assert!(injuries > 0);
}

#[test]
fn test_no_encounters_when_disabled() {
    let mut config = GameConfig::debug();
    config.encounters.enabled = false;
    let mut game = Game::new(config, street_services(300.0));
    let mut rng = ScriptedRng::constant(0.0);
    for _ in 0..2_000 {
        let result = game.tick(&mut rng);
        assert!(!result.combat_started);
    }
    assert_eq!(game.encounters().total_encounters(), 0);
    assert_eq!(game.combat().state(), CombatState::NotInCombat);
}

#[test]
fn test_save_file_round_trip() {
    let mut game = Game::new(GameConfig::debug(), street_services(300.0));
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    play(&mut game, &mut rng, 2_000);

    let path = std::env::temp_dir()
        .join(format!("hustle-pipeline-{}", std::process::id()))
        .join("save.json");
    game.save_to(&path).expect("save");

    let mut restored = Game::new(GameConfig::debug(), street_services(300.0));
    restored.load_from(&path).expect("load");
    assert_eq!(restored.clock().tick(), game.clock().tick());
    assert_eq!(restored.consequences().reputation(), game.consequences().reputation());
    assert_eq!(
        restored.encounters().total_encounters(),
        game.encounters().total_encounters()
    );
    assert_eq!(restored.combat().state(), CombatState::NotInCombat);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_downed_player_is_left_alone() {
    let mut config = GameConfig::debug();
    config.consequences.hospital_chance = 0.0;
    let mut services = street_services(1_000.0);
    services.player.change_health(-100.0);
    let mut game = Game::new(config, services);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for _ in 0..3_000 {
        let result = game.tick(&mut rng);
        assert!(!result.combat_started, "fight started at tick {}", game.clock().tick());
        assert!(result.combat_ended.is_none());
    }
    assert_eq!(game.encounters().total_encounters(), 0);
    assert_eq!(game.combat().state(), CombatState::NotInCombat);
    // Street events may add money; nothing takes it
    assert!(game.services().money() >= 1_000.0);
}
