use glam::Vec2;
use proptest::prelude::*;

use sharky::sim::{
    Bubble, Difficulty, Enemy, EnemyKind, GameEvent, GamePhase, Motion, TickInput, World,
    WorldConfig, size_from_score,
};
use sharky::{HighScores, StorageError};

fn started(difficulty: Difficulty, seed: u64) -> World {
    let mut world = World::new(WorldConfig {
        difficulty,
        seed,
        ..WorldConfig::default()
    });
    world.start();
    world
}

/// Motionless fish centered on the character
fn park_fish_on_character(world: &mut World, id: u32, score: u32) {
    let center = world.character.body.center();
    let mut fish = Enemy::fish(
        id,
        EnemyKind::Jelly,
        score,
        0.05,
        center - size_from_score(score) * 0.5,
        Motion::drift(-1.0),
    );
    fish.body.vel = Vec2::ZERO;
    world.enemies.push(fish);
}

/// Scripted input that exercises every control
fn scripted(frame: u32) -> TickInput {
    let leg = (frame / 40) % 4;
    TickInput {
        up: leg == 0,
        right: leg == 1 || leg == 0,
        down: leg == 2,
        left: leg == 3,
        melee: frame % 25 == 0,
        shoot: frame % 60 == 0,
        pause: false,
    }
}

#[test]
fn bigger_shark_eats_smaller_fish() {
    let mut world = started(Difficulty::Normal, 1);
    world.enemies.clear();
    world.score = 5000;
    park_fish_on_character(&mut world, 900, 4000);

    world.update(1.0, &TickInput::default());

    assert_eq!(world.score, 5800);
    assert_eq!(world.enemies_eaten, 1);
    assert!(world.enemies.iter().all(|e| e.body.id != 900));
    assert!(
        world
            .drain_events()
            .contains(&GameEvent::Eat { enemy_id: 900, score_gained: 800 })
    );
}

#[test]
fn smaller_shark_is_eaten() {
    let mut world = started(Difficulty::Normal, 1);
    world.enemies.clear();
    world.score = 3000;
    park_fish_on_character(&mut world, 900, 4000);

    world.update(1.0, &TickInput::default());

    assert_eq!(world.phase, GamePhase::GameOver);
    assert!(world.is_over());
    assert_eq!(world.score, 3000);

    // Terminal sessions are frozen
    let elapsed = world.elapsed_ms;
    world.update(50.0, &TickInput::default());
    assert_eq!(world.elapsed_ms, elapsed);
}

#[test]
fn boss_fight_ends_in_victory() {
    let mut world = started(Difficulty::Hard, 3);
    world.score = 119_500;
    assert!(world.start_boss_fight());
    assert!(world.boss_active);
    world.character.body.pos = Vec2::ZERO;

    for hit in 0..10u32 {
        assert_eq!(world.phase, GamePhase::Running);
        world.enemies[0].body.pos.x = world.canvas().x - 120.0;
        let center = world.enemies[0].body.center();
        world
            .bubbles
            .push(Bubble::new(10_000 + hit, center, 1.0, world.now_ms));
        world.update(0.0, &TickInput::default());
    }

    assert_eq!(world.phase, GamePhase::Victory);
    let summary = world.summary();
    assert_eq!(summary.outcome, GamePhase::Victory);
    assert_eq!(summary.difficulty, Difficulty::Hard);

    let record = world.highscore_record("Finn", "2026-10-19T00:00:00Z");
    let mut board = HighScores::new();
    assert_eq!(board.add_record(record), Some(1));
    assert_eq!(board.top(5, false).len(), 1);
}

#[test]
fn same_seed_same_session() {
    let mut a = started(Difficulty::Normal, 99);
    let mut b = started(Difficulty::Normal, 99);

    for frame in 0..900 {
        let input = scripted(frame);
        a.update(16.0, &input);
        b.update(16.0, &input);
        assert_eq!(a.drain_events(), b.drain_events(), "frame {}", frame);
    }

    assert_eq!(a.score, b.score);
    assert_eq!(a.phase, b.phase);
    assert_eq!(a.drawables(), b.drawables());
}

#[test]
fn restart_is_idempotent() {
    let mut world = started(Difficulty::Easy, 5);
    for frame in 0..300 {
        world.update(16.0, &scripted(frame));
    }

    world.restart_game();
    let first = (world.score, world.phase, world.drawables());
    world.restart_game();
    let second = (world.score, world.phase, world.drawables());

    assert_eq!(first, second);
    assert_eq!(world.config.difficulty, Difficulty::Easy);
    assert_eq!(world.elapsed_ms, 0.0);
}

#[test]
fn restart_with_new_seed_changes_the_layout() {
    let mut world = started(Difficulty::Normal, 1234);
    for frame in 0..200 {
        world.update(16.0, &scripted(frame));
    }

    let school = |w: &World| -> Vec<(u32, f32, f32)> {
        w.enemies
            .iter()
            .map(|e| (e.score, e.body.pos.x, e.body.pos.y))
            .collect()
    };

    world.restart_game();
    let same_seed = school(&world);
    world.restart_with_seed(98_765);
    let new_seed = school(&world);

    assert_ne!(same_seed, new_seed);
    assert_eq!(world.config.seed, 98_765);
    assert_eq!(world.config.difficulty, Difficulty::Normal);
    assert!(world.is_running());
    assert_eq!(world.score, 2000);
}

#[test]
fn pause_freezes_the_session() {
    let mut world = started(Difficulty::Normal, 8);
    world.update(16.0, &TickInput::default());

    world.update(16.0, &TickInput { pause: true, ..TickInput::default() });
    assert!(world.paused);
    let frozen = world.drawables();
    let elapsed = world.elapsed_ms;

    for _ in 0..30 {
        world.update(16.0, &TickInput { right: true, ..TickInput::default() });
    }
    assert_eq!(world.drawables(), frozen);
    assert_eq!(world.elapsed_ms, elapsed);

    world.update(16.0, &TickInput { pause: true, ..TickInput::default() });
    assert!(!world.paused);
    world.update(16.0, &TickInput::default());
    assert!(world.elapsed_ms > elapsed);
}

#[test]
fn native_storage_falls_back() {
    assert!(matches!(HighScores::new().save(), Err(StorageError::Unavailable)));
    assert!(HighScores::load().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn session_invariants_hold(seed in any::<u64>(), diff in 0usize..4, frames in 50u32..400) {
        let difficulty = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard, Difficulty::Infinity][diff];
        let mut world = started(difficulty, seed);
        let mut last_elapsed = 0.0;

        for frame in 0..frames {
            world.update(16.0, &scripted(frame.wrapping_mul(7).wrapping_add(seed as u32)));
            world.drain_events();

            prop_assert!(world.score <= difficulty.score_cap());
            prop_assert!(world.elapsed_ms >= last_elapsed);
            last_elapsed = world.elapsed_ms;

            let enemy_cap = world.preset.max_enemies.max(world.preset.ramp_target) + world.preset.spawn_rate_max_per_sec as usize;
            prop_assert!(world.enemies.len() <= enemy_cap);

            let drawables = world.drawables();
            prop_assert_eq!(drawables.last().map(|d| d.id), Some(world.character.body.id));

            if world.is_over() {
                break;
            }
        }
    }
}
