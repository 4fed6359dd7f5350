//! End-to-end properties of the Life3D step engine.
//!
//! Each test configures a small simulation through the public API and
//! checks one observable property of the step pipeline: rule outcomes on a
//! known pattern, age and color bookkeeping, toroidal wrap, termination
//! signals, determinism, and the mutation schedule.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::items_after_statements,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use life3d_core::color::ColorConfig;
use life3d_core::mutation::{MutationConfig, PerBirthConfig, PerStepConfig};
use life3d_core::termination::TerminationConfig;
use life3d_core::{Rule, Simulation};
use life3d_types::{ColorMode, Coord, Rgb, Seed, Shape, Snapshot, TerminalReason};

fn build(
    shape: Shape,
    rule: &str,
    mode: ColorMode,
    mutation: MutationConfig,
    seeds: &[Seed],
    rng_seed: u64,
) -> Simulation {
    Simulation::configure(
        Rule::parse(rule).expect("rule parses"),
        ColorConfig::with_mode(mode),
        mutation,
        shape,
        seeds,
        rng_seed,
        TerminationConfig::default(),
    )
    .expect("configuration is valid")
}

fn white_cube(lo: i64, hi: i64) -> Vec<Seed> {
    let mut seeds = Vec::new();
    for z in lo..=hi {
        for y in lo..=hi {
            for x in lo..=hi {
                seeds.push(Seed::new(x, y, z, Rgb::WHITE));
            }
        }
    }
    seeds
}

/// Assorted colors in a loose blob, enough to keep B6/S5-7 busy for a while.
fn blob(center: i64) -> Vec<Seed> {
    let palette = [
        Rgb::new(255, 40, 40),
        Rgb::new(40, 255, 40),
        Rgb::new(40, 40, 255),
        Rgb::new(250, 220, 30),
    ];
    let mut seeds = Vec::new();
    let mut k = 0_usize;
    for dz in -2_i64..=2 {
        for dy in -2_i64..=2 {
            for dx in -2_i64..=2 {
                // Deterministic sparse fill.
                if (dx * 7 + dy * 3 + dz * 5).rem_euclid(3) != 0 {
                    seeds.push(Seed::new(
                        center + dx,
                        center + dy,
                        center + dz,
                        palette[k % palette.len()],
                    ));
                    k += 1;
                }
            }
        }
    }
    seeds
}

fn live_coords(snap: &Snapshot) -> Vec<Coord> {
    let mut coords: Vec<Coord> = snap.live_cells().map(|(c, _, _)| c).collect();
    coords.sort();
    coords
}

fn assert_consistent(snap: &Snapshot) {
    for i in 0..snap.alive.len() {
        if snap.alive[i] {
            assert!(snap.colors[i].is_some(), "live cell {i} uncolored");
        } else {
            assert!(snap.colors[i].is_none(), "dead cell {i} colored");
            assert_eq!(snap.ages[i], 0, "dead cell {i} aged");
        }
    }
}

#[test]
fn white_cube_first_step_matches_known_outcome() {
    let mut sim = build(
        Shape::cube(8),
        "B6/S5-7",
        ColorMode::Mean,
        MutationConfig::disabled(),
        &white_cube(2, 4),
        42,
    );
    let info = sim.step().unwrap();
    let snap = sim.snapshot();

    let corners: Vec<Coord> = [
        (2, 2, 2),
        (4, 2, 2),
        (2, 4, 2),
        (4, 4, 2),
        (2, 2, 4),
        (4, 2, 4),
        (2, 4, 4),
        (4, 4, 4),
    ]
    .iter()
    .map(|&(x, y, z)| Coord::new(x, y, z))
    .collect();
    let births: Vec<Coord> = [
        (3, 2, 1),
        (2, 3, 1),
        (4, 3, 1),
        (3, 4, 1),
        (3, 1, 2),
        (1, 3, 2),
        (5, 3, 2),
        (3, 5, 2),
        (2, 1, 3),
        (4, 1, 3),
        (1, 2, 3),
        (5, 2, 3),
        (1, 4, 3),
        (5, 4, 3),
        (2, 5, 3),
        (4, 5, 3),
        (3, 1, 4),
        (1, 3, 4),
        (5, 3, 4),
        (3, 5, 4),
        (3, 2, 5),
        (2, 3, 5),
        (4, 3, 5),
        (3, 4, 5),
    ]
    .iter()
    .map(|&(x, y, z)| Coord::new(x, y, z))
    .collect();

    assert_eq!(info.alive_before, 27);
    assert_eq!(info.survivors, 8);
    assert_eq!(info.births, 24);
    assert_eq!(info.deaths, 19);
    assert_eq!(info.alive_after, 32);
    assert_eq!(info.terminal, None);

    let mut expected: Vec<Coord> = corners.iter().chain(births.iter()).copied().collect();
    expected.sort();
    assert_eq!(live_coords(&snap), expected);

    for c in &corners {
        assert_eq!(snap.age_at(*c), Some(1));
        assert_eq!(snap.color_at(*c), Some(Rgb::WHITE));
    }
    for c in &births {
        assert_eq!(snap.age_at(*c), Some(0));
        assert_eq!(snap.color_at(*c), Some(Rgb::WHITE));
    }
    assert_consistent(&snap);
}

#[test]
fn opposite_corners_are_moore_neighbors() {
    // B1: a single live corner gives the far corner exactly one neighbor.
    let mut sim = build(
        Shape::cube(5),
        "B1/S",
        ColorMode::Mean,
        MutationConfig::disabled(),
        &[Seed::new(4, 4, 4, Rgb::new(10, 200, 30))],
        1,
    );
    sim.step().unwrap();
    let snap = sim.snapshot();
    assert!(snap.is_alive(Coord::new(0, 0, 0)));
    assert_eq!(snap.color_at(Coord::new(0, 0, 0)), Some(Rgb::new(10, 200, 30)));
    assert!(!snap.is_alive(Coord::new(4, 4, 4)));
}

#[test]
fn birth_across_the_wrap_uses_wrapped_neighbors() {
    // Face neighbors of the origin, half of them addressed with negative
    // coordinates.
    let seeds = [
        Seed::new(0, 0, -1, Rgb::new(100, 0, 0)),
        Seed::new(0, 0, 1, Rgb::new(0, 100, 0)),
        Seed::new(0, -1, 0, Rgb::new(0, 0, 100)),
        Seed::new(0, 1, 0, Rgb::new(200, 0, 0)),
        Seed::new(-1, 0, 0, Rgb::new(0, 200, 0)),
        Seed::new(1, 0, 0, Rgb::new(0, 0, 200)),
    ];
    let mut sim = build(
        Shape::cube(6),
        "B6/S5-7",
        ColorMode::Mean,
        MutationConfig::disabled(),
        &seeds,
        3,
    );
    sim.step().unwrap();
    let snap = sim.snapshot();
    assert_eq!(snap.color_at(Coord::new(0, 0, 0)), Some(Rgb::new(50, 50, 50)));
    assert_eq!(snap.age_at(Coord::new(0, 0, 0)), Some(0));
}

#[test]
fn isolated_newborns_get_mid_gray() {
    // B0 births every dead cell with no Moore neighbor, including cells far
    // from any living cell.
    let mut sim = build(
        Shape::cube(8),
        "B0/S",
        ColorMode::RandomParent,
        MutationConfig::disabled(),
        &[Seed::new(0, 0, 0, Rgb::WHITE)],
        5,
    );
    sim.step().unwrap();
    let snap = sim.snapshot();
    // Chebyshev distance 4 from the seed: empty window.
    assert_eq!(snap.color_at(Coord::new(4, 4, 4)), Some(Rgb::MID_GRAY));
    // Distance 2: the seed is in the window.
    assert_eq!(snap.color_at(Coord::new(2, 2, 2)), Some(Rgb::WHITE));
    // Distance 1: not born (one neighbor).
    assert!(!snap.is_alive(Coord::new(1, 1, 1)));
}

#[test]
fn terminal_signals_match_the_alive_masks() {
    let mut sim = build(
        Shape::cube(10),
        "B6/S5-7",
        ColorMode::HsvBoostedMean,
        MutationConfig::default(),
        &blob(5),
        11,
    );
    let mut prev = sim.snapshot();
    for _ in 0..40 {
        let info = sim.step().unwrap();
        let snap = sim.snapshot();
        if snap.population() == 0 {
            assert_eq!(info.terminal, Some(TerminalReason::Extinction));
            break;
        }
        if snap.alive == prev.alive {
            assert_eq!(info.terminal, Some(TerminalReason::SteadyState { period: 1 }));
            break;
        }
        if info.terminal.is_some() {
            assert!(matches!(
                info.terminal,
                Some(TerminalReason::SteadyState { period }) if period > 1
            ));
            break;
        }
        prev = snap;
    }
}

#[test]
fn ages_count_consecutive_steps_alive() {
    let mut sim = build(
        Shape::cube(10),
        "B6/S5-7",
        ColorMode::Mean,
        MutationConfig::disabled(),
        &blob(5),
        2,
    );
    let mut prev = sim.snapshot();
    for _ in 0..10 {
        sim.step().unwrap();
        let snap = sim.snapshot();
        for i in 0..snap.alive.len() {
            match (prev.alive[i], snap.alive[i]) {
                (true, true) => assert_eq!(snap.ages[i], prev.ages[i] + 1),
                (false, true) => assert_eq!(snap.ages[i], 0),
                (_, false) => assert_eq!(snap.ages[i], 0),
            }
        }
        prev = snap;
    }
}

#[test]
fn random_parent_only_reuses_existing_colors() {
    let seeds = blob(6);
    let palette: Vec<Rgb> = seeds.iter().map(|s| s.rgb).collect();
    let mut sim = build(
        Shape::cube(12),
        "B6/S5-7",
        ColorMode::RandomParent,
        MutationConfig::disabled(),
        &seeds,
        9,
    );
    for _ in 0..15 {
        let info = sim.step().unwrap();
        for (_, color, _) in sim.snapshot().live_cells() {
            assert!(palette.contains(&color), "{color:?} was never seeded");
        }
        if info.terminal.is_some() {
            break;
        }
    }
}

#[test]
fn identical_inputs_give_identical_runs() {
    let mutation = MutationConfig {
        enabled: true,
        per_birth: PerBirthConfig {
            probability: 0.3,
            std_dev: 40.0,
        },
        per_step: PerStepConfig {
            probability: 0.9,
            max_mutants: 3,
            ..PerStepConfig::default()
        },
    };
    let run = |mode: ColorMode| {
        let mut sim = build(Shape::cube(10), "B6/S5-7", mode, mutation, &blob(5), 1234);
        for _ in 0..12 {
            sim.step().unwrap();
        }
        sim.snapshot()
    };
    for mode in ColorMode::ALL {
        assert_eq!(run(mode), run(mode), "mode {mode} diverged");
    }
}

#[test]
fn heavy_mutation_keeps_grid_consistent() {
    let mutation = MutationConfig {
        enabled: true,
        per_birth: PerBirthConfig {
            probability: 1.0,
            std_dev: 400.0,
        },
        per_step: PerStepConfig {
            probability: 1.0,
            max_mutants: 100,
            std_dev: 400.0,
            burst_length: 1,
            cooldown_length: 0,
        },
    };
    let mut sim = build(
        Shape::cube(10),
        "B6/S5-7",
        ColorMode::TwoParentBlend,
        mutation,
        &blob(5),
        77,
    );
    for _ in 0..10 {
        let info = sim.step().unwrap();
        assert_eq!(info.per_birth_mutations, info.births);
        assert_consistent(&sim.snapshot());
    }
}

#[test]
fn burst_schedule_gates_per_step_mutation() {
    let mutation = MutationConfig {
        enabled: true,
        per_birth: PerBirthConfig {
            probability: 0.0,
            std_dev: 0.0,
        },
        per_step: PerStepConfig {
            probability: 1.0,
            max_mutants: 1,
            std_dev: 20.0,
            burst_length: 2,
            cooldown_length: 1,
        },
    };
    let mut sim = build(
        Shape::cube(10),
        "B6/S5-7",
        ColorMode::Mean,
        mutation,
        &blob(5),
        4,
    );
    let mut eligible = Vec::new();
    for _ in 0..6 {
        let info = sim.step().unwrap();
        eligible.push(info.burst_eligible);
        if !info.burst_eligible {
            assert_eq!(info.per_step_mutations, 0);
        } else if info.births > 0 {
            assert_eq!(info.per_step_mutations, 1);
        }
    }
    assert_eq!(eligible, vec![true, true, false, true, true, false]);
}

#[test]
fn disabled_mutation_never_mutates() {
    let mut sim = build(
        Shape::cube(10),
        "B6/S5-7",
        ColorMode::Mean,
        MutationConfig {
            enabled: false,
            per_birth: PerBirthConfig {
                probability: 1.0,
                std_dev: 50.0,
            },
            per_step: PerStepConfig {
                probability: 1.0,
                ..PerStepConfig::default()
            },
        },
        &blob(5),
        4,
    );
    for _ in 0..5 {
        let info = sim.step().unwrap();
        assert_eq!(info.mutations(), 0);
    }
}
