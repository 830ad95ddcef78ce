use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::generator::{generate_with, grow_connected, GeneratorConfig};
use crate::shape::{Board, Point, Shape, ViewDir};

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Every point must be inside the shape's board.
fn assert_inbounds(shape: &Shape) {
    for p in shape.points() {
        assert!(shape.board().contains(p), "{p:?} outside {:?}", shape.board());
    }
}

#[test]
fn grown_shapes_are_connected_hollow_and_exact() {
    let board = Board::new(5, 4, 5);

    for seed in 0..40 {
        for target in 1..=14 {
            let Some(shape) = grow_connected(board, target, &mut rng(seed)) else {
                continue;
            };

            assert_eq!(shape.len(), target);
            assert_inbounds(&shape);
            assert!(shape.is_connected());
            // Growth alone never produces a sealed-in cube.
            assert!(!shape.has_interior_point());
        }
    }
}

#[test]
fn growth_fails_when_board_is_too_small() {
    let board = Board::new(1, 1, 1);

    for seed in 0..10 {
        assert!(grow_connected(board, 2, &mut rng(seed)).is_none());
    }
}

#[test]
fn default_config_success_path_invariants() {
    let config = GeneratorConfig::default();
    let mut successes = 0;

    for seed in 0..100 {
        let result = generate_with(&config, &mut rng(seed));

        assert_eq!(result.answer, result.shape.len());
        assert_inbounds(&result.shape);
        assert!(!result.shape.is_empty());
        assert!(result.shape.len() <= config.block_count_max);

        if result.fallback {
            continue;
        }

        successes += 1;
        assert!(result.shape.len() >= config.block_count_min);
        assert!(result.shape.is_connected());
        assert!(result.shape.satisfies_visibility(&config.views));
    }

    // 800 tries on a 5x4x5 board essentially never all fail.
    assert!(successes > 0);
}

#[test]
fn example_scenario_3x3x3() {
    let config = GeneratorConfig {
        board: Board::new(3, 3, 3),
        block_count_min: 4,
        block_count_max: 10,
        ..GeneratorConfig::default()
    };

    for seed in 0..50 {
        let result = generate_with(&config, &mut rng(seed));

        assert_eq!(result.answer, result.shape.len());
        assert_inbounds(&result.shape);
        assert!(result.shape.len() <= 10);

        if !result.fallback {
            assert!(result.shape.len() >= 4);
            assert!(result.shape.is_connected());
            assert!(result.shape.satisfies_visibility(&ViewDir::ALL));
        }
    }
}

#[test]
fn single_view_constraint_is_enforced() {
    let config = GeneratorConfig {
        views: vec![ViewDir::XP],
        ..GeneratorConfig::default()
    };

    for seed in 0..30 {
        let result = generate_with(&config, &mut rng(seed));

        if result.fallback {
            continue;
        }

        // Under a lone XP view no point may hide behind another; shapes
        // that would pass under three views must have been rejected.
        for p in result.shape.points() {
            assert!(result.shape.is_visible_along(p, ViewDir::XP));
        }
    }
}

#[test]
fn same_seed_reproduces_the_shape() {
    let config = GeneratorConfig {
        fill_occluded: false,
        ..GeneratorConfig::default()
    };

    let first = generate_with(&config, &mut rng(7));
    let second = generate_with(&config, &mut rng(7));

    assert_eq!(first.blocks(), second.blocks());
    assert_eq!(first.answer, second.answer);
    assert_eq!(first.fallback, second.fallback);
}

#[test]
fn pinned_count_range_terminates() {
    let config = GeneratorConfig {
        block_count_min: 9,
        block_count_max: 9,
        ..GeneratorConfig::default()
    };

    for seed in 0..20 {
        let result = generate_with(&config, &mut rng(seed));

        assert_eq!(result.answer, result.shape.len());
        assert!(result.shape.len() <= 9);
        if !result.fallback {
            assert_eq!(result.answer, 9);
        }
    }
}

#[test]
fn zero_tries_forces_fallback() {
    let config = GeneratorConfig {
        max_tries: 0,
        ..GeneratorConfig::default()
    };

    let result = generate_with(&config, &mut rng(3));

    assert!(result.fallback);
    assert!(!result.shape.is_empty());
    assert!(result.shape.len() <= config.block_count_max);
}

#[test]
fn unreachable_target_falls_back_to_origin() {
    // A 2x2x2 board holds 8 cubes, so a target of 9 can never be grown
    // and even the fallback growth fails; the degenerate single cube at
    // the origin remains.
    let config = GeneratorConfig {
        board: Board::new(2, 2, 2),
        block_count_min: 9,
        block_count_max: 9,
        max_tries: 5,
        ..GeneratorConfig::default()
    };

    for seed in 0..10 {
        let result = generate_with(&config, &mut rng(seed));

        assert!(result.fallback);
        assert_eq!(result.answer, 1);
        assert_eq!(result.blocks(), vec![Point::ORIGIN]);
    }
}

#[test]
fn degenerate_config_is_clamped() {
    let config = GeneratorConfig {
        board: Board::new(0, 0, 0),
        block_count_min: 10,
        block_count_max: 2,
        max_tries: 3,
        ..GeneratorConfig::default()
    };

    let result = generate_with(&config, &mut rng(1));

    assert_eq!(result.answer, result.shape.len());
    assert!(!result.shape.is_empty());
    // The board collapses to a single cell and the count range to
    // [10, 10], so only the fallback's lone origin cube fits.
    assert_eq!(result.blocks(), vec![Point::ORIGIN]);
}

#[test]
fn fill_keeps_count_within_bound_on_success() {
    let config = GeneratorConfig {
        block_count_min: 6,
        block_count_max: 8,
        ..GeneratorConfig::default()
    };

    for seed in 0..50 {
        let result = generate_with(&config, &mut rng(seed));
        assert!(result.shape.len() <= 8);
        if !result.fallback {
            assert!(result.shape.len() >= 6);
        }
    }
}
