//! Randomized generation of guess-the-count puzzle shapes.
//!
//! The generator grows a connected shape one cube at a time, rejecting any
//! placement that would seal a cube in on all 6 sides, then filters whole
//! candidates against the configured size range and visibility constraint.
//! Attempts are cheap, so failed ones are simply retried; after `max_tries`
//! failures a best-effort fallback shape is produced instead so generation
//! never reports an error.

use hashbrown::HashMap;
use rand::{seq::SliceRandom, Rng};

use crate::shape::{Board, Point, Shape, ViewDir};

/// Parameters for one generation request.
///
/// All fields have workable defaults. Values are not validated: degenerate
/// inputs are clamped at the generation boundary (axes and the minimum
/// count to at least 1, the maximum count to at least the minimum), and
/// `max_tries == 0` forces an immediate fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Board the shape must fit in.
    pub board: Board,
    /// Smallest acceptable number of cubes.
    pub block_count_min: usize,
    /// Largest acceptable number of cubes.
    pub block_count_max: usize,
    /// Every cube must be visible along at least one of these directions.
    pub views: Vec<ViewDir>,
    /// The view the puzzle opens on; drives the occlusion fill.
    pub initial_view: ViewDir,
    /// Solidify each column behind its deepest cube as seen from the
    /// initial view. Only applies when the initial view is [`ViewDir::XP`].
    pub fill_occluded: bool,
    /// Attempts before giving up and taking the fallback path.
    pub max_tries: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            board: Board::new(5, 4, 5),
            block_count_min: 6,
            block_count_max: 14,
            views: ViewDir::ALL.to_vec(),
            initial_view: ViewDir::XP,
            fill_occluded: true,
            max_tries: 800,
        }
    }
}

/// A generated puzzle: the shape and the count the player has to guess.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedShape {
    pub shape: Shape,
    /// Always equal to `shape.len()`.
    pub answer: usize,
    /// `true` when the shape came from the fallback path. Fallback shapes
    /// are non-empty and at most `block_count_max` cubes, but are not
    /// guaranteed to satisfy the connectivity or visibility invariants.
    pub fallback: bool,
}

impl GeneratedShape {
    /// The occupied points in a stable order.
    pub fn blocks(&self) -> Vec<Point> {
        self.shape.points_sorted()
    }
}

/// Grow one connected shape of exactly `target` cubes, or `None` when the
/// frontier runs out of room first.
///
/// Growth starts from a uniformly random point and repeatedly extends a
/// random frontier cube into a random free neighbor. A neighbor whose
/// placement would make any cube fully interior is rejected on the spot:
/// such a cube can never be visible from outside, so the shape would be
/// unsalvageable.
pub fn grow_connected<R: Rng + ?Sized>(board: Board, target: usize, rng: &mut R) -> Option<Shape> {
    let board = board.clamped();
    let mut shape = Shape::new(board);

    let start = Point::new(
        rng.gen_range(0..board.x) as i32,
        rng.gen_range(0..board.y) as i32,
        rng.gen_range(0..board.z) as i32,
    );
    shape.insert(start);
    let mut frontier = vec![start];

    while shape.len() < target {
        let base_idx = rng.gen_range(0..frontier.len());
        let base = frontier[base_idx];

        let mut candidates: Vec<Point> = base
            .neighbors()
            .into_iter()
            .filter(|&n| board.contains(n) && !shape.contains(n))
            .collect();

        if candidates.is_empty() {
            // Base has no room left in any direction.
            frontier.swap_remove(base_idx);
            if frontier.is_empty() {
                return None;
            }
            continue;
        }

        candidates.shuffle(rng);

        let mut placed = false;
        for candidate in candidates {
            if shape.would_create_interior(candidate) {
                continue;
            }

            shape.insert(candidate);
            frontier.push(candidate);
            placed = true;
            break;
        }

        if !placed {
            // Every free neighbor would seal a cube in; the base is spent.
            frontier.swap_remove(base_idx);
            if frontier.is_empty() {
                return None;
            }
        }
    }

    Some(shape)
}

/// Solidify the shape as seen from `+X`: for every `(y, z)` column, occupy
/// all cells from `x = 0` up to the deepest occupied cell.
///
/// This removes gaps behind the silhouette in the opening view. The result
/// is deliberately not re-checked against the anti-interior rule; only the
/// size and visibility checks that follow it apply.
pub fn fill_occluded_from_xp(shape: &mut Shape) {
    let mut max_x: HashMap<(i32, i32), i32> = HashMap::new();

    for p in shape.points() {
        max_x
            .entry((p.y, p.z))
            .and_modify(|x| *x = (*x).max(p.x))
            .or_insert(p.x);
    }

    for ((y, z), deepest) in max_x {
        for x in 0..=deepest {
            shape.insert(Point::new(x, y, z));
        }
    }
}

enum State {
    Attempt(usize),
    Fallback,
}

/// Generate one puzzle shape using the given random source.
///
/// Each attempt samples a target count uniformly from the configured range,
/// grows a candidate, optionally applies the occlusion fill, and accepts
/// the first candidate whose size stayed in range and whose every cube is
/// visible along at least one configured direction. If `max_tries`
/// attempts all fail, a single fallback shape is returned instead (see
/// [`GeneratedShape::fallback`]); generation never fails outright.
pub fn generate_with<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> GeneratedShape {
    let board = config.board.clamped();
    let min = config.block_count_min.max(1);
    let max = config.block_count_max.max(min);
    let fill = config.fill_occluded && config.initial_view == ViewDir::XP;

    let mut state = State::Attempt(0);

    loop {
        match state {
            State::Attempt(tried) if tried >= config.max_tries => state = State::Fallback,
            State::Attempt(tried) => {
                state = State::Attempt(tried + 1);

                let target = rng.gen_range(min..=max);
                let Some(mut shape) = grow_connected(board, target, rng) else {
                    continue;
                };

                if fill {
                    fill_occluded_from_xp(&mut shape);
                    // The fill can push the count past the maximum.
                    if shape.len() < min || shape.len() > max {
                        continue;
                    }
                }

                if !shape.satisfies_visibility(&config.views) {
                    continue;
                }

                let answer = shape.len();
                return GeneratedShape {
                    shape,
                    answer,
                    fallback: false,
                };
            }
            State::Fallback => {
                let mut shape = grow_connected(board, min, rng)
                    .unwrap_or_else(|| Shape::from_points(board, [Point::ORIGIN]));

                if fill {
                    fill_occluded_from_xp(&mut shape);
                }

                if shape.len() > max {
                    let mut points: Vec<Point> = shape.points().collect();
                    points.truncate(max);
                    shape = Shape::from_points(board, points);
                }

                let answer = shape.len();
                return GeneratedShape {
                    shape,
                    answer,
                    fallback: true,
                };
            }
        }
    }
}

/// Generate one puzzle shape from the thread-local random source.
pub fn generate(config: &GeneratorConfig) -> GeneratedShape {
    generate_with(config, &mut rand::thread_rng())
}

#[test]
fn fill_solidifies_columns() {
    let board = Board::new(4, 3, 3);
    let mut shape = Shape::from_points(
        board,
        [Point::new(2, 1, 1), Point::new(0, 0, 2), Point::new(3, 2, 0)],
    );

    fill_occluded_from_xp(&mut shape);

    // Column (y=1, z=1) is now solid from the boundary to x = 2.
    assert!(shape.contains(Point::new(0, 1, 1)));
    assert!(shape.contains(Point::new(1, 1, 1)));
    assert!(shape.contains(Point::new(2, 1, 1)));
    assert!(!shape.contains(Point::new(3, 1, 1)));

    // A column whose deepest cube sits at x = 0 is untouched.
    assert!(shape.contains(Point::new(0, 0, 2)));

    // 3 + 1 + 4 cells across the three touched columns.
    assert_eq!(shape.len(), 8);
}
