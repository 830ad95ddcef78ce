//! Lattice geometry for block puzzles.
//!
//! A [`Shape`] is a set of occupied unit cubes at integer coordinates inside
//! a [`Board`]. Cubes are 6-connected: two cubes are adjacent when they
//! differ by exactly one step along exactly one axis.

use hashbrown::HashSet;

/// A point on the integer lattice.
///
/// Identity is structural: two points are the same iff all three
/// coordinates match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The 6 face-adjacent neighbors of this point.
    pub fn neighbors(&self) -> [Point; 6] {
        let Point { x, y, z } = *self;
        [
            Point::new(x + 1, y, z),
            Point::new(x - 1, y, z),
            Point::new(x, y + 1, z),
            Point::new(x, y - 1, z),
            Point::new(x, y, z + 1),
            Point::new(x, y, z - 1),
        ]
    }
}

/// The axis-aligned box `[0,x) × [0,y) × [0,z)` that shapes live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Board {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0
            && (p.x as usize) < self.x
            && p.y >= 0
            && (p.y as usize) < self.y
            && p.z >= 0
            && (p.z as usize) < self.z
    }

    pub fn volume(&self) -> usize {
        self.x * self.y * self.z
    }

    /// The same board with every axis forced to be at least one cell long.
    pub fn clamped(&self) -> Board {
        Board::new(self.x.max(1), self.y.max(1), self.z.max(1))
    }
}

/// A viewing direction for visibility checks.
///
/// The variant names the direction the sight ray travels in: `XP` looks
/// through the shape toward the `+X` boundary, `XN` toward `-X`, `ZP`
/// toward `+Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewDir {
    XP,
    XN,
    ZP,
}

impl ViewDir {
    /// All supported directions.
    pub const ALL: [ViewDir; 3] = [ViewDir::XP, ViewDir::XN, ViewDir::ZP];
}

/// A set of occupied unit cubes inside a [`Board`].
///
/// The set itself places no connectivity or visibility requirements on its
/// contents; those are checked by the predicates below and enforced by the
/// generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    board: Board,
    occupied: HashSet<Point>,
}

impl Shape {
    /// Create an empty shape on `board`.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            occupied: HashSet::new(),
        }
    }

    /// Create a shape from a list of points. Out-of-board and duplicate
    /// points are silently dropped.
    pub fn from_points(board: Board, points: impl IntoIterator<Item = Point>) -> Self {
        let mut shape = Shape::new(board);
        for p in points {
            shape.insert(p);
        }
        shape
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.occupied.contains(&p)
    }

    /// Occupy `p`. Returns `false` if `p` is outside the board or was
    /// already occupied.
    pub fn insert(&mut self, p: Point) -> bool {
        self.board.contains(p) && self.occupied.insert(p)
    }

    /// Clear `p`. Returns whether it was occupied.
    pub fn remove(&mut self, p: Point) -> bool {
        self.occupied.remove(&p)
    }

    /// Iterate over the occupied points in arbitrary order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.occupied.iter().copied()
    }

    /// The occupied points, sorted. Handy for stable output and comparisons.
    pub fn points_sorted(&self) -> Vec<Point> {
        let mut points: Vec<Point> = self.occupied.iter().copied().collect();
        points.sort_unstable();
        points
    }

    /// Whether `p` is enclosed on all 6 sides by occupied cubes. Such a
    /// cube can never be seen from any straight-line external direction.
    pub fn is_fully_interior(&self, p: Point) -> bool {
        p.neighbors().iter().all(|n| self.occupied.contains(n))
    }

    /// Whether any occupied point is fully interior.
    pub fn has_interior_point(&self) -> bool {
        self.occupied.iter().any(|&p| self.is_fully_interior(p))
    }

    /// Whether occupying `p` would leave some point fully interior.
    ///
    /// Only `p` itself and its occupied neighbors can newly become
    /// interior, so the scan never has to touch the rest of the shape.
    pub fn would_create_interior(&self, p: Point) -> bool {
        let interior_with_p = |q: Point| {
            q.neighbors()
                .iter()
                .all(|n| *n == p || self.occupied.contains(n))
        };

        if interior_with_p(p) {
            return true;
        }

        p.neighbors()
            .into_iter()
            .filter(|n| self.occupied.contains(n))
            .any(interior_with_p)
    }

    /// Whether `p` can be seen along `dir`: walking from `p` toward the
    /// open boundary, one cube at a time, no step lands on an occupied
    /// cube.
    pub fn is_visible_along(&self, p: Point, dir: ViewDir) -> bool {
        match dir {
            ViewDir::XP => {
                (p.x + 1..self.board.x as i32).all(|x| !self.contains(Point::new(x, p.y, p.z)))
            }
            ViewDir::XN => (0..p.x).all(|x| !self.contains(Point::new(x, p.y, p.z))),
            ViewDir::ZP => {
                (p.z + 1..self.board.z as i32).all(|z| !self.contains(Point::new(p.x, p.y, z)))
            }
        }
    }

    /// Whether every occupied point is visible along at least one of
    /// `views`.
    pub fn satisfies_visibility(&self, views: &[ViewDir]) -> bool {
        self.occupied
            .iter()
            .all(|&p| views.iter().any(|&dir| self.is_visible_along(p, dir)))
    }

    /// Whether the 6-adjacency graph over the occupied points forms a
    /// single component. The empty shape counts as connected.
    pub fn is_connected(&self) -> bool {
        let Some(&start) = self.occupied.iter().next() else {
            return true;
        };

        let mut seen = HashSet::new();
        seen.insert(start);
        let mut to_explore = vec![start];

        while let Some(p) = to_explore.pop() {
            for n in p.neighbors() {
                if self.occupied.contains(&n) && seen.insert(n) {
                    to_explore.push(n);
                }
            }
        }

        seen.len() == self.occupied.len()
    }
}

impl core::fmt::Display for Shape {
    // Render the board one horizontal layer at a time, bottom layer first.
    // Rows run along z, columns along x.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut out = String::new();

        for _ in 0..self.board.x {
            out.push('-');
        }
        out.push('\n');

        for y in 0..self.board.y as i32 {
            for z in 0..self.board.z as i32 {
                for x in 0..self.board.x as i32 {
                    if self.contains(Point::new(x, y, z)) {
                        out.push('#');
                    } else {
                        out.push('.');
                    }
                }
                out.push('\n');
            }

            for _ in 0..self.board.x {
                out.push('-');
            }
            out.push('\n');
        }

        write!(f, "{}", out.trim_end())
    }
}

#[test]
fn straight_column_visibility() {
    let board = Board::new(3, 3, 3);
    let shape = Shape::from_points(
        board,
        [Point::new(0, 0, 0), Point::new(1, 0, 0), Point::new(2, 0, 0)],
    );

    // Only the cube nearest the +X boundary is unobstructed along XP.
    assert!(shape.is_visible_along(Point::new(2, 0, 0), ViewDir::XP));
    assert!(!shape.is_visible_along(Point::new(1, 0, 0), ViewDir::XP));
    assert!(!shape.is_visible_along(Point::new(0, 0, 0), ViewDir::XP));

    assert!(shape.is_visible_along(Point::new(0, 0, 0), ViewDir::XN));
    assert!(!shape.is_visible_along(Point::new(2, 0, 0), ViewDir::XN));

    // Nothing sits above any of them in z.
    for p in shape.points() {
        assert!(shape.is_visible_along(p, ViewDir::ZP));
    }

    assert!(!shape.satisfies_visibility(&[ViewDir::XP]));
    assert!(shape.satisfies_visibility(&[ViewDir::XP, ViewDir::ZP]));
    assert!(shape.satisfies_visibility(&ViewDir::ALL));
}

#[test]
fn interior_detection() {
    let board = Board::new(3, 3, 3);
    let center = Point::new(1, 1, 1);

    // All 6 neighbors of the center present, center itself empty.
    let ring = Shape::from_points(board, center.neighbors());
    assert!(!ring.has_interior_point());
    assert!(ring.would_create_interior(center));

    // The last side of the enclosure is the culprit even though it is not
    // the point that ends up interior.
    let mut open = ring.clone();
    let lid = Point::new(1, 2, 1);
    open.remove(lid);
    open.insert(center);
    assert!(!open.has_interior_point());
    assert!(open.would_create_interior(lid));

    let mut closed = open.clone();
    closed.insert(lid);
    assert!(closed.has_interior_point());
    assert!(closed.is_fully_interior(center));
}

#[test]
fn connectivity() {
    let board = Board::new(4, 4, 4);

    let connected = Shape::from_points(
        board,
        [Point::new(0, 0, 0), Point::new(1, 0, 0), Point::new(1, 1, 0)],
    );
    assert!(connected.is_connected());

    let split = Shape::from_points(board, [Point::new(0, 0, 0), Point::new(2, 0, 0)]);
    assert!(!split.is_connected());

    assert!(Shape::new(board).is_connected());
}

#[test]
fn insert_rejects_out_of_board() {
    let mut shape = Shape::new(Board::new(2, 2, 2));

    assert!(shape.insert(Point::new(1, 1, 1)));
    assert!(!shape.insert(Point::new(1, 1, 1)));
    assert!(!shape.insert(Point::new(-1, 0, 0)));
    assert!(!shape.insert(Point::new(0, 2, 0)));
    assert_eq!(shape.len(), 1);
}
