use std::fmt;

use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};

use super::bit_board::{BitBoard, BoardSize};

/// A tetromino with position, rotation state and kind.
///
/// Pieces are immutable values: movement and rotation return new `Piece`s and
/// the board decides whether the result is legal.
///
/// # Coordinate System
///
/// - Position is the top-left corner of the current rotation state's bounding box
/// - X increases rightward (columns), Y increases downward (rows)
/// - Row 0 is the top of the board
///
/// # Example
///
/// ```
/// use blockfall_engine::{BoardSize, Piece, PieceKind};
///
/// let piece = Piece::spawn(PieceKind::T, BoardSize::DEFAULT);
/// let moved = piece.right().unwrap();
/// let rotated = moved.rotated();
/// assert_eq!(rotated.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, position: PiecePosition) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    /// Creates a piece in rotation state 0 at the spawn position of a board.
    #[must_use]
    pub fn spawn(kind: PieceKind, size: BoardSize) -> Self {
        Self::new(kind, PieceRotation::SPAWN, size.spawn_position())
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &'static PieceShape {
        self.kind.shape(self.rotation)
    }

    /// Board coordinates of the four occupied cells.
    #[must_use]
    pub fn occupied_positions(&self) -> ArrayVec<(usize, usize), 4> {
        self.shape()
            .occupied_cells()
            .map(|(dx, dy)| (self.position.x() + dx, self.position.y() + dy))
            .collect()
    }

    #[must_use]
    pub fn with_position(self, position: PiecePosition) -> Self {
        Self { position, ..self }
    }

    #[must_use]
    pub fn left(&self) -> Option<Self> {
        Some(self.with_position(self.position.left()?))
    }

    #[must_use]
    pub fn right(&self) -> Option<Self> {
        Some(self.with_position(self.position.right()?))
    }

    #[must_use]
    pub fn down(&self) -> Option<Self> {
        Some(self.with_position(self.position.down()?))
    }

    /// Advances to the next rotation state, wrapping to state 0 after the last.
    ///
    /// The top-left corner stays fixed; no wall kicks are attempted.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            rotation: self.rotation.next(self.kind),
            ..*self
        }
    }

    /// Returns the piece moved down until the next step would collide.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &BitBoard) -> Self {
        let mut dropped = *self;
        while let Some(piece) = dropped.down().filter(|m| !board.is_colliding(*m)) {
            dropped = piece;
        }
        dropped
    }
}

/// Position of a piece's bounding box on the board.
///
/// Coordinates are stored as `u8`; [`BoardSize`] guarantees every board
/// coordinate fits. Moving past column or row 0 is unrepresentable and yields
/// `None`, which callers treat the same as a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePosition {
    x: u8,
    y: u8,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> usize {
        usize::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> usize {
        usize::from(self.y)
    }

    #[must_use]
    pub const fn with_y(self, y: u8) -> Self {
        Self { y, ..self }
    }

    #[must_use]
    pub const fn left(&self) -> Option<Self> {
        match self.x.checked_sub(1) {
            Some(x) => Some(Self::new(x, self.y)),
            None => None,
        }
    }

    #[must_use]
    pub const fn right(&self) -> Option<Self> {
        match self.x.checked_add(1) {
            Some(x) => Some(Self::new(x, self.y)),
            None => None,
        }
    }

    #[must_use]
    pub const fn down(&self) -> Option<Self> {
        match self.y.checked_add(1) {
            Some(y) => Some(Self::new(self.x, y)),
            None => None,
        }
    }
}

/// Index into a piece kind's list of distinct rotation states.
///
/// The number of states depends on the kind's symmetry: 1 for O, 2 for I, S
/// and Z, 4 for J, L and T.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    /// Returns the rotation with the given index, or `None` if the kind has
    /// fewer states.
    #[must_use]
    pub fn new(kind: PieceKind, index: usize) -> Option<Self> {
        if index < kind.rotation_count() {
            u8::try_from(index).ok().map(Self)
        } else {
            None
        }
    }

    #[must_use]
    pub fn next(self, kind: PieceKind) -> Self {
        let count = kind.rotation_count();
        #[expect(clippy::cast_possible_truncation)]
        Self(((self.index() + 1) % count) as u8)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The seven tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// All rotation states of this kind, in rotation order.
    #[must_use]
    pub fn shapes(self) -> &'static [PieceShape] {
        PIECE_SHAPES[self as usize]
    }

    #[must_use]
    pub fn rotation_count(self) -> usize {
        self.shapes().len()
    }

    /// Iterates over every distinct rotation state of this kind.
    pub fn rotations(self) -> impl Iterator<Item = PieceRotation> {
        #[expect(clippy::cast_possible_truncation)]
        (0..self.rotation_count()).map(|i| PieceRotation(i as u8))
    }

    #[must_use]
    pub fn shape(self, rotation: PieceRotation) -> &'static PieceShape {
        &self.shapes()[rotation.index()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }
}

/// One rotation state: an occupancy pattern with its bounding box size.
///
/// `rows()[dy]` holds the pattern row `dy` as a bit mask where bit `dx` is
/// column `dx` of the bounding box, matching the board's row layout.
#[derive(Debug, PartialEq, Eq)]
pub struct PieceShape {
    rows: &'static [u64],
    width: u8,
}

impl PieceShape {
    #[must_use]
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn rows(&self) -> &'static [u64] {
        self.rows
    }

    #[must_use]
    pub fn is_cell_occupied(&self, dx: usize, dy: usize) -> bool {
        self.rows
            .get(dy)
            .is_some_and(|row| dx < 64 && (row >> dx) & 1 != 0)
    }

    /// Iterates over the occupied `(dx, dy)` offsets, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height()).flat_map(move |dy| {
            (0..self.width())
                .filter(move |&dx| self.is_cell_occupied(dx, dy))
                .map(move |dx| (dx, dy))
        })
    }
}

/// Converts a row drawn with `#` (occupied) and `.` (empty) into a bit mask.
const fn row(cells: &[u8]) -> u64 {
    let mut mask = 0;
    let mut i = 0;
    while i < cells.len() {
        if cells[i] == b'#' {
            mask |= 1 << i;
        }
        i += 1;
    }
    mask
}

static I_SHAPES: [PieceShape; 2] = [
    PieceShape {
        rows: &[row(b"####")],
        width: 4,
    },
    PieceShape {
        rows: &[row(b"#"), row(b"#"), row(b"#"), row(b"#")],
        width: 1,
    },
];

static O_SHAPES: [PieceShape; 1] = [PieceShape {
    rows: &[row(b"##"), row(b"##")],
    width: 2,
}];

static S_SHAPES: [PieceShape; 2] = [
    PieceShape {
        rows: &[row(b".##"), row(b"##.")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b"#."), row(b"##"), row(b".#")],
        width: 2,
    },
];

static Z_SHAPES: [PieceShape; 2] = [
    PieceShape {
        rows: &[row(b"##."), row(b".##")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b".#"), row(b"##"), row(b"#.")],
        width: 2,
    },
];

static J_SHAPES: [PieceShape; 4] = [
    PieceShape {
        rows: &[row(b"#.."), row(b"###")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b"##"), row(b"#."), row(b"#.")],
        width: 2,
    },
    PieceShape {
        rows: &[row(b"###"), row(b"..#")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b".#"), row(b".#"), row(b"##")],
        width: 2,
    },
];

static L_SHAPES: [PieceShape; 4] = [
    PieceShape {
        rows: &[row(b"..#"), row(b"###")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b"#."), row(b"#."), row(b"##")],
        width: 2,
    },
    PieceShape {
        rows: &[row(b"###"), row(b"#..")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b"##"), row(b".#"), row(b".#")],
        width: 2,
    },
];

static T_SHAPES: [PieceShape; 4] = [
    PieceShape {
        rows: &[row(b".#."), row(b"###")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b"#."), row(b"##"), row(b"#.")],
        width: 2,
    },
    PieceShape {
        rows: &[row(b"###"), row(b".#.")],
        width: 3,
    },
    PieceShape {
        rows: &[row(b".#"), row(b"##"), row(b".#")],
        width: 2,
    },
];

/// Rotation state tables indexed by `PieceKind as usize`.
static PIECE_SHAPES: [&[PieceShape]; PieceKind::LEN] = [
    &I_SHAPES, &O_SHAPES, &S_SHAPES, &Z_SHAPES, &J_SHAPES, &L_SHAPES, &T_SHAPES,
];
