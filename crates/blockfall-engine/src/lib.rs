pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "invalid board size {width}x{height}: width must be in {}..={} and height in {}..={}",
    BoardSize::MIN_WIDTH,
    BoardSize::MAX_WIDTH,
    BoardSize::MIN_HEIGHT,
    BoardSize::MAX_HEIGHT
)]
pub struct BoardSizeError {
    pub width: usize,
    pub height: usize,
}
