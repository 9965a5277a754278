pub use self::{bit_board::*, piece::*};

pub(crate) mod bit_board;
pub(crate) mod piece;
