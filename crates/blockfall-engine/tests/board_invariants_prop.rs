//! Property tests for the bit board and piece tables.

use blockfall_engine::{
    BitBoard, BoardSize, GameField, Piece, PieceKind, PiecePosition, PieceRotation,
    PieceSequencer as _, SequencerKind,
};
use proptest::prelude::*;

const WIDTH: usize = 10;
const HEIGHT: usize = 20;

/// Builds a board from row bit masks, bit `x` being column `x`.
fn board_from_rows(rows: &[u64]) -> BitBoard {
    let art: String = rows
        .iter()
        .map(|row| {
            let mut line: String = (0..WIDTH)
                .map(|x| if (row >> x) & 1 != 0 { '#' } else { '.' })
                .collect();
            line.push('\n');
            line
        })
        .collect();
    BitBoard::from_ascii(&art)
}

fn naive_is_colliding(board: &BitBoard, piece: Piece) -> bool {
    let shape = piece.shape();
    let pos = piece.position();
    shape.occupied_cells().any(|(dx, dy)| {
        let (x, y) = (pos.x() + dx, pos.y() + dy);
        x >= board.width() || y >= board.height() || board.is_cell_occupied(x, y)
    })
}

fn arb_rows() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..(1 << WIDTH), HEIGHT)
}

fn arb_piece() -> impl Strategy<Value = Piece> {
    (0..PieceKind::LEN, 0usize..4, 0u8..12, 0u8..22).prop_map(|(k, r, x, y)| {
        let kind = PieceKind::ALL[k];
        let rotation = PieceRotation::new(kind, r % kind.rotation_count()).unwrap();
        Piece::new(kind, rotation, PiecePosition::new(x, y))
    })
}

proptest! {
    #[test]
    fn collision_matches_cell_by_cell_check(rows in arb_rows(), piece in arb_piece()) {
        let board = board_from_rows(&rows);
        prop_assert_eq!(board.is_colliding(piece), naive_is_colliding(&board, piece));
    }

    #[test]
    fn remove_piece_undoes_fill_piece(rows in arb_rows(), piece in arb_piece()) {
        let board = board_from_rows(&rows);
        prop_assume!(!board.is_colliding(piece));

        let mut scratch = board.clone();
        scratch.fill_piece(piece);
        prop_assert_eq!(scratch.occupied_cell_count(), board.occupied_cell_count() + 4);
        scratch.remove_piece(piece);
        prop_assert_eq!(scratch, board);
    }

    #[test]
    fn rotation_cycles_back_to_start(piece in arb_piece()) {
        let mut rotated = piece;
        for _ in 0..piece.kind().rotation_count() {
            rotated = rotated.rotated();
        }
        prop_assert_eq!(rotated, piece);
    }

    #[test]
    fn field_rotation_cycle_restores_the_falling_piece(
        rows in arb_rows(),
        k in 0..PieceKind::LEN,
        r in 0usize..4,
        x in 0u8..7,
        y in 4u8..17,
        seed in any::<u64>()
    ) {
        let mut rows = rows;
        // keep the spawn rows and the piece's 4x4 box free
        rows[..4].fill(0);
        rows[usize::from(y)..usize::from(y) + 4].fill(0);
        let kind = PieceKind::ALL[k];
        let rotation = PieceRotation::new(kind, r % kind.rotation_count()).unwrap();
        let piece = Piece::new(kind, rotation, PiecePosition::new(x, y));
        let board = board_from_rows(&rows);

        let mut field = GameField::with_board(board, SequencerKind::Bag.build(seed.into()));
        prop_assert!(field.set_falling_piece(piece).is_ok());
        for _ in 0..kind.rotation_count() {
            prop_assert!(field.try_rotate());
        }
        prop_assert_eq!(field.falling_piece(), piece);
        prop_assert_eq!(field.current_rotation(), piece.rotation());
        prop_assert_eq!(field.current_position(), piece.position());
        prop_assert_eq!(field.falling_piece().shape(), piece.shape());
    }

    #[test]
    fn clear_lines_keeps_partial_rows_in_order(rows in arb_rows()) {
        let full = BoardSize::DEFAULT.full_row_mask();
        let mut board = board_from_rows(&rows);
        let before = board.occupied_cell_count();

        let cleared = board.clear_lines();

        let partial: Vec<u64> = rows.iter().copied().filter(|row| *row != full).collect();
        prop_assert_eq!(cleared, HEIGHT - partial.len());
        prop_assert_eq!(board.occupied_cell_count(), before - cleared * WIDTH);
        prop_assert!(board.rows()[..cleared].iter().all(|row| *row == 0));
        prop_assert_eq!(&board.rows()[cleared..], partial.as_slice());
        prop_assert!((0..HEIGHT).all(|y| !board.is_row_filled(y)));
        prop_assert_eq!(board.clear_lines(), 0);
    }

    #[test]
    fn dropped_piece_rests_on_something(rows in arb_rows(), k in 0..PieceKind::LEN, x in 0u8..10) {
        let mut cleared = rows.clone();
        // keep the spawn rows free so the piece can enter the board
        cleared[..4].fill(0);
        let board = board_from_rows(&cleared);
        let piece = Piece::new(PieceKind::ALL[k], PieceRotation::SPAWN, PiecePosition::new(x, 0));
        prop_assume!(!board.is_colliding(piece));

        let dropped = piece.simulate_drop_position(&board);
        prop_assert!(!board.is_colliding(dropped));
        let below = dropped.down().unwrap();
        prop_assert!(board.is_colliding(below));
    }

    #[test]
    fn bag_sequencer_deals_every_kind_per_bag(seed in any::<u64>()) {
        let mut sequencer = SequencerKind::Bag.build(seed.into());
        for _ in 0..5 {
            let mut bag: Vec<_> = (0..PieceKind::LEN).map(|_| sequencer.next_piece() as usize).collect();
            bag.sort_unstable();
            prop_assert_eq!(bag, (0..PieceKind::LEN).collect::<Vec<_>>());
        }
    }
}
