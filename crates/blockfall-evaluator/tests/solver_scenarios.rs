//! End-to-end checks of the solver against live game fields.

use blockfall_engine::{
    BitBoard, BoardSize, Direction, GameField, PieceKind, PieceSequencer, SequencerKind,
};
use blockfall_evaluator::{
    board_feature::BoardFeature,
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{FeatureWeights, PlacementEvaluator as _, WeightedPlacementEvaluator},
    solver::Solver,
};
use proptest::prelude::*;

#[derive(Debug)]
struct Repeat(PieceKind);

impl PieceSequencer for Repeat {
    fn next_piece(&mut self) -> PieceKind {
        self.0
    }
}

#[test]
fn o_piece_drops_to_bottom_of_empty_board() {
    let mut field = GameField::new(BoardSize::DEFAULT, Box::new(Repeat(PieceKind::O)));
    while field.try_move(Direction::Down) {}
    let piece = field.falling_piece();
    assert_eq!(piece.position().y(), 20 - 2);

    let mut board = field.board().clone();
    board.fill_piece(piece);
    let features = PlacementAnalysis::new(&board, piece).feature_values();
    assert!(features[BoardFeature::MeltedLines].abs() < f32::EPSILON);
    assert!(features[BoardFeature::NumHoles].abs() < f32::EPSILON);
}

#[test]
fn empty_board_has_only_boundary_transitions() {
    for size in [
        BoardSize::DEFAULT,
        BoardSize::new(8, 8).unwrap(),
        BoardSize::new(64, 30).unwrap(),
    ] {
        let board = BitBoard::new(size);
        let analysis = blockfall_evaluator::board_analysis::BoardAnalysis::from_board(&board);
        assert_eq!(analysis.num_holes(), 0);
        assert_eq!(analysis.well_sums(), 0);
        assert_eq!(analysis.row_transitions() as usize, 2 * size.height());
        assert_eq!(analysis.column_transitions() as usize, size.width());
    }
}

#[test]
fn filling_the_gap_melts_the_row() {
    let board = BitBoard::from_ascii(
        "
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ....#.....
        ###.######
        ",
    );
    let mut field = GameField::with_board(board, Box::new(Repeat(PieceKind::T)));
    let solver = Solver::with_weights(FeatureWeights::EL_TETRIS);

    let choice = solver.best_placement_for(&field).unwrap();
    assert!(choice.evaluation().features[BoardFeature::MeltedLines] >= 1.0);

    let outcome = choice.placement().apply(&mut field).unwrap();
    assert_eq!(outcome.cleared_lines, 1);
    // the row with the gap is gone; no row is full afterwards
    for y in 0..field.board().height() {
        assert!(!field.board().is_row_filled(y));
    }
    assert_eq!(field.board().occupied_cell_count(), 9 + 1 + 4 - 10);
}

#[test]
fn evaluation_matches_solver_choice() {
    let board = BitBoard::from_ascii(
        "
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        ..........
        #.........
        ##.....#..
        ###.#.###.
        #####.####
        ",
    );
    let evaluator = WeightedPlacementEvaluator::new(FeatureWeights::TRAINED);
    let solver = Solver::with_weights(FeatureWeights::TRAINED);
    for kind in PieceKind::ALL {
        let choice = solver.best_placement(&board, kind).unwrap();
        let piece = choice.placement().piece();
        let mut placed = board.clone();
        placed.fill_piece(piece);
        let evaluation = evaluator.evaluate_placement(&PlacementAnalysis::new(&placed, piece));
        assert_eq!(&evaluation, choice.evaluation());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn solver_placements_are_always_executable(
        seed in any::<u64>(),
        kind_index in 0..SequencerKind::ALL.len(),
        trained in any::<bool>(),
    ) {
        let weights = if trained { FeatureWeights::TRAINED } else { FeatureWeights::EL_TETRIS };
        let solver = Solver::with_weights(weights);
        let sequencer = SequencerKind::ALL[kind_index].build(seed.into());
        let mut field = GameField::new(BoardSize::DEFAULT, sequencer);

        for _ in 0..150 {
            let Some(choice) = solver.best_placement_for(&field) else {
                break;
            };
            let outcome = choice.placement().apply(&mut field);
            prop_assert!(outcome.is_ok());
            if !outcome.unwrap().active {
                break;
            }
        }
    }
}
