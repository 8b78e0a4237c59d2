//! Property tests for the rules engine.
//!
//! Random seeds and action streams drive whole games; after every step the
//! board must keep its walls, the active piece must be drawn where the engine
//! says it is without covering a locked block, and score and line totals must
//! never go down.

use proptest::prelude::*;
use std::collections::HashSet;
use tint::bag::Bag;
use tint::board::{Board, Cell, FIRST_PLAY_COL, FIRST_VISIBLE_ROW, LAST_PLAY_COL, LAST_PLAY_ROW};
use tint::tetromino::{NUM_SHAPES, RotationClass};
use tint::{Action, BlockColor, ClassicScoring, Engine, EngineOptions, Evaluation, ShapeKind};

/// One host step: an action, or a gravity tick
#[derive(Debug, Clone, Copy)]
enum Step {
    Act(Action),
    Tick,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => Just(Step::Act(Action::MoveLeft)),
        1 => Just(Step::Act(Action::MoveRight)),
        1 => Just(Step::Act(Action::Rotate)),
        1 => Just(Step::Act(Action::Down)),
        1 => Just(Step::Act(Action::HardDrop)),
        3 => Just(Step::Tick),
    ]
}

fn assert_piece_drawn(engine: &Engine<ClassicScoring>) {
    let color = engine.current_kind().color();
    for (x, y) in engine.piece_cells() {
        assert_eq!(engine.board().get(x, y), Some(Cell::Filled(color)));
    }
}

/// Cells the active piece and its shadow hold on the board
fn active_cells(engine: &Engine<ClassicScoring>) -> HashSet<(i32, i32)> {
    let mut cells: HashSet<_> = engine.piece_cells().into_iter().collect();
    if let Some(shadow) = engine.shadow_cells() {
        cells.extend(shadow);
    }
    cells
}

const PLAY_WIDTH: usize = LAST_PLAY_COL - FIRST_PLAY_COL + 1;

proptest! {
    #[test]
    fn random_play_keeps_invariants(
        seed in any::<u64>(),
        shadow in any::<bool>(),
        level in 1u32..=9,
        show_next in any::<bool>(),
        steps in prop::collection::vec(step(), 1..400),
    ) {
        let scoring = ClassicScoring { level, show_next, dotted_lines: false };
        let mut engine = Engine::new(scoring, EngineOptions { shadow, seed: Some(seed) });
        assert_piece_drawn(&engine);
        // Blocks that stay behind once the active piece and shadow are lifted
        let mut locked = 0usize;
        prop_assert_eq!(engine.board().occupied_interior(), active_cells(&engine).len());

        for step in steps {
            let score = engine.score();
            let lines = engine.status().dropped_lines;
            let draws = engine.draw_index();
            let cells = engine.piece_cells();

            match step {
                Step::Act(action) => engine.apply(action),
                Step::Tick => match engine.evaluate() {
                    Evaluation::Falling => {
                        prop_assert_eq!(engine.draw_index(), draws);
                    }
                    Evaluation::Locked => {
                        prop_assert_eq!(engine.draw_index(), draws + 1);
                        prop_assert!(engine.status().current_dropped_lines <= 4);
                        prop_assert_eq!(engine.status().moves, 0);
                        prop_assert_eq!(engine.status().rotations, 0);
                        prop_assert!(engine.score() > score);
                        // Row 0 is wiped on every lock; full rows take PLAY_WIDTH cells each
                        let kept = cells.iter().filter(|&&(_, y)| y >= FIRST_VISIBLE_ROW as i32);
                        let cleared = (engine.status().dropped_lines - lines) as usize;
                        locked = locked + kept.count() - cleared * PLAY_WIDTH;
                    }
                    Evaluation::GameOver => {
                        prop_assert!(engine.is_game_over());
                        break;
                    }
                },
            }

            prop_assert!(engine.board().walls_intact());
            prop_assert!(engine.score() >= score);
            prop_assert!(engine.status().dropped_lines >= lines);
            assert_piece_drawn(&engine);
            prop_assert_eq!(
                engine.board().occupied_interior(),
                locked + active_cells(&engine).len()
            );
            if let Some(shadow) = engine.shadow_cells() {
                for (x, y) in shadow {
                    prop_assert!(engine.board().get(x, y).is_some_and(|c| c.is_filled()));
                }
            }
        }
    }

    #[test]
    fn every_aligned_bag_cycle_is_a_permutation(seed in any::<u64>(), cycles in 1usize..30) {
        let mut bag = Bag::with_seed(seed);
        let mut pieces = vec![bag.current()];
        for _ in 1..cycles * NUM_SHAPES {
            let expected = bag.peek();
            let dealt = bag.advance();
            prop_assert_eq!(dealt, expected);
            pieces.push(dealt);
        }
        for cycle in pieces.chunks(NUM_SHAPES) {
            let unique: HashSet<_> = cycle.iter().collect();
            prop_assert_eq!(unique.len(), NUM_SHAPES);
        }
    }

    #[test]
    fn rotation_is_periodic(id in 0usize..NUM_SHAPES, turns in 0usize..40) {
        let kind = ShapeKind::from_id(id).expect("valid id");
        let period = match kind.rotation_class() {
            RotationClass::Fixed => 1,
            RotationClass::AlternateCcwFirst | RotationClass::AlternateCwFirst => 2,
            RotationClass::CounterClockwise => 4,
        };
        let turn = |times: usize| {
            let mut shape = kind.template();
            for _ in 0..times {
                shape = shape.rotated();
            }
            shape
        };
        prop_assert_eq!(turn(turns), turn(turns % period));
    }

    #[test]
    fn clearing_removes_full_rows_and_keeps_the_rest_in_order(
        rows in prop::collection::vec(
            prop::collection::vec(any::<bool>(), PLAY_WIDTH),
            LAST_PLAY_ROW - FIRST_VISIBLE_ROW + 1,
        ),
        full in prop::collection::vec(any::<bool>(), LAST_PLAY_ROW - FIRST_VISIBLE_ROW + 1),
    ) {
        let mut board = Board::new();
        let mut kept = Vec::new();
        for (i, (pattern, &is_full)) in rows.iter().zip(&full).enumerate() {
            let y = FIRST_VISIBLE_ROW + i;
            let mut row = Vec::new();
            let mut filled = 0;
            for (j, &on) in pattern.iter().enumerate() {
                let on = on || is_full;
                if on {
                    let x = (FIRST_PLAY_COL + j) as i32;
                    board.set(x, y as i32, Cell::Filled(BlockColor::Green));
                    filled += 1;
                }
                row.push(on);
            }
            if filled < pattern.len() {
                kept.push(row);
            }
        }
        let expected_cleared = rows.len() - kept.len();

        prop_assert_eq!(board.clear_lines(), expected_cleared);
        prop_assert!(board.walls_intact());

        // Surviving rows sit at the bottom in their old order, empty rows above
        let bottom_up: Vec<Vec<bool>> = (FIRST_VISIBLE_ROW..=LAST_PLAY_ROW)
            .rev()
            .map(|y| {
                (FIRST_PLAY_COL..=LAST_PLAY_COL)
                    .map(|x| board.get(x as i32, y as i32).is_some_and(|c| c.is_filled()))
                    .collect()
            })
            .collect();
        let kept_bottom_up: Vec<Vec<bool>> = kept.into_iter().rev().collect();
        prop_assert_eq!(&bottom_up[..kept_bottom_up.len()], &kept_bottom_up[..]);
        for row in &bottom_up[kept_bottom_up.len()..] {
            prop_assert!(row.iter().all(|&on| !on));
        }
    }
}
