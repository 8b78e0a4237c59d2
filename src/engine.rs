//! Core game state and logic
//!
//! The [`Engine`] is a turn-based state machine. The host applies at most one
//! [`Action`] per tick and calls [`Engine::evaluate`] whenever the tick passes
//! without input (and right after every hard drop). Evaluation either lets the
//! piece fall one row or locks it, clears lines, scores, and deals the next
//! piece from the bag.

use crate::bag::Bag;
use crate::board::Board;
use crate::piece::Piece;
use crate::score::{Score, ScoringStrategy, Status};
use crate::tetromino::{BlockColor, NUM_BLOCKS, ShapeKind};

/// Input actions the engine can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    Down,
    HardDrop,
}

/// Result of one [`Engine::evaluate`] step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The piece moved down one row
    Falling,
    /// The piece locked and the next one was released
    Locked,
    /// The next piece has no room to spawn
    GameOver,
}

/// Construction options
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Project and draw the landing shadow of the active piece
    pub shadow: bool,
    /// Bag seed; `None` draws one from OS entropy
    pub seed: Option<u64>,
}

/// The rules engine for one game
#[derive(Debug, Clone)]
pub struct Engine<S> {
    board: Board,
    piece: Piece,
    bag: Bag,
    score: Score,
    status: Status,
    scoring: S,
    shadow: bool,
    game_over: bool,
}

impl<S: ScoringStrategy> Engine<S> {
    /// Start a game: seed the bag, zero score and status, spawn the first piece
    pub fn new(scoring: S, options: EngineOptions) -> Self {
        let bag = match options.seed {
            Some(seed) => Bag::with_seed(seed),
            None => Bag::new(),
        };
        let mut board = Board::new();
        let mut piece = Piece::new(bag.current(), options.shadow);
        piece.place(&mut board);
        tracing::info!(
            first = ?piece.kind(),
            next = ?bag.peek(),
            shadow = options.shadow,
            "engine initialized"
        );

        Self {
            board,
            piece,
            bag,
            score: Score::new(),
            status: Status::default(),
            scoring,
            shadow: options.shadow,
            game_over: false,
        }
    }

    /// Perform an action on the active piece. Blocked moves are ignored.
    pub fn apply(&mut self, action: Action) {
        if self.game_over {
            return;
        }
        let board = &mut self.board;
        match action {
            Action::MoveLeft => {
                if self.piece.move_left(board) {
                    self.status.moves += 1;
                }
            }
            Action::MoveRight => {
                if self.piece.move_right(board) {
                    self.status.moves += 1;
                }
            }
            Action::Down => {
                if self.piece.move_down(board) {
                    self.status.moves += 1;
                }
            }
            Action::Rotate => {
                if self.piece.rotate(board) {
                    self.status.rotations += 1;
                }
            }
            Action::HardDrop => {
                self.status.drop_count += self.piece.hard_drop(board);
            }
        }
    }

    /// Advance the state machine by one step
    pub fn evaluate(&mut self) -> Evaluation {
        if self.game_over {
            return Evaluation::GameOver;
        }
        if !self.piece.is_resting(&mut self.board) {
            self.piece.move_down(&mut self.board);
            return Evaluation::Falling;
        }
        self.lock_piece()
    }

    /// Lock the resting piece and release the next one
    fn lock_piece(&mut self) -> Evaluation {
        let lines = self.board.clear_lines() as u32;
        self.status.dropped_lines += lines;
        self.status.current_dropped_lines = lines;

        let before = self.score;
        self.scoring.on_lock(&self.status, &mut self.score);
        debug_assert!(self.score >= before, "score decreased");

        self.status.update_efficiency(self.piece.anchor.x);
        tracing::debug!(
            piece = ?self.piece.kind(),
            lines,
            total_lines = self.status.dropped_lines,
            award = self.score.scaled() - before.scaled(),
            efficiency = self.status.efficiency,
            "piece locked"
        );
        self.status.reset_piece();

        let kind = self.bag.advance();
        let next = Piece::new(kind, self.shadow);
        if !next.fits(&self.board) {
            self.game_over = true;
            tracing::info!(
                piece = ?kind,
                score = self.score.points(),
                lines = self.status.dropped_lines,
                "game over"
            );
            return Evaluation::GameOver;
        }
        self.piece = next;
        self.piece.place(&mut self.board);
        tracing::trace!(piece = ?kind, next = ?self.bag.peek(), "piece spawned");
        Evaluation::Locked
    }

    /// The board, active piece and shadow included
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn current_kind(&self) -> ShapeKind {
        self.piece.kind()
    }

    pub fn next_kind(&self) -> ShapeKind {
        self.bag.peek()
    }

    pub fn next_color(&self) -> BlockColor {
        self.bag.peek().color()
    }

    /// Cells of the active piece. After game over, the last piece to lock.
    pub fn piece_cells(&self) -> [(i32, i32); NUM_BLOCKS] {
        self.piece.cells()
    }

    /// Cells of the shadow, when shadow mode is on
    pub fn shadow_cells(&self) -> Option<[(i32, i32); NUM_BLOCKS]> {
        self.piece.shadow_cells()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Draw number of the active piece
    pub fn draw_index(&self) -> usize {
        self.bag.index()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    /// Mutable access to the strategy, so the host can update level and assists
    pub fn scoring_mut(&mut self) -> &mut S {
        &mut self.scoring
    }
}
