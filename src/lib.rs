//! TINT - TINT Is Not Tetris
//!
//! A falling-block puzzle engine with a terminal front end. The engine modules
//! (`tetromino`, `board`, `piece`, `bag`, `score`, `engine`) know nothing about
//! terminals or files; the rest of the crate is the host that plays them.

pub mod bag;
pub mod board;
pub mod cli;
pub mod engine;
pub mod highscore;
pub mod input;
pub mod level;
pub mod piece;
pub mod score;
pub mod session;
pub mod settings;
pub mod tetromino;
pub mod ui;

pub use engine::{Action, Engine, EngineOptions, Evaluation};
pub use score::{ClassicScoring, Score, ScoringStrategy, Status};
pub use tetromino::{BlockColor, ShapeKind};
