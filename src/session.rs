//! One game as the player sees it
//!
//! A [`Session`] drives the engine on behalf of the terminal host. It owns the
//! level, the per-family tally shown in the statistics panel, the display
//! assists and the pause state, and turns key commands and gravity ticks into
//! engine calls.

use std::time::{Duration, Instant};

use crate::engine::{Action, Engine, EngineOptions, Evaluation};
use crate::level::Level;
use crate::score::ClassicScoring;
use crate::tetromino::{NUM_SHAPES, ShapeKind};

/// A player command, already resolved from key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play(Action),
    /// Hard drop and lock right away, without waiting for the next tick
    DropAndEvaluate,
    ShowNext,
    ToggleDottedLines,
    SpeedUp,
    Pause,
    Quit,
    Unknown,
}

/// How the host should acknowledge a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Accepted,
    /// Ring the terminal bell
    Beep,
    /// The command only ended the pause
    Resumed,
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Quit,
    GameOver,
}

/// Session start options
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub level: Level,
    pub show_next: bool,
    pub dotted_lines: bool,
    pub shadow: bool,
    pub seed: Option<u64>,
}

/// A game in progress
#[derive(Debug, Clone)]
pub struct Session {
    engine: Engine<ClassicScoring>,
    level: Level,
    /// Pieces dealt per family, the active one included
    tally: [u32; NUM_SHAPES],
    paused: bool,
    finish: Option<Finish>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let scoring = ClassicScoring {
            level: options.level.get(),
            show_next: options.show_next,
            dotted_lines: options.dotted_lines,
        };
        let engine = Engine::new(
            scoring,
            EngineOptions {
                shadow: options.shadow,
                seed: options.seed,
            },
        );
        let mut tally = [0; NUM_SHAPES];
        tally[engine.current_kind().id()] += 1;
        tracing::info!(
            level = options.level.get(),
            show_next = options.show_next,
            dotted_lines = options.dotted_lines,
            shadow = options.shadow,
            "session started"
        );

        Self {
            engine,
            level: options.level,
            tally,
            paused: false,
            finish: None,
        }
    }

    /// Handle one command from the player
    pub fn handle(&mut self, command: Command) -> Response {
        if self.finish.is_some() {
            return Response::Accepted;
        }
        if self.paused {
            self.paused = false;
            tracing::debug!("resumed");
            return Response::Resumed;
        }

        match command {
            Command::Play(action) => self.engine.apply(action),
            Command::DropAndEvaluate => {
                self.engine.apply(Action::HardDrop);
                self.step();
            }
            Command::ShowNext => self.engine.scoring_mut().show_next = true,
            Command::ToggleDottedLines => {
                let scoring = self.engine.scoring_mut();
                scoring.dotted_lines = !scoring.dotted_lines;
            }
            Command::SpeedUp => {
                if !self.level.speed_up() {
                    return Response::Beep;
                }
                self.sync_level();
            }
            Command::Pause => {
                self.paused = true;
                tracing::debug!("paused");
            }
            Command::Quit => {
                self.finish = Some(Finish::Quit);
                tracing::info!(score = self.engine.score().points(), "player quit");
            }
            Command::Unknown => return Response::Beep,
        }
        Response::Accepted
    }

    /// Gravity step: the tick passed without a key press
    pub fn tick(&mut self) -> Option<Evaluation> {
        if self.paused || self.finish.is_some() {
            return None;
        }
        Some(self.step())
    }

    fn step(&mut self) -> Evaluation {
        let evaluation = self.engine.evaluate();
        match evaluation {
            Evaluation::Falling => {}
            Evaluation::Locked => {
                self.tally[self.engine.current_kind().id()] += 1;
                self.maybe_level_up();
            }
            Evaluation::GameOver => {
                self.maybe_level_up();
                self.finish = Some(Finish::GameOver);
            }
        }
        evaluation
    }

    fn maybe_level_up(&mut self) {
        if self.level.maybe_advance(self.engine.status().dropped_lines) {
            tracing::info!(level = self.level.get(), "level up");
            self.sync_level();
        }
    }

    fn sync_level(&mut self) {
        self.engine.scoring_mut().level = self.level.get();
    }

    pub fn engine(&self) -> &Engine<ClassicScoring> {
        &self.engine
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Current gravity delay
    pub fn delay(&self) -> Duration {
        self.level.delay()
    }

    pub fn show_next(&self) -> bool {
        self.engine.scoring().show_next
    }

    pub fn dotted_lines(&self) -> bool {
        self.engine.scoring().dotted_lines
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn finish(&self) -> Option<Finish> {
        self.finish
    }

    /// Pieces dealt of one family
    pub fn tally(&self, kind: ShapeKind) -> u32 {
        self.tally[kind.id()]
    }

    /// Pieces dealt in total
    pub fn piece_sum(&self) -> u32 {
        self.tally.iter().sum()
    }

    /// Displayed score
    pub fn score(&self) -> u64 {
        self.engine.score().points()
    }

    /// Score per piece dealt
    pub fn score_ratio(&self) -> u64 {
        self.score() / u64::from(self.piece_sum().max(1))
    }

    pub fn efficiency(&self) -> i32 {
        self.engine.status().efficiency
    }

    pub fn dropped_lines(&self) -> u32 {
        self.engine.status().dropped_lines
    }
}

/// Deadline for the next gravity step.
///
/// Key presses do not move the deadline, so gravity keeps its pace while the
/// player is busy.
#[derive(Debug, Clone, Copy)]
pub struct GravityTimer {
    delay: Duration,
    deadline: Instant,
}

impl GravityTimer {
    pub fn new(delay: Duration, now: Instant) -> Self {
        Self {
            delay,
            deadline: now + delay,
        }
    }

    /// Time left before the next step, for polling
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Check the deadline. When it has passed, restart it and return true.
    pub fn expired(&mut self, now: Instant) -> bool {
        if now < self.deadline {
            return false;
        }
        self.deadline = now + self.delay;
        true
    }

    /// Switch to a new delay, restarting the countdown if it changed
    pub fn set_delay(&mut self, delay: Duration, now: Instant) {
        if delay != self.delay {
            self.delay = delay;
            self.deadline = now + delay;
        }
    }

    /// Restart the countdown from `now`
    pub fn restart(&mut self, now: Instant) {
        self.deadline = now + self.delay;
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(level: u32) -> Session {
        Session::new(SessionOptions {
            level: Level::new(level).expect("valid level"),
            seed: Some(77),
            ..SessionOptions::default()
        })
    }

    fn drop_until_finished(session: &mut Session) {
        for _ in 0..500 {
            session.handle(Command::DropAndEvaluate);
            if session.finish().is_some() {
                return;
            }
        }
        panic!("game never ended");
    }

    #[test]
    fn test_first_piece_is_tallied() {
        let session = session(1);
        assert_eq!(session.piece_sum(), 1);
        assert_eq!(session.tally(session.engine().current_kind()), 1);
    }

    #[test]
    fn test_each_lock_tallies_the_new_piece() {
        let mut session = session(1);
        for expected in 2..=6 {
            session.handle(Command::DropAndEvaluate);
            assert_eq!(session.piece_sum(), expected);
        }
        let total: u32 = ShapeKind::all().iter().map(|&k| session.tally(k)).sum();
        assert_eq!(total, session.piece_sum());
    }

    #[test]
    fn test_tick_moves_piece_down() {
        let mut session = session(1);
        let y = session.engine().piece().anchor.y;
        assert_eq!(session.tick(), Some(Evaluation::Falling));
        assert_eq!(session.engine().piece().anchor.y, y + 1);
    }

    #[test]
    fn test_pause_swallows_next_command() {
        let mut session = session(1);
        assert_eq!(session.handle(Command::Pause), Response::Accepted);
        assert!(session.is_paused());
        assert_eq!(session.tick(), None);

        let x = session.engine().piece().anchor.x;
        assert_eq!(session.handle(Command::Play(Action::MoveLeft)), Response::Resumed);
        assert!(!session.is_paused());
        assert_eq!(session.engine().piece().anchor.x, x);
    }

    #[test]
    fn test_show_next_only_turns_on() {
        let mut session = session(1);
        assert!(!session.show_next());
        session.handle(Command::ShowNext);
        session.handle(Command::ShowNext);
        assert!(session.show_next());
    }

    #[test]
    fn test_dotted_lines_toggle() {
        let mut session = session(1);
        session.handle(Command::ToggleDottedLines);
        assert!(session.dotted_lines());
        session.handle(Command::ToggleDottedLines);
        assert!(!session.dotted_lines());
    }

    #[test]
    fn test_speed_up_and_beep_at_max() {
        let mut session = session(8);
        assert_eq!(session.handle(Command::SpeedUp), Response::Accepted);
        assert_eq!(session.level().get(), 9);
        assert_eq!(session.engine().scoring().level, 9);
        assert_eq!(session.handle(Command::SpeedUp), Response::Beep);
        assert_eq!(session.handle(Command::Unknown), Response::Beep);
    }

    #[test]
    fn test_quit() {
        let mut session = session(1);
        session.handle(Command::Quit);
        assert_eq!(session.finish(), Some(Finish::Quit));
        assert_eq!(session.tick(), None);
    }

    #[test]
    fn test_game_over_finishes_session() {
        let mut session = session(1);
        drop_until_finished(&mut session);
        assert_eq!(session.finish(), Some(Finish::GameOver));
        assert!(session.engine().is_game_over());
        assert!(session.score() > 0);
        assert_eq!(session.score_ratio(), session.score() / session.piece_sum() as u64);
    }

    #[test]
    fn test_timer_expiry_restarts_deadline() {
        let start = Instant::now();
        let mut timer = GravityTimer::new(Duration::from_millis(300), start);
        assert_eq!(timer.remaining(start), Duration::from_millis(300));
        assert!(!timer.expired(start + Duration::from_millis(100)));
        assert_eq!(
            timer.remaining(start + Duration::from_millis(100)),
            Duration::from_millis(200)
        );

        let late = start + Duration::from_millis(350);
        assert!(timer.expired(late));
        assert_eq!(timer.remaining(late), Duration::from_millis(300));
        assert_eq!(timer.remaining(late + Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn test_timer_delay_change() {
        let start = Instant::now();
        let mut timer = GravityTimer::new(Level::default().delay(), start);
        let later = start + Duration::from_millis(50);
        timer.set_delay(Duration::from_millis(100), later);
        assert_eq!(timer.delay(), Duration::from_millis(100));
        assert_eq!(timer.remaining(later), Duration::from_millis(100));
    }
}
