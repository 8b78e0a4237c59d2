//! TINT - TINT Is Not Tetris
//!
//! Terminal front end: options and settings, the level prompt, the game loop
//! and the high-score table.

use anyhow::{Context, bail};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, BufRead, Write, stdout},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};
use tint::{
    cli::{self, Options},
    highscore::{self, ScoreTable},
    input::KeyBindings,
    level::Level,
    session::{Finish, GravityTimer, Response, Session, SessionOptions},
    settings::Settings,
    ui,
};

/// Get the tint temp directory, creating it if needed
fn tint_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("tint");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> anyhow::Result<ExitCode> {
    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Setup tracing to log file
    let session_id: u32 = rand::random();
    let log_dir = tint_temp_dir();
    let log_file = format!("{session_id:08x}.log");
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("tint=debug".parse()?),
        )
        .with_ansi(false)
        .init();
    tracing::info!(
        "TINT starting up, session={session_id:08x}, log={}",
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();
    options.apply(&mut settings);

    let level = match settings.game.level.and_then(Level::new) {
        Some(level) => level,
        None => choose_level()?,
    };
    let mut session = Session::new(SessionOptions {
        level,
        show_next: settings.game.show_next,
        dotted_lines: settings.game.dotted_lines,
        shadow: settings.game.shadow,
        seed: None,
    });
    let keys = KeyBindings::from_settings(&settings);

    // Setup terminal
    let result = enable_raw_mode()
        .context("enabling raw mode")
        .and_then(|()| {
            execute!(stdout(), EnterAlternateScreen).context("entering alternate screen")
        })
        .and_then(|()| {
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
            terminal.clear()?;
            run_game(&mut terminal, &mut session, &keys, settings.visual.block_char)
                .context("running the game")
        });

    // Restore terminal, both steps even if one fails
    let raw = disable_raw_mode().context("disabling raw mode");
    let screen = execute!(stdout(), LeaveAlternateScreen).context("leaving alternate screen");
    result?;
    raw?;
    screen?;

    // Don't bother the player if they quit
    if session.finish() == Some(Finish::Quit) {
        return Ok(ExitCode::SUCCESS);
    }
    eprint!("{}", ui::player_stats(&session));
    match settings.score_file() {
        Some(path) => save_score(&path, &session)?,
        None => tracing::warn!("no data directory, score not saved"),
    }

    Ok(ExitCode::SUCCESS)
}

/// Play until the game ends or the player quits
fn run_game(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
    keys: &KeyBindings,
    block_char: char,
) -> io::Result<()> {
    let mut timer = GravityTimer::new(session.delay(), Instant::now());

    while session.finish().is_none() {
        terminal.draw(|frame| ui::render_game(frame, session, block_char))?;

        let now = Instant::now();
        if timer.expired(now) {
            session.tick();
            timer.set_delay(session.delay(), now);
            continue;
        }

        if !event::poll(timer.remaining(now))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let command = keys.command(key);
        tracing::trace!(?command, "key pressed");
        match session.handle(command) {
            Response::Accepted => {}
            Response::Beep => execute!(terminal.backend_mut(), Print('\x07'))?,
            Response::Resumed => timer.restart(Instant::now()),
        }
        timer.set_delay(session.delay(), Instant::now());
    }

    tracing::info!(
        finish = ?session.finish(),
        score = session.score(),
        lines = session.dropped_lines(),
        pieces = session.piece_sum(),
        "session ended"
    );
    Ok(())
}

/// Read one line from stdin; `None` at end of input
fn read_line() -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading from stdin")?;
    Ok((read > 0).then_some(line))
}

/// Ask for a starting level until a valid one is given
fn choose_level() -> anyhow::Result<Level> {
    loop {
        eprint!(
            "Choose a level to start [{}-{}]: ",
            Level::MIN,
            Level::MAX
        );
        io::stderr().flush()?;
        let Some(line) = read_line()? else {
            bail!("no level given");
        };
        if let Some(level) = cli::parse_level(&line) {
            return Ok(level);
        }
    }
}

/// Login name of the player, if the environment knows it
fn login_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_default()
}

/// Ask the player for a name, defaulting to the login name
fn ask_name() -> String {
    let login = login_name();
    eprintln!("Congratulations! You have a new high score.");
    eprint!("Enter your name [{login}]: ");
    let _ = io::stderr().flush();
    let typed = match read_line() {
        Ok(Some(line)) => line.trim_end_matches(['\r', '\n']).to_string(),
        _ => String::new(),
    };
    if typed.is_empty() { login } else { typed }
}

/// Merge this game into the high-score file and print the table
fn save_score(path: &std::path::Path, session: &Session) -> anyhow::Result<()> {
    let score = i32::try_from(session.score()).unwrap_or(i32::MAX);
    let existing = ScoreTable::load(path)
        .with_context(|| format!("reading score file {}", path.display()))?;
    let Some((table, rank)) = highscore::record(existing, score, highscore::now(), ask_name)
    else {
        return Ok(());
    };
    table
        .save(path)
        .with_context(|| format!("writing score file {}", path.display()))?;
    eprint!("{}", table.format(rank));
    Ok(())
}
