//! Terminal UI rendering with ratatui

use crate::board::{COLS, Cell, FIRST_VISIBLE_ROW, ROWS};
use crate::session::Session;
use crate::tetromino::{BlockColor, NUM_BLOCKS, ShapeKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

const EMPTY: &str = "  ";
const DOT: &str = ". ";
const WALL: &str = "<>";

/// Board columns drawn: the left wall, the play field and the first right wall
const VISIBLE_COLS: usize = COLS - 1;
/// Board rows drawn: everything below the spawn row down to the first floor row
const VISIBLE_ROWS: usize = ROWS - 1 - FIRST_VISIBLE_ROW;

const LEFT_WIDTH: u16 = 18;
const BOARD_WIDTH: u16 = VISIBLE_COLS as u16 * 2;
const RIGHT_WIDTH: u16 = 26;
const GAME_WIDTH: u16 = LEFT_WIDTH + 2 + BOARD_WIDTH + 2 + RIGHT_WIDTH;
/// Board plus the pause line
const GAME_HEIGHT: u16 = VISIBLE_ROWS as u16 + 2;

pub const PAUSE_TEXT: &str = "Paused - Press any key to continue";

/// Order of families in the statistics panel
const STATS_ORDER: [ShapeKind; 7] = [
    ShapeKind::L,
    ShapeKind::I,
    ShapeKind::J,
    ShapeKind::S,
    ShapeKind::Z,
    ShapeKind::O,
    ShapeKind::T,
];

const HELP: [&str; 9] = [
    "p: Pause",
    "j: Left",
    "l: Right",
    "k: Rotate",
    "s: Draw next",
    "d: Toggle lines",
    "a: Speed up",
    "q: Quit",
    " SPACE: Drop",
];

fn color(color: BlockColor) -> Color {
    match color {
        BlockColor::Red => Color::Red,
        BlockColor::Green => Color::Green,
        BlockColor::Yellow => Color::Yellow,
        BlockColor::Blue => Color::Blue,
        BlockColor::Magenta => Color::Magenta,
        BlockColor::Cyan => Color::Cyan,
        BlockColor::White => Color::White,
    }
}

fn block_style(block: BlockColor) -> Style {
    Style::default().fg(Color::Black).bg(color(block))
}

/// Render one frame of the game
pub fn render_game(frame: &mut Frame, session: &Session, block_char: char) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(VISIBLE_ROWS as u16),
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Pause line
        ])
        .split(game_area);

    // Status | board | statistics
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(LEFT_WIDTH),
            Constraint::Length(2),
            Constraint::Length(BOARD_WIDTH),
            Constraint::Length(2),
            Constraint::Length(RIGHT_WIDTH),
        ])
        .split(rows[0]);

    frame.render_widget(Paragraph::new(status_lines(session, block_char)), columns[0]);
    frame.render_widget(Paragraph::new(board_lines(session, block_char)), columns[2]);
    frame.render_widget(Paragraph::new(statistics_lines(session, block_char)), columns[4]);

    if session.is_paused() {
        let pause = Paragraph::new(Line::styled(PAUSE_TEXT, Style::default().fg(Color::White)))
            .alignment(Alignment::Center);
        frame.render_widget(pause, rows[2]);
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// The visible board, two characters per cell
pub fn board_lines(session: &Session, block_char: char) -> Vec<Line<'static>> {
    let engine = session.engine();
    let board = engine.board();
    let piece = engine.piece_cells();
    let shadow = engine.shadow_cells();
    let block_text: String = [block_char; 2].iter().collect();

    let is_shadow = |x: i32, y: i32| {
        shadow.is_some_and(|cells| cells.contains(&(x, y))) && !piece.contains(&(x, y))
    };

    board
        .rows()
        .skip(FIRST_VISIBLE_ROW)
        .take(VISIBLE_ROWS)
        .map(|(y, row)| {
            let spans: Vec<Span> = row[..VISIBLE_COLS]
                .iter()
                .enumerate()
                .map(|(x, cell)| match cell {
                    Cell::Wall => Span::styled(WALL, Style::default().fg(Color::Blue).bold()),
                    Cell::Empty if session.dotted_lines() => {
                        Span::styled(DOT, Style::default().fg(Color::Blue))
                    }
                    Cell::Empty => Span::raw(EMPTY),
                    Cell::Filled(block) => {
                        let mut style = block_style(*block);
                        if is_shadow(x as i32, y as i32) {
                            style = style.add_modifier(Modifier::DIM);
                        }
                        Span::styled(block_text.clone(), style)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Level, lines, score, help and the next piece
fn status_lines(session: &Session, block_char: char) -> Vec<Line<'static>> {
    let white = Style::default().fg(Color::White);
    let mut lines = vec![
        Line::raw(""),
        Line::styled(format!("Your level: {}", session.level().get()), white),
        Line::styled(format!("Full lines: {}", session.dropped_lines()), white),
        Line::raw(""),
        Line::from(vec![
            Span::styled(" Score", white),
            Span::styled(
                format!("  {}", session.score()),
                Style::default().fg(Color::Yellow).bold(),
            ),
        ]),
        Line::raw(""),
        Line::styled("   H E L P", white),
        Line::raw(""),
    ];
    lines.extend(HELP.iter().map(|text| Line::styled(*text, white)));
    lines.push(Line::raw(""));
    lines.push(Line::styled("  Next:", white));
    if session.show_next() {
        let next = session.engine().next_kind();
        lines.extend(
            mini_piece_lines(next, block_char)
                .into_iter()
                .map(|line| line.alignment(Alignment::Center)),
        );
    }
    lines
}

/// Per-family tally and derived statistics
fn statistics_lines(session: &Session, block_char: char) -> Vec<Line<'static>> {
    let white = Style::default().fg(Color::White);
    let mut lines = vec![Line::styled("      STATISTICS", white), Line::raw("")];

    for kind in STATS_ORDER {
        let [mut top, bottom] = mini_piece_lines(kind, block_char);
        top.push_span(Span::styled(
            format!("  - {:>6}", session.tally(kind)),
            Style::default().fg(color(kind.color())),
        ));
        lines.push(top);
        lines.push(bottom);
    }

    lines.push(Line::styled("-".repeat(RIGHT_WIDTH as usize), white));
    lines.push(stat_line("Sum", session.piece_sum().to_string()));
    lines.push(Line::raw(""));
    lines.push(stat_line("Score ratio", session.score_ratio().to_string()));
    lines.push(stat_line("Efficiency", session.efficiency().to_string()));
    lines
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::styled(
        format!("{label:<13}:{value:>12}"),
        Style::default().fg(Color::White),
    )
}

/// A family's spawn layout drawn in a 4x2 cell box
fn mini_piece_lines(kind: ShapeKind, block_char: char) -> [Line<'static>; 2] {
    let offsets = kind.offsets();
    let min_dx = offsets.iter().map(|o| o.dx).min().unwrap_or(0);
    let min_dy = offsets.iter().map(|o| o.dy).min().unwrap_or(0);
    let block_text: String = [block_char; 2].iter().collect();
    let filled: [(i32, i32); NUM_BLOCKS] = offsets.map(|o| (o.dx - min_dx, o.dy - min_dy));

    [0, 1].map(|row| {
        let spans: Vec<Span> = (0..4)
            .map(|col| {
                if filled.contains(&(col, row)) {
                    Span::styled(block_text.clone(), block_style(kind.color()))
                } else {
                    Span::raw(EMPTY)
                }
            })
            .collect();
        Line::from(spans)
    })
}

/// Statistics printed after the game
pub fn player_stats(session: &Session) -> String {
    format!(
        "\n\t   PLAYER STATISTICS\n\n\tScore       {:11}\n\tEfficiency  {:11}\n\tScore ratio {:11}\n",
        session.score(),
        session.efficiency(),
        session.score_ratio()
    )
}
