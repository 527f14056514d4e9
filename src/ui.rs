//! Terminal UI rendering with ratatui

use crate::game::GameEngine;
use crate::settings::{KeyNames, VisualSettings};
use crate::snapshot::{GameStatus, Snapshot, SnapshotCell};
use crate::tetromino::{ColorTag, PieceKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";

/// Hold box width
const HOLD_WIDTH: u16 = 12;
/// Next box + stats width
const SIDE_WIDTH: u16 = 18;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct GameView {
    pub snapshot: Snapshot,
    pub status: GameStatus,
    /// Best score so far, including the current game
    pub highscore: u64,
}

impl GameView {
    pub fn capture(engine: &GameEngine, highscore: u64) -> Self {
        let status = engine.game_state();
        Self {
            snapshot: engine.snapshot(),
            highscore: highscore.max(status.score),
            status,
        }
    }
}

/// Something that can draw a [`GameView`]
pub trait Renderer {
    fn render(&mut self, view: &GameView) -> anyhow::Result<()>;
}

/// Key hints for the pause and game-over overlays, built from the
/// configured bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayHints {
    pub paused: String,
    pub game_over: String,
}

impl OverlayHints {
    pub fn from_keys(keys: &KeyNames) -> Self {
        Self {
            paused: join_hints(&[(&keys.pause, "resume"), (&keys.restart, "restart")]),
            game_over: join_hints(&[(&keys.restart, "restart"), (&keys.quit, "quit")]),
        }
    }
}

impl Default for OverlayHints {
    fn default() -> Self {
        Self::from_keys(&KeyNames::default())
    }
}

/// First bound name per action; actions with no binding are left out
fn join_hints(actions: &[(&Vec<String>, &str)]) -> String {
    actions
        .iter()
        .filter_map(|(names, action)| {
            names
                .first()
                .map(|name| format!("{} {}", key_label(name), action))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Single letters are shown in capitals, named keys as written
fn key_label(name: &str) -> String {
    if name.chars().count() == 1 {
        name.to_uppercase()
    } else {
        name.to_string()
    }
}

/// Draws to a ratatui terminal
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    visual: VisualSettings,
    hints: OverlayHints,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>, visual: VisualSettings) -> Self {
        Self {
            terminal,
            visual,
            hints: OverlayHints::default(),
        }
    }

    /// Show overlay hints for these bindings instead of the defaults
    pub fn with_keys(mut self, keys: &KeyNames) -> Self {
        self.hints = OverlayHints::from_keys(keys);
        self
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> Renderer for TerminalRenderer<B> {
    fn render(&mut self, view: &GameView) -> anyhow::Result<()> {
        let (visual, hints) = (&self.visual, &self.hints);
        self.terminal
            .draw(|frame| render_game(frame, view, visual, hints))?;
        Ok(())
    }
}

/// Map a piece color tag to a terminal color
pub fn tag_color(tag: ColorTag) -> Color {
    match tag {
        ColorTag::Cyan => Color::Cyan,
        ColorTag::Yellow => Color::Yellow,
        ColorTag::Purple => Color::Magenta,
        ColorTag::Green => Color::Green,
        ColorTag::Red => Color::Red,
        ColorTag::Blue => Color::Blue,
        ColorTag::Orange => Color::Rgb(255, 165, 0),
    }
}

fn kind_color(kind: PieceKind) -> Color {
    tag_color(kind.color())
}

/// Render the entire game UI
pub fn render_game(
    frame: &mut Frame,
    view: &GameView,
    visual: &VisualSettings,
    hints: &OverlayHints,
) {
    let area = frame.area();
    let (block_char, _) = visual.block_chars();

    let board_width = view.snapshot.width() as u16 * 2 + 2;
    let board_height = view.snapshot.height() as u16 + 2;
    let game_area = center_rect(area, HOLD_WIDTH + board_width + SIDE_WIDTH, board_height);

    // hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(HOLD_WIDTH),
            Constraint::Length(board_width),
            Constraint::Length(SIDE_WIDTH),
        ])
        .split(game_area);

    render_hold(frame, main_layout[0], &view.status, block_char);
    render_board(frame, main_layout[1], &view.snapshot, visual);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Next piece
            Constraint::Min(10),   // Stats
        ])
        .split(main_layout[2]);

    render_next(frame, right_layout[0], view.status.next, block_char);
    render_stats(frame, right_layout[1], view);

    if view.status.is_over {
        render_overlay(frame, area, "GAME OVER", &hints.game_over);
    } else if view.status.is_paused {
        render_overlay(frame, area, "PAUSED", &hints.paused);
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

/// Render the hold piece box; dimmed once hold has been used
fn render_hold(frame: &mut Frame, area: Rect, status: &GameStatus, block_char: &str) {
    let border = if status.hold_available {
        Color::Gray
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" HOLD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(kind) = status.held {
        render_mini_piece(frame, inner, kind, block_char, !status.hold_available);
    }
}

fn render_next(frame: &mut Frame, area: Rect, next: PieceKind, block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    render_mini_piece(frame, inner, next, block_char, false);
}

/// Render a small piece preview (for hold and next)
fn render_mini_piece(frame: &mut Frame, area: Rect, kind: PieceKind, block_char: &str, dim: bool) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let offsets = kind.offsets();
    let min_row = offsets.iter().map(|(r, _)| *r).min().unwrap_or(0);
    let mut style = Style::default().fg(kind_color(kind));
    if dim {
        style = style.dim();
    }

    // Every shape fits in 2 rows x 4 columns at spawn orientation
    let lines: Vec<Line> = (0..2)
        .map(|row| {
            let spans: Vec<Span> = (0..kind.size())
                .map(|col| {
                    if offsets.contains(&(min_row + row, col)) {
                        Span::styled(block_char, style)
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot, visual: &VisualSettings) {
    let (block_char, ghost_char) = visual.block_chars();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = snapshot
        .rows()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| {
                    let Some(kind) = cell.kind() else {
                        return Span::raw(EMPTY);
                    };
                    let style = Style::default().fg(kind_color(kind));
                    if matches!(cell, SnapshotCell::Ghost(_)) {
                        Span::styled(ghost_char, style.dim())
                    } else {
                        Span::styled(block_char, style)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, view: &GameView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status = &view.status;
    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let mut lines = vec![
        label("SCORE"),
        Line::from(Span::styled(
            status.score.to_string(),
            Style::default().fg(Color::Yellow).bold(),
        )),
        label("HIGHSCORE"),
        Line::from(Span::styled(
            view.highscore.to_string(),
            Style::default().fg(Color::White),
        )),
        label("LEVEL"),
        Line::from(Span::styled(
            status.level.to_string(),
            Style::default().fg(Color::Cyan),
        )),
        label("LINES"),
        Line::from(Span::styled(
            status.lines_cleared.to_string(),
            Style::default().fg(Color::Green),
        )),
    ];

    if let Some(message) = status.message {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            message,
            Style::default().fg(Color::Magenta).bold(),
        ));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let width = (subtitle.chars().count() as u16 + 4).max(24);
    let popup_area = center_rect(area, width, 5);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
