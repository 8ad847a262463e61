//! Layout and drawing: board, sidebar, legend, pause, game over, quit menu, achievement toast.

use crate::app::{QuitOption, Screen};
use crate::game::powerups::{BOMB_ROW_INTERVAL, MONSTER_MAX_CONSUMED};
use crate::game::{Achievement, GRID_COLS, GRID_ROWS, GameOverReason, GameState, Status};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::{Duration, Instant};
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each letter tile is drawn as ` X `.
const CELL_WIDTH: u16 = 3;
const BOARD_WIDTH: u16 = GRID_COLS as u16 * CELL_WIDTH + 2;
const BOARD_HEIGHT: u16 = GRID_ROWS as u16 + 2;
const LEGEND_HEIGHT: u16 = 7;
const SIDEBAR_WIDTH: u16 = 36;
const TOTAL_HEIGHT: u16 = BOARD_HEIGHT + LEGEND_HEIGHT;
const BOMB_FADE_MS: u32 = 600;
/// Rows this close to the loss edge are drawn in the danger colour.
const DANGER_ROWS: usize = 2;

/// Everything the renderer reads for one frame.
pub struct View<'a> {
    pub state: &'a GameState,
    pub theme: &'a Theme,
    pub screen: Screen,
    pub quit_selected: QuitOption,
    /// (row, col) of the keyboard cursor.
    pub cursor: (usize, usize),
    pub toast: Option<Achievement>,
    pub achievements_unlocked: usize,
}

/// Bomb flash effect and the time it was last advanced.
#[derive(Default)]
pub struct BombFlash {
    pub effect: Option<Effect>,
    pub last_frame: Option<Instant>,
}

impl BombFlash {
    pub fn reset(&mut self) {
        self.effect = None;
        self.last_frame = None;
    }

    pub fn done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

struct Areas {
    board: Rect,
    legend: Rect,
    sidebar: Rect,
}

/// Board on the left with the legend below it, sidebar on the right; centred in `area`.
fn areas(area: Rect) -> Areas {
    let total_w = BOARD_WIDTH + SIDEBAR_WIDTH;
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(TOTAL_HEIGHT),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BOARD_WIDTH), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(BOARD_HEIGHT), Constraint::Length(LEGEND_HEIGHT)])
        .split(columns[0]);
    Areas {
        board: left[0],
        legend: left[1],
        sidebar: columns[1],
    }
}

fn board_inner(board: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(board)
}

/// Grid (row, col) under terminal position (x, y), for mouse clicks.
pub fn cell_at(area: Rect, x: u16, y: u16) -> Option<(usize, usize)> {
    let inner = board_inner(areas(area).board);
    if !inner.contains(Position { x, y }) {
        return None;
    }
    let col = usize::from((x - inner.x) / CELL_WIDTH);
    let row = usize::from(y - inner.y);
    (row < GRID_ROWS && col < GRID_COLS).then_some((row, col))
}

/// Draw the game with whichever overlay the screen and status call for.
/// While the bomb's exploding flag is set (and animation is on) the board gets a fade flash.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    flash: &mut BombFlash,
    no_animation: bool,
    now: Instant,
) {
    let area = frame.area();
    let areas = areas(area);
    draw_board(frame, view, areas.board);
    draw_legend(frame, view.theme, areas.legend);
    draw_sidebar(frame, view, areas.sidebar);

    if view.state.bomb.exploding && !no_animation && !flash.done() {
        apply_bomb_flash(frame, view.theme, areas.board, flash, now);
    }

    match (view.screen, view.state.status) {
        (Screen::QuitMenu, _) => draw_quit_menu(frame, view.theme, view.quit_selected),
        (Screen::Playing, Status::Paused) => draw_pause_overlay(frame, view.theme, areas.board),
        (Screen::Playing, Status::GameOver) => draw_game_over(frame, view, areas.board),
        (Screen::Playing, Status::Playing) => {}
    }
    if let Some(achievement) = view.toast {
        draw_toast(frame, view.theme, achievement, area);
    }
}

fn apply_bomb_flash(
    frame: &mut Frame,
    theme: &Theme,
    board: Rect,
    flash: &mut BombFlash,
    now: Instant,
) {
    let delta = flash
        .last_frame
        .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
    let delta_ms = u32::try_from(delta.as_millis()).unwrap_or(u32::MAX);
    flash.last_frame = Some(now);
    let effect = flash.effect.get_or_insert_with(|| {
        fx::fade_from(theme.danger, theme.danger, (BOMB_FADE_MS, Interpolation::Linear))
            .with_area(board)
    });
    frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
}

fn cell_style(theme: &Theme) -> Style {
    Style::default().fg(theme.main_fg).bg(theme.cell_bg)
}

fn draw_board(frame: &mut Frame, view: &View, area: Rect) {
    let View { state, theme, .. } = *view;
    let title = format!(" Lexifall · {} ", state.language.label());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let mut slots = vec![None; GRID_ROWS * GRID_COLS];
    for cell in state.grid.cells() {
        if let Some(slot) = slots.get_mut(cell.row * GRID_COLS + cell.col) {
            *slot = Some(cell);
        }
    }
    let occupant = state.monster.occupant;

    for row in 0..GRID_ROWS {
        for col in 0..GRID_COLS {
            let x = inner.x + col as u16 * CELL_WIDTH;
            let y = inner.y + row as u16;
            if x + CELL_WIDTH > inner.right() || y >= inner.bottom() {
                continue;
            }
            let (text, mut style) = match slots[row * GRID_COLS + col] {
                None => ("   ".to_string(), Style::default().bg(theme.bg)),
                Some(cell) if Some(cell.id) == occupant => (
                    " @ ".to_string(),
                    Style::default()
                        .fg(theme.bg)
                        .bg(theme.monster)
                        .add_modifier(Modifier::BOLD),
                ),
                Some(cell) => {
                    let mut style = cell_style(theme);
                    if row <= DANGER_ROWS {
                        style = style.fg(theme.danger);
                    }
                    if cell.replaced {
                        style = style.fg(theme.replaced);
                    }
                    if state.hint_cells.contains(&cell.id) {
                        style = style.fg(theme.bg).bg(theme.hint);
                    }
                    if cell.selected {
                        style = style
                            .fg(theme.bg)
                            .bg(theme.selected)
                            .add_modifier(Modifier::BOLD);
                    }
                    (format!(" {} ", cell.glyph), style)
                }
            };
            if view.cursor == (row, col) && view.screen == Screen::Playing {
                style = style.add_modifier(Modifier::REVERSED);
            }
            frame.buffer_mut().set_string(x, y, text, style);
        }
    }
}

fn draw_legend(frame: &mut Frame, theme: &Theme, area: Rect) {
    let key = Style::default().fg(theme.title);
    let text = Style::default().fg(theme.inactive_fg);
    let entry = |k: &'static str, what: &'static str| {
        [Span::styled(k, key), Span::styled(what, text)]
    };
    let lines: Vec<Line> = [
        [entry("←↓↑→ hjkl", " move  "), entry("␣/⏎", " select")],
        [entry("⌫/c", " clear  "), entry("p", " pause  ")],
        [entry("b", " bomb  "), entry("x", " replace  ")],
        [entry("m", " monster  "), entry("?", " hint  ")],
        [entry("Tab", " language  "), entry("+/-", " speed  ")],
    ]
    .into_iter()
    .map(|pair| Line::from(pair.into_iter().flatten().collect::<Vec<_>>()))
    .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    Paragraph::new(Text::from(lines))
        .block(block)
        .render(area, frame.buffer_mut());
}

fn sidebar_block(theme: &Theme, title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let View { state, theme, .. } = *view;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let ready_style = Style::default().fg(theme.found).add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats
            Constraint::Length(5), // Power-ups
            Constraint::Length(9), // Targets
            Constraint::Min(3),    // Found words
        ])
        .split(area);

    // --- Stats ---
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let spelling = state.spelled_selection();
    let stats = vec![
        stat("Score:    ", state.score.to_string()),
        stat("Level:    ", state.level().to_string()),
        stat("Speed:    ", format!("{}s per row", state.tick_interval.as_secs_f64())),
        stat("Rows:     ", state.rows_spawned.to_string()),
        stat(
            "Spelling: ",
            if spelling.is_empty() { "-".to_string() } else { spelling },
        ),
    ];
    Paragraph::new(Text::from(stats))
        .block(sidebar_block(theme, " Stats ".to_string()))
        .render(chunks[0], frame.buffer_mut());

    // --- Power-ups ---
    let bomb = if state.bomb.ready {
        Span::styled("ready", ready_style)
    } else {
        let to_go = BOMB_ROW_INTERVAL - state.rows_spawned % BOMB_ROW_INTERVAL;
        Span::styled(format!("{to_go} more rows"), dim_style)
    };
    let monster = if state.monster.active {
        Span::styled(
            format!("eating {}/{}", state.monster.consumed, MONSTER_MAX_CONSUMED),
            Style::default().fg(theme.monster),
        )
    } else if state.monster.ready {
        Span::styled("ready", ready_style)
    } else {
        Span::styled(
            format!("letters at row {}", state.monster.threshold()),
            dim_style,
        )
    };
    let powerups = vec![
        Line::from(vec![Span::styled("[b] Bomb     ", title_style), bomb]),
        Line::from(vec![
            Span::styled("[x] Replace  ", title_style),
            Span::styled("ready", ready_style),
        ]),
        Line::from(vec![Span::styled("[m] Monster  ", title_style), monster]),
    ];
    Paragraph::new(Text::from(powerups))
        .block(sidebar_block(theme, " Power-ups ".to_string()))
        .render(chunks[1], frame.buffer_mut());

    // --- Targets: shown in the other language, spelled in the active one ---
    let targets: Vec<Line> = state
        .targets
        .words()
        .iter()
        .map(|t| {
            if t.found {
                Line::from(vec![
                    Span::styled("✓ ", Style::default().fg(theme.found)),
                    Span::styled(format!("{} → {}", t.word, t.meaning), dim_style),
                ])
            } else {
                Line::from(vec![Span::styled("· ", dim_style), Span::styled(t.word.clone(), fg_style)])
            }
        })
        .collect();
    let targets_title = format!(
        " Targets {}/{} ",
        state.targets.found_count(),
        state.targets.words().len()
    );
    Paragraph::new(Text::from(targets))
        .block(sidebar_block(theme, targets_title))
        .render(chunks[2], frame.buffer_mut());

    // --- Found words, newest first ---
    let found: Vec<Line> = state
        .found
        .recent()
        .map(|w| {
            Line::from(vec![
                Span::styled(w.word.clone(), fg_style),
                Span::styled(format!("  {}", w.meaning), dim_style),
            ])
        })
        .collect();
    let found_title = format!(" Found · {} achievements ", view.achievements_unlocked);
    Paragraph::new(Text::from(found))
        .block(sidebar_block(theme, found_title))
        .render(chunks[3], frame.buffer_mut());
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn clear_rect(frame: &mut Frame, rect: Rect, theme: &Theme) {
    let rect = rect.intersection(frame.area());
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            frame.buffer_mut()[(x, y)].reset();
            frame.buffer_mut()[(x, y)].set_style(Style::default().bg(theme.bg));
        }
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 24, 5);
    clear_rect(frame, popup, theme);
    let lines = vec![
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(theme.bg).bg(theme.title),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P Resume   Q Menu ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let View { state, theme, .. } = *view;
    let popup = centered(area, 24, 9);
    clear_rect(frame, popup, theme);
    let (title, colour) = match state.outcome {
        Some(GameOverReason::AllTargetsFound) => (" You win! ", theme.found),
        _ => (" Game Over ", theme.danger),
    };
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme.bg)
                .bg(colour)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score), fg)),
        Line::from(Span::styled(format!(" Level: {} ", state.level()), fg)),
        Line::from(Span::styled(
            format!(
                " Targets: {}/{} ",
                state.targets.found_count(),
                state.targets.words().len()
            ),
            fg,
        )),
        Line::from(""),
        Line::from(Span::styled(" R New game   Q Menu ", fg)),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_toast(frame: &mut Frame, theme: &Theme, achievement: Achievement, area: Rect) {
    let text = format!(
        " ★ {}: {} ",
        achievement.title(),
        achievement.description()
    );
    let width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX).saturating_add(2);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y,
        width: width.min(area.width),
        height: 3.min(area.height),
    };
    clear_rect(frame, rect, theme);
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(theme.title))))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.found)),
        )
        .render(rect, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    clear_rect(frame, quit_rect, theme);
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::NewGame, " New Game "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.bottom() {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_at_maps_board_positions() {
        let area = Rect::new(0, 0, 100, 30);
        let board = areas(area).board;
        let inner = board_inner(board);
        assert_eq!(cell_at(area, inner.x, inner.y), Some((0, 0)));
        assert_eq!(cell_at(area, inner.x + 2, inner.y), Some((0, 0)));
        assert_eq!(cell_at(area, inner.x + 3, inner.y + 14), Some((14, 1)));
        assert_eq!(cell_at(area, board.x, board.y), None);
        assert_eq!(cell_at(area, 99, 29), None);
    }

    #[test]
    fn test_layout_fits_standard_terminal() {
        let a = areas(Rect::new(0, 0, 80, 24));
        assert_eq!(a.board.height, BOARD_HEIGHT);
        assert_eq!(a.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(a.legend.y, a.board.bottom());
    }
}
