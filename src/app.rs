//! App: terminal init, main loop, session clock and key/mouse handling.

use crate::GameConfig;
use crate::audio::{self, AudioSink};
use crate::dictionary::{Dictionary, WordList};
use crate::game::{self, Achievement, GRID_COLS, GRID_ROWS, GameState, Intent, Session, Status};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, BombFlash, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Redraw at ~60 FPS.
const FRAME_DURATION: Duration = Duration::from_millis(16);
const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    NewGame,
    Exit,
}

impl QuitOption {
    fn next(self) -> Self {
        match self {
            Self::Resume => Self::NewGame,
            Self::NewGame => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::NewGame => Self::Resume,
            Self::Exit => Self::NewGame,
        }
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    session: Session,
    /// Origin of the session's logical clock.
    started: Instant,
    cursor: (usize, usize),
    screen: Screen,
    quit_selected: QuitOption,
    /// The quit menu paused a running game and should resume it.
    menu_paused: bool,
    audio: Box<dyn AudioSink>,
    bomb_flash: BombFlash,
    toasts: VecDeque<Achievement>,
    toast_since: Option<Instant>,
    /// Last drawn frame area, for mapping mouse clicks.
    area: Rect,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, dictionary: Rc<dyn Dictionary>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = GameState::new(config.language, config.tick_interval, dictionary, rng);
        let audio = audio::sink(config.bell);
        Self {
            config,
            theme,
            session: Session::new(state),
            started: Instant::now(),
            cursor: (GRID_ROWS - 1, 0),
            screen: Screen::Playing,
            quit_selected: QuitOption::Resume,
            menu_paused: false,
            audio,
            bomb_flash: BombFlash::default(),
            toasts: VecDeque::new(),
            toast_since: None,
            area: Rect::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
                PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        // Attempt to enable enhanced keyboard for Release events
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        info!("session started");

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        info!(
            "session ended: score {}, {} achievements",
            self.session.state().score,
            self.session.achievements().unlocked().len()
        );
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.session.advance(now.duration_since(self.started));
            for sound in self.session.drain_sounds() {
                self.audio.play(sound);
            }
            for achievement in self.session.drain_unlocked() {
                info!("achievement unlocked: {}", achievement.title());
                self.toasts.push_back(achievement);
            }
            if !self.session.state().bomb.exploding {
                self.bomb_flash.reset();
            }
            let toast = self.current_toast(now);

            terminal.draw(|f| {
                self.area = f.area();
                let view = View {
                    state: self.session.state(),
                    theme: &self.theme,
                    screen: self.screen,
                    quit_selected: self.quit_selected,
                    cursor: self.cursor,
                    toast,
                    achievements_unlocked: self.session.achievements().unlocked().len(),
                };
                ui::draw(f, &view, &mut self.bomb_flash, self.config.no_animation, now);
            })?;

            // Sleep until the next frame or the next session deadline, whichever is first.
            let mut timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if let Some(deadline) = self.session.next_deadline() {
                timeout = timeout.min(deadline.saturating_sub(self.started.elapsed()));
            }

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if !self.handle_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Front of the toast queue; each stays up for [`TOAST_DURATION`].
    fn current_toast(&mut self, now: Instant) -> Option<Achievement> {
        if self
            .toast_since
            .is_some_and(|since| now.duration_since(since) >= TOAST_DURATION)
        {
            self.toasts.pop_front();
            self.toast_since = None;
        }
        if self.toast_since.is_none() && !self.toasts.is_empty() {
            self.toast_since = Some(now);
        }
        self.toasts.front().copied()
    }

    /// Returns false when the player chose to exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Playing => self.handle_playing(action),
            Screen::QuitMenu => match action {
                Action::MoveDown | Action::MoveRight => self.quit_selected = self.quit_selected.next(),
                Action::MoveUp | Action::MoveLeft => self.quit_selected = self.quit_selected.prev(),
                Action::Select => match self.quit_selected {
                    QuitOption::Resume => self.close_menu(),
                    QuitOption::NewGame => {
                        self.menu_paused = false;
                        self.reload_dictionary();
                        self.session.submit(Intent::Reset);
                        self.screen = Screen::Playing;
                    }
                    QuitOption::Exit => return false,
                },
                Action::Pause | Action::Quit => self.close_menu(),
                _ => {}
            },
        }
        true
    }

    fn handle_playing(&mut self, action: Action) {
        let tick_interval = self.session.state().tick_interval;
        let intent = match action {
            Action::Quit => {
                self.open_menu();
                None
            }
            Action::MoveLeft => {
                self.cursor.1 = self.cursor.1.saturating_sub(1);
                None
            }
            Action::MoveRight => {
                self.cursor.1 = (self.cursor.1 + 1).min(GRID_COLS - 1);
                None
            }
            Action::MoveUp => {
                self.cursor.0 = self.cursor.0.saturating_sub(1);
                None
            }
            Action::MoveDown => {
                self.cursor.0 = (self.cursor.0 + 1).min(GRID_ROWS - 1);
                None
            }
            Action::Select => self
                .session
                .state()
                .grid
                .at(self.cursor.0, self.cursor.1)
                .map(|c| Intent::SelectBlock(c.id)),
            Action::ClearSelection => Some(Intent::ClearSelection),
            Action::Pause => Some(Intent::TogglePause),
            Action::Reset => {
                self.reload_dictionary();
                Some(Intent::Reset)
            }
            Action::SwitchLanguage => Some(Intent::SwitchLanguage),
            Action::Bomb => Some(Intent::ActivateBomb),
            Action::Replace => Some(Intent::ActivateReplace),
            Action::Monster => Some(Intent::ActivateMonster),
            Action::Hint => Some(Intent::RequestHint),
            Action::Faster => Some(Intent::ChangeSpeed(game::adjacent_speed(tick_interval, true))),
            Action::Slower => Some(Intent::ChangeSpeed(game::adjacent_speed(tick_interval, false))),
            Action::None => None,
        };
        if let Some(intent) = intent {
            self.session.submit(intent);
        }
    }

    /// Re-read the `--dictionary` file so edits take effect in the next game.
    /// A file that no longer loads leaves the current list in place.
    fn reload_dictionary(&mut self) {
        let Some(path) = self.config.dictionary.as_deref() else {
            return;
        };
        match WordList::load(path) {
            Ok(list) => {
                info!("reloaded {} words from {}", list.pairs().len(), path.display());
                self.session.replace_dictionary(Rc::new(list));
            }
            Err(err) => warn!("keeping current word list, {} failed to load: {err}", path.display()),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Playing || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some((row, col)) = ui::cell_at(self.area, mouse.column, mouse.row) else {
            return;
        };
        self.cursor = (row, col);
        if let Some(cell) = self.session.state().grid.at(row, col) {
            self.session.submit(Intent::SelectBlock(cell.id));
        }
    }

    fn open_menu(&mut self) {
        if self.session.state().status == Status::Playing {
            self.session.submit(Intent::TogglePause);
            self.menu_paused = true;
        }
        self.screen = Screen::QuitMenu;
        self.quit_selected = QuitOption::Resume;
    }

    fn close_menu(&mut self) {
        if self.menu_paused {
            self.session.submit(Intent::TogglePause);
            self.menu_paused = false;
        }
        self.screen = Screen::Playing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Language;

    fn app_with_word_file(name: &str, contents: &str) -> App {
        let path = std::env::temp_dir().join(format!("lexifall-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        let config = GameConfig {
            language: Language::English,
            tick_interval: game::DEFAULT_TICK_INTERVAL,
            seed: Some(1),
            dictionary: Some(path),
            no_animation: true,
            bell: false,
        };
        App::new(config, Theme::default(), Rc::new(WordList::builtin()))
    }

    #[test]
    fn test_new_game_rereads_word_file() {
        let mut app = app_with_word_file("reload", "fox = ثعلب\n");
        assert_eq!(app.session.state().targets.words().len(), 7);
        assert!(app.handle_action(Action::Reset));
        app.session.advance(Duration::ZERO);
        let targets = app.session.state().targets.words();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].meaning, "fox");
    }

    #[test]
    fn test_broken_word_file_keeps_current_list() {
        let mut app = app_with_word_file("broken", "fox =\n");
        app.handle_action(Action::Reset);
        app.session.advance(Duration::ZERO);
        assert_eq!(app.session.state().targets.words().len(), 7);
    }
}
