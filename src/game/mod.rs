//! Game engine: the session state and the reducer that applies commands to it.
//!
//! Every mutation goes through [`GameState::apply`]. Preconditions are checked against the
//! state at application time; an intent that does not apply is a silent no-op.

mod achievements;
pub mod clock;
pub mod grid;
pub mod powerups;
pub mod words;


pub use achievements::Achievement;
pub use clock::Session;
pub use grid::{CellId, Grid, GRID_COLS, GRID_ROWS};

use crate::Language;
use crate::dictionary::{Dictionary, normalize, normalize_glyph};
use grid::random_glyph;
use log::{debug, info};
use powerups::{BOMB_BLAST_CELLS, BOMB_FLASH, BombState, HINT_DURATION, MonsterState, MonsterStep, REPLACE_FLASH};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;
use words::{FoundWord, FoundWords, TargetTracker};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(7500);

/// Row intervals the player may pick besides the default.
pub const SPEED_OPTIONS: [Duration; 9] = [
    Duration::from_secs(3),
    Duration::from_secs(5),
    Duration::from_secs(10),
    Duration::from_secs(15),
    Duration::from_secs(20),
    Duration::from_secs(30),
    Duration::from_secs(35),
    Duration::from_secs(40),
    Duration::from_secs(45),
];

const LEVEL_POINTS: u32 = 5000;

pub fn is_allowed_speed(interval: Duration) -> bool {
    interval == DEFAULT_TICK_INTERVAL || SPEED_OPTIONS.contains(&interval)
}

/// Parse a `--speed` value. Only the default and [`SPEED_OPTIONS`] are accepted.
pub fn speed_from_secs(secs: f64) -> Option<Duration> {
    let interval = Duration::try_from_secs_f64(secs).ok()?;
    is_allowed_speed(interval).then_some(interval)
}

/// Next allowed interval below (`faster`) or above `current`, clamped at the ends.
pub fn adjacent_speed(current: Duration, faster: bool) -> Duration {
    let mut ladder: Vec<Duration> = SPEED_OPTIONS.to_vec();
    ladder.push(DEFAULT_TICK_INTERVAL);
    ladder.sort();
    let last = ladder.len() - 1;
    let i = ladder.iter().position(|&d| d >= current).unwrap_or(last);
    if faster {
        ladder[i.saturating_sub(1)]
    } else if ladder[i] > current {
        ladder[i]
    } else {
        ladder[(i + 1).min(last)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// A clock tick would have pushed a letter past the loss edge.
    Overflow,
    AllTargetsFound,
}

/// Fire-and-forget cue for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    Click,
    Match,
    NewRow,
    Bomb,
    Replace,
    GameOver,
}

/// Milestones counted by the session's achievement tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    WordFound,
    BombUsed,
    LanguageSwitched,
}

/// What the player asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SelectBlock(CellId),
    ClearSelection,
    TogglePause,
    Reset,
    SwitchLanguage,
    ChangeSpeed(Duration),
    ActivateBomb,
    ActivateReplace,
    ActivateMonster,
    RequestHint,
}

/// Cosmetic state cleared by a delayed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cosmetic {
    Replaced,
    Explosion,
    Hint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    /// Session clock: advance rows and spawn.
    Tick,
    MonsterStep,
    /// Clear a cosmetic flag armed during session `epoch`.
    Clear { what: Cosmetic, epoch: u64 },
}

/// Side effects of one applied command, handled by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Sound(SoundEvent),
    Event(GameEvent),
    /// Clear `Cosmetic` after the delay, unless the session is reset first.
    ClearAfter(Duration, Cosmetic),
}

#[derive(Debug)]
pub struct GameState {
    pub grid: Grid,
    /// Selected cells in selection order.
    pub selection: Vec<CellId>,
    pub score: u32,
    pub found: FoundWords,
    pub targets: TargetTracker,
    pub status: Status,
    pub outcome: Option<GameOverReason>,
    pub language: Language,
    pub rows_spawned: u32,
    pub tick_interval: Duration,
    pub hint_cells: HashSet<CellId>,
    pub bomb: BombState,
    pub monster: MonsterState,
    /// Bumped by every reset and language switch.
    pub epoch: u64,
    dictionary: Rc<dyn Dictionary>,
    rng: StdRng,
}

impl GameState {
    pub fn new(
        language: Language,
        tick_interval: Duration,
        dictionary: Rc<dyn Dictionary>,
        rng: StdRng,
    ) -> Self {
        let mut state = Self {
            grid: Grid::new(GRID_ROWS, GRID_COLS),
            selection: Vec::new(),
            score: 0,
            found: FoundWords::default(),
            targets: TargetTracker::default(),
            status: Status::Playing,
            outcome: None,
            language,
            rows_spawned: 0,
            tick_interval,
            hint_cells: HashSet::new(),
            bomb: BombState::default(),
            monster: MonsterState::new(GRID_ROWS),
            epoch: 0,
            dictionary,
            rng,
        };
        state.start_fresh(language);
        state
    }

    /// Swap the word list. Only the scheduler calls this, between sessions.
    pub fn set_dictionary(&mut self, dictionary: Rc<dyn Dictionary>) {
        self.dictionary = dictionary;
    }

    pub fn level(&self) -> u32 {
        self.score / LEVEL_POINTS + 1
    }

    /// Glyphs of the selection in selection order.
    pub fn spelled_selection(&self) -> String {
        self.selection
            .iter()
            .filter_map(|&id| self.grid.get(id))
            .map(|c| c.glyph)
            .collect()
    }

    pub fn apply(&mut self, command: Command, now: Duration) -> Vec<Followup> {
        let mut out = Vec::new();
        match command {
            Command::Intent(intent) => self.apply_intent(intent, now, &mut out),
            Command::Tick => self.tick(&mut out),
            Command::MonsterStep => self.monster_step(&mut out),
            Command::Clear { what, epoch } => {
                if epoch == self.epoch {
                    self.clear_cosmetic(what);
                }
            }
        }
        self.refresh_gates();
        out
    }

    /// Re-derive power-up readiness and drop hints pointing at removed cells.
    pub fn refresh_gates(&mut self) {
        self.bomb.observe_rows_spawned(self.rows_spawned);
        if !self.monster.active {
            self.monster.observe_min_row(self.grid.min_row());
        }
        let grid = &self.grid;
        self.hint_cells.retain(|&id| grid.get(id).is_some());
    }

    fn apply_intent(&mut self, intent: Intent, now: Duration, out: &mut Vec<Followup>) {
        match intent {
            Intent::SelectBlock(id) => self.select(id, now, out),
            Intent::ClearSelection => {
                if self.clear_selection() {
                    out.push(Followup::Sound(SoundEvent::Click));
                }
            }
            Intent::TogglePause => {
                self.status = match self.status {
                    Status::Playing => Status::Paused,
                    Status::Paused => Status::Playing,
                    Status::GameOver => return,
                };
                out.push(Followup::Sound(SoundEvent::Click));
            }
            Intent::Reset => {
                self.start_fresh(self.language);
                out.push(Followup::Sound(SoundEvent::Click));
                info!("new game ({})", self.language.label());
            }
            Intent::SwitchLanguage => {
                self.start_fresh(self.language.other());
                out.push(Followup::Sound(SoundEvent::Click));
                out.push(Followup::Event(GameEvent::LanguageSwitched));
                info!("switched language to {}", self.language.label());
            }
            Intent::ChangeSpeed(interval) => {
                if is_allowed_speed(interval) {
                    self.tick_interval = interval;
                }
            }
            Intent::ActivateBomb => self.activate_bomb(out),
            Intent::ActivateReplace => self.activate_replace(out),
            Intent::ActivateMonster => self.activate_monster(out),
            Intent::RequestHint => self.request_hint(out),
        }
    }

    fn start_fresh(&mut self, language: Language) {
        self.epoch += 1;
        self.language = language;
        self.grid.clear();
        self.selection.clear();
        self.score = 0;
        self.found = FoundWords::default();
        self.targets = TargetTracker::sample(self.dictionary.as_ref(), language, &mut self.rng);
        self.status = Status::Playing;
        self.outcome = None;
        self.hint_cells.clear();
        self.bomb = BombState::default();
        self.monster = MonsterState::new(self.grid.rows);
        self.grid.spawn_row(language, &mut self.rng);
        self.rows_spawned = 1;
    }

    fn end(&mut self, reason: GameOverReason, out: &mut Vec<Followup>) {
        self.status = Status::GameOver;
        self.outcome = Some(reason);
        out.push(Followup::Sound(SoundEvent::GameOver));
        info!("game over: {reason:?}, score {}", self.score);
    }

    fn select(&mut self, id: CellId, now: Duration, out: &mut Vec<Followup>) {
        if self.status != Status::Playing || self.monster.active {
            return;
        }
        let Some(cell) = self.grid.get_mut(id) else {
            return;
        };
        if cell.selected {
            cell.selected = false;
            self.selection.retain(|&s| s != id);
            out.push(Followup::Sound(SoundEvent::Click));
            return;
        }
        cell.selected = true;
        self.selection.push(id);
        if !self.resolve_selection(now, out) {
            out.push(Followup::Sound(SoundEvent::Click));
        }
    }

    /// Match the selection against the dictionary. Returns true if a word was awarded.
    fn resolve_selection(&mut self, now: Duration, out: &mut Vec<Followup>) -> bool {
        let language = self.language;
        let spelled = self.spelled_selection();
        let Some(pair) = self.dictionary.lookup(&spelled, language).cloned() else {
            return false;
        };
        let key = normalize(pair.spelling(language), language);
        if self.found.contains(language, &key) {
            return false;
        }

        let ids: HashSet<CellId> = self.selection.drain(..).collect();
        self.grid.remove(&ids);
        self.grid.settle();
        let points = words::match_points(ids.len());
        self.score += points;
        self.targets.mark_found(&pair, language);
        self.found.record(
            language,
            key,
            FoundWord {
                word: pair.spelling(language).to_string(),
                meaning: pair.spelling(language.other()).to_string(),
                found_at: now,
            },
        );
        debug!("matched {spelled:?} for {points} points");
        out.push(Followup::Sound(SoundEvent::Match));
        out.push(Followup::Event(GameEvent::WordFound));

        if self.targets.all_found() {
            self.score += words::WIN_BONUS;
            self.end(GameOverReason::AllTargetsFound, out);
        }
        true
    }

    /// Returns false if nothing was selected.
    fn clear_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        for id in self.selection.drain(..) {
            if let Some(cell) = self.grid.get_mut(id) {
                cell.selected = false;
            }
        }
        true
    }

    fn tick(&mut self, out: &mut Vec<Followup>) {
        if self.status != Status::Playing || self.monster.active {
            return;
        }
        if !self.grid.shift_toward_loss_edge() {
            self.end(GameOverReason::Overflow, out);
            return;
        }
        self.grid.spawn_row(self.language, &mut self.rng);
        self.rows_spawned += 1;
        out.push(Followup::Sound(SoundEvent::NewRow));
    }

    fn unselected_cells(&self) -> Vec<CellId> {
        self.grid
            .cells()
            .iter()
            .filter(|c| !c.selected)
            .map(|c| c.id)
            .collect()
    }

    fn activate_bomb(&mut self, out: &mut Vec<Followup>) {
        if !self.bomb.ready || self.status != Status::Playing || self.monster.active {
            return;
        }
        let candidates = self.unselected_cells();
        if candidates.is_empty() {
            return;
        }
        let blast: HashSet<CellId> = candidates
            .choose_multiple(&mut self.rng, BOMB_BLAST_CELLS)
            .copied()
            .collect();
        self.grid.remove(&blast);
        self.grid.settle();
        self.bomb.detonate();
        debug!("bomb removed {} cells", blast.len());
        out.push(Followup::Sound(SoundEvent::Bomb));
        out.push(Followup::Event(GameEvent::BombUsed));
        out.push(Followup::ClearAfter(BOMB_FLASH, Cosmetic::Explosion));
    }

    fn activate_replace(&mut self, out: &mut Vec<Followup>) {
        if self.status != Status::Playing || self.monster.active {
            return;
        }
        let candidates = self.unselected_cells();
        let count = candidates.len() / 2;
        if count == 0 {
            return;
        }
        let chosen: HashSet<CellId> = candidates
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();
        let language = self.language;
        for cell in self.grid.cells_mut().filter(|c| chosen.contains(&c.id)) {
            cell.glyph = random_glyph(language, &mut self.rng);
            cell.replaced = true;
        }
        debug!("replaced {count} letters");
        out.push(Followup::Sound(SoundEvent::Replace));
        out.push(Followup::ClearAfter(REPLACE_FLASH, Cosmetic::Replaced));
    }

    fn activate_monster(&mut self, out: &mut Vec<Followup>) {
        if !self.monster.ready || self.monster.active || self.status != Status::Playing {
            return;
        }
        let Some(bottom) = self.grid.bottom_row() else {
            return;
        };
        let starts: Vec<CellId> = self
            .grid
            .cells()
            .iter()
            .filter(|c| c.row == bottom)
            .map(|c| c.id)
            .collect();
        let Some(&start) = starts.choose(&mut self.rng) else {
            return;
        };
        self.monster.begin(start);
        debug!("monster released at {start:?}");
        out.push(Followup::Sound(SoundEvent::Click));
    }

    fn monster_step(&mut self, out: &mut Vec<Followup>) {
        if !self.monster.active || self.status != Status::Playing {
            return;
        }
        let step = self.monster.advance(&self.grid, &mut self.rng);
        if let Some(eaten) = self.monster.take_pending_removal() {
            self.grid.remove(&HashSet::from([eaten]));
            self.selection.retain(|&s| s != eaten);
        }
        if step == MonsterStep::Finished {
            self.grid.settle();
            debug!("monster done after {} cells", self.monster.consumed);
            out.push(Followup::Sound(SoundEvent::Bomb));
        } else {
            out.push(Followup::Sound(SoundEvent::Click));
        }
    }

    /// Highlight board letters that spell a random unfound target, if there are enough of them.
    fn request_hint(&mut self, out: &mut Vec<Followup>) {
        if self.status != Status::Playing || self.monster.active {
            return;
        }
        let unfound: Vec<&str> = self.targets.unfound().map(|t| t.meaning.as_str()).collect();
        let Some(meaning) = unfound.choose(&mut self.rng).map(|m| (*m).to_string()) else {
            return;
        };
        let language = self.language;
        let letters = normalize(&meaning, language).chars().count();
        let wanted: HashSet<char> = normalize(&meaning, language).chars().collect();
        let matching: Vec<CellId> = self
            .grid
            .cells()
            .iter()
            .filter(|c| wanted.contains(&normalize_glyph(c.glyph, language)))
            .map(|c| c.id)
            .collect();
        if matching.len() < letters {
            return;
        }
        self.hint_cells = matching
            .choose_multiple(&mut self.rng, letters)
            .copied()
            .collect();
        debug!("hint for {meaning:?}");
        out.push(Followup::ClearAfter(HINT_DURATION, Cosmetic::Hint));
    }

    fn clear_cosmetic(&mut self, what: Cosmetic) {
        match what {
            Cosmetic::Replaced => {
                for cell in self.grid.cells_mut() {
                    cell.replaced = false;
                }
            }
            Cosmetic::Explosion => self.bomb.exploding = false,
            Cosmetic::Hint => self.hint_cells.clear(),
        }
    }
}
