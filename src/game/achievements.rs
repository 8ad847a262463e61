//! Achievements tracked for the lifetime of the process (never saved).

use super::{GameEvent, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    FirstSteps,
    WordMaster,
    HighScorer,
    LevelUp,
    BombExpert,
    Polyglot,
}

const WORD_MASTER_WORDS: u32 = 10;
const HIGH_SCORER_SCORE: u32 = 10_000;
const LEVEL_UP_LEVEL: u32 = 5;
const BOMB_EXPERT_USES: u32 = 5;
const POLYGLOT_SWITCHES: u32 = 3;

impl Achievement {
    pub const ALL: [Self; 6] = [
        Self::FirstSteps,
        Self::WordMaster,
        Self::HighScorer,
        Self::LevelUp,
        Self::BombExpert,
        Self::Polyglot,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstSteps => "First Steps",
            Self::WordMaster => "Word Master",
            Self::HighScorer => "High Scorer",
            Self::LevelUp => "Level Up",
            Self::BombExpert => "Bomb Expert",
            Self::Polyglot => "Polyglot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstSteps => "Find your first word",
            Self::WordMaster => "Find 10 words",
            Self::HighScorer => "Reach 10000 points",
            Self::LevelUp => "Reach level 5",
            Self::BombExpert => "Use the bomb 5 times",
            Self::Polyglot => "Switch language 3 times",
        }
    }
}

/// Counters behind the achievements plus what is already unlocked.
#[derive(Debug, Clone, Default)]
pub struct Achievements {
    words: u32,
    bombs: u32,
    switches: u32,
    unlocked: Vec<Achievement>,
}

impl Achievements {
    pub fn record(&mut self, event: GameEvent) {
        match event {
            GameEvent::WordFound => self.words += 1,
            GameEvent::BombUsed => self.bombs += 1,
            GameEvent::LanguageSwitched => self.switches += 1,
        }
    }

    /// Unlock whatever the counters and `state` now satisfy. Returns the new unlocks.
    pub fn check(&mut self, state: &GameState) -> Vec<Achievement> {
        let mut newly = Vec::new();
        for achievement in Achievement::ALL {
            if self.is_unlocked(achievement) {
                continue;
            }
            let earned = match achievement {
                Achievement::FirstSteps => self.words >= 1,
                Achievement::WordMaster => self.words >= WORD_MASTER_WORDS,
                Achievement::HighScorer => state.score >= HIGH_SCORER_SCORE,
                Achievement::LevelUp => state.level() >= LEVEL_UP_LEVEL,
                Achievement::BombExpert => self.bombs >= BOMB_EXPERT_USES,
                Achievement::Polyglot => self.switches >= POLYGLOT_SWITCHES,
            };
            if earned {
                self.unlocked.push(achievement);
                newly.push(achievement);
            }
        }
        newly
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }
}
