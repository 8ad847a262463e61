//! Scoring, target-word tracking and the found-word log.

use crate::Language;
use crate::dictionary::{Dictionary, WordPair, normalize};
use rand::RngCore;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

pub const TARGET_WORD_COUNT: usize = 7;
pub const FOUND_WORDS_CAP: usize = 10;
pub const POINTS_PER_LETTER: u32 = 100;
pub const WIN_BONUS: u32 = 2000;
/// Selection time fed to the speed bonus. Real timing is not measured.
pub const ASSUMED_SELECTION_SECS: u64 = 5;

/// Length and speed bonus for a matched word.
pub fn bonus_points(letters: usize, selection_secs: u64) -> u32 {
    let length = match letters {
        6.. => 500,
        4..=5 => 200,
        _ => 0,
    };
    let speed = match selection_secs {
        0..5 => 300,
        5..10 => 100,
        _ => 0,
    };
    length + speed
}

/// Points awarded for matching a word of `letters` letters.
pub fn match_points(letters: usize) -> u32 {
    let letters_u32 = u32::try_from(letters).unwrap_or(u32::MAX);
    letters_u32
        .saturating_mul(POINTS_PER_LETTER)
        .saturating_add(bonus_points(letters, ASSUMED_SELECTION_SECS))
}

/// A goal word: shown in the inactive language, spelled by the player in the active one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWord {
    /// Display spelling (inactive language).
    pub word: String,
    /// Spelling to build on the board (active language).
    pub meaning: String,
    pub found: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TargetTracker {
    words: Vec<TargetWord>,
}

impl TargetTracker {
    /// Draw a fresh target set for `language` being the active language.
    pub fn sample(dictionary: &dyn Dictionary, language: Language, rng: &mut dyn RngCore) -> Self {
        let words = dictionary
            .sample(TARGET_WORD_COUNT, rng)
            .into_iter()
            .map(|pair| TargetWord {
                word: pair.spelling(language.other()).to_string(),
                meaning: pair.spelling(language).to_string(),
                found: false,
            })
            .collect();
        Self { words }
    }

    pub fn words(&self) -> &[TargetWord] {
        &self.words
    }

    pub fn unfound(&self) -> impl Iterator<Item = &TargetWord> {
        self.words.iter().filter(|w| !w.found)
    }

    pub fn found_count(&self) -> usize {
        self.words.iter().filter(|w| w.found).count()
    }

    /// True when there is at least one target and every target is found.
    pub fn all_found(&self) -> bool {
        !self.words.is_empty() && self.words.iter().all(|w| w.found)
    }

    /// Mark the target whose display word is `pair`'s inactive-language spelling.
    /// Returns true if a previously unfound target was marked.
    pub fn mark_found(&mut self, pair: &WordPair, language: Language) -> bool {
        let other = language.other();
        let expected = normalize(pair.spelling(other), other);
        let Some(index) = self
            .words
            .iter()
            .position(|w| !w.found && normalize(&w.word, other) == expected)
        else {
            return false;
        };
        self.words[index].found = true;
        self.promote(index);
        true
    }

    /// Found word goes to slot 1; an unfound word takes slot 0 if it was found.
    fn promote(&mut self, index: usize) {
        if self.words.len() < 2 {
            return;
        }
        let word = self.words.remove(index);
        self.words.insert(1, word);
        if self.words[0].found {
            if let Some(next) = self.words.iter().position(|w| !w.found) {
                self.words.swap(0, next);
            }
        }
    }

    #[cfg(test)]
    pub fn from_words(words: Vec<TargetWord>) -> Self {
        Self { words }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundWord {
    /// Spelling in the language it was matched in.
    pub word: String,
    /// Translation.
    pub meaning: String,
    /// Session time of the match.
    pub found_at: Duration,
}

/// Most-recent-first log of matched words plus the set of every word awarded this session.
#[derive(Debug, Clone, Default)]
pub struct FoundWords {
    recent: VecDeque<FoundWord>,
    awarded: HashSet<(Language, String)>,
}

impl FoundWords {
    /// Whether `key` (normalized spelling) was already awarded in `language`.
    pub fn contains(&self, language: Language, key: &str) -> bool {
        self.awarded.contains(&(language, key.to_string()))
    }

    pub fn record(&mut self, language: Language, key: String, word: FoundWord) {
        self.awarded.insert((language, key));
        self.recent.push_front(word);
        self.recent.truncate(FOUND_WORDS_CAP);
    }

    pub fn recent(&self) -> impl Iterator<Item = &FoundWord> {
        self.recent.iter()
    }

    #[cfg(test)]
    pub fn first(&self) -> Option<&FoundWord> {
        self.recent.front()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}
