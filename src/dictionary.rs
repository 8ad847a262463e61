//! Bilingual word list: lookup by normalized spelling, random sampling, file loading.

use crate::Language;
use log::{debug, warn};
use rand::RngCore;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// One dictionary entry: a word and its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    pub english: String,
    pub arabic: String,
}

impl WordPair {
    pub fn new(english: impl Into<String>, arabic: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            arabic: arabic.into(),
        }
    }

    /// Spelling of this entry in `language`.
    pub fn spelling(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Arabic => &self.arabic,
        }
    }
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected `english = arabic`, got {content:?}")]
    Malformed { line: usize, content: String },
    #[error("dictionary has no words")]
    Empty,
}

/// Read-only word source consulted by the engine. Entries never change mid-session.
pub trait Dictionary: fmt::Debug {
    /// Entry whose `language` spelling matches `spelling` after normalization.
    fn lookup(&self, spelling: &str, language: Language) -> Option<&WordPair>;

    /// Up to `n` distinct entries in random order.
    fn sample(&self, n: usize, rng: &mut dyn RngCore) -> Vec<WordPair>;
}

/// Canonical form used for every comparison: Latin is lower-cased, Arabic letter variants are folded.
pub fn normalize(word: &str, language: Language) -> String {
    match language {
        Language::English => word.to_lowercase(),
        Language::Arabic => word.chars().map(fold_arabic).collect(),
    }
}

/// Single-glyph version of [`normalize`].
pub fn normalize_glyph(glyph: char, language: Language) -> char {
    match language {
        Language::English => glyph.to_ascii_lowercase(),
        Language::Arabic => fold_arabic(glyph),
    }
}

fn fold_arabic(c: char) -> char {
    match c {
        'إ' | 'أ' | 'آ' => 'ا',
        'ة' => 'ه',
        'ى' | 'ئ' => 'ي',
        'ؤ' => 'و',
        _ => c,
    }
}

/// In-memory word list indexed by normalized spelling in both languages.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    pairs: Vec<WordPair>,
    english: HashMap<String, usize>,
    arabic: HashMap<String, usize>,
}

impl WordList {
    /// Build the indexes. An entry whose English or Arabic spelling normalizes to one
    /// already listed is dropped with a warning, so every kept pair is reachable by lookup.
    pub fn new(entries: Vec<WordPair>) -> Self {
        let mut pairs = Vec::with_capacity(entries.len());
        let mut english = HashMap::with_capacity(entries.len());
        let mut arabic = HashMap::with_capacity(entries.len());
        for pair in entries {
            let english_key = normalize(&pair.english, Language::English);
            let arabic_key = normalize(&pair.arabic, Language::Arabic);
            if english.contains_key(&english_key) || arabic.contains_key(&arabic_key) {
                warn!("duplicate entry {} = {} skipped", pair.english, pair.arabic);
                continue;
            }
            english.insert(english_key, pairs.len());
            arabic.insert(arabic_key, pairs.len());
            pairs.push(pair);
        }
        Self {
            pairs,
            english,
            arabic,
        }
    }

    /// Word list shipped with the game.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_WORDS
                .iter()
                .map(|&(en, ar)| WordPair::new(en, ar))
                .collect(),
        )
    }

    /// Load a word file (see [`parse_word_file`] for the format).
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let s = std::fs::read_to_string(path)?;
        let list = Self::parse(&s)?;
        debug!("loaded {} words from {}", list.pairs.len(), path.display());
        Ok(list)
    }

    pub fn parse(s: &str) -> Result<Self, DictionaryError> {
        let pairs = parse_word_file(s)?;
        if pairs.is_empty() {
            return Err(DictionaryError::Empty);
        }
        Ok(Self::new(pairs))
    }

    pub fn pairs(&self) -> &[WordPair] {
        &self.pairs
    }
}

impl Dictionary for WordList {
    fn lookup(&self, spelling: &str, language: Language) -> Option<&WordPair> {
        let key = normalize(spelling, language);
        let index = match language {
            Language::English => self.english.get(&key),
            Language::Arabic => self.arabic.get(&key),
        };
        index.and_then(|&i| self.pairs.get(i))
    }

    fn sample(&self, n: usize, rng: &mut dyn RngCore) -> Vec<WordPair> {
        self.pairs.choose_multiple(rng, n).cloned().collect()
    }
}

/// Parse `english = arabic` lines (a tab also separates). Blank lines and `#` comments are skipped.
/// Duplicates are left for [`WordList::new`] to drop.
fn parse_word_file(s: &str) -> Result<Vec<WordPair>, DictionaryError> {
    let mut pairs = Vec::new();
    for (i, raw) in s.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || DictionaryError::Malformed {
            line: i + 1,
            content: line.to_string(),
        };
        let (english, arabic) = line
            .split_once('=')
            .or_else(|| line.split_once('\t'))
            .ok_or_else(malformed)?;
        let (english, arabic) = (english.trim(), arabic.trim());
        if english.is_empty() || arabic.is_empty() {
            return Err(malformed());
        }
        pairs.push(WordPair::new(english, arabic));
    }
    Ok(pairs)
}

const BUILTIN_WORDS: &[(&str, &str)] = &[
    ("cat", "قطة"),
    ("dog", "كلب"),
    ("house", "بيت"),
    ("book", "كتاب"),
    ("sun", "شمس"),
    ("moon", "قمر"),
    ("star", "نجم"),
    ("tree", "شجرة"),
    ("water", "ماء"),
    ("fire", "نار"),
    ("bread", "خبز"),
    ("milk", "حليب"),
    ("door", "باب"),
    ("pen", "قلم"),
    ("car", "سيارة"),
    ("sea", "بحر"),
    ("road", "طريق"),
    ("city", "مدينة"),
    ("day", "يوم"),
    ("night", "ليل"),
    ("hand", "يد"),
    ("eye", "عين"),
    ("head", "رأس"),
    ("heart", "قلب"),
    ("friend", "صديق"),
    ("school", "مدرسة"),
    ("teacher", "معلم"),
    ("apple", "تفاحة"),
    ("rice", "أرز"),
    ("tea", "شاي"),
    ("coffee", "قهوة"),
    ("rain", "مطر"),
    ("wind", "ريح"),
    ("snow", "ثلج"),
    ("gold", "ذهب"),
    ("king", "ملك"),
    ("bird", "طائر"),
    ("fish", "سمك"),
    ("horse", "حصان"),
    ("lion", "أسد"),
    ("red", "أحمر"),
    ("blue", "أزرق"),
    ("green", "أخضر"),
    ("white", "أبيض"),
    ("black", "أسود"),
    ("big", "كبير"),
    ("small", "صغير"),
    ("new", "جديد"),
    ("old", "قديم"),
    ("good", "جيد"),
    ("time", "وقت"),
    ("word", "كلمة"),
    ("name", "اسم"),
    ("love", "حب"),
    ("light", "نور"),
    ("sky", "سماء"),
    ("land", "أرض"),
    ("mountain", "جبل"),
    ("river", "نهر"),
    ("garden", "حديقة"),
    ("room", "غرفة"),
    ("table", "طاولة"),
    ("chair", "كرسي"),
    ("window", "نافذة"),
    ("key", "مفتاح"),
    ("map", "خريطة"),
    ("ship", "سفينة"),
    ("salt", "ملح"),
    ("honey", "عسل"),
    ("rose", "وردة"),
];
