//! Lexifall: falling-letter bilingual word-search puzzle in the terminal.

mod app;
mod audio;
mod dictionary;
mod game;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use dictionary::WordList;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Options derived from CLI that affect session behaviour (language, pacing, randomness, feedback).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub language: Language,
    pub tick_interval: Duration,
    pub seed: Option<u64>,
    /// Word file re-read at every new game.
    pub dictionary: Option<PathBuf>,
    pub no_animation: bool,
    pub bell: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let dictionary = match args.dictionary.as_deref() {
        Some(path) => WordList::load(path)
            .with_context(|| format!("failed to load dictionary {}", path.display()))?,
        None => WordList::builtin(),
    };
    let tick_interval = game::speed_from_secs(args.speed).with_context(|| {
        format!(
            "unsupported speed {}s (use 7.5 or one of {})",
            args.speed,
            game::SPEED_OPTIONS
                .iter()
                .map(|d| d.as_secs().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    let config = GameConfig {
        language: args.language,
        tick_interval,
        seed: args.seed,
        dictionary: args.dictionary,
        no_animation: args.no_animation,
        bell: args.bell,
    };
    log::info!(
        "starting lexifall: {} words, language {}, tick {:?}",
        dictionary.pairs().len(),
        config.language.label(),
        config.tick_interval
    );
    let mut app = App::new(config, theme, Rc::new(dictionary));
    app.run()?;
    Ok(())
}

/// Log records go to a file: the terminal is owned by the UI while playing.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Falling-letter word-search puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "lexifall",
    version,
    about = "Falling-letter word-search puzzle in the terminal. Spell words from the rising letters before they reach the top.",
    long_about = "Lexifall is a terminal word game played with an English/Arabic dictionary.\n\n\
        Rows of random letters rise from the bottom of the board. Select letters to spell any \
        dictionary word in the active language; matched letters vanish and the rest fall. \
        Find every target word to win. A letter reaching the top row ends the game.\n\n\
        CONTROLS:\n  Arrows/hjkl Move cursor   Space/Enter Select     Backspace/c Clear selection\n  \
        b Bomb   x Replace letters   m Monster   ? Hint   +/- Speed\n  \
        Tab/L Switch language   p Pause   r New game   q/Esc Menu\n\n\
        The mouse can also be used to select letters."
)]
pub struct Args {
    /// Active language: the letters on the board and the words you spell.
    #[arg(short, long, default_value = "english")]
    pub language: Language,

    /// Seconds between new rows: 7.5 or one of 3, 5, 10, 15, 20, 30, 35, 40, 45.
    #[arg(short, long, default_value = "7.5", value_name = "SECS")]
    pub speed: f64,

    /// Seed for letters, target words and power-ups (repeatable games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Word list file: one `english = arabic` pair per line. Re-read on every new game.
    /// Uses the built-in list if not set.
    #[arg(short, long, value_name = "FILE")]
    pub dictionary: Option<PathBuf>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the bomb flash animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Ring the terminal bell when a word matches and when the game ends.
    #[arg(long)]
    pub bell: bool,

    /// Write log output to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

/// The two dictionary languages. The active one supplies the board alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Language {
    #[default]
    #[value(alias = "en")]
    English,
    #[value(alias = "ar")]
    Arabic,
}

impl Language {
    pub fn other(self) -> Self {
        match self {
            Self::English => Self::Arabic,
            Self::Arabic => Self::English,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Arabic => "العربية",
        }
    }
}
