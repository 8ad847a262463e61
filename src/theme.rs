//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Board background.
    pub bg: Color,
    /// Letter tile background.
    pub cell_bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (letters, score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text: legend, found targets.
    pub inactive_fg: Color,
    /// Selected letters.
    pub selected: Color,
    /// Hinted letters.
    pub hint: Color,
    /// Letters just swapped by the replace power-up.
    pub replaced: Color,
    /// The monster's tile.
    pub monster: Color,
    /// Found target words and ready power-ups.
    pub found: Color,
    /// Rows near the loss edge, game over.
    pub danger: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Theme {
    /// Hardcoded One Dark defaults: hex values from onedark.theme.
    pub const fn onedark_default() -> Self {
        Self {
            bg: rgb(0x282C34),          // main_bg
            cell_bg: rgb(0x31353F),     // meter_bg
            div_line: rgb(0x3F444F),    // div_line
            main_fg: rgb(0xABB2BF),     // main_fg
            title: rgb(0xE5C07B),       // title
            inactive_fg: rgb(0x5C6370), // inactive_fg
            selected: rgb(0x61AFEF),    // cpu_box / blue
            hint: rgb(0xC678DD),        // net_box / magenta
            replaced: rgb(0x56B6C2),    // hi_fg / cyan
            monster: rgb(0xD19A66),     // orange
            found: rgb(0x98C379),       // mem_box / green
            danger: rgb(0xE06C75),      // cpu_end / red
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Default theme for a palette when no file is loaded.
    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override the state colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.main_fg = rgb(0xFFFFFF);
                self.selected = rgb(0x0088FF);
                self.hint = rgb(0xFF00FF);
                self.replaced = rgb(0x00FFFF);
                self.monster = rgb(0xFFFF00);
                self.found = rgb(0x00FF00);
                self.danger = rgb(0xFF0000);
            }
            crate::Palette::Colorblind => {
                // Avoid red/green pairs
                self.selected = rgb(0x0077BB);
                self.hint = rgb(0xEE3377);
                self.replaced = rgb(0x009988);
                self.monster = rgb(0xEE7733);
                self.found = rgb(0xBBBB00);
                self.danger = rgb(0xCC3311);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let d = Self::onedark_default();
        // Keys match onedark.theme.
        Self {
            bg: get("main_bg").unwrap_or(d.bg),
            cell_bg: get("meter_bg").unwrap_or(d.cell_bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
            selected: get("cpu_box").or_else(|| get("selected_bg")).unwrap_or(d.selected),
            hint: get("net_box").unwrap_or(d.hint),
            replaced: get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(d.replaced),
            monster: get("temp_mid").or_else(|| get("cpu_mid")).unwrap_or(d.monster),
            found: get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.found),
            danger: get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.danger),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, rest)) = stripped.split_once(']') else {
            continue;
        };
        if let Some((_, value)) = rest.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.trim().to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGHHII").is_err());
        assert!(parse_hex("#éé").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_defaults() {
        let map = parse_theme_file("theme[mem_box]='#00FF00'\ntheme[title]=\"#123\"\n");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.found, Color::Rgb(0, 255, 0));
        assert_eq!(theme.title, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.bg, Theme::onedark_default().bg);
    }

    #[test]
    fn test_palette_overrides_state_colours() {
        let mut theme = Theme::default();
        theme.apply_palette(crate::Palette::HighContrast);
        assert_eq!(theme.danger, Color::Rgb(255, 0, 0));
    }
}
