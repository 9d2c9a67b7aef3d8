//! Presentation theme derived from the current condition text.

use serde::Serialize;

/// Theme variants in the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKind {
    Clear,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Wind,
    Night,
    /// Shown before any data has arrived
    Default,
}

/// Color tokens and symbol for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub kind: ThemeKind,
    pub background: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
    pub emoji: &'static str,
}

impl ThemeKind {
    pub fn theme(self) -> Theme {
        let (background, text, accent, emoji) = match self {
            Self::Clear => ("yellow", "black", "bright_yellow", "☀️"),
            Self::Clouds => ("gray", "black", "white", "☁️"),
            Self::Rain => ("blue", "white", "bright_blue", "🌧️"),
            Self::Thunderstorm => ("magenta", "bright_yellow", "bright_magenta", "⛈️"),
            Self::Snow => ("white", "blue", "bright_cyan", "❄️"),
            Self::Mist => ("bright_black", "white", "gray", "🌫️"),
            Self::Wind => ("cyan", "black", "bright_cyan", "🌬️"),
            Self::Night => ("blue", "white", "magenta", "🌙"),
            Self::Default => ("blue", "white", "bright_blue", "🌤️"),
        };
        Theme {
            kind: self,
            background,
            text,
            accent,
            emoji,
        }
    }
}

/// Keyword table, checked in order; the first rule with a matching keyword wins.
const THEME_RULES: &[(&[&str], ThemeKind)] = &[
    (&["clear"], ThemeKind::Clear),
    (&["cloud"], ThemeKind::Clouds),
    (&["rain"], ThemeKind::Rain),
    (&["thunder"], ThemeKind::Thunderstorm),
    (&["snow"], ThemeKind::Snow),
    (&["mist", "fog"], ThemeKind::Mist),
];

/// Pick the theme for a condition description such as "Patchy light rain".
pub fn select_theme(condition_text: &str) -> Theme {
    let text = condition_text.to_lowercase();
    THEME_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(*k)))
        .map(|(_, kind)| *kind)
        .unwrap_or(ThemeKind::Clear)
        .theme()
}
