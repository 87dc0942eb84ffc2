//! Colour theme for the eoslog TUI.
//!
//! Themes are defined as TOML files embedded in the binary via
//! [`include_str!`] so the application works without any files on disk.
//!
//! # Colour assignment for identifiers
//!
//! Key identifiers are hashed to a stable index into the palette so the same
//! service always gets the same colour within a session, regardless of the
//! order in which entries arrive.

use config::{Config, File, FileFormat};
use eoslog_core::LogEntry;
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");
const GRUVBOX_DARK_THEME_SRC: &str = include_str!("themes/gruvbox_dark.toml");

// ---------------------------------------------------------------------------
// Raw (serde) types: mirror the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawEntries {
    plain: RawStyle,
    exception: RawStyle,
    sql: RawStyle,
    internal: RawStyle,
    tags: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    connected: RawStyle,
    connecting: RawStyle,
    disconnected: RawStyle,
    error: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawIdentifiers {
    palette: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    entries: RawEntries,
    borders: RawBorders,
    status: RawStatus,
    identifiers: RawIdentifiers,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Application colour theme. All styles are resolved at load time.
#[derive(Debug, Clone)]
pub struct Theme {
    pub entry_plain: Style,
    pub entry_exception: Style,
    pub entry_sql: Style,
    /// Self-diagnostic entries (`log://eos`).
    pub entry_internal: Style,
    /// Key tags and shared-tag badges.
    pub tags: Style,

    pub border_focused: Style,
    pub border_unfocused: Style,

    pub status_connected: Style,
    pub status_connecting: Style,
    pub status_disconnected: Style,
    pub status_error: Style,

    identifier_palette: Vec<Color>,
}

impl Theme {
    /// Load and parse the embedded default theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_default() -> Self {
        Self::from_toml_str(DEFAULT_THEME_SRC).expect("embedded default theme must be valid TOML")
    }

    /// Load and parse the embedded Gruvbox Dark theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_gruvbox_dark() -> Self {
        Self::from_toml_str(GRUVBOX_DARK_THEME_SRC)
            .expect("embedded gruvbox dark theme must be valid TOML")
    }

    /// Resolve a theme by name, falling back to the default for unknown names.
    pub fn by_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "gruvbox" | "gruvbox_dark" | "gruvbox-dark" => Self::load_gruvbox_dark(),
            "default" => Self::load_default(),
            other => {
                tracing::warn!(theme = other, "unknown theme, using default");
                Self::load_default()
            }
        }
    }

    /// Parse a theme from a TOML string. Unknown keys are ignored.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            entry_plain: raw.entries.plain.into_style(),
            entry_exception: raw.entries.exception.into_style(),
            entry_sql: raw.entries.sql.into_style(),
            entry_internal: raw.entries.internal.into_style(),
            tags: raw.entries.tags.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            status_connected: raw.status.connected.into_style(),
            status_connecting: raw.status.connecting.into_style(),
            status_disconnected: raw.status.disconnected.into_style(),
            status_error: raw.status.error.into_style(),
            identifier_palette: raw
                .identifiers
                .palette
                .iter()
                .filter_map(|s| parse_color(s))
                .collect(),
        })
    }

    /// Message style for an entry. Exceptions win over SQL.
    pub fn entry_style(&self, entry: &LogEntry) -> Style {
        if entry.is_internal() {
            self.entry_internal
        } else if entry.has_exception() {
            self.entry_exception
        } else if entry.has_sql() {
            self.entry_sql
        } else {
            self.entry_plain
        }
    }

    /// Stable colour for a key identifier.
    pub fn identifier_style(&self, identifier: &str) -> Style {
        if self.identifier_palette.is_empty() {
            return Style::default();
        }
        let idx = stable_hash(identifier) % self.identifier_palette.len();
        Style::default().fg(self.identifier_palette[idx])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// djb2-style hash, stable across Rust versions and process restarts.
fn stable_hash(s: &str) -> usize {
    s.bytes().fold(5381usize, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(b as usize)
    })
}

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts:
/// - Named terminal colours (case-insensitive): `red`, `dark_gray`, etc.
/// - Hex RGB: `#rrggbb`
/// - 256-colour indexed: `indexed:N`
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use eoslog_core::{Key, Payload};
    use pretty_assertions::assert_eq;

    fn entry(header: &str, body: &str) -> LogEntry {
        LogEntry::new(Key::parse(header).unwrap(), Payload::Text(body.to_string()))
    }

    #[test]
    fn embedded_themes_load() {
        for theme in [Theme::load_default(), Theme::load_gruvbox_dark()] {
            assert_ne!(theme.entry_exception, Style::default());
            assert_ne!(theme.border_focused, Style::default());
            assert_ne!(theme.status_connected, Style::default());
            assert!(!theme.identifier_palette.is_empty());
        }
    }

    #[test]
    fn entry_style_prefers_exception_over_sql() {
        let theme = Theme::load_default();
        let both = entry("log://svc", r#"{"exception":"x","sql":"y"}"#);
        assert_eq!(theme.entry_style(&both), theme.entry_exception);
        let sql = entry("log://svc", r#"{"sql":"y"}"#);
        assert_eq!(theme.entry_style(&sql), theme.entry_sql);
        let internal = entry("log://eos", r#"{"exception":"x"}"#);
        assert_eq!(theme.entry_style(&internal), theme.entry_internal);
    }

    #[test]
    fn identifier_style_is_stable() {
        let theme = Theme::load_default();
        assert_eq!(
            theme.identifier_style("billing-api"),
            theme.identifier_style("billing-api")
        );
    }

    #[test]
    fn unknown_theme_name_falls_back() {
        let theme = Theme::by_name("solarized");
        assert_eq!(theme.entry_sql, Theme::load_default().entry_sql);
    }

    #[test]
    fn parse_colors() {
        assert_eq!(parse_color("#ff0080"), Some(Color::Rgb(255, 0, 128)));
        assert_eq!(parse_color("indexed:42"), Some(Color::Indexed(42)));
        assert_eq!(parse_color("chartreuse"), None);
    }
}
