//! Terminal styling and color detection.

/// ANSI escape codes used by the text renderer.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";
    /// Bold white for headings and building names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary details (floors, numbering).
    pub const GRAY: &str = "\x1b[90m";
    /// Bold reverse cyan for INDR badges.
    pub const TAG_INDOOR: &str = "\x1b[1;7;36m";
    /// Bold reverse green for OUTD badges.
    pub const TAG_OUTDOOR: &str = "\x1b[1;7;32m";
    /// Magenta for the arrival line.
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Resolved color codes, or empty strings when color is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub heading: &'static str,
    pub muted: &'static str,
    pub tag_indoor: &'static str,
    pub tag_outdoor: &'static str,
    pub arrival: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            heading: colors::WHITE_BOLD,
            muted: colors::GRAY,
            tag_indoor: colors::TAG_INDOOR,
            tag_outdoor: colors::TAG_OUTDOOR,
            arrival: colors::MAGENTA,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            heading: "",
            muted: "",
            tag_indoor: "",
            tag_outdoor: "",
            arrival: "",
        }
    }

    /// `colored()` when the terminal supports ANSI colors, `plain()` otherwise.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI colors should be emitted.
///
/// Honours `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}
