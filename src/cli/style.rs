//! CLI styling utilities
//!
//! Semantic styling via the [`Stylize`] trait; color support detection
//! (`NO_COLOR`, `CLICOLOR`, TTY) is delegated to `owo-colors`.
//!
//! The merge summary goes to stderr so stdout stays machine-readable JSON,
//! which is why every style here targets the stderr stream.

use std::fmt::{self, Display};

use owo_colors::{OwoColorize, Stream, Style};

const ACCENT: Style = Style::new().cyan();
const SUCCESS: Style = Style::new().green();
const ERROR: Style = Style::new().red();
const WARN: Style = Style::new().yellow();
const MUTED: Style = Style::new().dimmed();

/// A value with semantic styling applied.
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    style: Style,
}

impl<T> Styled<T> {
    const fn new(value: T, style: Style) -> Self {
        Self { value, style }
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.value
                .if_supports_color(Stream::Stderr, |v| v.style(self.style))
        )
    }
}

/// Extension trait for semantic terminal styling.
pub trait Stylize: Display {
    /// Cyan, for repos, PR numbers, SHAs
    fn accent(&self) -> Styled<&Self> {
        Styled::new(self, ACCENT)
    }

    /// Green, for completed merges
    fn success(&self) -> Styled<&Self> {
        Styled::new(self, SUCCESS)
    }

    /// Red, for failures
    fn error(&self) -> Styled<&Self> {
        Styled::new(self, ERROR)
    }

    /// Yellow, for not-ready and partial states
    fn warn(&self) -> Styled<&Self> {
        Styled::new(self, WARN)
    }

    /// Dim, for hints
    fn muted(&self) -> Styled<&Self> {
        Styled::new(self, MUTED)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Green checkmark
pub const fn check() -> Styled<&'static str> {
    Styled::new("✓", SUCCESS)
}

/// Red cross
pub const fn cross() -> Styled<&'static str> {
    Styled::new("✗", ERROR)
}
