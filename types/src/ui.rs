//! UI state types shared by the engine (state ownership) and tui (rendering/input).
//!
//! Pure data types with no IO, no async, no ratatui dependency.

use crate::FormField;

/// UI configuration options derived from config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    /// Use ASCII-only glyphs for icons and the spinner.
    pub ascii_only: bool,
    pub high_contrast: bool,
}

/// Which form control receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormFocus {
    #[default]
    Name,
    Email,
    Role,
    Submit,
}

impl FormFocus {
    const ORDER: [FormFocus; 4] = [
        FormFocus::Name,
        FormFocus::Email,
        FormFocus::Role,
        FormFocus::Submit,
    ];

    #[must_use]
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = self.index();
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// The draft field behind this control, if it edits one.
    #[must_use]
    pub const fn field(self) -> Option<FormField> {
        match self {
            FormFocus::Name => Some(FormField::Name),
            FormFocus::Email => Some(FormField::Email),
            FormFocus::Role => Some(FormField::Role),
            FormFocus::Submit => None,
        }
    }

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|f| *f == self)
            .unwrap_or_default()
    }
}

impl From<FormField> for FormFocus {
    fn from(field: FormField) -> Self {
        match field {
            FormField::Name => FormFocus::Name,
            FormField::Email => FormFocus::Email,
            FormField::Role => FormFocus::Role,
        }
    }
}
