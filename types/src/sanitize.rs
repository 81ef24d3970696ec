//! Terminal text sanitization for backend-provided strings.
//!
//! User names, emails and status fields come from the backend and end up
//! drawn straight into the terminal. A value carrying escape sequences could
//! move the cursor, retitle the window or write to the clipboard (OSC 52), so
//! everything remote goes through here before rendering.

use std::borrow::Cow;
use std::iter::Peekable;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Strip escape sequences and control characters, keeping `\n`, `\t` and `\r`.
///
/// Returns `Cow::Borrowed` when the input is already clean.
///
/// ```
/// use userdash_types::sanitize_terminal_text;
///
/// assert_eq!(sanitize_terminal_text("Alice"), "Alice");
/// assert_eq!(sanitize_terminal_text("Al\x1b[2Jice"), "Alice");
/// ```
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unsafe) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => skip_escape_sequence(&mut chars),
            C1_CSI => skip_csi(&mut chars),
            '\n' | '\t' | '\r' => out.push(c),
            c if is_control(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Like [`sanitize_terminal_text`], but also folds line breaks and tabs into
/// spaces so the value fits a single row of a card.
#[must_use]
pub fn sanitize_single_line(input: &str) -> Cow<'_, str> {
    let clean = sanitize_terminal_text(input);
    if clean.contains(['\n', '\t', '\r']) {
        Cow::Owned(clean.replace(['\n', '\t', '\r'], " "))
    } else {
        clean
    }
}

fn is_control(c: char) -> bool {
    c <= '\x1f' || c == '\x7f' || ('\u{0080}'..='\u{009f}').contains(&c)
}

fn is_unsafe(c: char) -> bool {
    is_control(c) && !matches!(c, '\n' | '\t' | '\r')
}

fn skip_escape_sequence<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    let Some(&next) = chars.peek() else {
        return;
    };
    match next {
        '[' => {
            chars.next();
            skip_csi(chars);
        }
        ']' => {
            chars.next();
            skip_string(chars, true);
        }
        'P' | '^' | '_' => {
            chars.next();
            skip_string(chars, false);
        }
        '(' | ')' | '*' | '+' | '#' | ' ' => {
            chars.next();
            chars.next();
        }
        '7' | '8' | 'c' | 'D' | 'E' | 'H' | 'M' | 'N' | 'O' | 'Z' | '=' | '>' | '<' => {
            chars.next();
        }
        _ => {}
    }
}

/// CSI: parameter and intermediate bytes (0x20-0x3F) up to a final byte (0x40-0x7E).
fn skip_csi<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(&c) = chars.peek() {
        if ('\x40'..='\x7e').contains(&c) {
            chars.next();
            return;
        }
        if !('\x20'..='\x3f').contains(&c) {
            return;
        }
        chars.next();
    }
}

/// OSC/DCS/PM/APC bodies run until ST (`ESC \`); OSC may also end at BEL.
fn skip_string<I: Iterator<Item = char>>(chars: &mut Peekable<I>, bel_terminates: bool) {
    while let Some(c) = chars.next() {
        if c == BEL && bel_terminates {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}
