//! Terminal text sanitization for display.
//!
//! Contact names, chat text and relay payloads are typed by the user or read back
//! from storage. Any of them may carry escape sequences that would move the cursor
//! or repaint the panel, so they pass through [`sanitize_terminal_text`] before
//! rendering.

use std::borrow::Cow;
use std::iter::Peekable;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Strip escape sequences and control characters, keeping `\n` and `\t`.
///
/// Returns `Cow::Borrowed` when the input is already clean.
///
/// ```
/// use gate_types::sanitize_terminal_text;
///
/// assert_eq!(sanitize_terminal_text("Ana"), "Ana");
/// assert_eq!(sanitize_terminal_text("A\x1b[2Jna"), "Ana");
/// ```
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_stripped) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => skip_escape(&mut chars),
            C1_CSI => skip_csi(&mut chars),
            c if is_stripped(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    match c {
        '\n' | '\t' => false,
        '\x00'..='\x1f' | '\x7f' | '\u{0080}'..='\u{009f}' => true,
        _ => false,
    }
}

fn skip_escape<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            skip_csi(chars);
        }
        Some(']' | 'P' | '^' | '_') => {
            chars.next();
            skip_string(chars);
        }
        Some(_) => {
            chars.next();
        }
        None => {}
    }
}

/// Parameter and intermediate bytes, then one final byte in `@`..=`~`.
fn skip_csi<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(&c) = chars.peek() {
        if ('\x20'..='\x3f').contains(&c) {
            chars.next();
        } else {
            if ('\x40'..='\x7e').contains(&c) {
                chars.next();
            }
            return;
        }
    }
}

/// OSC/DCS/PM/APC bodies end at BEL or ST (`ESC \`).
fn skip_string<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::sanitize_terminal_text;

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(sanitize_terminal_text("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn strips_csi_and_osc() {
        assert_eq!(sanitize_terminal_text("a\x1b[31mb\x1b[0m"), "ab");
        assert_eq!(
            sanitize_terminal_text("x\x1b]8;;http://evil\x07link\x1b]8;;\x1b\\y"),
            "xlinky"
        );
    }

    #[test]
    fn keeps_newlines_and_tabs() {
        assert_eq!(sanitize_terminal_text("a\n\tb\r\x07"), "a\n\tb");
    }

    #[test]
    fn strips_c1_csi() {
        assert_eq!(sanitize_terminal_text("a\u{009b}2Jb"), "ab");
    }
}
