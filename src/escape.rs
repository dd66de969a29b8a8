//! Escape-code reading and command parsing for the outgoing message stream.
//!
//! The host's message pipeline hands us the escape code it just scanned plus
//! the text buffer and cursor; we consume the bracketed argument list and
//! produce a tagged [`MessageCommand`] for the stage to apply. Tokens we do
//! not recognize are left untouched for the host's default handling.

use crate::stage::{Slot, SlotSelector};

// ── Argument reader ──────────────────────────────────────────────────────────

/// Read a bracket-delimited, comma-separated argument list at `cursor`.
///
/// Returns an empty list unless the byte at `cursor` is `[`. Brackets may
/// nest; an unbalanced list is consumed to the end of the buffer without
/// error. Each argument is trimmed and has one leading and one trailing
/// quote character (`'` or `"`) stripped. On return the cursor sits just
/// past the consumed `]`.
pub fn read_args(text: &str, cursor: &mut usize) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut i = *cursor;
    if bytes.get(i) != Some(&b'[') {
        return Vec::new();
    }
    i += 1;
    let start = i;
    let mut depth = 1usize;
    while i < bytes.len() && depth > 0 {
        match bytes[i] {
            b'[' => depth += 1,
            b']' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    // The closing `]` (or, for unbalanced input, the final byte) is excluded
    // from the raw argument text.
    let end = i.saturating_sub(1).max(start);
    let raw = &text[start..end];
    *cursor = i;

    raw.split(',').map(|tok| strip_quotes(tok.trim()).to_string()).collect()
}

/// Strip at most one leading and one trailing quote character, independently.
fn strip_quotes(token: &str) -> &str {
    let token = token.strip_prefix(['\'', '"']).unwrap_or(token);
    token.strip_suffix(['\'', '"']).unwrap_or(token)
}

// ── Commands ─────────────────────────────────────────────────────────────────

/// Parsed portrait directive from the message stream.
///
/// `Noop` marks a directive we recognized (its arguments were consumed) that
/// resolves to nothing — a missing asset name, an invalid slot token. Bad
/// in-stream scripting degrades to "nothing happens", never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageCommand {
    Show { asset: String, slot: Slot },
    Hide { slots: Vec<Slot> },
    Focus { slot: Option<Slot> },
    Noop,
}

/// Parse one escape directive.
///
/// Returns `None` — cursor untouched — when `code` is not one of ours, so
/// the host's own escape handling still sees the token. Codes and slot
/// tokens are case-insensitive.
pub fn parse_command(code: &str, text: &str, cursor: &mut usize) -> Option<MessageCommand> {
    if code.eq_ignore_ascii_case("SHOW") {
        let args = read_args(text, cursor);
        Some(parse_show(&args))
    } else if code.eq_ignore_ascii_case("HIDE") {
        let args = read_args(text, cursor);
        Some(parse_hide(&args))
    } else if code.eq_ignore_ascii_case("FOCUS") {
        let args = read_args(text, cursor);
        Some(parse_focus(&args))
    } else {
        None
    }
}

fn parse_show(args: &[String]) -> MessageCommand {
    let asset = args.first().map(String::as_str).unwrap_or("");
    if asset.is_empty() {
        return MessageCommand::Noop;
    }
    // The slot defaults to Center only when the argument is absent; an
    // explicit-but-invalid token (including ALL) drops the directive.
    let slot = match args.get(1) {
        None => Slot::Center,
        Some(token) => match Slot::parse(token) {
            Some(slot) => slot,
            None => return MessageCommand::Noop,
        },
    };
    MessageCommand::Show { asset: asset.to_string(), slot }
}

fn parse_hide(args: &[String]) -> MessageCommand {
    let mut slots: Vec<Slot> = Vec::new();
    for token in args {
        match SlotSelector::parse(token) {
            Some(SlotSelector::All) => {
                return MessageCommand::Hide { slots: Slot::ALL.to_vec() };
            }
            Some(SlotSelector::One(slot)) => {
                if !slots.contains(&slot) {
                    slots.push(slot);
                }
            }
            None => {}
        }
    }
    if slots.is_empty() {
        slots.push(Slot::Center);
    }
    MessageCommand::Hide { slots }
}

fn parse_focus(args: &[String]) -> MessageCommand {
    let token = args.first().map(String::as_str).unwrap_or("");
    if token.is_empty() || token.eq_ignore_ascii_case("OFF") || token.eq_ignore_ascii_case("ALL") {
        return MessageCommand::Focus { slot: None };
    }
    match Slot::parse(token) {
        Some(slot) => MessageCommand::Focus { slot: Some(slot) },
        None => MessageCommand::Noop,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_requires_open_bracket() {
        let mut cursor = 0;
        assert!(read_args("no brackets", &mut cursor).is_empty());
        assert_eq!(cursor, 0, "cursor untouched without a bracket");
    }

    #[test]
    fn reader_splits_trims_and_advances() {
        let text = "[Hero, L]more text";
        let mut cursor = 0;
        let args = read_args(text, &mut cursor);
        assert_eq!(args, vec!["Hero", "L"]);
        assert_eq!(&text[cursor..], "more text");
    }

    #[test]
    fn reader_strips_one_quote_layer() {
        let mut cursor = 0;
        let args = read_args(r#"["Hero",'L',"'x'"]"#, &mut cursor);
        assert_eq!(args, vec!["Hero", "L", "'x'"]);
    }

    #[test]
    fn reader_handles_nested_brackets() {
        let mut cursor = 0;
        let args = read_args("[a[b]c, d]rest", &mut cursor);
        assert_eq!(args, vec!["a[b]c", "d"]);
    }

    #[test]
    fn reader_consumes_unbalanced_input_to_end() {
        let text = "[never closed";
        let mut cursor = 0;
        let args = read_args(text, &mut cursor);
        assert_eq!(cursor, text.len());
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn reader_empty_list_yields_single_empty_token() {
        let mut cursor = 0;
        assert_eq!(read_args("[]", &mut cursor), vec![""]);
        assert_eq!(cursor, 2);
    }

    #[test]
    fn strip_quotes_is_single_layer_and_independent() {
        assert_eq!(strip_quotes("\"a\""), "a");
        assert_eq!(strip_quotes("''b''"), "'b'");
        assert_eq!(strip_quotes("\"c'"), "c");
        assert_eq!(strip_quotes("d"), "d");
    }
}
