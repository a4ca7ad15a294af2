//! Placeholder tokens marking where a block sat in the display stream.

const PREFIX: &str = "[[block:";
const SUFFIX: &str = "]]";

/// Token inserted into display text for the block with this ordinal.
pub fn placeholder(ordinal: usize) -> String {
    format!("{PREFIX}{ordinal}{SUFFIX}")
}

/// A piece of display text: plain text, or the slot for a block ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Block(usize),
}

/// Split display text into text runs and block slots, in order.
///
/// Anything that looks like a placeholder but does not carry a decimal
/// ordinal stays text.
pub fn split_display(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(PREFIX) {
        let token_start = cursor + found;
        let digits_start = token_start + PREFIX.len();
        let parsed = text[digits_start..].find(SUFFIX).and_then(|len| {
            let digits = &text[digits_start..digits_start + len];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                digits
                    .parse::<usize>()
                    .ok()
                    .map(|ordinal| (ordinal, digits_start + len + SUFFIX.len()))
            } else {
                None
            }
        });

        match parsed {
            Some((ordinal, token_end)) => {
                if token_start > text_start {
                    segments.push(Segment::Text(&text[text_start..token_start]));
                }
                segments.push(Segment::Block(ordinal));
                text_start = token_end;
                cursor = token_end;
            }
            None => cursor = digits_start,
        }
    }

    if text_start < text.len() {
        segments.push(Segment::Text(&text[text_start..]));
    }
    segments
}
