//! Lightweight markup parser and style stacks
//!
//! Grammar: `[L]`/`[C]`/`[R]` alignment blocks, `<b>`, `<u>`,
//! `<font size='...'>`, newlines; everything else is literal text.
//! The scan is a single left-to-right pass with no backtracking; nesting
//! is handled by four independent style stacks, not a parse tree.
//! Malformed input never aborts: unrecognized `[` sequences stay literal,
//! unknown `<...>` bodies are dropped, and a `<` with no closing `>`
//! turns the rest of the input into literal text.

use crate::encoder::{Align, EscPosTextEncoder, FontSize, Underline};

/// Stack with an implicit default below the bottom element
struct StyleStack<T: Copy> {
    items: Vec<T>,
    default: T,
}

impl<T: Copy> StyleStack<T> {
    fn new(default: T) -> Self {
        Self {
            items: Vec::new(),
            default,
        }
    }

    /// Push a value; returns the new effective top
    fn push(&mut self, value: T) -> T {
        self.items.push(value);
        value
    }

    /// Pop the top (no-op when already at the implicit bottom); returns
    /// the new effective top
    fn pop(&mut self) -> T {
        self.items.pop();
        self.items.last().copied().unwrap_or(self.default)
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// Per-session style stacks, one per independent axis
pub(crate) struct StyleState {
    align: StyleStack<Align>,
    bold: StyleStack<bool>,
    underline: StyleStack<Underline>,
    size: StyleStack<FontSize>,
}

impl StyleState {
    pub(crate) fn new() -> Self {
        Self {
            align: StyleStack::new(Align::Left),
            bold: StyleStack::new(false),
            underline: StyleStack::new(Underline::Off),
            size: StyleStack::new(FontSize::NORMAL),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.align.clear();
        self.bold.clear();
        self.underline.clear();
        self.size.clear();
    }
}

/// Walk `input` left to right, mutating the style stacks and appending
/// opcodes and encoded text to the session in document order.
pub(crate) fn render(encoder: &mut EscPosTextEncoder, input: &str) {
    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        if rest.starts_with('[') {
            i += alignment_tag(encoder, rest);
        } else if rest.starts_with('<') {
            match rest[1..].find('>') {
                Some(end) => {
                    let body = rest[1..1 + end].trim().to_ascii_lowercase();
                    styled_tag(encoder, &body);
                    i += end + 2;
                }
                None => {
                    // unterminated tag: the rest of the input is literal
                    encoder.text(rest);
                    break;
                }
            }
        } else if rest.starts_with('\n') {
            encoder.newline();
            i += 1;
        } else {
            // maximal run of plain text, encoded as one batch
            let end = rest.find(['[', '<', '\n']).unwrap_or(rest.len());
            encoder.text(&rest[..end]);
            i += end;
        }
    }
}

/// Handle a `[` at the start of `rest`; returns the bytes consumed.
fn alignment_tag(encoder: &mut EscPosTextEncoder, rest: &str) -> usize {
    if rest.starts_with("[L]") {
        push_align(encoder, Align::Left);
        3
    } else if rest.starts_with("[C]") {
        push_align(encoder, Align::Center);
        3
    } else if rest.starts_with("[R]") {
        push_align(encoder, Align::Right);
        3
    } else if rest.starts_with("[/L]") || rest.starts_with("[/C]") || rest.starts_with("[/R]") {
        // any closing alignment tag pops the top; the closer is not
        // matched against the opener
        pop_align(encoder);
        4
    } else {
        encoder.text("[");
        1
    }
}

/// Dispatch a trimmed, lowercased `<...>` tag body. Unknown bodies are
/// consumed without emitting anything.
fn styled_tag(encoder: &mut EscPosTextEncoder, body: &str) {
    match body {
        "b" => push_bold(encoder, true),
        "/b" => pop_bold(encoder),
        "u" => push_underline(encoder, Underline::Thin),
        "/u" => pop_underline(encoder),
        "/font" => pop_size(encoder),
        _ if body.starts_with("font") => push_size(encoder, font_size_attr(body)),
        _ => {}
    }
}

/// Extract the size attribute of a `font` tag body.
///
/// Accepts `size='big'`, `size="big"` and `size=big`; the value ends at
/// a quote or space. Unknown values and a missing attribute map to 1x1.
fn font_size_attr(body: &str) -> FontSize {
    let Some(pos) = body.find("size=") else {
        return FontSize::NORMAL;
    };
    let mut value = body[pos + 5..].trim_start();
    value = value.strip_prefix(['\'', '"']).unwrap_or(value);
    let end = value.find(['\'', '"', ' ']).unwrap_or(value.len());
    match &value[..end] {
        "big" | "large" => FontSize::new(2, 2),
        "tall" => FontSize::new(1, 2),
        "wide" => FontSize::new(2, 1),
        _ => FontSize::NORMAL,
    }
}

// Every push and pop re-emits the opcode for the new effective top, so
// the physical printer state always matches the logical stack top.

fn push_align(encoder: &mut EscPosTextEncoder, align: Align) {
    let top = encoder.styles.align.push(align);
    encoder.align(top);
}

fn pop_align(encoder: &mut EscPosTextEncoder) {
    let top = encoder.styles.align.pop();
    encoder.align(top);
}

fn push_bold(encoder: &mut EscPosTextEncoder, on: bool) {
    let top = encoder.styles.bold.push(on);
    encoder.bold(top);
}

fn pop_bold(encoder: &mut EscPosTextEncoder) {
    let top = encoder.styles.bold.pop();
    encoder.bold(top);
}

fn push_underline(encoder: &mut EscPosTextEncoder, mode: Underline) {
    let top = encoder.styles.underline.push(mode);
    encoder.underline(top);
}

fn pop_underline(encoder: &mut EscPosTextEncoder) {
    let top = encoder.styles.underline.pop();
    encoder.underline(top);
}

fn push_size(encoder: &mut EscPosTextEncoder, size: FontSize) {
    let top = encoder.styles.size.push(size);
    encoder.font_size(top);
}

fn pop_size(encoder: &mut EscPosTextEncoder) {
    let top = encoder.styles.size.pop();
    encoder.font_size(top);
}
