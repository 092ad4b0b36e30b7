//! ESC/POS text encoder session
//!
//! Owns the output byte buffer; every opcode emission and text encoding
//! funnels through it. [`EscPosTextEncoder::encode`] is the main entry
//! point; the lower-level methods support incremental use.

use tracing::{debug, instrument};

use crate::charset::{self, Charset};
use crate::error::{EncodeError, EncodeResult};
use crate::markup::{self, StyleState};

/// Text alignment (`ESC a n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub(crate) fn operand(self) -> u8 {
        match self {
            Align::Left => 0x00,
            Align::Center => 0x01,
            Align::Right => 0x02,
        }
    }
}

/// Underline mode (`ESC - n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Underline {
    #[default]
    Off,
    Thin,
    Thick,
}

impl Underline {
    pub(crate) fn operand(self) -> u8 {
        match self {
            Underline::Off => 0x00,
            Underline::Thin => 0x01,
            Underline::Thick => 0x02,
        }
    }
}

/// Character size multipliers (`GS ! n`)
///
/// Width and height multipliers are clamped to 1..=8, the range the
/// opcode operand can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSize {
    width: u8,
    height: u8,
}

impl FontSize {
    /// 1x1, the printer default
    pub const NORMAL: FontSize = FontSize {
        width: 1,
        height: 1,
    };

    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width: width.clamp(1, 8),
            height: height.clamp(1, 8),
        }
    }

    pub(crate) fn operand(self) -> u8 {
        ((self.width - 1) << 4) | (self.height - 1)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Formatted-text to ESC/POS encoder
///
/// Single-use per document: one [`encode`](Self::encode) call turns one
/// formatted string into a finished byte buffer. The session can be
/// reused for an independent document by calling `encode` again, which
/// re-establishes the initial reset state. Not meant to be shared across
/// threads; concurrent callers should use independent sessions.
pub struct EscPosTextEncoder {
    buf: Vec<u8>,
    charset: &'static Charset,
    pub(crate) styles: StyleState,
}

impl EscPosTextEncoder {
    /// Create a session with the default charset (CP437)
    pub fn new() -> Self {
        Self::with_charset(charset::default())
    }

    /// Create a session with an explicit charset.
    ///
    /// The fresh buffer starts with the charset selector: every new
    /// document declares its code page.
    pub fn with_charset(charset: &'static Charset) -> Self {
        let mut encoder = Self {
            buf: Vec::with_capacity(4096),
            charset,
            styles: StyleState::new(),
        };
        encoder.select_charset();
        encoder
    }

    /// Create a session from a charset name (case-insensitive)
    pub fn with_charset_name(name: &str) -> EncodeResult<Self> {
        let charset =
            charset::lookup(name).ok_or_else(|| EncodeError::UnknownCharset(name.to_string()))?;
        Ok(Self::with_charset(charset))
    }

    /// The active charset
    pub fn charset(&self) -> &'static Charset {
        self.charset
    }

    /// Switch the active charset mid-document.
    ///
    /// Appends the new selector at the current position; text already in
    /// the buffer is not re-encoded.
    pub fn set_charset(&mut self, charset: &'static Charset) -> &mut Self {
        self.charset = charset;
        self.select_charset();
        self
    }

    fn select_charset(&mut self) {
        self.buf.extend_from_slice(self.charset.selector_bytes());
    }

    /// Clear the buffer and style stacks and re-emit the document
    /// preamble: hardware reset (ESC @) then the charset selector.
    pub fn reset(&mut self) -> &mut Self {
        self.buf.clear();
        self.styles.clear();
        self.buf.extend_from_slice(&[0x1B, 0x40]);
        self.select_charset();
        self
    }

    // === Text Output ===

    /// Append text encoded with the active charset
    pub fn text(&mut self, s: &str) -> &mut Self {
        let bytes = self.charset.encode_text(s);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Append text followed by a line feed
    pub fn text_line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.newline()
    }

    /// Append a line feed
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(0x0A);
        self
    }

    /// Append multiple line feeds
    pub fn newlines(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.buf.push(0x0A);
        }
        self
    }

    // === Text Style ===

    /// Bold on/off (`ESC E n`)
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, on as u8]);
        self
    }

    /// Underline mode (`ESC - n`)
    pub fn underline(&mut self, mode: Underline) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x2D, mode.operand()]);
        self
    }

    /// Alignment (`ESC a n`)
    pub fn align(&mut self, align: Align) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, align.operand()]);
        self
    }

    /// Character size (`GS ! n`)
    pub fn font_size(&mut self, size: FontSize) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, size.operand()]);
        self
    }

    // === Paper Control ===

    /// Cut paper (full cut, `GS V 0`)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    /// Partial cut (`GS V 1`, leaves a small connection)
    pub fn cut_partial(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x01]);
        self
    }

    // === Output ===

    /// Snapshot of the current buffer
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// Encode one formatted string into a finished ESC/POS byte buffer.
    ///
    /// Supported markup: `[L]`/`[C]`/`[R]` alignment blocks, `<b>`, `<u>`,
    /// `<font size='big'|'tall'|'wide'>`, closed by `[/…]` and `</…>`.
    /// Malformed or unknown tags degrade to literal text or are dropped;
    /// encoding never fails.
    ///
    /// The output always starts with ESC @ plus the charset selector and
    /// always ends with bold off, underline off, size 1x1 and left
    /// alignment, so no style leaks into the next job on the same channel.
    /// Deterministic: identical input yields byte-identical output.
    #[instrument(skip_all)]
    pub fn encode(&mut self, formatted: &str) -> Vec<u8> {
        self.reset();
        markup::render(self, formatted);
        self.bold(false);
        self.underline(Underline::Off);
        self.font_size(FontSize::NORMAL);
        self.align(Align::Left);
        debug!(bytes = self.buf.len(), "encode complete");
        self.buf.clone()
    }
}

impl Default for EscPosTextEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset;

    #[test]
    fn new_session_declares_its_codepage() {
        let encoder = EscPosTextEncoder::new();
        assert_eq!(encoder.data(), &[0x1B, 0x74, 0x00]);
    }

    #[test]
    fn empty_document_is_preamble_plus_defaults() {
        let mut encoder = EscPosTextEncoder::new();
        let bytes = encoder.encode("");
        assert_eq!(
            bytes,
            vec![
                0x1B, 0x40, // ESC @
                0x1B, 0x74, 0x00, // ESC t 0 (CP437)
                0x1B, 0x45, 0x00, // bold off
                0x1B, 0x2D, 0x00, // underline off
                0x1D, 0x21, 0x00, // size 1x1
                0x1B, 0x61, 0x00, // align left
            ]
        );
    }

    #[test]
    fn encode_is_deterministic() {
        let mut encoder = EscPosTextEncoder::new();
        let first = encoder.encode("[C]<b>Hi</b>[/C]\n");
        let second = encoder.encode("[C]<b>Hi</b>[/C]\n");
        assert_eq!(first, second);
    }

    #[test]
    fn set_charset_appends_selector_in_place() {
        let mut encoder = EscPosTextEncoder::new();
        encoder.text("a");
        encoder.set_charset(charset::lookup("CP1252").unwrap());
        encoder.text("b");
        assert_eq!(encoder.data(), &[0x1B, 0x74, 0x00, b'a', 0x1B, 0x74, 16, b'b']);
    }

    #[test]
    fn charset_survives_reencode() {
        let mut encoder = EscPosTextEncoder::with_charset_name("cp858").unwrap();
        let bytes = encoder.encode("x");
        assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 19]);
    }

    #[test]
    fn unknown_charset_name_is_an_error() {
        assert!(matches!(
            EscPosTextEncoder::with_charset_name("nonexistent"),
            Err(EncodeError::UnknownCharset(name)) if name == "nonexistent"
        ));
    }

    #[test]
    fn partial_cut_emits_its_own_opcode() {
        let mut encoder = EscPosTextEncoder::new();
        encoder.cut_partial();
        assert!(encoder.data().ends_with(&[0x1D, 0x56, 0x01]));
    }

    #[test]
    fn unclosed_tags_still_restore_defaults() {
        let mut encoder = EscPosTextEncoder::new();
        let bytes = encoder.encode("<b>[C]<font size='big'>loud");
        let tail = &bytes[bytes.len() - 12..];
        assert_eq!(
            tail,
            &[0x1B, 0x45, 0x00, 0x1B, 0x2D, 0x00, 0x1D, 0x21, 0x00, 0x1B, 0x61, 0x00]
        );
    }

    #[test]
    fn font_size_operand_packs_multipliers() {
        assert_eq!(FontSize::new(2, 2).operand(), 0x11);
        assert_eq!(FontSize::new(1, 2).operand(), 0x01);
        assert_eq!(FontSize::new(2, 1).operand(), 0x10);
        assert_eq!(FontSize::new(8, 8).operand(), 0x77);
        // out-of-range multipliers clamp instead of overflowing
        assert_eq!(FontSize::new(0, 9).operand(), 0x07);
    }

    #[test]
    fn incremental_api_emits_raw_opcodes() {
        let mut encoder = EscPosTextEncoder::new();
        encoder
            .reset()
            .align(Align::Center)
            .bold(true)
            .text_line("TOTAL")
            .bold(false)
            .newlines(2)
            .cut();
        let data = encoder.data();
        assert!(data.ends_with(&[0x0A, 0x0A, 0x1D, 0x56, 0x00]));
        assert_eq!(&data[..5], &[0x1B, 0x40, 0x1B, 0x74, 0x00]);
    }
}
