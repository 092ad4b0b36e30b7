//! Code page registry for ESC/POS printers
//!
//! Maps logical code page names to:
//! - The `ESC t n` selector bytes that activate the page on the printer
//! - The character encoding that turns text into the matching 8-bit bytes
//!
//! DOS/OEM pages (CP437, CP850, ...) use the portable single-byte tables
//! from `oem_cp`; Windows and ISO pages go through `encoding_rs`. The
//! registry is built once and never mutated, so lookups need no locking.

use std::fmt;
use std::sync::OnceLock;

use encoding_rs::Encoding;
use oem_cp::code_table::{
    ENCODING_TABLE_CP437, ENCODING_TABLE_CP720, ENCODING_TABLE_CP737, ENCODING_TABLE_CP775,
    ENCODING_TABLE_CP850, ENCODING_TABLE_CP852, ENCODING_TABLE_CP855, ENCODING_TABLE_CP857,
    ENCODING_TABLE_CP858, ENCODING_TABLE_CP860, ENCODING_TABLE_CP861, ENCODING_TABLE_CP862,
    ENCODING_TABLE_CP863, ENCODING_TABLE_CP864, ENCODING_TABLE_CP865, ENCODING_TABLE_CP866,
    ENCODING_TABLE_CP869,
};
use oem_cp::{encode_string_checked, encode_string_lossy, OEMCPHashMap};
use tracing::warn;

/// How a charset turns text into printer bytes
enum Codec {
    /// Single-byte DOS/OEM code page table
    Oem(&'static OEMCPHashMap<char, u8>),
    /// Windows or ISO code page via encoding_rs
    Ansi(&'static Encoding),
}

/// One registered code page
///
/// Immutable after registration; all accessors borrow `&'static` data.
pub struct Charset {
    name: &'static str,
    selector: [u8; 3],
    codec: Codec,
}

impl Charset {
    fn oem(name: &'static str, page: u8, table: &'static OEMCPHashMap<char, u8>) -> Self {
        Self {
            name,
            selector: [0x1B, 0x74, page],
            codec: Codec::Oem(table),
        }
    }

    fn ansi(name: &'static str, page: u8, encoding: &'static Encoding) -> Self {
        Self {
            name,
            selector: [0x1B, 0x74, page],
            codec: Codec::Ansi(encoding),
        }
    }

    /// Case-insensitive lookup key
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The `ESC t n` opcode that selects this code page
    pub fn selector_bytes(&self) -> &[u8] {
        &self.selector
    }

    /// Encode text as printer bytes for this code page.
    ///
    /// Fallback chain: strict encode, then lossy encode (unmappable
    /// characters become `?`), then raw UTF-8 for the whole run. A bad
    /// character never aborts the document.
    pub fn encode_text(&self, text: &str) -> Vec<u8> {
        if let Some(bytes) = self.encode_strict(text) {
            return bytes;
        }
        match self.encode_lossy(text) {
            Some(bytes) => {
                warn!(charset = self.name, "text not fully representable, encoded lossily");
                bytes
            }
            None => {
                warn!(charset = self.name, "lossy encode failed, falling back to UTF-8");
                text.as_bytes().to_vec()
            }
        }
    }

    fn encode_strict(&self, text: &str) -> Option<Vec<u8>> {
        match self.codec {
            Codec::Oem(table) => encode_string_checked(text, table),
            Codec::Ansi(encoding) => {
                let (bytes, _, unmappable) = encoding.encode(text);
                if unmappable {
                    None
                } else {
                    Some(bytes.into_owned())
                }
            }
        }
    }

    fn encode_lossy(&self, text: &str) -> Option<Vec<u8>> {
        match self.codec {
            Codec::Oem(table) => Some(encode_string_lossy(text, table)),
            Codec::Ansi(encoding) => {
                let mut out = Vec::with_capacity(text.len());
                let mut utf8 = [0u8; 4];
                for ch in text.chars() {
                    let (bytes, _, unmappable) = encoding.encode(ch.encode_utf8(&mut utf8));
                    if unmappable {
                        out.push(b'?');
                    } else {
                        out.extend_from_slice(&bytes);
                    }
                }
                Some(out)
            }
        }
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name)
    }
}

static REGISTRY: OnceLock<Vec<Charset>> = OnceLock::new();

/// All registered code pages, Epson `ESC t` page assignments.
///
/// CP437 comes first: it is the registry default.
fn registry() -> &'static [Charset] {
    REGISTRY.get_or_init(|| {
        vec![
            Charset::oem("CP437", 0, &ENCODING_TABLE_CP437),
            Charset::oem("CP850", 2, &ENCODING_TABLE_CP850),
            Charset::oem("CP860", 3, &ENCODING_TABLE_CP860),
            Charset::oem("CP863", 4, &ENCODING_TABLE_CP863),
            Charset::oem("CP865", 5, &ENCODING_TABLE_CP865),
            Charset::oem("CP857", 13, &ENCODING_TABLE_CP857),
            Charset::oem("CP737", 14, &ENCODING_TABLE_CP737),
            Charset::ansi("ISO8859-7", 15, encoding_rs::ISO_8859_7),
            Charset::ansi("CP1252", 16, encoding_rs::WINDOWS_1252),
            Charset::oem("CP866", 17, &ENCODING_TABLE_CP866),
            Charset::oem("CP852", 18, &ENCODING_TABLE_CP852),
            Charset::oem("CP858", 19, &ENCODING_TABLE_CP858),
            Charset::oem("CP720", 32, &ENCODING_TABLE_CP720),
            Charset::oem("CP775", 33, &ENCODING_TABLE_CP775),
            Charset::oem("CP855", 34, &ENCODING_TABLE_CP855),
            Charset::oem("CP861", 35, &ENCODING_TABLE_CP861),
            Charset::oem("CP862", 36, &ENCODING_TABLE_CP862),
            Charset::oem("CP864", 37, &ENCODING_TABLE_CP864),
            Charset::oem("CP869", 38, &ENCODING_TABLE_CP869),
            Charset::ansi("ISO8859-2", 39, encoding_rs::ISO_8859_2),
            Charset::ansi("ISO8859-15", 40, encoding_rs::ISO_8859_15),
            Charset::ansi("CP1250", 45, encoding_rs::WINDOWS_1250),
            Charset::ansi("CP1251", 46, encoding_rs::WINDOWS_1251),
            Charset::ansi("CP1253", 47, encoding_rs::WINDOWS_1253),
            Charset::ansi("CP1254", 48, encoding_rs::WINDOWS_1254),
            Charset::ansi("CP1255", 49, encoding_rs::WINDOWS_1255),
            Charset::ansi("CP1256", 50, encoding_rs::WINDOWS_1256),
            Charset::ansi("CP1257", 51, encoding_rs::WINDOWS_1257),
            Charset::ansi("CP1258", 52, encoding_rs::WINDOWS_1258),
        ]
    })
}

/// All registered code pages
pub fn all() -> &'static [Charset] {
    registry()
}

/// Find a code page by name (case-insensitive, exact).
///
/// Returns `None` when nothing matches; the caller decides whether to fall
/// back to [`default`] or surface the miss.
pub fn lookup(name: &str) -> Option<&'static Charset> {
    registry()
        .iter()
        .find(|charset| charset.name.eq_ignore_ascii_case(name))
}

/// The code page used when no explicit selection occurs (CP437).
pub fn default() -> &'static Charset {
    &registry()[0]
}
