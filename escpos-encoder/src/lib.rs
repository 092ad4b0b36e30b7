//! # escpos-encoder
//!
//! Formatted-text to ESC/POS encoder - text formatting and charset
//! selection only.
//!
//! ## Scope
//!
//! This crate turns a human-authored string with lightweight markup into
//! the exact ESC/POS byte sequence that reproduces the formatting on a
//! thermal receipt printer:
//! - `[L]`, `[C]`, `[R]` alignment blocks (closed by `[/L]`/`[/C]`/`[/R]`)
//! - `<b>`, `<u>` style toggles
//! - `<font size='big'|'tall'|'wide'>` character sizing
//! - Code page selection with per-page text encoding (CP437, CP850,
//!   CP1252, ...) and lossy fallback for unencodable characters
//!
//! Delivering the bytes is the caller's job: transports (TCP, Bluetooth,
//! accessory streams) stay outside this crate, which performs no I/O.
//!
//! ## Example
//!
//! ```
//! use escpos_encoder::EscPosTextEncoder;
//!
//! let mut encoder = EscPosTextEncoder::with_charset_name("CP437")?;
//! let bytes = encoder.encode("[C]<b>KITCHEN</b>[/C]\nTable: 12\n");
//! // hand `bytes` to your transport, verbatim and in order
//! assert!(bytes.starts_with(&[0x1B, 0x40]));
//! # Ok::<(), escpos_encoder::EncodeError>(())
//! ```

pub mod charset;
mod encoder;
mod error;
mod markup;

// Re-exports
pub use charset::Charset;
pub use encoder::{Align, EscPosTextEncoder, FontSize, Underline};
pub use error::{EncodeError, EncodeResult};
