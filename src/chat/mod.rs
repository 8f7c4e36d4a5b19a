//! Chat pipeline.
//!
//! Inbound: structured payload → best rendering → flatten → clean → line.
//! Outbound: console line → control word or [`Outbound`] → safety filter →
//! [`Wire`] encoding for the session's version.
//!
//! # Inbound Rendering Order
//!
//! | Priority | Source                                    | Output             |
//! |----------|-------------------------------------------|--------------------|
//! | 1        | `translate: "chat.type.text"`, 2+ args    | `[sender] body`    |
//! | 2        | Plain rendering from the protocol layer   | as is              |
//! | 3        | Flattened tree (`text`, `extra`, arrays)  | concatenated text  |
//!
//! Formatting codes (`§` + style character) are stripped, or rendered as
//! ANSI escapes when colors are enabled. Whitespace runs collapse to one
//! space; empty results are dropped.

mod decode;
mod encode;
mod format;

pub use decode::{flatten, kick_reason, Decoder, CHAT_TRANSLATION, MAX_DEPTH, UNKNOWN_REASON};
pub use encode::{ConsoleCommand, Outbound, Wire};
pub use format::{collapse_whitespace, color_code, render_ansi, strip_codes, SECTION};
