#![deny(unused_must_use)]
#![forbid(unsafe_code)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]
#![doc = "A parser for Psion Series 3 Word documents, producing plain text or Markdown."]

pub mod body_text;
pub mod charset;
pub mod err;
pub mod file_info;
pub mod format_block;
pub mod markdown;
pub mod style;
pub mod utils;
pub mod word_file_header;
pub mod word_parser;
pub mod word_record;

pub use body_text::{OuterTextKind, extract_body_text, extract_outer_text};
pub use err::{ProcessError, Result};
pub use file_info::FileInfo;
pub use format_block::{FormatBlock, extract_format_blocks};
pub use markdown::render_markdown;
pub use style::{StyleTable, TextAttributes, WordStyle};
pub use word_file_header::WordFileHeader;
pub use word_parser::{ParserSettings, WordDocument, WordParser, parse_document, process_file};
pub use word_record::{RawRecord, RecordIterator, RecordType, WordRecord};

#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}
