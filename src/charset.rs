//! Character set handling.
//!
//! Psion Series 3 documents store text in IBM code page 850. Body text is first normalised into
//! Windows code page 1252 bytes (one byte per character, so format block offsets stay valid), and
//! only turned into UTF-8 when a string is actually needed.

use crate::word_parser::ParserSettings;

use encoding::all::WINDOWS_1252;
use encoding::{DecoderTrap, Encoding};
use log::warn;
use std::fmt::Write;

/// CP850 code points with a CP1252 equivalent, paired with that equivalent.
///
/// Covers: £ ® © ½ ¼ ¾ ¥ ¶ § ° ¹ ² ³ ± × ÷ º ª ƒ ¦
const CP850_TO_CP1252: [(u8, u8); 20] = [
    (0x9C, 0xA3),
    (0xA9, 0xAE),
    (0xB8, 0xA9),
    (0xAB, 0xBD),
    (0xAC, 0xBC),
    (0xF3, 0xBE),
    (0xBE, 0xA5),
    (0xF4, 0xB6),
    (0xF5, 0xA7),
    (0xF8, 0xB0),
    (0xFB, 0xB9),
    (0xFD, 0xB2),
    (0xFC, 0xB3),
    (0xF1, 0xB1),
    (0x9E, 0xD7),
    (0xF6, 0xF7),
    (0xA7, 0xBA),
    (0xA6, 0xAA),
    (0x9F, 0x83),
    (0xDD, 0xA6),
];

/// Unicode code points for CP1252 0x80..=0x9F. `None` marks the five unassigned bytes.
const CP1252_HIGH_CONTROLS: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Maps a CP850 byte above 127 to its CP1252 equivalent, or `?` when there is none.
pub fn cp850_to_cp1252(byte: u8) -> u8 {
    CP850_TO_CP1252
        .iter()
        .find(|(from, _)| *from == byte)
        .map(|(_, to)| *to)
        .unwrap_or(b'?')
}

/// Maps a CP1252 byte to a `char`, or `None` for the unassigned bytes.
pub fn cp1252_to_char(byte: u8) -> Option<char> {
    match byte {
        0x80..=0x9F => CP1252_HIGH_CONTROLS[usize::from(byte - 0x80)],
        // ASCII and the Latin-1 upper half map straight onto Unicode.
        _ => Some(char::from(byte)),
    }
}

/// Strict CP1252 decode. On failure returns the positions of every unassigned byte.
fn decode_cp1252_strict(bytes: &[u8]) -> Result<String, Vec<usize>> {
    let mut text = String::with_capacity(bytes.len());
    let mut bad_positions = Vec::new();

    for (i, &byte) in bytes.iter().enumerate() {
        match cp1252_to_char(byte) {
            Some(c) => text.push(c),
            None => bad_positions.push(i),
        }
    }

    if bad_positions.is_empty() {
        Ok(text)
    } else {
        Err(bad_positions)
    }
}

/// Decodes normalised (CP1252) text bytes into a `String`.
///
/// Decoding is attempted strictly first. When that fails a warning is logged (plus the offending
/// bytes and their positions when diagnostics are on) and the bytes are decoded again with
/// unassigned values replaced. An empty string results only if both attempts fail.
pub fn decode_text(bytes: &[u8], settings: &ParserSettings) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    match decode_cp1252_strict(bytes) {
        Ok(text) => text,
        Err(bad_positions) => {
            let count = bad_positions.len();
            warn!(
                "File contains {} invalid Windows CP 1252 character{}",
                count,
                if count == 1 { "" } else { "s" }
            );

            if settings.should_show_diagnostics() {
                let mut msg = String::new();
                for &i in &bad_positions {
                    let _ = write!(msg, "{} @ {} ", bytes[i], i);
                }
                warn!("{}", msg.trim_end());
            }

            WINDOWS_1252
                .decode(bytes, DecoderTrap::Replace)
                .unwrap_or_default()
        }
    }
}
