use crate::charset::{cp850_to_cp1252, decode_text};
use crate::word_parser::ParserSettings;

use log::info;

const PARAGRAPH_SEPARATOR: u8 = 0;
const UNBREAKABLE_HYPHEN: u8 = 7;
const SOFT_HYPHEN: u8 = 14;
const UNBREAKABLE_SPACE: u8 = 15;

/// Which outer text record is being read.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OuterTextKind {
    Header,
    Footer,
}

impl OuterTextKind {
    /// Text used when the record holds no text.
    pub fn placeholder(self) -> &'static str {
        match self {
            OuterTextKind::Header => "No header",
            OuterTextKind::Footer => "No footer",
        }
    }
}

/// Normalises a BODY TEXT payload into CP1252 bytes.
///
/// Psion control bytes are substituted (paragraph separator → `\n`, unbreakable hyphen → `-`,
/// unbreakable space → ` `), soft hyphens are dropped and CP850 characters are remapped.
pub fn extract_body_text(data: &[u8], settings: &ParserSettings) -> Vec<u8> {
    let mut text = Vec::with_capacity(data.len());

    for &byte in data {
        match byte {
            PARAGRAPH_SEPARATOR => text.push(b'\n'),
            UNBREAKABLE_HYPHEN => text.push(b'-'),
            // Only shown when it breaks a line.
            SOFT_HYPHEN => {}
            UNBREAKABLE_SPACE => text.push(b' '),
            128..=255 => text.push(cp850_to_cp1252(byte)),
            _ => text.push(byte),
        }
    }

    if settings.should_show_diagnostics() {
        info!(
            "  Processed text length {} character{}",
            text.len(),
            if text.len() == 1 { "" } else { "s" }
        );
    }

    text
}

/// Reads a NUL-terminated HEADER TEXT or FOOTER TEXT payload.
///
/// The text is cut at the first NUL and trimmed; an empty result is replaced with the
/// kind's placeholder.
pub fn extract_outer_text(data: &[u8], kind: OuterTextKind, settings: &ParserSettings) -> String {
    let raw = match data.iter().position(|&b| b == 0) {
        Some(nul) => &data[..nul],
        None => data,
    };

    let remapped: Vec<u8> = raw
        .iter()
        .map(|&b| if b > 127 { cp850_to_cp1252(b) } else { b })
        .collect();
    let text = decode_text(&remapped, settings).trim().to_string();

    if settings.should_show_diagnostics() {
        info!(
            "  {} text length {} byte{}",
            match kind {
                OuterTextKind::Header => "Header",
                OuterTextKind::Footer => "Footer",
            },
            raw.len(),
            if raw.len() == 1 { "" } else { "s" }
        );
    }

    if text.is_empty() {
        kind.placeholder().to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_substitutes_control_bytes() {
        let settings = ParserSettings::default();
        let data = [b'a', 0, b'b', 7, b'c', 14, b'd', 15, b'e'];
        assert_eq!(extract_body_text(&data, &settings), b"a\nb-cd e".to_vec());
    }

    #[test]
    fn test_byte_pairs() {
        let settings = ParserSettings::default();
        let pairs: [(u8, Option<u8>); 6] = [
            (0, Some(0x0A)),
            (7, Some(0x2D)),
            (14, None),
            (15, Some(0x20)),
            (b'A', Some(b'A')),
            (9, Some(9)),
        ];

        for (input, expected) in pairs {
            let out = extract_body_text(&[input], &settings);
            assert_eq!(out, expected.into_iter().collect::<Vec<u8>>(), "byte {input}");
        }
    }

    #[test]
    fn test_remaps_high_bytes() {
        let settings = ParserSettings::default();
        assert_eq!(
            extract_body_text(&[0x9C, b'1', 0x80], &settings),
            vec![0xA3, b'1', b'?']
        );
    }

    #[test]
    fn test_outer_text() {
        let settings = ParserSettings::default();
        assert_eq!(
            extract_outer_text(b"Fintlewoodlewix\0", OuterTextKind::Header, &settings),
            "Fintlewoodlewix"
        );
        assert_eq!(
            extract_outer_text(b"  Page footer \n\0", OuterTextKind::Footer, &settings),
            "Page footer"
        );
        assert_eq!(
            extract_outer_text(b"abc\0junk", OuterTextKind::Footer, &settings),
            "abc"
        );
    }

    #[test]
    fn test_empty_outer_text_uses_placeholder() {
        let settings = ParserSettings::default();
        assert_eq!(
            extract_outer_text(b"\0", OuterTextKind::Header, &settings),
            "No header"
        );
        assert_eq!(
            extract_outer_text(&[0, 0, 0], OuterTextKind::Footer, &settings),
            "No footer"
        );
        assert_eq!(
            extract_outer_text(&[], OuterTextKind::Footer, &settings),
            "No footer"
        );
        assert_eq!(
            extract_outer_text(b"   \0", OuterTextKind::Header, &settings),
            "No header"
        );
    }
}
