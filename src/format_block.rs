use crate::style::decode_field;
use crate::utils::bytes;
use crate::word_parser::ParserSettings;

use log::info;

pub const BLOCK_UNIT_SIZE: usize = 6;

/// Style code of plain body text.
pub const DEFAULT_STYLE_CODE: &str = "BT";
/// Emphasis code of unemphasised text.
pub const DEFAULT_EMPHASIS_CODE: &str = "NN";

/// A run of body text sharing one style and one emphasis.
///
/// `start_index` and `end_index` are inclusive offsets into the normalised body text.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FormatBlock {
    pub start_index: usize,
    pub end_index: usize,
    pub style_code: String,
    pub emphasis_code: String,
}

impl FormatBlock {
    /// The bytes of `text` this block covers.
    pub fn slice<'t>(&self, text: &'t [u8]) -> &'t [u8] {
        text.get(self.start_index..=self.end_index).unwrap_or(&[])
    }
}

/// Splits a STYLE APPLICATION payload into format blocks over a body of `text_length` bytes.
///
/// Each 6 byte unit holds a length, a style code and an emphasis code. Blocks follow each other
/// with no gaps; the last one is clamped to the end of the text. Units after the text is fully
/// covered are ignored, as are trailing bytes too short to form a unit.
pub fn extract_format_blocks(
    data: &[u8],
    text_length: usize,
    settings: &ParserSettings,
) -> Vec<FormatBlock> {
    let mut blocks = Vec::new();
    let mut text_offset = 0_usize;

    for unit in data.chunks_exact(BLOCK_UNIT_SIZE) {
        if text_offset >= text_length {
            break;
        }

        let length = usize::from(bytes::read_u16_le_or_zero(unit, 0));
        if length == 0 {
            continue;
        }

        let style_code = code_or_default(decode_field(&unit[2..4], settings), DEFAULT_STYLE_CODE);
        let emphasis_code =
            code_or_default(decode_field(&unit[4..6], settings), DEFAULT_EMPHASIS_CODE);

        let block = FormatBlock {
            start_index: text_offset,
            end_index: (text_offset + length - 1).min(text_length - 1),
            style_code,
            emphasis_code,
        };

        if settings.should_show_diagnostics() {
            info!(
                "  Text bytes range {}-{} has style code {} and emphasis code {}",
                block.start_index, block.end_index, block.style_code, block.emphasis_code
            );
        }

        blocks.push(block);
        text_offset += length;
    }

    blocks
}

fn code_or_default(code: String, default: &str) -> String {
    if code.is_empty() {
        default.to_string()
    } else {
        code
    }
}
