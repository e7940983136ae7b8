//! Markdown rendering of body text.
//!
//! Styles apply to whole paragraphs, emphases to arbitrary runs of characters. So a style's
//! markup is opened by the first block of a paragraph and closed at the newline ending it, while
//! an emphasis's markup is opened and closed within a single block.
//!
//! Rendering is a fold over the format blocks with [`ParagraphState`] as the accumulator; each
//! step is the pure function [`render_block`].

use crate::charset::decode_text;
use crate::format_block::{DEFAULT_STYLE_CODE, FormatBlock};
use crate::style::StyleTable;
use crate::word_parser::ParserSettings;

use log::debug;

/// Largest point size bucket considered by the heading heuristic.
const MAX_SIZE_BUCKET: u16 = 10;
/// Size buckets at or below this produce no heading.
const MIN_HEADING_BUCKET: u16 = 6;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ParagraphState {
    #[default]
    NoParagraphOpen,
    /// `pending_close` is emitted when the paragraph ends.
    ParagraphOpen { pending_close: &'static str },
}

/// Markup opening a paragraph, plus the markup that must close it.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ParagraphTag {
    pub open: String,
    pub close: &'static str,
}

/// Heading prefix (`# ` to `#### `) derived from a font size in 1/20 points.
///
/// Point sizes are halved into buckets capped at 10; buckets 7 to 10 map to heading levels
/// 4 to 1. Anything under 14pt is not a heading.
pub fn heading_prefix(font_size: u16) -> Option<String> {
    let bucket = ((font_size / 20) >> 1).min(MAX_SIZE_BUCKET);
    if bucket > MIN_HEADING_BUCKET {
        let level = MAX_SIZE_BUCKET - bucket + 1;
        Some(format!("{} ", "#".repeat(usize::from(level))))
    } else {
        None
    }
}

/// Markup for the first block of a paragraph with style `style_code`.
///
/// Bold and italic user styles wrap the whole paragraph, so they open their markup here and
/// close it at the paragraph end. A first block emphasis is then dropped, as nesting it would
/// leave the paragraph markup unbalanced.
pub fn paragraph_tag(style_code: &str, styles: &StyleTable) -> ParagraphTag {
    match style_code {
        "HA" => ParagraphTag {
            open: "# ".to_string(),
            close: "",
        },
        "HB" => ParagraphTag {
            open: "### ".to_string(),
            close: "",
        },
        "BL" => ParagraphTag {
            open: "* ".to_string(),
            close: "",
        },
        DEFAULT_STYLE_CODE => ParagraphTag::default(),
        // User defined styles can have any code, so go by their attributes.
        other => match styles.get(other) {
            Some(style) => {
                let mut open = heading_prefix(style.font_size).unwrap_or_default();
                let close = if style.is_bold() {
                    "**"
                } else if style.is_italic() {
                    "*"
                } else {
                    ""
                };
                open.push_str(close);
                ParagraphTag { open, close }
            }
            None => ParagraphTag::default(),
        },
    }
}

/// Markup wrapping a single block with emphasis `emphasis_code`.
pub fn emphasis_tag(emphasis_code: &str) -> Option<&'static str> {
    match emphasis_code {
        "BB" => Some("**"),
        "II" => Some("*"),
        _ => None,
    }
}

/// Renders one block's decoded `text` given the state left by the previous block.
///
/// Returns the state for the next block and the Markdown for this one.
pub fn render_block(
    state: ParagraphState,
    block: &FormatBlock,
    text: &str,
    styles: &StyleTable,
) -> (ParagraphState, String) {
    let (open, inline_close, pending_close) = match state {
        ParagraphState::NoParagraphOpen => {
            let tag = paragraph_tag(&block.style_code, styles);
            if tag.open.is_empty() {
                let inline = emphasis_tag(&block.emphasis_code).unwrap_or("");
                (inline.to_string(), inline, tag.close)
            } else {
                (tag.open, "", tag.close)
            }
        }
        ParagraphState::ParagraphOpen { pending_close } => {
            let inline = emphasis_tag(&block.emphasis_code).unwrap_or("");
            (inline.to_string(), inline, pending_close)
        }
    };

    if text == "\n" {
        // An empty line closes the paragraph; markup opened by this very block is dropped.
        let close = match state {
            ParagraphState::ParagraphOpen { pending_close } => pending_close,
            ParagraphState::NoParagraphOpen => "",
        };
        return (ParagraphState::NoParagraphOpen, format!("{close}\n"));
    }

    match text.strip_suffix('\n') {
        Some(line) => (
            ParagraphState::NoParagraphOpen,
            format!("{open}{line}{inline_close}{pending_close}\n"),
        ),
        None => (
            ParagraphState::ParagraphOpen { pending_close },
            format!("{open}{text}{inline_close}"),
        ),
    }
}

/// Renders normalised body text as Markdown using its format blocks.
pub fn render_markdown(
    text: &[u8],
    blocks: &[FormatBlock],
    styles: &StyleTable,
    emphases: &StyleTable,
    settings: &ParserSettings,
) -> String {
    let mut markdown = String::with_capacity(text.len());
    let mut state = ParagraphState::default();

    for block in blocks {
        if settings.should_show_diagnostics() {
            debug!(
                "  Rendering bytes {}-{}: style {}, emphasis {}",
                block.start_index,
                block.end_index,
                styles
                    .get(&block.style_code)
                    .map_or(block.style_code.as_str(), |s| s.name.as_str()),
                emphases
                    .get(&block.emphasis_code)
                    .map_or(block.emphasis_code.as_str(), |e| e.name.as_str()),
            );
        }

        let decoded = decode_text(block.slice(text), settings);
        let (next, rendered) = render_block(state, block, &decoded, styles);
        markdown.push_str(&rendered);
        state = next;
    }

    markdown
}
