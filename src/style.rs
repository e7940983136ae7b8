use crate::charset::{cp850_to_cp1252, decode_text};
use crate::utils::bytes;
use crate::word_parser::ParserSettings;

use bitflags::bitflags;
use hashbrown::HashMap;
use log::info;

/// Styles or emphases keyed by their two character code. Later definitions replace earlier ones.
pub type StyleTable = HashMap<String, WordStyle>;

const NAME_OFFSET: usize = 2;
const NAME_SIZE: usize = 16;
const TYPE_FLAGS_OFFSET: usize = 18;
const FONT_CODE_OFFSET: usize = 20;
const ATTRIBUTES_OFFSET: usize = 22;
const FONT_SIZE_OFFSET: usize = 24;
const INHERITED_OFFSET: usize = 26;
const LEFT_INDENT_OFFSET: usize = 28;
const RIGHT_INDENT_OFFSET: usize = 30;
const FIRST_INDENT_OFFSET: usize = 32;
const ALIGNMENT_OFFSET: usize = 34;
const LINE_SPACING_OFFSET: usize = 36;
const SPACE_ABOVE_OFFSET: usize = 38;
const SPACE_BELOW_OFFSET: usize = 40;
const SPACING_OFFSET: usize = 42;
const OUTLINE_LEVEL_OFFSET: usize = 44;
const TAB_COUNT_OFFSET: usize = 46;
const TABS_OFFSET: usize = 48;
const TAB_ENTRY_SIZE: usize = 4;

bitflags! {
    /// Character attributes. The same layout is used for the attributes a style sets and for
    /// the attributes it inherits from its context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TextAttributes: u8 {
        const UNDERLINE = 0x01;
        const BOLD = 0x02;
        const ITALIC = 0x04;
        const SUPERSCRIPT = 0x08;
        const SUBSCRIPT = 0x10;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct TypeFlags: u8 {
        const EMPHASIS = 0x01;
        const UNDELETABLE = 0x02;
        const DEFAULT = 0x04;
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StyleKind {
    /// Paragraph level formatting.
    Style,
    /// Character level formatting.
    Emphasis,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Centered,
    Justified,
}

impl Alignment {
    fn from_u16(value: u16) -> Alignment {
        match value {
            1 => Alignment::Right,
            2 => Alignment::Centered,
            3 => Alignment::Justified,
            _ => Alignment::Left,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Spacing {
    KeepWithNext,
    KeepTogether,
    NewPage,
    NoSpacing,
}

impl Spacing {
    /// The lowest set bit decides.
    fn from_u8(value: u8) -> Spacing {
        if value & 0x01 != 0 {
            Spacing::KeepWithNext
        } else if value & 0x02 != 0 {
            Spacing::KeepTogether
        } else if value & 0x04 != 0 {
            Spacing::NewPage
        } else {
            Spacing::NoSpacing
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TabKind {
    Left,
    Right,
    Centered,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TabStop {
    pub position: u16,
    pub kind: TabKind,
}

/// Paragraph layout carried only by styles.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParagraphLayout {
    pub left_indent: u16,
    pub right_indent: u16,
    pub first_indent: u16,
    pub alignment: Alignment,
    pub line_spacing: u16,
    pub space_above: u16,
    pub space_below: u16,
    pub spacing: Spacing,
    pub outline_level: u16,
    pub tabs: Vec<TabStop>,
}

/// A STYLE DEFINITION or EMPHASIS DEFINITION record.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct WordStyle {
    pub code: String,
    pub name: String,
    pub kind: StyleKind,
    pub undeletable: bool,
    pub default: bool,
    pub font_code: u16,
    pub attributes: TextAttributes,
    /// In 1/20 point units.
    pub font_size: u16,
    pub inherited: TextAttributes,
    /// `None` for emphases.
    pub paragraph: Option<ParagraphLayout>,
}

impl WordStyle {
    /// Parses a style or emphasis definition.
    ///
    /// Whether the paragraph layout is read depends on the type flags inside the record, not
    /// on the record type it came from.
    pub fn from_bytes(data: &[u8], settings: &ParserSettings) -> WordStyle {
        let code = decode_field(data.get(..2).unwrap_or(data), settings);

        let name_bytes = data
            .get(NAME_OFFSET..NAME_OFFSET + NAME_SIZE)
            .or_else(|| data.get(NAME_OFFSET..))
            .unwrap_or(&[]);
        let name_bytes = match name_bytes.iter().position(|&b| b == 0) {
            Some(nul) => &name_bytes[..nul],
            None => name_bytes,
        };
        let mut name = decode_field(name_bytes, settings);
        if name.is_empty() {
            name = "Unknown".to_string();
        }

        let type_flags =
            TypeFlags::from_bits_truncate(bytes::read_u8_or_zero(data, TYPE_FLAGS_OFFSET));
        let kind = if type_flags.contains(TypeFlags::EMPHASIS) {
            StyleKind::Emphasis
        } else {
            StyleKind::Style
        };

        let paragraph = match kind {
            StyleKind::Style => Some(parse_paragraph_layout(data)),
            StyleKind::Emphasis => None,
        };

        let style = WordStyle {
            code,
            name,
            kind,
            undeletable: type_flags.contains(TypeFlags::UNDELETABLE),
            default: type_flags.contains(TypeFlags::DEFAULT),
            font_code: bytes::read_u16_le_or_zero(data, FONT_CODE_OFFSET),
            attributes: TextAttributes::from_bits_truncate(bytes::read_u8_or_zero(
                data,
                ATTRIBUTES_OFFSET,
            )),
            font_size: bytes::read_u16_le_or_zero(data, FONT_SIZE_OFFSET),
            inherited: TextAttributes::from_bits_truncate(bytes::read_u8_or_zero(
                data,
                INHERITED_OFFSET,
            )),
            paragraph,
        };

        if settings.should_show_diagnostics() {
            match style.kind {
                StyleKind::Style => info!("  Style code: {} ({})", style.code, style.name),
                StyleKind::Emphasis => info!("  Emphasis code: {} ({})", style.code, style.name),
            }
        }

        style
    }

    pub fn is_bold(&self) -> bool {
        self.attributes.contains(TextAttributes::BOLD)
    }

    pub fn is_italic(&self) -> bool {
        self.attributes.contains(TextAttributes::ITALIC)
    }

    pub fn is_underlined(&self) -> bool {
        self.attributes.contains(TextAttributes::UNDERLINE)
    }

    /// Font size in whole points.
    pub fn point_size(&self) -> u16 {
        self.font_size / 20
    }
}

fn parse_paragraph_layout(data: &[u8]) -> ParagraphLayout {
    let tab_count = usize::from(bytes::read_u16_le_or_zero(data, TAB_COUNT_OFFSET));

    let tabs = (0..tab_count)
        .map_while(|i| {
            let offset = TABS_OFFSET + i * TAB_ENTRY_SIZE;
            let position = bytes::read_u16_le(data, offset)?;
            let kind = match bytes::read_u16_le(data, offset + 2)? {
                1 => TabKind::Right,
                2 => TabKind::Centered,
                _ => TabKind::Left,
            };
            Some(TabStop { position, kind })
        })
        .collect();

    ParagraphLayout {
        left_indent: bytes::read_u16_le_or_zero(data, LEFT_INDENT_OFFSET),
        right_indent: bytes::read_u16_le_or_zero(data, RIGHT_INDENT_OFFSET),
        first_indent: bytes::read_u16_le_or_zero(data, FIRST_INDENT_OFFSET),
        alignment: Alignment::from_u16(bytes::read_u16_le_or_zero(data, ALIGNMENT_OFFSET)),
        line_spacing: bytes::read_u16_le_or_zero(data, LINE_SPACING_OFFSET),
        space_above: bytes::read_u16_le_or_zero(data, SPACE_ABOVE_OFFSET),
        space_below: bytes::read_u16_le_or_zero(data, SPACE_BELOW_OFFSET),
        spacing: Spacing::from_u8(bytes::read_u8_or_zero(data, SPACING_OFFSET)),
        outline_level: bytes::read_u16_le_or_zero(data, OUTLINE_LEVEL_OFFSET),
        tabs,
    }
}

/// Decodes a short code or name field from a record.
pub(crate) fn decode_field(raw: &[u8], settings: &ParserSettings) -> String {
    let remapped: Vec<u8> = raw
        .iter()
        .map(|&b| if b > 127 { cp850_to_cp1252(b) } else { b })
        .collect();
    decode_text(&remapped, settings)
}
