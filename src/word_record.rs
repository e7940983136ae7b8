use crate::body_text::{OuterTextKind, extract_body_text, extract_outer_text};
use crate::err::{ProcessError, Result};
use crate::file_info::FileInfo;
use crate::style::WordStyle;
use crate::word_parser::ParserSettings;

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use log::info;
use std::fmt;
use std::io::Cursor;

pub const RECORD_HEADER_SIZE: usize = 4;

pub const FILE_INFO_SIZE: u16 = 10;
pub const PRINTER_CONFIG_SIZE: u16 = 58;
pub const STYLE_DEFINITION_SIZE: u16 = 80;
pub const EMPHASIS_DEFINITION_SIZE: u16 = 28;

/// The nine record types making up a Word document body.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u16)]
pub enum RecordType {
    FileInfo = 1,
    PrinterConfig = 2,
    PrinterDriver = 3,
    HeaderText = 4,
    FooterText = 5,
    StyleDefinition = 6,
    EmphasisDefinition = 7,
    BodyText = 8,
    BlockInfo = 9,
}

impl RecordType {
    pub const ALL: [RecordType; 9] = [
        RecordType::FileInfo,
        RecordType::PrinterConfig,
        RecordType::PrinterDriver,
        RecordType::HeaderText,
        RecordType::FooterText,
        RecordType::StyleDefinition,
        RecordType::EmphasisDefinition,
        RecordType::BodyText,
        RecordType::BlockInfo,
    ];

    pub fn from_u16(value: u16) -> Option<RecordType> {
        match value {
            1..=9 => Some(RecordType::ALL[usize::from(value) - 1]),
            _ => None,
        }
    }

    pub fn mask(self) -> RecordMask {
        RecordMask::from_bits_truncate(1 << (self as u16 - 1))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordType::FileInfo => "FILE INFO",
            RecordType::PrinterConfig => "PRINTER CONFIG",
            RecordType::PrinterDriver => "PRINTER DRIVER INFO",
            RecordType::HeaderText => "HEADER TEXT",
            RecordType::FooterText => "FOOTER TEXT",
            RecordType::StyleDefinition => "STYLE DEFINITION",
            RecordType::EmphasisDefinition => "EMPHASIS DEFINITION",
            RecordType::BodyText => "BODY TEXT",
            RecordType::BlockInfo => "STYLE APPLICATION",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Which record types have been seen so far during a scan.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RecordMask: u16 {
        const FILE_INFO = 1 << 0;
        const PRINTER_CONFIG = 1 << 1;
        const PRINTER_DRIVER = 1 << 2;
        const HEADER_TEXT = 1 << 3;
        const FOOTER_TEXT = 1 << 4;
        const STYLE_DEFINITION = 1 << 5;
        const EMPHASIS_DEFINITION = 1 << 6;
        const BODY_TEXT = 1 << 7;
        const BLOCK_INFO = 1 << 8;
    }
}

impl RecordMask {
    /// Record types with no bit set in this mask, in type order.
    pub fn missing(self) -> Vec<RecordType> {
        RecordType::ALL
            .iter()
            .copied()
            .filter(|t| !self.contains(t.mask()))
            .collect()
    }
}

/// A record as laid out in the file: a type, a declared payload length and the payload bytes.
///
/// `payload` is truncated to the end of the buffer when the declared length runs past it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RawRecord<'a> {
    pub type_value: u16,
    pub data_length: u16,
    /// Offset of the payload within the document.
    pub offset: usize,
    pub payload: &'a [u8],
}

/// One decoded record.
#[derive(Debug, PartialEq, Clone)]
pub enum WordRecord<'a> {
    FileInfo(FileInfo),
    PrinterConfig,
    PrinterDriver,
    HeaderText(String),
    FooterText(String),
    StyleDefinition(WordStyle),
    EmphasisDefinition(WordStyle),
    BodyText(Vec<u8>),
    /// Decoding block info needs the body text length, so the payload is handed on as-is.
    BlockInfo(&'a [u8]),
}

impl<'a> WordRecord<'a> {
    pub fn record_type(&self) -> RecordType {
        match self {
            WordRecord::FileInfo(_) => RecordType::FileInfo,
            WordRecord::PrinterConfig => RecordType::PrinterConfig,
            WordRecord::PrinterDriver => RecordType::PrinterDriver,
            WordRecord::HeaderText(_) => RecordType::HeaderText,
            WordRecord::FooterText(_) => RecordType::FooterText,
            WordRecord::StyleDefinition(_) => RecordType::StyleDefinition,
            WordRecord::EmphasisDefinition(_) => RecordType::EmphasisDefinition,
            WordRecord::BodyText(_) => RecordType::BodyText,
            WordRecord::BlockInfo(_) => RecordType::BlockInfo,
        }
    }
}

impl<'a> RawRecord<'a> {
    /// Validates the record against its type's size rules and decodes it.
    pub fn parse(&self, settings: &ParserSettings) -> Result<WordRecord<'a>> {
        let record_type =
            RecordType::from_u16(self.type_value).ok_or(ProcessError::BadRecordType {
                value: self.type_value,
                offset: self.offset,
            })?;

        if settings.should_show_diagnostics() {
            info!(
                "Record of type {} found at offset 0x{:04x}. Size: {} bytes",
                record_type, self.offset, self.data_length
            );
        }

        let record = match record_type {
            RecordType::FileInfo => {
                if self.data_length != FILE_INFO_SIZE {
                    return Err(ProcessError::BadRecordLengthFileInfo {
                        length: self.data_length,
                    });
                }
                let file_info = FileInfo::from_bytes(self.payload);
                if settings.should_show_diagnostics() {
                    file_info.log();
                }
                WordRecord::FileInfo(file_info)
            }
            RecordType::PrinterConfig => {
                if self.data_length != PRINTER_CONFIG_SIZE {
                    return Err(ProcessError::BadRecordLengthPrinterConfig {
                        length: self.data_length,
                    });
                }
                WordRecord::PrinterConfig
            }
            RecordType::PrinterDriver => WordRecord::PrinterDriver,
            RecordType::HeaderText => WordRecord::HeaderText(extract_outer_text(
                self.payload,
                OuterTextKind::Header,
                settings,
            )),
            RecordType::FooterText => WordRecord::FooterText(extract_outer_text(
                self.payload,
                OuterTextKind::Footer,
                settings,
            )),
            RecordType::StyleDefinition => {
                if self.data_length != STYLE_DEFINITION_SIZE {
                    return Err(ProcessError::BadRecordLengthStyle {
                        length: self.data_length,
                    });
                }
                WordRecord::StyleDefinition(WordStyle::from_bytes(self.payload, settings))
            }
            RecordType::EmphasisDefinition => {
                // Reported apart from the style size error, with its own exit code.
                if self.data_length != EMPHASIS_DEFINITION_SIZE {
                    return Err(ProcessError::BadRecordLengthEmphasis {
                        length: self.data_length,
                    });
                }
                WordRecord::EmphasisDefinition(WordStyle::from_bytes(self.payload, settings))
            }
            RecordType::BodyText => WordRecord::BodyText(extract_body_text(self.payload, settings)),
            RecordType::BlockInfo => WordRecord::BlockInfo(self.payload),
        };

        Ok(record)
    }
}

/// Walks the records of a document body.
///
/// Yields records until fewer than [`RECORD_HEADER_SIZE`] bytes remain.
pub struct RecordIterator<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> RecordIterator<'a> {
    /// Starts a scan of `data` at `offset`.
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        RecordIterator { data, offset }
    }

    pub fn position(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for RecordIterator<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<RawRecord<'a>> {
        let remaining = self.data.len().checked_sub(self.offset)?;
        if remaining < RECORD_HEADER_SIZE {
            return None;
        }

        let mut cursor = Cursor::new(&self.data[self.offset..self.offset + RECORD_HEADER_SIZE]);
        let type_value = cursor.read_u16::<LittleEndian>().ok()?;
        let data_length = cursor.read_u16::<LittleEndian>().ok()?;

        let payload_offset = self.offset + RECORD_HEADER_SIZE;
        let payload_end = (payload_offset + usize::from(data_length)).min(self.data.len());

        self.offset = payload_offset + usize::from(data_length);

        Some(RawRecord {
            type_value,
            data_length,
            offset: payload_offset,
            payload: &self.data[payload_offset..payload_end],
        })
    }
}
