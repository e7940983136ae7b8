use crate::utils::bytes;

use bitflags::bitflags;
use log::info;

bitflags! {
    /// Formatting symbols the editor was set to display.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShownSymbols: u8 {
        const TABS = 0x01;
        const SPACES = 0x02;
        const NEWLINES = 0x04;
        const SOFT_HYPHENS = 0x08;
        const FORCED_LINE_BREAKS = 0x10;
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StatusWindow {
    None,
    Narrow,
    Wide,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    Line,
    Paragraph,
}

/// Editor state saved in the FILE INFO record. Not needed for conversion.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FileInfo {
    pub cursor_location: u16,
    pub shown_symbols: ShownSymbols,
    pub status_window: StatusWindow,
    pub zoom_level: u8,
    pub show_style_bar: bool,
    pub file_type: FileType,
    pub outline_level: u8,
}

impl FileInfo {
    pub fn from_bytes(data: &[u8]) -> FileInfo {
        let status = bytes::read_u8_or_zero(data, 3);

        FileInfo {
            cursor_location: bytes::read_u16_le_or_zero(data, 0),
            shown_symbols: ShownSymbols::from_bits_truncate(bytes::read_u8_or_zero(data, 2)),
            status_window: match status & 0x03 {
                1 => StatusWindow::Narrow,
                2 => StatusWindow::Wide,
                _ => StatusWindow::None,
            },
            zoom_level: ((status & 0x30) >> 4) + 1,
            show_style_bar: bytes::read_u8_or_zero(data, 4) == 1,
            file_type: match bytes::read_u8_or_zero(data, 5) {
                1 => FileType::Line,
                _ => FileType::Paragraph,
            },
            outline_level: bytes::read_u8_or_zero(data, 6),
        }
    }

    pub(crate) fn log(&self) {
        info!(
            "  Cursor location: {}, outline level: {}",
            self.cursor_location, self.outline_level
        );
        info!(
            "  Show style bar: {}, File type: {}",
            if self.show_style_bar { "yes" } else { "no" },
            match self.file_type {
                FileType::Line => "line",
                FileType::Paragraph => "paragraph",
            }
        );

        let names = [
            (ShownSymbols::TABS, "tabs"),
            (ShownSymbols::SPACES, "spaces"),
            (ShownSymbols::NEWLINES, "newlines"),
            (ShownSymbols::SOFT_HYPHENS, "soft hyphens"),
            (ShownSymbols::FORCED_LINE_BREAKS, "forced line breaks"),
        ];
        let shown: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.shown_symbols.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if shown.is_empty() {
            info!("  Symbols shown: none");
        } else {
            info!("  Symbols shown: {}", shown.join(", "));
        }

        info!(
            "  Status window: {}",
            match self.status_window {
                StatusWindow::None => "none",
                StatusWindow::Narrow => "narrow",
                StatusWindow::Wide => "wide",
            }
        );
        info!("  Zoom level: {}x", self.zoom_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_file_info() {
        let data = [0x34, 0x12, 0x05, 0x22, 1, 1, 3, 0, 0, 0];
        assert_eq!(
            FileInfo::from_bytes(&data),
            FileInfo {
                cursor_location: 0x1234,
                shown_symbols: ShownSymbols::TABS | ShownSymbols::NEWLINES,
                status_window: StatusWindow::Wide,
                zoom_level: 3,
                show_style_bar: true,
                file_type: FileType::Line,
                outline_level: 3,
            }
        );
    }

    #[test]
    fn test_truncated_file_info_reads_zero() {
        let info = FileInfo::from_bytes(&[]);
        assert_eq!(info.cursor_location, 0);
        assert_eq!(info.shown_symbols, ShownSymbols::empty());
        assert_eq!(info.status_window, StatusWindow::None);
        assert_eq!(info.zoom_level, 1);
        assert_eq!(info.file_type, FileType::Paragraph);
    }
}
