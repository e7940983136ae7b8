use crate::body_text::OuterTextKind;
use crate::charset::decode_text;
use crate::err::{ProcessError, Result};
use crate::file_info::FileInfo;
use crate::format_block::{FormatBlock, extract_format_blocks};
use crate::markdown::render_markdown;
use crate::style::StyleTable;
use crate::word_file_header::{WORD_FILE_HEADER_SIZE, WordFileHeader};
use crate::word_record::{RecordIterator, RecordMask, WordRecord};

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Character used for the rules separating header and footer from the body.
const RULE_CHAR: char = '*';
/// Shortest rule drawn in Markdown mode, so it never reads as emphasis.
const MIN_MARKDOWN_RULE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParserSettings {
    /// Log record level details while parsing.
    show_diagnostics: bool,
    /// Wrap the body with the header and footer text.
    include_outer_text: bool,
    /// Render Markdown instead of plain text.
    markdown: bool,
}

impl ParserSettings {
    pub fn new() -> Self {
        ParserSettings::default()
    }

    /// Emit record offsets, sizes, style codes and block ranges through `log`.
    pub fn show_diagnostics(mut self, show_diagnostics: bool) -> Self {
        self.show_diagnostics = show_diagnostics;
        self
    }

    /// Prepend the header text and append the footer text, each separated by a rule of `*`.
    pub fn include_outer_text(mut self, include_outer_text: bool) -> Self {
        self.include_outer_text = include_outer_text;
        self
    }

    /// Produce Markdown instead of plain text.
    pub fn markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    pub fn should_show_diagnostics(&self) -> bool {
        self.show_diagnostics
    }

    pub fn should_include_outer_text(&self) -> bool {
        self.include_outer_text
    }

    pub fn should_render_markdown(&self) -> bool {
        self.markdown
    }
}

/// Everything a scan of a Word document collects.
#[derive(Debug, Clone, PartialEq)]
pub struct WordDocument {
    pub header: WordFileHeader,
    pub file_info: Option<FileInfo>,
    pub header_text: String,
    pub footer_text: String,
    pub styles: StyleTable,
    pub emphases: StyleTable,
    /// Normalised CP1252 bytes. Format block offsets index into this.
    pub body_text: Vec<u8>,
    pub blocks: Vec<FormatBlock>,
}

impl WordDocument {
    fn new(header: WordFileHeader) -> Self {
        WordDocument {
            header,
            file_info: None,
            header_text: OuterTextKind::Header.placeholder().to_string(),
            footer_text: OuterTextKind::Footer.placeholder().to_string(),
            styles: StyleTable::new(),
            emphases: StyleTable::new(),
            body_text: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn apply(&mut self, record: WordRecord<'_>, settings: &ParserSettings) {
        match record {
            WordRecord::FileInfo(file_info) => self.file_info = Some(file_info),
            WordRecord::PrinterConfig | WordRecord::PrinterDriver => {}
            WordRecord::HeaderText(text) => self.header_text = text,
            WordRecord::FooterText(text) => self.footer_text = text,
            WordRecord::StyleDefinition(style) => {
                self.styles.insert(style.code.clone(), style);
            }
            WordRecord::EmphasisDefinition(emphasis) => {
                self.emphases.insert(emphasis.code.clone(), emphasis);
            }
            WordRecord::BodyText(text) => self.body_text = text,
            // Blocks are clamped to whatever body text has been read so far.
            WordRecord::BlockInfo(payload) => {
                self.blocks = extract_format_blocks(payload, self.body_text.len(), settings)
            }
        }
    }

    /// Renders the document as plain text or Markdown, optionally wrapped in its outer text.
    pub fn to_text(&self, settings: &ParserSettings) -> String {
        let body = if settings.should_render_markdown() {
            render_markdown(
                &self.body_text,
                &self.blocks,
                &self.styles,
                &self.emphases,
                settings,
            )
        } else {
            decode_text(&self.body_text, settings)
        };

        if !settings.should_include_outer_text() {
            return body;
        }

        let header_len = self.header_text.chars().count();
        let footer_len = self.footer_text.chars().count();

        let (header_rule, footer_rule) = if settings.should_render_markdown() {
            let shared = rule(header_len.max(footer_len).max(MIN_MARKDOWN_RULE));
            (shared.clone(), shared)
        } else {
            (rule(header_len), rule(footer_len))
        };

        format!(
            "{}\n{}\n{}\n{}\n{}",
            self.header_text, header_rule, body, footer_rule, self.footer_text
        )
    }
}

fn rule(length: usize) -> String {
    std::iter::repeat_n(RULE_CHAR, length).collect()
}

/// Validates the header of `data` and scans its records into a [`WordDocument`].
///
/// The scan stops at the first failing record. A scan that runs cleanly but never saw one of
/// the nine record types fails with [`ProcessError::BadFileMissingRecords`].
pub fn parse_document(data: &[u8], settings: &ParserSettings) -> Result<WordDocument> {
    let header = WordFileHeader::from_bytes(data)?;
    debug!("Word header: {:?}", header);

    let (seen, document) = RecordIterator::new(data, WORD_FILE_HEADER_SIZE).try_fold(
        (RecordMask::empty(), WordDocument::new(header)),
        |(seen, mut document), raw| {
            let record = raw.parse(settings)?;
            let seen = seen | record.record_type().mask();
            document.apply(record, settings);
            Ok::<_, ProcessError>((seen, document))
        },
    )?;

    let missing = seen.missing();
    if !missing.is_empty() {
        return Err(ProcessError::BadFileMissingRecords { missing });
    }

    Ok(document)
}

/// Converts the Word document in `data` to text. `file_path` is only used for diagnostics.
pub fn process_file(
    data: &[u8],
    file_path: impl AsRef<Path>,
    settings: &ParserSettings,
) -> Result<String> {
    let document = parse_document(data, settings)?;

    if settings.should_show_diagnostics() {
        info!(
            "File {} is a Psion Series 3 Word document",
            file_path.as_ref().display()
        );
    }

    Ok(document.to_text(settings))
}

/// Owns a document's bytes and the settings used to convert them.
pub struct WordParser {
    data: Vec<u8>,
    path: Option<PathBuf>,
    config: ParserSettings,
}

impl WordParser {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| ProcessError::bad_file(path, e))?;

        Ok(WordParser {
            data,
            path: Some(path.to_path_buf()),
            config: ParserSettings::default(),
        })
    }

    pub fn from_buffer(buffer: Vec<u8>) -> Self {
        WordParser {
            data: buffer,
            path: None,
            config: ParserSettings::default(),
        }
    }

    pub fn with_configuration(mut self, configuration: ParserSettings) -> Self {
        self.config = configuration;
        self
    }

    /// The path this parser was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn document(&self) -> Result<WordDocument> {
        parse_document(&self.data, &self.config)
    }

    pub fn to_text(&self) -> Result<String> {
        let path = self
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new("<buffer>"));
        process_file(&self.data, path, &self.config)
    }
}
