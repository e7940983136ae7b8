use crate::word_record::RecordType;

use std::fmt::Write;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessError>;

/// Every way converting a document can fail.
///
/// Each variant carries a stable numeric code (see [`ProcessError::code`]) which the
/// `psion_word_dump` binary also uses as its exit status. `0` means success and has no variant.
/// None of these errors are retryable: they are a verdict on the buffer, not on the environment.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to read file {}: {source}", path.display())]
    BadFile { path: PathBuf, source: io::Error },

    #[error("Not a Psion Series 3 Word file")]
    BadFileType,

    #[error("Word file is encrypted")]
    BadFileEncrypted,

    #[error("Bad file info record size ({length} not 10 bytes)")]
    BadRecordLengthFileInfo { length: u16 },

    #[error("Bad printer config record size ({length} not 58 bytes)")]
    BadRecordLengthPrinterConfig { length: u16 },

    #[error("Bad style definition record size ({length} not 80 bytes)")]
    BadRecordLengthStyle { length: u16 },

    #[error("Bad emphasis definition record size ({length} not 28 bytes)")]
    BadRecordLengthEmphasis { length: u16 },

    #[error("Bad Word file record type ({value} at 0x{offset:04x})")]
    BadRecordType { value: u16, offset: usize },

    #[error("File did not include required records (missing: {})", format_record_types(missing))]
    BadFileMissingRecords { missing: Vec<RecordType> },
}

impl ProcessError {
    /// The stable code for this error, usable as a process exit code.
    pub fn code(&self) -> i32 {
        match self {
            ProcessError::BadFile { .. } => 1,
            ProcessError::BadFileType => 2,
            ProcessError::BadFileEncrypted => 3,
            ProcessError::BadRecordLengthFileInfo { .. } => 4,
            ProcessError::BadRecordLengthPrinterConfig { .. } => 5,
            ProcessError::BadRecordLengthStyle { .. } => 6,
            ProcessError::BadRecordLengthEmphasis { .. } => 7,
            ProcessError::BadRecordType { .. } => 8,
            ProcessError::BadFileMissingRecords { .. } => 9,
        }
    }

    pub(crate) fn bad_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProcessError::BadFile {
            path: path.into(),
            source,
        }
    }
}

fn format_record_types(types: &[RecordType]) -> String {
    let mut out = String::new();
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", t);
    }
    out
}
