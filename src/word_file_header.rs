use crate::err::{ProcessError, Result};
use crate::utils::bytes;

/// ASCII signature found at offset 0 of every Word document.
pub const WORD_FILE_SIGNATURE: &[u8; 15] = b"PSIONWPDATAFILE";
/// Size of the file header; records start right after it.
pub const WORD_FILE_HEADER_SIZE: usize = 40;

const ENCRYPTION_FLAG_OFFSET: usize = 16;
const ENCRYPTED: u16 = 256;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct WordFileHeader {
    /// Raw value of the word at offset 16.
    pub encryption_flag: u16,
}

impl WordFileHeader {
    /// Validates the fixed 40 byte header at the start of `data`.
    ///
    /// Checks, in order: the buffer holds at least 16 bytes, the signature matches and the buffer
    /// holds a full header, and the file is not encrypted. Encrypted documents are detected only;
    /// their body cannot be decoded.
    pub fn from_bytes(data: &[u8]) -> Result<WordFileHeader> {
        if data.len() < ENCRYPTION_FLAG_OFFSET {
            return Err(ProcessError::BadFileType);
        }

        if &data[..WORD_FILE_SIGNATURE.len()] != WORD_FILE_SIGNATURE
            || data.len() < WORD_FILE_HEADER_SIZE
        {
            return Err(ProcessError::BadFileType);
        }

        let encryption_flag = bytes::read_u16_le_or_zero(data, ENCRYPTION_FLAG_OFFSET);
        if encryption_flag == ENCRYPTED {
            return Err(ProcessError::BadFileEncrypted);
        }

        Ok(WordFileHeader { encryption_flag })
    }
}
