use std::path::PathBuf;

/// Errors produced while decoding header chains, records and DCS payloads
///
/// None of these are fatal to a batch of files.  The caller decides whether to skip the file,
/// report it, or give up.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The first record is missing, isn't a primary header, or has a bad layout
    #[error("Corrupt primary header: {0}")]
    CorruptPrimaryHeader(String),

    /// A record declared more bytes than are left in the buffer
    #[error("Truncated header at offset {offset}: record needs {needed} bytes, only {available} left")]
    TruncatedHeader {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The record body doesn't match the fixed layout for its type
    #[error("Malformed record type {tag}: expected {expected} bytes, got {actual}")]
    MalformedRecord { tag: u8, expected: usize, actual: usize },

    /// A DCS payload too short to hold its 64 byte base header
    #[error("Truncated DCS payload: {0} bytes is shorter than the 64 byte base header")]
    TruncatedDcsPayload(usize),

    #[error("Malformed DCS frame {index}: {reason}")]
    MalformedDcsFrame { index: usize, reason: String },

    #[error("Text field is not valid UTF-8: {0}")]
    TextDecode(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from working with LRIT files on disk
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file has no annotation record to take a name from
    #[error("No annotation record in {}", .0.display())]
    MissingAnnotation(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
