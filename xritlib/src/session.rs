//! Reading LRIT files from disk
//!
//! An LRIT file is its header records followed by a data section.  The data section is
//! everything after the headers; the primary header's declared data length is only checked
//! and logged.
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::cursor::ByteCursor;
use crate::dcs::{decode_dcs_payload, DcsBaseHeader, DcsFrame};
use crate::error::{DecodeError, Error, Result};
use crate::headers::{decode_header_chain, HeaderChain};
use crate::lrit::{LRITHeader, PrimaryHeader, RECORD_PREFIX_LEN};
use crate::names;

/// One LRIT file: its decoded headers and its raw data section
#[derive(Clone)]
pub struct LritFile {
    /// Where the file was read from (if it was read from disk)
    pub path: Option<PathBuf>,
    pub headers: HeaderChain,
    pub data: Vec<u8>,
}

impl Debug for LritFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        write!(
            f,
            "<LritFile path: {:?} headers: {:?} data.len: {}",
            self.path,
            self.headers,
            self.data.len()
        )
    }
}

fn corrupt_on_eof(err: io::Error, what: &str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::CorruptPrimaryHeader(format!("file ends inside the {}", what)).into()
    } else {
        err.into()
    }
}

/// Read the primary header record, returning it along with its raw bytes
fn read_primary_record<R: Read>(cur: &mut ByteCursor<R>) -> Result<(PrimaryHeader, Vec<u8>)> {
    let tag = cur.read_u8().map_err(|e| corrupt_on_eof(e, "record prefix"))?;
    let record_size = cur.read_u16().map_err(|e| corrupt_on_eof(e, "record prefix"))?;

    if tag != PrimaryHeader::TYPE {
        return Err(DecodeError::CorruptPrimaryHeader(format!(
            "first record has type {}, expected {}",
            tag,
            PrimaryHeader::TYPE
        ))
        .into());
    }
    let body_len = (record_size as usize)
        .checked_sub(RECORD_PREFIX_LEN)
        .ok_or_else(|| {
            DecodeError::CorruptPrimaryHeader(format!("record length {} is too small", record_size))
        })?;

    let body = cur
        .read_blob(body_len)
        .map_err(|e| corrupt_on_eof(e, "primary header"))?;
    let primary = PrimaryHeader::decode(&body)
        .map_err(|e| DecodeError::CorruptPrimaryHeader(e.to_string()))?;

    let mut raw = Vec::with_capacity(record_size as usize);
    raw.push(tag);
    raw.extend_from_slice(&record_size.to_be_bytes());
    raw.extend_from_slice(&body);
    Ok((primary, raw))
}

/// Read just the primary header from the front of a reader
///
/// Nothing past the primary header record is read.
pub fn read_primary<R: Read>(reader: R) -> Result<PrimaryHeader> {
    let mut cur = ByteCursor::new(reader);
    let (primary, _) = read_primary_record(&mut cur)?;
    Ok(primary)
}

/// Read and decode the whole header region from the front of a reader
///
/// The reader is left positioned at the start of the data section.
fn read_header_chain<R: Read>(cur: &mut ByteCursor<R>) -> Result<HeaderChain> {
    let (primary, mut raw) = read_primary_record(cur)?;

    let rest = (primary.header_length as usize).saturating_sub(raw.len());
    raw.extend(cur.read_up_to(rest)?);

    let headers = decode_header_chain(&raw)?;
    check_complete(&headers)?;
    Ok(headers)
}

/// Make sure the chain covered everything the primary header said it would
fn check_complete(headers: &HeaderChain) -> Result<()> {
    let header_length = headers.header_length() as usize;
    if headers.consumed_len() < header_length {
        return Err(DecodeError::TruncatedHeader {
            offset: headers.consumed_len(),
            needed: header_length - headers.consumed_len(),
            available: 0,
        }
        .into());
    }
    Ok(())
}

fn check_data_length(headers: &HeaderChain, data: &[u8]) {
    let declared = headers.data_length();
    let actual = data.len() as u64;
    // data_length is a byte count, but some senders fill it in with the size in bits
    if declared != actual && Some(declared) != actual.checked_mul(8) {
        warn!(
            "Declared data length {} doesn't match the {} bytes of data",
            declared, actual
        );
    }
}

impl LritFile {
    /// Read only the headers of an LRIT file.  The data section is not read.
    pub fn read_headers(path: impl AsRef<Path>) -> Result<HeaderChain> {
        let file = File::open(path.as_ref())?;
        let mut cur = ByteCursor::new(BufReader::new(file));
        let headers = read_header_chain(&mut cur)?;
        debug!(
            "{}: {} header records",
            path.as_ref().display(),
            headers.len()
        );
        Ok(headers)
    }

    /// Read an entire LRIT file
    pub fn open(path: impl AsRef<Path>) -> Result<LritFile> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut cur = ByteCursor::new(BufReader::new(file));

        let headers = read_header_chain(&mut cur)?;
        debug!("{}: {} header records", path.display(), headers.len());

        let data = cur.read_to_end()?;
        check_data_length(&headers, &data);

        Ok(LritFile {
            path: Some(path.to_path_buf()),
            headers,
            data,
        })
    }

    /// Decode an LRIT file that is already in memory
    pub fn load(bytes: &[u8]) -> Result<LritFile> {
        let headers = decode_header_chain(bytes)?;
        check_complete(&headers)?;

        let data = bytes[headers.consumed_len()..].to_vec();
        check_data_length(&headers, &data);

        Ok(LritFile {
            path: None,
            headers,
            data,
        })
    }

    pub fn filetype_code(&self) -> u8 {
        self.headers.primary().filetype_code
    }

    /// Write the data section somewhere
    pub fn dump_data<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(&self.data)?;
        out.flush()
    }

    /// The path this file should have, according to its annotation record
    ///
    /// This is in the same directory as the original file.
    pub fn annotated_path(&self) -> Result<PathBuf> {
        let path = self.path.clone().unwrap_or_default();
        annotated_path(&path, &self.headers)
    }

    /// Decode the data section as a DCS payload
    ///
    /// Returns `None` if this isn't a DCS file
    pub fn dcs(&self) -> Option<std::result::Result<(DcsBaseHeader, Vec<DcsFrame>), DecodeError>> {
        if self.filetype_code() != names::FILETYPE_DCS {
            return None;
        }
        Some(decode_dcs_payload(&self.data))
    }
}

/// The sibling of `path` that is named by the annotation record in `headers`
pub fn annotated_path(path: &Path, headers: &HeaderChain) -> Result<PathBuf> {
    let annotation = headers
        .annotation()
        .ok_or_else(|| Error::MissingAnnotation(path.to_path_buf()))?;

    // only the final component, so that an annotation can't point outside the directory
    let name = Path::new(annotation.text()?)
        .file_name()
        .ok_or_else(|| Error::MissingAnnotation(path.to_path_buf()))?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(name))
}
