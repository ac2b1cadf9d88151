//! Walking the chain of header records at the start of an LRIT file
use std::ops::Range;

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::lrit::*;

/// All the header records of one LRIT file, in the order they appeared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChain {
    primary: PrimaryHeader,
    records: Vec<Record>,
    /// How many bytes of the buffer the records covered
    consumed: usize,
}

impl HeaderChain {
    /// The primary header.  This is always the first record in the chain.
    pub fn primary(&self) -> &PrimaryHeader {
        &self.primary
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Total number of bytes taken up by the records (prefixes included)
    ///
    /// For a complete header buffer this is the same as the primary header's `header_length`
    pub fn consumed_len(&self) -> usize {
        self.consumed
    }

    pub fn header_length(&self) -> u32 {
        self.primary.header_length
    }

    pub fn data_length(&self) -> u64 {
        self.primary.data_length
    }

    /// Where the data section should be, according to the primary header
    pub fn declared_data_range(&self) -> Range<u64> {
        let start = self.primary.header_length as u64;
        start..start.saturating_add(self.primary.data_length)
    }

    /// Where the data section is in a file of `file_len` bytes: everything after the headers
    pub fn data_range(&self, file_len: u64) -> Range<u64> {
        let start = std::cmp::min(self.primary.header_length as u64, file_len);
        start..file_len
    }

    pub fn image_structure(&self) -> Option<&ImageStructureRecord> {
        self.iter().find_map(|r| match r {
            Record::ImageStructure(h) => Some(h),
            _ => None,
        })
    }

    pub fn image_navigation(&self) -> Option<&ImageNavigationRecord> {
        self.iter().find_map(|r| match r {
            Record::ImageNavigation(h) => Some(h),
            _ => None,
        })
    }

    pub fn image_data_function(&self) -> Option<&ImageDataFunctionRecord> {
        self.iter().find_map(|r| match r {
            Record::ImageDataFunction(h) => Some(h),
            _ => None,
        })
    }

    pub fn annotation(&self) -> Option<&AnnotationRecord> {
        self.iter().find_map(|r| match r {
            Record::Annotation(h) => Some(h),
            _ => None,
        })
    }

    pub fn timestamp(&self) -> Option<&TimeStampRecord> {
        self.iter().find_map(|r| match r {
            Record::Timestamp(h) => Some(h),
            _ => None,
        })
    }

    pub fn ancillary_text(&self) -> Option<&AncillaryTextRecord> {
        self.iter().find_map(|r| match r {
            Record::AncillaryText(h) => Some(h),
            _ => None,
        })
    }

    pub fn key_header(&self) -> Option<&KeyHeaderRecord> {
        self.iter().find_map(|r| match r {
            Record::KeyHeader(h) => Some(h),
            _ => None,
        })
    }

    pub fn segment(&self) -> Option<&ImageSegmentIdentificationRecord> {
        self.iter().find_map(|r| match r {
            Record::SegmentIdentification(h) => Some(h),
            _ => None,
        })
    }

    pub fn noaa(&self) -> Option<&NOAALRITHeader> {
        self.iter().find_map(|r| match r {
            Record::ProductSpecific(h) => Some(h),
            _ => None,
        })
    }

    pub fn header_structure(&self) -> Option<&HeaderStructureRecord> {
        self.iter().find_map(|r| match r {
            Record::StructuredRecord(h) => Some(h),
            _ => None,
        })
    }

    pub fn rice_compression(&self) -> Option<&RiceCompressionSecondaryHeader> {
        self.iter().find_map(|r| match r {
            Record::RiceCompression(h) => Some(h),
            _ => None,
        })
    }

    pub fn dcs_filename(&self) -> Option<&DcsFilenameRecord> {
        self.iter().find_map(|r| match r {
            Record::DcsFilename(h) => Some(h),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a HeaderChain {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Read the type and the record length from the front of `data`
///
/// Returns `None` if there aren't even 3 bytes left
fn read_prefix(data: &[u8]) -> Result<Option<(u8, usize)>, DecodeError> {
    if data.len() < RECORD_PREFIX_LEN {
        return Ok(None);
    }
    let mut cur = ByteCursor::new(data);
    let tag = cur.read_u8()?;
    let record_size = cur.read_u16()? as usize;
    Ok(Some((tag, record_size)))
}

/// Decode the primary header at the start of `buf`, returning it with its record length
fn decode_primary(buf: &[u8]) -> Result<(PrimaryHeader, usize), DecodeError> {
    let (tag, record_size) = match read_prefix(buf)? {
        Some(prefix) => prefix,
        None => {
            return Err(DecodeError::CorruptPrimaryHeader(format!(
                "need at least {} bytes, only have {}",
                RECORD_PREFIX_LEN,
                buf.len()
            )))
        }
    };

    if tag != PrimaryHeader::TYPE {
        return Err(DecodeError::CorruptPrimaryHeader(format!(
            "first record has type {}, expected {}",
            tag,
            PrimaryHeader::TYPE
        )));
    }
    if record_size < RECORD_PREFIX_LEN {
        return Err(DecodeError::CorruptPrimaryHeader(format!(
            "record length {} is too small",
            record_size
        )));
    }
    if record_size > buf.len() {
        return Err(DecodeError::TruncatedHeader {
            offset: 0,
            needed: record_size,
            available: buf.len(),
        });
    }

    let primary = PrimaryHeader::decode(&buf[RECORD_PREFIX_LEN..record_size])
        .map_err(|e| DecodeError::CorruptPrimaryHeader(e.to_string()))?;

    if (primary.header_length as usize) < record_size {
        return Err(DecodeError::CorruptPrimaryHeader(format!(
            "total header length {} is shorter than the primary header itself",
            primary.header_length
        )));
    }

    Ok((primary, record_size))
}

/// Decode all the header records at the start of `buf`
///
/// The first record must be a primary header.  Its `header_length` bounds the walk, so any
/// bytes past the declared header region (normally the data section) are never looked at.
/// Unknown record types are kept as `Record::Unknown` and skipped using their declared length.
pub fn decode_header_chain(buf: &[u8]) -> Result<HeaderChain, DecodeError> {
    let (primary, primary_len) = decode_primary(buf)?;

    let mut records = vec![Record::Primary(primary)];
    let mut offset = primary_len;

    // the primary header tells us how long the whole chain is (measured from the start)
    let header_end = std::cmp::min(primary.header_length as usize, buf.len());
    let mut remaining = &buf[primary_len..header_end];

    while !remaining.is_empty() {
        let (tag, record_size) = match read_prefix(remaining)? {
            Some(prefix) => prefix,
            None => {
                return Err(DecodeError::TruncatedHeader {
                    offset,
                    needed: RECORD_PREFIX_LEN,
                    available: remaining.len(),
                })
            }
        };

        if record_size < RECORD_PREFIX_LEN {
            // can't make progress on a record that's shorter than its own prefix
            return Err(DecodeError::MalformedRecord {
                tag,
                expected: RECORD_PREFIX_LEN,
                actual: record_size,
            });
        }
        if record_size > remaining.len() {
            return Err(DecodeError::TruncatedHeader {
                offset,
                needed: record_size,
                available: remaining.len(),
            });
        }

        records.push(decode_record(tag, &remaining[RECORD_PREFIX_LEN..record_size])?);

        remaining = &remaining[record_size..];
        offset += record_size;
    }

    Ok(HeaderChain {
        primary,
        records,
        consumed: offset,
    })
}
