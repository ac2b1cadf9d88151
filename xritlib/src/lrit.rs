//! LRIT/HRIT header records
//!
//! Every LRIT file starts with a chain of header records.  Each record is a 1 byte type tag, a
//! 2 byte big-endian record length (which counts these 3 prefix bytes), and then a body whose
//! layout depends on the type.
//!
//! Ref: 3_LRIT_Receiver-specs.pdf
//!
//! Ref: 5_LRIT_Mission-data.pdf
use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

/// Length of the type + length prefix that starts every record
pub const RECORD_PREFIX_LEN: usize = 3;

/// Seconds between the CCSDS epoch (1958-01-01T00:00:00) and the unix epoch
pub const CCSDS_EPOCH_OFFSET_SECS: i64 = 378_691_200;

/// Some compile-time knowledge about each record type
pub trait LRITHeader: Debug + Sized {
    /// The type tag of this record
    const TYPE: u8;

    /// Size of the record body (not counting the 3 byte prefix), or `None` if the record
    /// takes whatever body it's given
    const BODY_LEN: Option<usize>;

    /// Decode a body that is already known to have the right length
    fn from_body(body: &[u8]) -> Result<Self, DecodeError>;

    /// Check the body length against the layout, then decode it
    fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        if let Some(expected) = Self::BODY_LEN {
            if body.len() != expected {
                return Err(DecodeError::MalformedRecord {
                    tag: Self::TYPE,
                    expected,
                    actual: body.len(),
                });
            }
        }
        Self::from_body(body)
    }
}

/// One decoded header record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Primary(PrimaryHeader),
    ImageStructure(ImageStructureRecord),
    ImageNavigation(ImageNavigationRecord),
    ImageDataFunction(ImageDataFunctionRecord),
    Annotation(AnnotationRecord),
    Timestamp(TimeStampRecord),
    AncillaryText(AncillaryTextRecord),
    KeyHeader(KeyHeaderRecord),
    SegmentIdentification(ImageSegmentIdentificationRecord),
    ProductSpecific(NOAALRITHeader),
    StructuredRecord(HeaderStructureRecord),
    RiceCompression(RiceCompressionSecondaryHeader),
    DcsFilename(DcsFilenameRecord),
    /// A record type we don't know how to decode.  Its body is dropped.
    Unknown(u8),
}

impl Record {
    /// The type tag this record was decoded from
    pub fn tag(&self) -> u8 {
        match self {
            Record::Primary(_) => PrimaryHeader::TYPE,
            Record::ImageStructure(_) => ImageStructureRecord::TYPE,
            Record::ImageNavigation(_) => ImageNavigationRecord::TYPE,
            Record::ImageDataFunction(_) => ImageDataFunctionRecord::TYPE,
            Record::Annotation(_) => AnnotationRecord::TYPE,
            Record::Timestamp(_) => TimeStampRecord::TYPE,
            Record::AncillaryText(_) => AncillaryTextRecord::TYPE,
            Record::KeyHeader(_) => KeyHeaderRecord::TYPE,
            Record::SegmentIdentification(_) => ImageSegmentIdentificationRecord::TYPE,
            Record::ProductSpecific(_) => NOAALRITHeader::TYPE,
            Record::StructuredRecord(_) => HeaderStructureRecord::TYPE,
            Record::RiceCompression(_) => RiceCompressionSecondaryHeader::TYPE,
            Record::DcsFilename(_) => DcsFilenameRecord::TYPE,
            Record::Unknown(tag) => *tag,
        }
    }

    /// The raw body of the records that are kept as opaque data
    pub fn opaque_data(&self) -> Option<&[u8]> {
        match self {
            Record::ImageDataFunction(r) => Some(&r.data),
            Record::Annotation(r) => Some(&r.data),
            Record::AncillaryText(r) => Some(&r.data),
            Record::KeyHeader(r) => Some(&r.data),
            Record::StructuredRecord(r) => Some(&r.data),
            Record::DcsFilename(r) => Some(&r.data),
            _ => None,
        }
    }
}

/// Decode the body of a record, given its type tag
///
/// Unknown tags are not an error, they come back as `Record::Unknown`.  A known fixed-layout
/// record whose body is the wrong size is reported as `DecodeError::MalformedRecord`.
pub fn decode_record(tag: u8, body: &[u8]) -> Result<Record, DecodeError> {
    let record = match tag {
        // Mandatory first record for every file type
        0 => Record::Primary(PrimaryHeader::decode(body)?),
        // Mandatory for image data
        1 => Record::ImageStructure(ImageStructureRecord::decode(body)?),
        // Optional for image data
        2 => Record::ImageNavigation(ImageNavigationRecord::decode(body)?),
        3 => Record::ImageDataFunction(ImageDataFunctionRecord::decode(body)?),
        // Mandatory for image data, text, meteorologic data, and GTS messages
        4 => Record::Annotation(AnnotationRecord::decode(body)?),
        5 => Record::Timestamp(TimeStampRecord::decode(body)?),
        6 => Record::AncillaryText(AncillaryTextRecord::decode(body)?),
        // encryption key header
        7 => Record::KeyHeader(KeyHeaderRecord::decode(body)?),
        128 => Record::SegmentIdentification(ImageSegmentIdentificationRecord::decode(body)?),
        129 => Record::ProductSpecific(NOAALRITHeader::decode(body)?),
        130 => Record::StructuredRecord(HeaderStructureRecord::decode(body)?),
        131 => Record::RiceCompression(RiceCompressionSecondaryHeader::decode(body)?),
        // Found in DCS files
        132 => Record::DcsFilename(DcsFilenameRecord::decode(body)?),
        x => Record::Unknown(x),
    };
    Ok(record)
}

/// Decode a fixed-width text field, dropping the space or NUL padding at the end
pub(crate) fn fixed_text(buf: &[u8]) -> Result<String, DecodeError> {
    let s = std::str::from_utf8(buf)?;
    Ok(s.trim_end_matches(|c: char| c == ' ' || c == '\0').to_owned())
}

/// Decode a whole opaque body as text (with surrounding whitespace and NULs trimmed)
fn body_text(buf: &[u8]) -> Result<&str, DecodeError> {
    let s = std::str::from_utf8(buf)?;
    Ok(s.trim_matches(|c: char| c.is_whitespace() || c == '\0'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryHeader {
    /// File type code
    ///
    /// This indicates what other headers we might expect to see
    pub filetype_code: u8,

    /// Total header length
    ///
    /// Total length of all header records (including this one), in bytes
    ///
    /// Since the primary header itself is 16 bytes, if header_length == 16, then there are no other headers
    pub header_length: u32,

    /// Data field length in bytes, as declared by the sender
    ///
    /// This is only compared against how much data actually follows the headers, never
    /// trusted to find the end of the file
    pub data_length: u64,
}

impl LRITHeader for PrimaryHeader {
    const TYPE: u8 = 0;
    const BODY_LEN: Option<usize> = Some(13);

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(body);
        Ok(PrimaryHeader {
            filetype_code: cur.read_u8()?,
            header_length: cur.read_u32()?,
            data_length: cur.read_u64()?,
        })
    }
}

impl PrimaryHeader {
    /// Size of the whole primary record, prefix included
    pub const RECORD_LEN: usize = 16;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStructureRecord {
    pub bits_per_pixel: u8,

    pub num_columns: u16,

    pub num_lines: u16,

    /// Compression flag (0 none, 1 lossless, 2 lossy)
    pub compression: u8,
}

impl LRITHeader for ImageStructureRecord {
    const TYPE: u8 = 1;
    const BODY_LEN: Option<usize> = Some(6);

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(body);
        Ok(ImageStructureRecord {
            bits_per_pixel: cur.read_u8()?,
            num_columns: cur.read_u16()?,
            num_lines: cur.read_u16()?,
            compression: cur.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNavigationRecord {
    pub projection_name: String,

    pub column_scaling_factor: u32,
    pub line_scaling_factor: u32,
    pub column_offset: u32,
    pub line_offset: u32,
}

impl LRITHeader for ImageNavigationRecord {
    const TYPE: u8 = 2;
    const BODY_LEN: Option<usize> = Some(48);

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(body);
        let name_buf = cur.read_array::<32>()?;

        Ok(ImageNavigationRecord {
            projection_name: fixed_text(&name_buf)?,
            column_scaling_factor: cur.read_u32()?,
            line_scaling_factor: cur.read_u32()?,
            column_offset: cur.read_u32()?,
            line_offset: cur.read_u32()?,
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ImageDataFunctionRecord {
    pub data: Vec<u8>,
}

// A custom implementation that doesn't show all the bytes of self.data
impl std::fmt::Debug for ImageDataFunctionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "ImageDataFunctionRecord {{ data: {} bytes }}", self.data.len())
    }
}

impl LRITHeader for ImageDataFunctionRecord {
    const TYPE: u8 = 3;
    const BODY_LEN: Option<usize> = None;

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(ImageDataFunctionRecord { data: body.to_vec() })
    }
}

/// This header specifies an alphanumeric annotation for the file
///
/// The annotation is the name the file was sent under, which makes it useful for naming files
/// on disk.
///
/// Source: 4_LRIT_Transmitter-specs.pdf Table 10 (page 13)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub data: Vec<u8>,
}

impl AnnotationRecord {
    /// The annotation as a filename
    pub fn text(&self) -> Result<&str, DecodeError> {
        body_text(&self.data)
    }
}

impl LRITHeader for AnnotationRecord {
    const TYPE: u8 = 4;
    const BODY_LEN: Option<usize> = None;

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(AnnotationRecord { data: body.to_vec() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStampRecord {
    /// Days since 1 January 1958
    pub days: u16,

    /// Milliseconds of that day
    pub millis: u32,
}

impl TimeStampRecord {
    /// CCSDS time, converted to UTC
    pub fn datetime(&self) -> DateTime<Utc> {
        let millis = self.days as i64 * 86_400_000 + self.millis as i64
            - CCSDS_EPOCH_OFFSET_SECS * 1000;
        DateTime::<Utc>::default() + Duration::milliseconds(millis)
    }
}

impl LRITHeader for TimeStampRecord {
    const TYPE: u8 = 5;
    const BODY_LEN: Option<usize> = Some(7);

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(body);
        // The P-field of the CCSDS day segmented time code.  It's always the same, so skip it.
        let _pfield = cur.read_u8()?;

        Ok(TimeStampRecord {
            days: cur.read_u16()?,
            millis: cur.read_u32()?,
        })
    }
}

/// Free-form `key=value` pairs, separated by `;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncillaryTextRecord {
    pub data: Vec<u8>,
}

impl AncillaryTextRecord {
    pub fn text(&self) -> Result<&str, DecodeError> {
        body_text(&self.data)
    }

    /// The individual `;` separated fields
    pub fn fields(&self) -> Result<Vec<&str>, DecodeError> {
        Ok(self.text()?.split(';').collect())
    }
}

impl LRITHeader for AncillaryTextRecord {
    const TYPE: u8 = 6;
    const BODY_LEN: Option<usize> = None;

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(AncillaryTextRecord { data: body.to_vec() })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct KeyHeaderRecord {
    pub data: Vec<u8>,
}

impl std::fmt::Debug for KeyHeaderRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "KeyHeaderRecord {{ data: {} bytes }}", self.data.len())
    }
}

impl LRITHeader for KeyHeaderRecord {
    const TYPE: u8 = 7;
    const BODY_LEN: Option<usize> = None;

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(KeyHeaderRecord { data: body.to_vec() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSegmentIdentificationRecord {
    pub image_id: u16,

    pub segment_seq: u16,

    pub start_col: u16,
    pub start_line: u16,

    pub max_segment: u16,
    pub max_column: u16,
    pub max_row: u16,
}

impl LRITHeader for ImageSegmentIdentificationRecord {
    const TYPE: u8 = 128;
    const BODY_LEN: Option<usize> = Some(14);

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(body);
        Ok(ImageSegmentIdentificationRecord {
            image_id: cur.read_u16()?,
            segment_seq: cur.read_u16()?,
            start_col: cur.read_u16()?,
            start_line: cur.read_u16()?,
            max_segment: cur.read_u16()?,
            max_column: cur.read_u16()?,
            max_row: cur.read_u16()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NOAALRITHeader {
    /// Agency signature, normally "NOAA"
    pub agency_signature: String,

    pub product_id: u16,
    pub product_subid: u16,
    pub parameter: u16,
    pub noaa_compression: u8,
}

impl LRITHeader for NOAALRITHeader {
    const TYPE: u8 = 129;
    const BODY_LEN: Option<usize> = Some(11);

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(body);
        let sig = cur.read_array::<4>()?;

        Ok(NOAALRITHeader {
            agency_signature: fixed_text(&sig)?,
            product_id: cur.read_u16()?,
            product_subid: cur.read_u16()?,
            parameter: cur.read_u16()?,
            noaa_compression: cur.read_u8()?,
        })
    }
}

/// Header structure record, a list of text segments separated by "UI"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderStructureRecord {
    pub data: Vec<u8>,
}

impl HeaderStructureRecord {
    pub fn text(&self) -> Result<&str, DecodeError> {
        body_text(&self.data)
    }

    pub fn segments(&self) -> Result<Vec<&str>, DecodeError> {
        Ok(self.text()?.split("UI").collect())
    }
}

impl LRITHeader for HeaderStructureRecord {
    const TYPE: u8 = 130;
    const BODY_LEN: Option<usize> = None;

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(HeaderStructureRecord { data: body.to_vec() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiceCompressionSecondaryHeader {
    pub flags: u16,

    pub pixels_per_block: u8,

    pub scanlines_per_packet: u8,
}

impl LRITHeader for RiceCompressionSecondaryHeader {
    const TYPE: u8 = 131;
    const BODY_LEN: Option<usize> = Some(4);

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(body);
        Ok(RiceCompressionSecondaryHeader {
            flags: cur.read_u16()?,
            pixels_per_block: cur.read_u8()?,
            scanlines_per_packet: cur.read_u8()?,
        })
    }
}

/// The name of the DCS file carried in the data section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcsFilenameRecord {
    pub data: Vec<u8>,
}

impl DcsFilenameRecord {
    pub fn filename(&self) -> Result<&str, DecodeError> {
        body_text(&self.data)
    }
}

impl LRITHeader for DcsFilenameRecord {
    const TYPE: u8 = 132;
    const BODY_LEN: Option<usize> = None;

    fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(DcsFilenameRecord { data: body.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_primary() {
        let body = [0x82, 0, 0, 0, 0x2e, 0, 0, 0, 0, 0, 0, 0x10, 0];
        let rec = decode_record(0, &body).unwrap();
        assert_eq!(
            rec,
            Record::Primary(PrimaryHeader {
                filetype_code: 130,
                header_length: 46,
                data_length: 4096,
            })
        );
        assert_eq!(rec.tag(), 0);
        assert!(rec.opaque_data().is_none());
    }

    #[test]
    fn test_image_structure() {
        let body = [8, 0x15, 0x30, 0x01, 0x53, 1];
        match decode_record(1, &body).unwrap() {
            Record::ImageStructure(ish) => {
                assert_eq!(ish.bits_per_pixel, 8);
                assert_eq!(ish.num_columns, 5424);
                assert_eq!(ish.num_lines, 339);
                assert_eq!(ish.compression, 1);
            }
            x => panic!("wrong record {:?}", x),
        }
    }

    #[test]
    fn test_image_navigation() {
        let mut body = Vec::new();
        body.extend_from_slice(b"GEOS(-75.0)");
        body.resize(32, b' ');
        for v in [0x0140_0000u32, 0x0140_0000, 2712, 1356] {
            body.extend_from_slice(&v.to_be_bytes());
        }
        match decode_record(2, &body).unwrap() {
            Record::ImageNavigation(nav) => {
                assert_eq!(nav.projection_name, "GEOS(-75.0)");
                assert_eq!(nav.column_scaling_factor, 0x0140_0000);
                assert_eq!(nav.line_scaling_factor, 0x0140_0000);
                assert_eq!(nav.column_offset, 2712);
                assert_eq!(nav.line_offset, 1356);
            }
            x => panic!("wrong record {:?}", x),
        }
    }

    #[test]
    fn test_projection_name_must_be_utf8() {
        let mut body = vec![0xff; 32];
        body.extend_from_slice(&[0; 16]);
        assert!(matches!(decode_record(2, &body), Err(DecodeError::TextDecode(_))));
    }

    #[test]
    fn test_timestamp() {
        let rec = decode_record(5, &[0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01]).unwrap();
        let ts = match rec {
            Record::Timestamp(ts) => ts,
            x => panic!("wrong record {:?}", x),
        };
        assert_eq!(ts.days, 1);
        assert_eq!(ts.millis, 1);
        let expected = NaiveDate::from_ymd_opt(1958, 1, 2)
            .unwrap()
            .and_hms_milli_opt(0, 0, 0, 1)
            .unwrap();
        assert_eq!(ts.datetime(), Utc.from_utc_datetime(&expected));
    }

    #[test]
    fn test_timestamp_epoch() {
        let ts = TimeStampRecord { days: 0, millis: 0 };
        assert_eq!(ts.datetime().to_rfc3339(), "1958-01-01T00:00:00+00:00");

        // 2019-01-01 is 22280 days after the epoch
        let ts = TimeStampRecord {
            days: 22280,
            millis: 3_600_000,
        };
        assert_eq!(ts.datetime().to_rfc3339(), "2019-01-01T01:00:00+00:00");
    }

    #[test]
    fn test_segment_identification() {
        let body = [0xe2, 0x94, 0, 1, 0, 0, 0x01, 0x53, 0, 16, 0x15, 0x30, 0x15, 0x30];
        match decode_record(128, &body).unwrap() {
            Record::SegmentIdentification(seg) => {
                assert_eq!(seg.image_id, 58004);
                assert_eq!(seg.segment_seq, 1);
                assert_eq!(seg.start_col, 0);
                assert_eq!(seg.start_line, 339);
                assert_eq!(seg.max_segment, 16);
                assert_eq!(seg.max_column, 5424);
                assert_eq!(seg.max_row, 5424);
            }
            x => panic!("wrong record {:?}", x),
        }
    }

    #[test]
    fn test_noaa_header() {
        let body = [b'N', b'O', b'A', b'A', 0, 8, 0, 0, 0, 0, 0];
        match decode_record(129, &body).unwrap() {
            Record::ProductSpecific(noaa) => {
                assert_eq!(noaa.agency_signature, "NOAA");
                assert_eq!(noaa.product_id, 8);
                assert_eq!(noaa.product_subid, 0);
                assert_eq!(noaa.parameter, 0);
                assert_eq!(noaa.noaa_compression, 0);
            }
            x => panic!("wrong record {:?}", x),
        }
    }

    #[test]
    fn test_rice() {
        let body = [0x00, 0x31, 16, 1];
        assert_eq!(
            decode_record(131, &body).unwrap(),
            Record::RiceCompression(RiceCompressionSecondaryHeader {
                flags: 49,
                pixels_per_block: 16,
                scanlines_per_packet: 1,
            })
        );
    }

    #[test]
    fn test_opaque_records_keep_their_bytes() {
        let body = b"\x00\xffnot \x01 text\x00";
        for tag in [3u8, 4, 6, 7, 130, 132] {
            let rec = decode_record(tag, body).unwrap();
            assert_eq!(rec.tag(), tag);
            assert_eq!(rec.opaque_data(), Some(&body[..]), "tag {}", tag);
        }
        // and they take any length, including nothing
        for tag in [3u8, 4, 6, 7, 130, 132] {
            let rec = decode_record(tag, &[]).unwrap();
            assert_eq!(rec.opaque_data(), Some(&[][..]));
        }
    }

    #[test]
    fn test_text_accessors() {
        let ann = AnnotationRecord {
            data: b"OR_ABI-L2-CMIPF-M6C13_G16_s20211.lrit\0".to_vec(),
        };
        assert_eq!(ann.text().unwrap(), "OR_ABI-L2-CMIPF-M6C13_G16_s20211.lrit");

        let text = AncillaryTextRecord {
            data: b"Time of frame start=2021-10-01T00:00:20.1Z;Segmented=yes".to_vec(),
        };
        assert_eq!(
            text.fields().unwrap(),
            vec!["Time of frame start=2021-10-01T00:00:20.1Z", "Segmented=yes"]
        );

        let hs = HeaderStructureRecord {
            data: b"UI0=1UI1=2".to_vec(),
        };
        assert_eq!(hs.segments().unwrap(), vec!["", "0=1", "1=2"]);

        let bad = DcsFilenameRecord { data: vec![0xc3, 0x28] };
        assert!(matches!(bad.filename(), Err(DecodeError::TextDecode(_))));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(decode_record(200, b"whatever").unwrap(), Record::Unknown(200));
        assert_eq!(decode_record(8, &[]).unwrap(), Record::Unknown(8));
        assert_eq!(Record::Unknown(200).tag(), 200);
    }

    #[test]
    fn test_wrong_body_length() {
        for (tag, len) in [(0u8, 13usize), (1, 6), (2, 48), (5, 7), (128, 14), (129, 11), (131, 4)] {
            let short = vec![0u8; len - 1];
            match decode_record(tag, &short) {
                Err(DecodeError::MalformedRecord {
                    tag: t,
                    expected,
                    actual,
                }) => {
                    assert_eq!(t, tag);
                    assert_eq!(expected, len);
                    assert_eq!(actual, len - 1);
                }
                x => panic!("tag {} gave {:?}", tag, x),
            }
            let long = vec![b' '; len + 1];
            assert!(matches!(
                decode_record(tag, &long),
                Err(DecodeError::MalformedRecord { .. })
            ));
        }
    }
}
