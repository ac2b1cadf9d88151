//! Parser for DCS ("Data Collection System") payloads
//!
//! A DCS payload is a 64 byte base header followed by many short platform transmissions.  Each
//! transmission starts with a 3 byte frame marker and a 33 byte ASCII header:
//!
//! ```text
//!  offset  len  field
//!  0       8    platform address
//!  9       11   receive time, YYDDDHHMMSS
//!  20      1    status
//!  21      2    signal strength
//!  23      2    frequency offset
//!  25      1    modulation index
//!  26      1    data quality
//!  27      4    channel
//!  31      2    source code
//! ```
//!
//! Whatever follows the header, up to the next marker, is the message data.
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::DecodeError;
use crate::lrit::fixed_text;

/// Size of the base header at the start of every DCS payload
pub const DCS_BASE_HEADER_LEN: usize = 64;

/// Every transmission in the payload starts with these bytes
pub const DCS_FRAME_MARKER: [u8; 3] = [0x02, 0x02, 0x18];

/// Size of the ASCII header at the start of every transmission
pub const DCS_FRAME_HEADER_LEN: usize = 33;

/// The first 64 bytes of a DCS payload, kept as-is
#[derive(Clone, PartialEq, Eq)]
pub struct DcsBaseHeader(pub [u8; DCS_BASE_HEADER_LEN]);

impl DcsBaseHeader {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for DcsBaseHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DcsBaseHeader({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// One platform transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcsFrame {
    /// Platform address, 8 hex digits
    pub address: String,

    /// When the transmission was received
    pub timestamp: DateTime<Utc>,

    pub status: char,

    /// Signal strength, in dBm
    pub signal: String,

    /// Frequency offset from the channel center
    pub frequency_offset: String,

    pub modulation_index: char,

    pub data_quality: char,

    pub channel: String,

    /// Code of the ground station that received this transmission
    pub source: String,

    /// The message itself
    pub data: Vec<u8>,
}

impl DcsFrame {
    /// Parse one marker-delimited segment (without the marker)
    ///
    /// `index` is only used for error messages
    pub fn parse(index: usize, segment: &[u8]) -> Result<DcsFrame, DecodeError> {
        if segment.len() < DCS_FRAME_HEADER_LEN {
            return Err(DecodeError::MalformedDcsFrame {
                index,
                reason: format!(
                    "{} bytes is too short for the {} byte frame header",
                    segment.len(),
                    DCS_FRAME_HEADER_LEN
                ),
            });
        }

        let timestamp =
            parse_timestamp(&segment[9..20]).ok_or_else(|| DecodeError::MalformedDcsFrame {
                index,
                reason: format!(
                    "bad timestamp {:?}",
                    String::from_utf8_lossy(&segment[9..20])
                ),
            })?;

        Ok(DcsFrame {
            address: fixed_text(&segment[0..8])?,
            timestamp,
            status: flag(segment, 20)?,
            signal: fixed_text(&segment[21..23])?,
            frequency_offset: fixed_text(&segment[23..25])?,
            modulation_index: flag(segment, 25)?,
            data_quality: flag(segment, 26)?,
            channel: fixed_text(&segment[27..31])?,
            source: fixed_text(&segment[31..33])?,
            data: segment[DCS_FRAME_HEADER_LEN..].to_vec(),
        })
    }
}

/// A one byte flag field.  Like the other text fields it has to be valid UTF-8, which for a
/// single byte means ASCII.
fn flag(segment: &[u8], at: usize) -> Result<char, DecodeError> {
    let byte = &segment[at..at + 1];
    std::str::from_utf8(byte)?;
    Ok(byte[0] as char)
}

/// Parse a `YYDDDHHMMSS` time (2 digit year, day of year, hours, minutes, seconds)
///
/// Years are in the 2000s.
fn parse_timestamp(field: &[u8]) -> Option<DateTime<Utc>> {
    if field.len() != 11 || !field.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num = |start: usize, end: usize| {
        field[start..end]
            .iter()
            .fold(0u32, |acc, d| acc * 10 + (d - b'0') as u32)
    };

    let date = NaiveDate::from_yo_opt(2000 + num(0, 2) as i32, num(2, 5))?;
    let time = date.and_hms_opt(num(5, 7), num(7, 9), num(9, 11))?;
    Some(Utc.from_utc_datetime(&time))
}

/// Split `data` on every (non-overlapping) occurrence of `marker`
///
/// Like `str::split`, a marker at the very start or end produces an empty segment.
fn split_on_marker<'a>(data: &'a [u8], marker: &[u8]) -> Vec<&'a [u8]> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut idx = 0;
    while idx + marker.len() <= data.len() {
        if &data[idx..idx + marker.len()] == marker {
            segments.push(&data[start..idx]);
            idx += marker.len();
            start = idx;
        } else {
            idx += 1;
        }
    }
    segments.push(&data[start..]);
    segments
}

/// Decode a DCS payload into its base header and its transmissions
///
/// Empty segments between markers are dropped.
// TODO a zero-length final transmission is indistinguishable from a trailing marker, and is
// dropped along with the other empty segments.  Check against a real capture if one turns up.
pub fn decode_dcs_payload(payload: &[u8]) -> Result<(DcsBaseHeader, Vec<DcsFrame>), DecodeError> {
    if payload.len() < DCS_BASE_HEADER_LEN {
        return Err(DecodeError::TruncatedDcsPayload(payload.len()));
    }

    let mut base = [0u8; DCS_BASE_HEADER_LEN];
    base.copy_from_slice(&payload[..DCS_BASE_HEADER_LEN]);

    let frames = split_on_marker(&payload[DCS_BASE_HEADER_LEN..], &DCS_FRAME_MARKER)
        .into_iter()
        .filter(|seg| !seg.is_empty())
        .enumerate()
        .map(|(idx, seg)| DcsFrame::parse(idx, seg))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((DcsBaseHeader(base), frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use chrono::Timelike;

    fn frame_header(addr: &[u8; 8], time: &[u8; 11]) -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(addr);
        h.push(b' ');
        h.extend_from_slice(time);
        h.push(b'G');
        h.extend_from_slice(b"45");
        h.extend_from_slice(b"+0");
        h.push(b'N');
        h.push(b'N');
        h.extend_from_slice(b"097E");
        h.extend_from_slice(b"UP");
        assert_eq!(h.len(), DCS_FRAME_HEADER_LEN);
        h
    }

    fn payload(frames: &[Vec<u8>]) -> Vec<u8> {
        let mut p = vec![0u8; 64];
        for f in frames {
            p.extend_from_slice(&DCS_FRAME_MARKER);
            p.extend_from_slice(f);
        }
        p
    }

    #[test]
    fn test_single_frame() {
        let mut frame = frame_header(b"CE1234AB", b"21274123456");
        frame.extend_from_slice(b"DATA");
        let (base, frames) = decode_dcs_payload(&payload(&[frame])).unwrap();

        assert_eq!(base.as_bytes(), &[0u8; 64][..]);
        assert_eq!(frames.len(), 1);
        let f = &frames[0];
        assert_eq!(f.data, b"DATA");
        assert_eq!(f.address, "CE1234AB");
        assert_eq!(f.status, 'G');
        assert_eq!(f.signal, "45");
        assert_eq!(f.frequency_offset, "+0");
        assert_eq!(f.modulation_index, 'N');
        assert_eq!(f.data_quality, 'N');
        assert_eq!(f.channel, "097E");
        assert_eq!(f.source, "UP");

        assert_eq!(f.timestamp.year(), 2021);
        assert_eq!(f.timestamp.ordinal(), 274);
        assert_eq!(f.timestamp.month(), 10);
        assert_eq!(f.timestamp.day(), 1);
        assert_eq!(f.timestamp.hour(), 12);
        assert_eq!(f.timestamp.minute(), 34);
        assert_eq!(f.timestamp.second(), 56);
    }

    #[test]
    fn test_many_frames() {
        let mut a = frame_header(b"CE1234AB", b"21274000000");
        a.extend_from_slice(b"first message");
        let b = frame_header(b"3B0012FE", b"21274000001");
        let mut c = frame_header(b"DD5500A0", b"21365235959");
        c.extend_from_slice(&[0x40, 0x41, 0x7f]);

        let mut p = payload(&[a, b, c]);
        // a trailing marker and a doubled marker only produce empty segments
        p.extend_from_slice(&DCS_FRAME_MARKER);
        p.extend_from_slice(&DCS_FRAME_MARKER);

        let (_, frames) = decode_dcs_payload(&p).unwrap();
        let addrs: Vec<&str> = frames.iter().map(|f| f.address.as_str()).collect();
        assert_eq!(addrs, vec!["CE1234AB", "3B0012FE", "DD5500A0"]);
        assert_eq!(frames[0].data, b"first message");
        assert!(frames[1].data.is_empty());
        assert_eq!(frames[2].data, vec![0x40, 0x41, 0x7f]);
        assert_eq!(frames[2].timestamp.to_rfc3339(), "2021-12-31T23:59:59+00:00");
    }

    #[test]
    fn test_base_header_is_kept() {
        let mut p = payload(&[]);
        p[..8].copy_from_slice(b"pM-21274");
        let (base, frames) = decode_dcs_payload(&p).unwrap();
        assert!(frames.is_empty());
        assert_eq!(&base.as_bytes()[..8], b"pM-21274");
    }

    #[test]
    fn test_short_payload() {
        assert!(matches!(
            decode_dcs_payload(&[0u8; 63]),
            Err(DecodeError::TruncatedDcsPayload(63))
        ));
        assert!(matches!(
            decode_dcs_payload(&[]),
            Err(DecodeError::TruncatedDcsPayload(0))
        ));
    }

    #[test]
    fn test_short_frame() {
        let good = frame_header(b"CE1234AB", b"21274123456");
        let short = b"CE1234AB 2127".to_vec();
        match decode_dcs_payload(&payload(&[good, short])) {
            Err(DecodeError::MalformedDcsFrame { index, .. }) => assert_eq!(index, 1),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn test_bad_timestamps() {
        for time in [b"21274ab3456", b"21400123456", b"21274253456", b"2127412345 "] {
            let frame = frame_header(b"CE1234AB", time);
            assert!(
                matches!(
                    decode_dcs_payload(&payload(&[frame])),
                    Err(DecodeError::MalformedDcsFrame { index: 0, .. })
                ),
                "{:?}",
                String::from_utf8_lossy(time)
            );
        }
    }

    #[test]
    fn test_non_utf8_address() {
        let frame = frame_header(&[0xff; 8], b"21274123456");
        assert!(matches!(
            decode_dcs_payload(&payload(&[frame])),
            Err(DecodeError::TextDecode(_))
        ));
    }

    #[test]
    fn test_non_ascii_flags() {
        for (at, byte) in [(20usize, 0xffu8), (25, 0xc3), (26, 0x80)] {
            let mut frame = frame_header(b"CE1234AB", b"21274123456");
            frame[at] = byte;
            assert!(
                matches!(
                    decode_dcs_payload(&payload(&[frame])),
                    Err(DecodeError::TextDecode(_))
                ),
                "byte {} = {:#x}",
                at,
                byte
            );
        }
    }

    #[test]
    fn test_split() {
        let m = DCS_FRAME_MARKER;
        let data = [&m[..], &b"ab"[..], &m[..], &m[..], &b"c"[..]].concat();
        let segs = split_on_marker(&data, &m);
        let expected: Vec<&[u8]> = vec![&b""[..], &b"ab"[..], &b""[..], &b"c"[..]];
        assert_eq!(segs, expected);
        assert_eq!(split_on_marker(b"abc", &m), vec![&b"abc"[..]]);
        assert_eq!(split_on_marker(&[0x02, 0x02], &m), vec![&[0x02u8, 0x02][..]]);
    }
}
