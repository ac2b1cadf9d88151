#![allow(dead_code)]

use xritlib::lrit::PrimaryHeader;

/// Build one header record, prefix and all
pub fn record(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut v = vec![tag];
    v.extend_from_slice(&((body.len() + 3) as u16).to_be_bytes());
    v.extend_from_slice(body);
    v
}

/// Build a header region: a primary header that covers the given records, then the records
pub fn header_region(filetype_code: u8, data_length: u64, records: &[Vec<u8>]) -> Vec<u8> {
    let total = PrimaryHeader::RECORD_LEN + records.iter().map(|r| r.len()).sum::<usize>();
    let mut body = vec![filetype_code];
    body.extend_from_slice(&(total as u32).to_be_bytes());
    body.extend_from_slice(&data_length.to_be_bytes());

    let mut buf = record(0, &body);
    for r in records {
        buf.extend_from_slice(r);
    }
    buf
}

/// The headers of one segment of a full disk image, the way GOES-16 sends them
pub fn image_segment_headers() -> Vec<Vec<u8>> {
    let mut nav = b"GEOS(-75.0)".to_vec();
    nav.resize(32, b' ');
    for v in [0x0140_0000u32, 0x0140_0000, 2712, 1356] {
        nav.extend_from_slice(&v.to_be_bytes());
    }
    vec![
        record(1, &[8, 0x15, 0x30, 0x01, 0x53, 1]),
        record(2, &nav),
        record(4, b"OR_ABI-L2-CMIPF-M6C13_G16_s20212740000204_e20212740009524_c20212740010008.lrit"),
        record(5, &[0x00, 0x57, 0x0a, 0x00, 0x00, 0x4e, 0x20]),
        record(6, b"Time of frame start=2021-10-01T00:00:20.4Z;Segmented=yes;Satellite=G16"),
        record(128, &[0xe2, 0x94, 0, 1, 0, 0, 0x01, 0x53, 0, 16, 0x15, 0x30, 0x15, 0x30]),
        record(129, &[b'N', b'O', b'A', b'A', 0, 16, 0, 13, 0, 0, 1]),
        record(130, b"UI0=1UI1=0"),
        record(131, &[0x00, 0x31, 16, 1]),
    ]
}
