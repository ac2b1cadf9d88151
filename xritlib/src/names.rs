//! Human readable names for the numeric codes found in LRIT headers
//!
//! Every lookup returns `None` for codes we don't know about.  Unknown codes are never an
//! error, it's up to the caller to decide how to show them.

pub const FILETYPE_IMAGE: u8 = 0;
pub const FILETYPE_TEXT: u8 = 2;
pub const FILETYPE_DCS: u8 = 130;

/// NOAA product ID of DCS data
pub const PRODUCT_DCS: u16 = 8;

/// Name of a primary header file type code
pub fn file_type_name(code: u8) -> Option<&'static str> {
    match code {
        FILETYPE_IMAGE => Some("Image"),
        FILETYPE_TEXT => Some("Text"),
        FILETYPE_DCS => Some("DCS"),
        _ => None,
    }
}

/// Name of a compression code, as used by the image structure and NOAA headers
pub fn compression_name(code: u8) -> Option<&'static str> {
    match code {
        0 => Some("Not Compressed"),
        1 => Some("LRIT Rice"),
        2 => Some("JPEG"),
        5 => Some("GIF"),
        _ => None,
    }
}

/// Name of a NOAA product ID
pub fn noaa_product_name(product_id: u16) -> Option<&'static str> {
    match product_id {
        1 => Some("NOAA Text"),
        3 | 4 => Some("Other Satellite"),
        6 => Some("Weather Data"),
        PRODUCT_DCS => Some("DCS"),
        13 => Some("Scanner Image"),
        _ => None,
    }
}

/// Name of a NOAA sub-product.  Sub-product IDs only mean something within their product.
pub fn noaa_sub_product_name(product_id: u16, sub_id: u16) -> Option<&'static str> {
    match (product_id, sub_id) {
        (1, 0) | (4, 0) | (6, 0) | (PRODUCT_DCS, 0) => Some("None"),
        (3, 1) | (4, 1) => Some("Infrared Full Disk"),
        (3, 3) | (4, 3) => Some("Visible Full Disk"),
        (13, 1) => Some("Full Disk Infrared"),
        (13, 2) => Some("Region Infrared"),
        (13, 5) => Some("Area of Interest Infrared"),
        (13, 11) => Some("Full Disk Visible"),
        (13, 12) => Some("Region Visible"),
        (13, 15) => Some("Area of Interest Visible"),
        (13, 21) => Some("Full Disk Water Vapour"),
        (13, 22) => Some("Region Water Vapour"),
        (13, 25) => Some("Area of Interest Water Vapour"),
        _ => None,
    }
}
