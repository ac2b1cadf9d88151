//! xritlib decodes the headers of LRIT/HRIT files, as broadcast by weather satellites, and the
//! DCS payloads some of those files carry.
pub mod cursor;

pub mod error;

pub mod lrit;

pub mod headers;

pub mod dcs;

pub mod session;

pub mod names;

pub mod print;

pub use dcs::{decode_dcs_payload, DcsBaseHeader, DcsFrame};
pub use error::{DecodeError, Error, Result};
pub use headers::{decode_header_chain, HeaderChain};
pub use lrit::{decode_record, Record};
pub use session::LritFile;
