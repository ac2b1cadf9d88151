//! Human readable dumps of LRIT headers
use std::fmt::Display;
use std::io::{self, Write};

use crate::headers::HeaderChain;
use crate::lrit::Record;
use crate::names;

fn name_or_unknown(name: Option<&str>, code: impl Display) -> String {
    match name {
        Some(name) => name.to_owned(),
        None => format!("Unknown({})", code),
    }
}

/// Writes one block of text per header record
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderPrinter {
    /// Show the contents of the header structure record
    pub show_structured_header: bool,
    /// Show the (binary) contents of the image data function record
    pub show_image_data: bool,
}

impl HeaderPrinter {
    pub fn write<W: Write>(&self, out: &mut W, headers: &HeaderChain) -> io::Result<()> {
        for record in headers {
            self.write_record(out, record)?;
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn write_record<W: Write>(&self, out: &mut W, record: &Record) -> io::Result<()> {
        match record {
            Record::Primary(h) => {
                writeln!(out, "Primary Header: ")?;
                writeln!(
                    out,
                    "   File Type Code: {}",
                    name_or_unknown(names::file_type_name(h.filetype_code), h.filetype_code)
                )?;
                writeln!(out, "   Header Length: {}", h.header_length)?;
                writeln!(out, "   Data Field Length: {}", h.data_length)?;
            }
            Record::ImageStructure(h) => {
                writeln!(out, "Image Structure Header: ")?;
                writeln!(out, "   Bits Per Pixel: {}", h.bits_per_pixel)?;
                writeln!(out, "   Columns: {}", h.num_columns)?;
                writeln!(out, "   Lines: {}", h.num_lines)?;
                writeln!(
                    out,
                    "   Compression: {}",
                    name_or_unknown(names::compression_name(h.compression), h.compression)
                )?;
            }
            Record::ImageNavigation(h) => {
                writeln!(out, "Image Navigation Record")?;
                writeln!(out, "   Projection Name: {}", h.projection_name)?;
                writeln!(out, "   Column Scaling Factor: {}", h.column_scaling_factor)?;
                writeln!(out, "   Line Scaling Factor: {}", h.line_scaling_factor)?;
                writeln!(out, "   Column Offset: {}", h.column_offset)?;
                writeln!(out, "   Line Offset: {}", h.line_offset)?;
            }
            Record::ImageDataFunction(h) => {
                writeln!(out, "Image Data Function Record")?;
                if self.show_image_data {
                    writeln!(out, "   Data: {}", String::from_utf8_lossy(&h.data))?;
                } else {
                    writeln!(out, "   Data: {{HIDDEN}}")?;
                }
            }
            Record::Annotation(h) => {
                writeln!(out, "Annotation Record")?;
                writeln!(out, "   Filename: {}", String::from_utf8_lossy(&h.data))?;
            }
            Record::Timestamp(h) => {
                writeln!(out, "Timestamp Record")?;
                writeln!(
                    out,
                    "   DateTime: {}",
                    h.datetime().format("%Y-%m-%d %H:%M:%S%.3f")
                )?;
            }
            Record::AncillaryText(h) => {
                writeln!(out, "Ancillary Text")?;
                writeln!(out, "   Data: ")?;
                for field in String::from_utf8_lossy(&h.data).split(';') {
                    writeln!(out, "     {}", field)?;
                }
            }
            Record::KeyHeader(h) => {
                writeln!(out, "Key Header")?;
                writeln!(out, "   Data: {}", String::from_utf8_lossy(&h.data))?;
            }
            Record::SegmentIdentification(h) => {
                writeln!(out, "Segment Identification Header")?;
                writeln!(out, "   Image Id: {}", h.image_id)?;
                writeln!(out, "   Sequence: {}", h.segment_seq)?;
                writeln!(out, "   Start Column: {}", h.start_col)?;
                writeln!(out, "   Start Line: {}", h.start_line)?;
                writeln!(out, "   Number of Segments: {}", h.max_segment)?;
                writeln!(out, "   Width: {}", h.max_column)?;
                writeln!(out, "   Height: {}", h.max_row)?;
            }
            Record::ProductSpecific(h) => {
                writeln!(out, "NOAA Specific Header")?;
                writeln!(out, "   Signature: {}", h.agency_signature)?;
                writeln!(
                    out,
                    "   Product ID: {}",
                    name_or_unknown(names::noaa_product_name(h.product_id), h.product_id)
                )?;
                writeln!(
                    out,
                    "   Product SubId: {}",
                    name_or_unknown(
                        names::noaa_sub_product_name(h.product_id, h.product_subid),
                        h.product_subid
                    )
                )?;
                writeln!(out, "   Parameter: {}", h.parameter)?;
                writeln!(
                    out,
                    "   Compression: {}",
                    name_or_unknown(names::compression_name(h.noaa_compression), h.noaa_compression)
                )?;
            }
            Record::StructuredRecord(h) => {
                writeln!(out, "Header Structured Record")?;
                if self.show_structured_header {
                    writeln!(out, "   Data: ")?;
                    for segment in String::from_utf8_lossy(&h.data).split("UI") {
                        writeln!(out, "     {}", segment)?;
                    }
                } else {
                    writeln!(out, "   Data: {{HIDDEN}}")?;
                }
            }
            Record::RiceCompression(h) => {
                writeln!(out, "Rice Compression Record")?;
                writeln!(out, "   Flags: {}", h.flags)?;
                writeln!(out, "   Pixel: {}", h.pixels_per_block)?;
                writeln!(out, "   Line: {}", h.scanlines_per_packet)?;
            }
            Record::DcsFilename(h) => {
                writeln!(out, "DCS Filename: ")?;
                writeln!(out, "   Filename: {}", String::from_utf8_lossy(&h.data))?;
            }
            Record::Unknown(tag) => {
                writeln!(out, "Type not mapped: {}", tag)?;
            }
        }
        Ok(())
    }
}
