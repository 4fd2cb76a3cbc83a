//! TIFF file format module
//!
//! Structures and functions for writing single-band GeoTIFF rasters and
//! reading TIFF and BigTIFF files back.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
#[cfg(test)]
mod tests;
pub mod builder;
pub(crate) mod builders;
pub(crate) mod constants;
pub mod geo_key_parser;
pub(crate) mod validation;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use geo_key_parser::{GeoInfo, GeoKeyEntry, GeoKeyParser, get_key_name};
pub use builder::TiffBuilder;
