//! Utility modules for common functionality
//!
//! Logging, progress reporting and the helpers shared by the TIFF reader
//! and writer.

pub mod logger;
pub(crate) mod progress;
pub(crate) mod tiff_utils;
pub mod xml_utils;
pub(crate) mod write_utils;
pub(crate) mod ifd_utils;
pub(crate) mod format_utils;
pub(crate) mod tag_utils;
