//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for one TIFF compression method
pub trait CompressionHandler: Send + Sync {
    /// Decompress one strip
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Compress one strip
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Human-readable name of this method
    fn name(&self) -> &'static str;

    /// TIFF compression code written to the Compression tag
    fn code(&self) -> u16;
}
