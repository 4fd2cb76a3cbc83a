//! Strip compression for the output raster
//!
//! Each compression method is a [`CompressionHandler`] strategy; the
//! [`CompressionFactory`] resolves the handler from a TIFF compression code
//! (when reading a raster back) or a configuration name (when writing).

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
