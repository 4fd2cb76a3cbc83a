//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Handler for a TIFF compression code
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match u16::try_from(code) {
            Ok(compression::NONE) => Ok(Box::new(UncompressedHandler)),
            Ok(compression::DEFLATE) => Ok(Box::new(AdobeDeflateHandler)),
            Ok(compression::ZSTD) => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::UnsupportedCompression(code)),
        }
    }

    /// Handler for a configuration name such as `deflate`
    pub fn get_handler_by_name(name: &str) -> TiffResult<Box<dyn CompressionHandler>> {
        match name.trim().to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "deflate" | "zip" | "adobe deflate" => Ok(Box::new(AdobeDeflateHandler)),
            "zstd" => Ok(Box::new(ZstdHandler::new())),
            other => Err(TiffError::GenericError(format!("Unknown compression type: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_codes_agree() {
        for name in ["none", "deflate", "zstd"] {
            let handler = CompressionFactory::get_handler_by_name(name).unwrap();
            let by_code = CompressionFactory::create_handler(handler.code() as u64).unwrap();
            assert_eq!(by_code.name(), name);
        }
    }

    #[test]
    fn test_unknown_compression() {
        assert!(CompressionFactory::get_handler_by_name("lzw").is_err());
        assert!(matches!(
            CompressionFactory::create_handler(5),
            Err(TiffError::UnsupportedCompression(5))
        ));
    }

    #[test]
    fn test_strip_survives_each_codec() {
        let strip: Vec<u8> = [300.0f32, f32::NAN, 301.5, 0.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();

        for name in ["none", "deflate", "zstd"] {
            let handler = CompressionFactory::get_handler_by_name(name).unwrap();
            let packed = handler.compress(&strip).unwrap();
            assert_eq!(handler.decompress(&packed).unwrap(), strip, "codec {}", name);
        }
    }
}
