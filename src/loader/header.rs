//! ENVI header parsing
//!
//! The geolocation binary ships with a text header of `key = value` lines.
//! Keys are matched by name, so their order and any extra keys do not
//! matter. Values wrapped in `{ ... }` may span several lines.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::errors::{ConvertError, ConvertResult};
use crate::io::byte_order::ByteOrder;

lazy_static! {
    static ref KEY_VALUE: Regex = Regex::new(r"^([^=]+?)\s*=\s*(.*)$").expect("valid header pattern");
}

/// ENVI code for 32-bit float samples
pub const ENVI_FLOAT32: u32 = 4;

/// Geolocation bands: latitude, longitude, elevation and one unused band
pub const GEO_BANDS: usize = 4;

/// Size in bytes of one geolocation sample
pub const SAMPLE_BYTES: usize = 4;

/// A header value and the line it started on
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderEntry {
    /// 1-based line number
    pub line: usize,
    /// Trimmed value text
    pub value: String,
}

/// Parsed geolocation header
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHeader {
    /// Columns per line (`samples`)
    pub samples: usize,
    /// Number of lines (`lines`)
    pub lines: usize,
    /// Number of bands (`bands`)
    pub bands: usize,
    /// Byte order of the binary (`byte order`)
    pub byte_order: ByteOrder,
    /// ENVI data type code (`data type`)
    pub data_type: u32,
    /// Bytes to skip before the first sample (`header offset`)
    pub header_offset: u64,
    /// Every key of the header, normalised
    pub entries: BTreeMap<String, HeaderEntry>,
    path: PathBuf,
}

impl GeoHeader {
    /// Read and parse a header file
    pub fn from_file(path: &Path) -> ConvertResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConvertError::input_read(path, e))?;
        Self::parse(&text, path)
    }

    /// Parse header text; `path` is only used in error messages
    pub fn parse(text: &str, path: &Path) -> ConvertResult<Self> {
        let entries = scan_entries(text, path)?;
        let mut header = GeoHeader {
            samples: 0,
            lines: 0,
            bands: 0,
            byte_order: ByteOrder::LittleEndian,
            data_type: ENVI_FLOAT32,
            header_offset: 0,
            entries,
            path: path.to_path_buf(),
        };

        header.samples = header.required_number("samples")?;
        header.lines = header.required_number("lines")?;
        header.bands = header.required_number("bands")?;

        if header.samples == 0 || header.lines == 0 {
            return Err(header.error(0, format!(
                "empty raster: samples = {}, lines = {}", header.samples, header.lines
            )));
        }
        if header.bands != GEO_BANDS {
            let line = header.line_of("bands");
            return Err(header.error(line, format!(
                "expected {} bands (latitude, longitude, elevation, unused), found {}",
                GEO_BANDS, header.bands
            )));
        }
        header.byte_count()?;

        if let Some(code) = header.optional_number::<u64>("byte order")? {
            header.byte_order = ByteOrder::from_envi_code(code).ok_or_else(|| {
                header.error(header.line_of("byte order"), format!("unknown byte order {}", code))
            })?;
        }
        if let Some(data_type) = header.optional_number::<u32>("data type")? {
            if data_type != ENVI_FLOAT32 {
                return Err(header.error(header.line_of("data type"), format!(
                    "unsupported data type {}, only 4 (32-bit float) is supported", data_type
                )));
            }
            header.data_type = data_type;
        }
        if let Some(offset) = header.optional_number::<u64>("header offset")? {
            header.header_offset = offset;
        }

        debug!("Geolocation header: {} samples x {} lines x {} bands, {}, offset {}",
               header.samples, header.lines, header.bands, header.byte_order.name(), header.header_offset);
        Ok(header)
    }

    /// Raw value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(|e| e.value.as_str())
    }

    /// Number of Float32 values the binary must hold
    pub fn element_count(&self) -> ConvertResult<usize> {
        GEO_BANDS.checked_mul(self.samples)
            .and_then(|n| n.checked_mul(self.lines))
            .ok_or_else(|| self.error(0, format!(
                "{} samples x {} lines x {} bands overflows the addressable size",
                self.samples, self.lines, GEO_BANDS
            )))
    }

    /// Number of bytes the binary must hold after its header offset
    pub fn byte_count(&self) -> ConvertResult<u64> {
        let count = self.element_count()?;
        count.checked_mul(SAMPLE_BYTES)
            .and_then(|bytes| u64::try_from(bytes).ok())
            .ok_or_else(|| self.error(0, format!("{} samples overflow the addressable size", count)))
    }

    /// Path the header was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn line_of(&self, key: &str) -> usize {
        self.entries.get(key).map(|e| e.line).unwrap_or(0)
    }

    fn error(&self, line: usize, reason: String) -> ConvertError {
        ConvertError::HeaderParse {
            path: self.path.clone(),
            line,
            reason,
        }
    }

    fn optional_number<T: std::str::FromStr>(&self, key: &str) -> ConvertResult<Option<T>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => entry.value.parse::<T>().map(Some).map_err(|_| {
                self.error(entry.line, format!("value of '{}' is not a number: '{}'", key, entry.value))
            }),
        }
    }

    fn required_number(&self, key: &str) -> ConvertResult<usize> {
        self.optional_number(key)?
            .ok_or_else(|| self.error(0, format!("missing required key '{}'", key)))
    }
}

/// Lower-case a key and collapse its inner whitespace
fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split header text into normalised entries; later keys replace earlier ones
fn scan_entries(text: &str, path: &Path) -> ConvertResult<BTreeMap<String, HeaderEntry>> {
    let error = |line: usize, reason: String| ConvertError::HeaderParse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut entries = BTreeMap::new();
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    while let Some((line_no, line)) = lines.next() {
        if line.is_empty() || line.eq_ignore_ascii_case("ENVI") {
            continue;
        }

        let captures = KEY_VALUE.captures(line)
            .ok_or_else(|| error(line_no, format!("expected 'key = value', found '{}'", line)))?;
        let key = normalize_key(&captures[1]);
        let mut value = captures[2].trim().to_string();

        if value.starts_with('{') && !value.contains('}') {
            loop {
                match lines.next() {
                    Some((_, continuation)) => {
                        value.push(' ');
                        value.push_str(continuation);
                        if continuation.contains('}') {
                            break;
                        }
                    }
                    None => return Err(error(line_no, format!("unterminated '{{' in value of '{}'", key))),
                }
            }
        }

        if key.is_empty() {
            return Err(error(line_no, "empty key".to_string()));
        }
        entries.insert(key, HeaderEntry { line: line_no, value });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ENVI\n\
        description = {\n  HyTES geolocation,\n  lat lon dem}\n\
        samples = 4\n\
        lines   = 4\n\
        bands = 4\n\
        header offset = 0\n\
        file type = ENVI Standard\n\
        data type = 4\n\
        interleave = bip\n\
        byte order = 0\n";

    fn parse(text: &str) -> ConvertResult<GeoHeader> {
        GeoHeader::parse(text, Path::new("scene.geo.hdr"))
    }

    #[test]
    fn test_parse_envi_header() {
        let header = parse(HEADER).unwrap();
        assert_eq!((header.samples, header.lines, header.bands), (4, 4, 4));
        assert_eq!(header.byte_order, ByteOrder::LittleEndian);
        assert_eq!(header.element_count().unwrap(), 64);
        assert_eq!(header.byte_count().unwrap(), 256);
        assert_eq!(header.get("Interleave"), Some("bip"));
        assert!(header.get("description").unwrap().contains("lat lon dem"));
    }

    #[test]
    fn test_reordered_keys_and_whitespace() {
        let header = parse("bands=4\n   LINES   =  2  \n\n Samples = 5\nbyte  order = 1").unwrap();
        assert_eq!((header.samples, header.lines, header.bands), (5, 2, 4));
        assert_eq!(header.byte_order, ByteOrder::BigEndian);
    }

    #[test]
    fn test_line_without_separator() {
        match parse("samples = 4\nlines 4\nbands = 4") {
            Err(ConvertError::HeaderParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected HeaderParse, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value() {
        match parse("samples = four\nlines = 4\nbands = 4") {
            Err(ConvertError::HeaderParse { line, reason, .. }) => {
                assert_eq!(line, 1);
                assert!(reason.contains("samples"));
            }
            other => panic!("expected HeaderParse, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_and_invalid_keys() {
        assert!(parse("samples = 4\nlines = 4").is_err());
        assert!(parse("samples = 4\nlines = 4\nbands = 2").is_err());
        assert!(parse("samples = 4\nlines = 4\nbands = 5").is_err());
        assert!(parse("samples = 4\nlines = 4\nbands = 4\ndata type = 5").is_err());
        assert!(parse("samples = 4\nlines = 4\nbands = 4\nbyte order = 7").is_err());
        assert!(parse("samples = 4\nlines = 4\nbands = 4\ndescription = { open").is_err());
    }

    #[test]
    fn test_band_count_is_fixed() {
        match parse("samples = 4\nlines = 4\nbands = 3") {
            Err(ConvertError::HeaderParse { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("expected 4 bands"));
            }
            other => panic!("expected HeaderParse, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let text = format!("samples = {}\nlines = {}\nbands = 4", usize::MAX / 2, usize::MAX / 2);
        assert!(matches!(parse(&text), Err(ConvertError::HeaderParse { .. })));

        let text = format!("samples = {}\nlines = 1\nbands = 4", usize::MAX / 8);
        assert!(matches!(parse(&text), Err(ConvertError::HeaderParse { .. })));
    }
}
