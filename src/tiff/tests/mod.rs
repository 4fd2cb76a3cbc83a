//! Tests for the TIFF layer

mod test_utils;
mod types_tests;
mod reader_tests;
