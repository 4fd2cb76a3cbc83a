//! Low-level binary I/O
//!
//! Byte order strategies and the seekable reader abstraction shared by the
//! geolocation loader and the TIFF reader.

pub mod seekable;
pub mod byte_order;
