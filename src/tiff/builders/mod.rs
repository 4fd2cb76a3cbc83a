//! Tag and layout strategies used by [`TiffBuilder`](crate::tiff::TiffBuilder)

pub mod basic_tags;
pub mod geo_tags;
pub mod metadata_tags;
pub mod writer;

use std::collections::BTreeMap;

/// Out-of-line tag values keyed by (IFD index, tag)
///
/// Ordered so that the file layout, and so the output bytes, are
/// deterministic.
pub type ExternalData = BTreeMap<(usize, u16), Vec<u8>>;

/// Encoded strips keyed by IFD index
pub type StripData = BTreeMap<usize, Vec<Vec<u8>>>;
