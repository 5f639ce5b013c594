//! Report body decoding
//!
//! # Overview
//!
//! The click report arrives as CSV text. [`CsvDecoder`] turns it into one
//! JSON object per data row, keyed by the header row, with every value kept
//! as a string (`null` when empty or missing).

mod decoders;
mod types;

pub use decoders::CsvDecoder;
pub use types::RecordDecoder;
