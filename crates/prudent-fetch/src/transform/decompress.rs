//! Content-Encoding handling.

use std::io::Read;

use flate2::read::MultiGzDecoder;

/// Body encodings the resolver knows how to undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Identity,
    Gzip,
}

impl Encoding {
    /// Interpret a `Content-Encoding` value. Anything but gzip is passed
    /// through untouched.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("gzip") || v.eq_ignore_ascii_case("x-gzip") => {
                Encoding::Gzip
            }
            _ => Encoding::Identity,
        }
    }
}

/// Gzip decoder over `reader`, accepting concatenated members.
pub fn gunzip<R: Read>(reader: R) -> MultiGzDecoder<R> { MultiGzDecoder::new(reader) }
