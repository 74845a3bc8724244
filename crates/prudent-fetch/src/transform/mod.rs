//! Decorators layered over a response body.
//!
//! The order is fixed: bound the wire bytes, decode gzip, bound the decoded
//! bytes, then hand everything to the lifecycle observer. The second bound is
//! what protects against compression bombs; a declared Content-Length only
//! speaks for the wire.

mod bounded;
mod decompress;
mod observer;

use std::io::Read;

pub use bounded::BoundedReader;
pub use decompress::{Encoding, gunzip};
pub use observer::ManagedStream;

use crate::effects::{BoxBody, Connection};

/// Build the stream handed to the caller.
///
/// `base_uri` is the final URI of the exchange and is what errors raised
/// while reading will name.
pub fn wrap(
    body: BoxBody,
    connection: Box<dyn Connection>,
    encoding: Encoding,
    size_limit: Option<u64>,
    base_uri: &str,
) -> ManagedStream {
    let bound = |stream: Box<dyn Read + Send>| -> Box<dyn Read + Send> {
        match size_limit {
            Some(limit) => Box::new(BoundedReader::new(stream, limit, base_uri)),
            None => stream,
        }
    };

    let mut stream = bound(body);
    if encoding == Encoding::Gzip {
        stream = bound(Box::new(gunzip(stream)));
    }

    ManagedStream::new(stream, connection, base_uri)
}
