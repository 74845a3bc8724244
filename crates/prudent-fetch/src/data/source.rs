use std::io::{self, Read};

use crate::error::Location;
use crate::negotiate::ContentType;
use crate::transform::ManagedStream;

/// An external reference as it appears in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub public_id: Option<String>,
    /// Address to fetch.
    pub system_id: String,
}

impl Reference {
    pub fn new(public_id: Option<&str>, system_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.map(str::to_owned),
            system_id: system_id.into(),
        }
    }

    pub fn location(&self) -> Location {
        Location {
            public_id: self.public_id.clone(),
            system_id: self.system_id.clone(),
        }
    }
}

/// A fetched resource, ready to be parsed.
///
/// `byte_stream` owns the network connection. Read it to the end and call
/// [`ManagedStream::close`] to hand the connection back to the pool; dropping
/// it unclosed discards the connection instead.
#[derive(Debug)]
pub struct TypedInputSource {
    /// Final URI, after redirects.
    pub uri: String,
    pub public_id: Option<String>,
    pub content_type: ContentType,
    pub language: Option<String>,
    pub byte_stream: ManagedStream,
}

impl TypedInputSource {
    pub fn charset(&self) -> Option<&str> { self.content_type.charset.as_deref() }

    pub fn close(&mut self) { self.byte_stream.close(); }
}

impl Read for TypedInputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { self.byte_stream.read(buf) }
}
