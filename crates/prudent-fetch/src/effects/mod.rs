//! Network I/O: the client seam and the GET exchange.

mod fetcher;
mod http;

pub use fetcher::{ACCEPT, ACCEPT_ENCODING, Fetcher, content_language, report_protocol_noise};
pub use http::{BoxBody, Connection, Exchange, Headers, HttpClient};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
