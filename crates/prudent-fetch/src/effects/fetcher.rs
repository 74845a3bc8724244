use std::sync::Arc;

use url::Url;

use crate::effects::http::{Exchange, HttpClient};
use crate::error::{Error, Location, Result};
use crate::report::Reporter;

pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub const ACCEPT_ENCODING: &str = "gzip";

/// Runs the GET exchange and vets the response head.
pub struct Fetcher<C: HttpClient> {
    client: Arc<C>,
    size_limit: Option<u64>,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: Arc<C>, size_limit: Option<u64>) -> Self { Self { client, size_limit } }

    pub fn size_limit(&self) -> Option<u64> { self.size_limit }

    /// Fetch `url` and return the exchange once its status and declared
    /// length have been accepted.
    ///
    /// Every failure is reported fatal through `reporter`. Errors raised after
    /// the response arrived name the final URI and have already given the
    /// connection up.
    pub fn fetch(&self, url: &Url, location: &Location, reporter: &Reporter) -> Result<Exchange> {
        tracing::info!(%url, "fetching");

        let exchange = self
            .client
            .get(url, &[("Accept", ACCEPT), ("Accept-Encoding", ACCEPT_ENCODING)])
            .map_err(|e| {
                reporter.fatal(Error::Transport {
                    location: location.clone(),
                    source: Box::new(e),
                })
            })?;

        let final_location = location.at(exchange.url.as_str());

        if exchange.status != 200 {
            let code = exchange.status;
            exchange.discard();
            return Err(reporter.fatal(Error::HttpStatus {
                location: final_location,
                code,
            }));
        }

        if let (Some(limit), Some(len)) = (self.size_limit, exchange.content_length)
            && len > limit
        {
            exchange.discard();
            return Err(reporter.fatal(Error::SizeLimit {
                location: final_location,
                limit,
            }));
        }

        Ok(exchange)
    }
}

/// Warn about headers that only make sense to browsers.
pub fn report_protocol_noise(exchange: &Exchange, location: &Location, reporter: &Reporter) {
    if exchange.headers.contains("X-UA-Compatible") {
        reporter.warning(&Error::ProtocolNoise {
            location: location.clone(),
            message: "X-UA-Compatible is a browser-specific HTTP header.".to_owned(),
        });
    }
}

pub fn content_language(exchange: &Exchange) -> Option<String> {
    exchange
        .headers
        .get("Content-Language")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
}
