use std::fmt;
use std::io::{self, Read};

use url::Url;

/// Response body as handed out by an [`HttpClient`].
pub type BoxBody = Box<dyn Read + Send>;

/// Handle on the connection an [`Exchange`] is using.
///
/// The resolver calls either `release` alone, or `abort` followed by
/// `release`, exactly once per exchange.
pub trait Connection: Send {
    /// Give the connection back to the pool.
    fn release(&mut self) -> io::Result<()>;

    /// Discard the connection so that it is never reused.
    fn abort(&mut self) -> io::Result<()>;
}

/// Response headers, looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// First value of the named header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool { self.get(name).is_some() }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One completed GET: status and headers received, body not yet read.
pub struct Exchange {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub headers: Headers,
    /// Length declared by the server, if any.
    pub content_length: Option<u64>,
    pub body: BoxBody,
    pub connection: Box<dyn Connection>,
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl Exchange {
    /// Abort and release the connection without reading the body.
    pub fn discard(mut self) {
        if let Err(e) = self.connection.abort() {
            tracing::debug!(url = %self.url, error = %e, "abort failed");
        }
        if let Err(e) = self.connection.release() {
            tracing::debug!(url = %self.url, error = %e, "release failed");
        }
    }
}

/// Blocking HTTP client abstraction.
///
/// Implementations follow redirects themselves, never store cookies, and
/// release any connection they opened when `get` fails.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a GET for `url` with the given extra headers and wait for the
    /// response head.
    fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Exchange, Self::Error>;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::sync::{Arc, Mutex, PoisonError};

    use reqwest::blocking::{Client, Response};
    use reqwest::redirect::Policy;

    use super::*;
    use crate::data::ClientConfig;

    /// Production client on top of `reqwest`'s blocking API.
    ///
    /// Build one per process and share it behind an `Arc`: it owns the
    /// keep-alive pool.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
            let mut builder = Client::builder()
                .redirect(Policy::limited(config.max_redirects))
                .pool_max_idle_per_host(config.max_connections_per_host)
                .connect_timeout(config.connect_timeout())
                .timeout(config.socket_timeout());

            if let Some(ref user_agent) = config.user_agent {
                builder = builder.user_agent(user_agent.as_str());
            }
            if config.promiscuous_tls {
                tracing::warn!("TLS certificate and host name checks are disabled");
                builder = builder
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true);
            }
            if !config.use_system_proxy {
                builder = builder.no_proxy();
            }

            Ok(Self { client: builder.build()? })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Exchange, Self::Error> {
            let mut request = self.client.get(url.clone());
            for (name, value) in headers {
                request = request.header(*name, *value);
            }

            let response = request.send()?;
            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let content_length = response.content_length();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_owned(), v.to_owned()))
                })
                .collect();

            let shared = Arc::new(Mutex::new(Some(response)));
            Ok(Exchange {
                status,
                url: final_url,
                headers,
                content_length,
                body: Box::new(PooledBody(Arc::clone(&shared))),
                connection: Box::new(PooledConnection(shared)),
            })
        }
    }

    type SharedResponse = Arc<Mutex<Option<Response>>>;

    /// Reads from the response until the connection is given up.
    struct PooledBody(SharedResponse);

    impl Read for PooledBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.as_mut() {
                Some(response) => response.read(buf),
                None => Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "connection already released",
                )),
            }
        }
    }

    /// hyper puts a connection back into the idle pool when its response is
    /// dropped after the body reached EOF, and closes it otherwise.
    struct PooledConnection(SharedResponse);

    impl PooledConnection {
        fn take(&self) -> Option<Response> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
        }
    }

    impl Connection for PooledConnection {
        fn release(&mut self) -> io::Result<()> {
            if let Some(response) = self.take() {
                tracing::debug!(url = %response.url(), "releasing connection");
            }
            Ok(())
        }

        fn abort(&mut self) -> io::Result<()> {
            if let Some(response) = self.take() {
                tracing::debug!(url = %response.url(), "aborting connection");
            }
            Ok(())
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
