use std::time::Duration;

use serde::Deserialize;

/// Redirect ceiling, matching Gecko's default.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

const PROMISCUOUS_TLS_ENV: &str = "PRUDENT_PROMISCUOUS_TLS";
const USER_AGENT_ENV: &str = "PRUDENT_USER_AGENT";

/// Process-wide settings of the shared HTTP client.
///
/// Built once, turned into a client, and shared by every resolver. Timeouts
/// of `0` mean "no timeout".
///
/// # Examples
///
/// ```
/// use prudent_fetch::ClientConfig;
///
/// let config = ClientConfig::default()
///     .timeouts(5_000, 10_000)
///     .max_connections_per_host(4)
///     .user_agent("validator/1.0");
/// assert_eq!(config.max_redirects, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Time allowed to establish a connection, in milliseconds.
    pub connect_timeout_ms: u64,

    /// Time allowed for a request once connected, in milliseconds. reqwest's
    /// blocking client applies it until the body has been read.
    pub socket_timeout_ms: u64,

    /// Idle keep-alive connections kept per host. This does not cap how many
    /// requests to one host run at once.
    pub max_connections_per_host: usize,

    pub max_redirects: usize,

    pub user_agent: Option<String>,

    /// Accept any TLS certificate and host name. Off unless explicitly set.
    pub promiscuous_tls: bool,

    /// Honour `HTTP_PROXY`-style environment variables.
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 0,
            socket_timeout_ms: 0,
            max_connections_per_host: 2,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: None,
            promiscuous_tls: false,
            use_system_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Overlay `PRUDENT_PROMISCUOUS_TLS` and `PRUDENT_USER_AGENT` onto `self`.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if let Ok(value) = std::env::var(PROMISCUOUS_TLS_ENV) {
            self.promiscuous_tls = value.trim() == "true";
        }
        if let Ok(value) = std::env::var(USER_AGENT_ENV)
            && !value.trim().is_empty()
        {
            self.user_agent = Some(value.trim().to_owned());
        }
        self
    }

    #[must_use]
    pub fn timeouts(mut self, connect_timeout_ms: u64, socket_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self.socket_timeout_ms = socket_timeout_ms;
        self
    }

    #[must_use]
    pub fn max_connections_per_host(mut self, max: usize) -> Self {
        self.max_connections_per_host = max;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn promiscuous_tls(mut self, promiscuous_tls: bool) -> Self {
        self.promiscuous_tls = promiscuous_tls;
        self
    }

    #[must_use]
    pub fn use_system_proxy(mut self, use_system_proxy: bool) -> Self {
        self.use_system_proxy = use_system_proxy;
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> { millis(self.connect_timeout_ms) }

    pub fn socket_timeout(&self) -> Option<Duration> { millis(self.socket_timeout_ms) }
}

fn millis(ms: u64) -> Option<Duration> { (ms > 0).then(|| Duration::from_millis(ms)) }

/// Media-type families the content negotiator may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllowFlags {
    pub rnc: bool,
    pub html: bool,
    pub xhtml: bool,
    pub accept_all_known_xml_types: bool,
    pub generic_xml: bool,
}

impl Default for AllowFlags {
    fn default() -> Self {
        Self {
            rnc: false,
            html: false,
            xhtml: false,
            accept_all_known_xml_types: false,
            generic_xml: true,
        }
    }
}

impl AllowFlags {
    pub fn is_only_html_allowed(&self) -> bool { !self.generic_xml && !self.rnc && !self.xhtml }
}

/// Per-resolver settings. `None` limits are unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Largest body accepted, in bytes, checked both on the wire and after
    /// decompression.
    pub size_limit: Option<u64>,

    /// Fetch attempts permitted over the lifetime of one resolver.
    pub request_limit: Option<u32>,

    /// Accept unknown or generic content types with a warning instead of
    /// failing.
    pub lax_content_type: bool,

    pub allow: AllowFlags,
}

impl ResolverOptions {
    #[must_use]
    pub fn size_limit(mut self, limit: Option<u64>) -> Self {
        self.size_limit = limit;
        self
    }

    #[must_use]
    pub fn request_limit(mut self, limit: Option<u32>) -> Self {
        self.request_limit = limit;
        self
    }

    #[must_use]
    pub fn lax_content_type(mut self, lax: bool) -> Self {
        self.lax_content_type = lax;
        self
    }

    #[must_use]
    pub fn allow(mut self, allow: AllowFlags) -> Self {
        self.allow = allow;
        self
    }
}
