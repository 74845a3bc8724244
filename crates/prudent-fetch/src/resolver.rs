use std::sync::Arc;

use crate::core::{RequestBudget, validate};
use crate::data::{AllowFlags, Reference, ResolverOptions, TypedInputSource};
use crate::effects::{Exchange, Fetcher, HttpClient, content_language, report_protocol_noise};
use crate::error::{Error, Result};
use crate::negotiate::{ContentNegotiator, MediaTypeNegotiator};
use crate::report::{ErrorHandler, Reporter};
use crate::transform::{self, Encoding};

/// Resolves external references of one document over HTTP.
///
/// A resolver carries the request budget of a single resolution session and
/// is meant to be used from one thread; `resolve` takes `&mut self` so that
/// sharing one across threads is an explicit decision by the caller. The HTTP
/// client is shared by every resolver in the process.
///
/// # Examples
///
/// ```no_run
/// use std::io::Read;
/// use std::sync::Arc;
///
/// use prudent_fetch::{ClientConfig, EntityResolver, ReqwestClient, ResolverOptions};
///
/// let client = Arc::new(ReqwestClient::new(&ClientConfig::default().from_env())?);
/// let options = ResolverOptions::default()
///     .size_limit(Some(1 << 20))
///     .request_limit(Some(10));
/// let mut resolver = EntityResolver::new(client, options, None);
///
/// let mut source = resolver.resolve(None, "https://example.org/schema.xsd")?;
/// let mut text = String::new();
/// source.read_to_string(&mut text)?;
/// source.close();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EntityResolver<C: HttpClient, N: ContentNegotiator = MediaTypeNegotiator> {
    fetcher: Fetcher<C>,
    budget: RequestBudget,
    negotiator: N,
    reporter: Reporter,
}

impl<C: HttpClient> EntityResolver<C> {
    pub fn new(
        client: Arc<C>,
        options: ResolverOptions,
        handler: Option<Arc<dyn ErrorHandler>>,
    ) -> Self {
        let negotiator = MediaTypeNegotiator::new(options.allow, options.lax_content_type);
        Self::with_negotiator(client, options, handler, negotiator)
    }
}

impl<C: HttpClient, N: ContentNegotiator> EntityResolver<C, N> {
    pub fn with_negotiator(
        client: Arc<C>,
        options: ResolverOptions,
        handler: Option<Arc<dyn ErrorHandler>>,
        negotiator: N,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(client, options.size_limit),
            budget: RequestBudget::new(options.request_limit),
            negotiator,
            reporter: Reporter::new(handler),
        }
    }

    /// Fetch the resource named by `system_id`.
    ///
    /// Every call spends one request from the budget, even when the
    /// identifier turns out to be invalid. Failures are reported to the error
    /// handler before they are returned.
    pub fn resolve(&mut self, public_id: Option<&str>, system_id: &str) -> Result<TypedInputSource> {
        let reference = Reference::new(public_id, system_id);

        if self.budget.check_and_consume().is_err() {
            return Err(self.reporter.fatal(Error::Exhausted {
                location: reference.location(),
            }));
        }

        let url = validate(&reference).map_err(|e| self.reporter.fatal(e))?;
        let location = reference.location().at(url.as_str());
        let exchange = self.fetcher.fetch(&url, &location, &self.reporter)?;

        let base_uri = exchange.url.clone();
        let content_type = match self.negotiator.negotiate(
            &base_uri,
            public_id,
            exchange.headers.get("Content-Type"),
            &self.reporter,
        ) {
            Ok(content_type) => content_type,
            Err(e) => {
                exchange.discard();
                return Err(self.reporter.fatal(e));
            }
        };
        let language = content_language(&exchange);
        report_protocol_noise(&exchange, &location, &self.reporter);

        let Exchange {
            headers,
            body,
            connection,
            ..
        } = exchange;
        let encoding = Encoding::from_header(headers.get("Content-Encoding"));
        let byte_stream = transform::wrap(
            body,
            connection,
            encoding,
            self.fetcher.size_limit(),
            &base_uri,
        );

        Ok(TypedInputSource {
            uri: base_uri,
            public_id: reference.public_id,
            content_type,
            language,
            byte_stream,
        })
    }

    /// Requests left in this session; `None` when unlimited.
    pub fn remaining_requests(&self) -> Option<u32> { self.budget.remaining() }

    pub fn allow(&self) -> AllowFlags { self.negotiator.allow() }

    pub fn set_allow(&mut self, allow: AllowFlags) { self.negotiator.set_allow(allow); }

    pub fn is_only_html_allowed(&self) -> bool { self.allow().is_only_html_allowed() }

    pub fn reporter(&self) -> &Reporter { &self.reporter }
}
