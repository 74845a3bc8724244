//! Mapping a response's Content-Type onto the kind of input the parser gets.

use crate::data::AllowFlags;
use crate::error::{Error, Location};
use crate::report::Reporter;

/// What a fetched resource is to be parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Xml,
    Xhtml,
    Html,
    Rnc,
}

/// Outcome of content negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Media type without parameters, lower-cased. `None` when the server
    /// sent none.
    pub media_type: Option<String>,
    pub charset: Option<String>,
    pub kind: ContentKind,
}

/// Decides whether a resource of a given Content-Type is acceptable.
pub trait ContentNegotiator: Send {
    /// `base_uri` is the final URI of the exchange; `content_type` the raw
    /// header value. Fatal errors are returned; warnings go to `reporter`.
    fn negotiate(
        &self,
        base_uri: &str,
        public_id: Option<&str>,
        content_type: Option<&str>,
        reporter: &Reporter,
    ) -> Result<ContentType, Error>;

    fn set_allow(&mut self, allow: AllowFlags);

    fn allow(&self) -> AllowFlags;
}

/// Allow-list negotiator driven by [`AllowFlags`].
#[derive(Debug, Clone, Default)]
pub struct MediaTypeNegotiator {
    allow: AllowFlags,
    lax: bool,
}

impl MediaTypeNegotiator {
    pub fn new(allow: AllowFlags, lax: bool) -> Self { Self { allow, lax } }

    fn kind_of(&self, media_type: &str) -> Option<ContentKind> {
        let allow = &self.allow;
        match media_type {
            "application/xml" | "text/xml" if allow.generic_xml => Some(ContentKind::Xml),
            "application/xhtml+xml" if allow.xhtml => Some(ContentKind::Xhtml),
            "text/html" if allow.html => Some(ContentKind::Html),
            "application/relax-ng-compact-syntax" if allow.rnc => Some(ContentKind::Rnc),
            t if t.ends_with("+xml") && allow.accept_all_known_xml_types => Some(ContentKind::Xml),
            _ => None,
        }
    }

    /// Kind to assume for `text/plain`, `application/octet-stream` or a
    /// missing type.
    fn fallback_kind(&self, base_uri: &str) -> Option<ContentKind> {
        if self.allow.rnc && has_rnc_extension(base_uri) {
            Some(ContentKind::Rnc)
        } else if self.allow.generic_xml {
            Some(ContentKind::Xml)
        } else if self.allow.xhtml {
            Some(ContentKind::Xhtml)
        } else if self.allow.html {
            Some(ContentKind::Html)
        } else {
            None
        }
    }
}

impl ContentNegotiator for MediaTypeNegotiator {
    fn negotiate(
        &self,
        base_uri: &str,
        public_id: Option<&str>,
        content_type: Option<&str>,
        reporter: &Reporter,
    ) -> Result<ContentType, Error> {
        let location = Location::new(public_id, base_uri);
        let parsed = content_type.map(parse_media_type);
        let (media_type, charset) = match parsed {
            Some((m, c)) if !m.is_empty() => (Some(m), c),
            Some((_, c)) => (None, c),
            None => (None, None),
        };

        if let Some(kind) = media_type.as_deref().and_then(|m| self.kind_of(m)) {
            return Ok(ContentType {
                media_type,
                charset,
                kind,
            });
        }

        let generic = matches!(
            media_type.as_deref(),
            None | Some("text/plain") | Some("application/octet-stream")
        );
        let rnc_by_name = self.allow.rnc && generic && has_rnc_extension(base_uri);

        if (self.lax || rnc_by_name)
            && let Some(kind) = self.fallback_kind(base_uri)
        {
            if !rnc_by_name {
                reporter.warning(&Error::ProtocolNoise {
                    location,
                    message: describe("Unexpected content type", media_type.as_deref()),
                });
            }
            return Ok(ContentType {
                media_type,
                charset,
                kind,
            });
        }

        Err(Error::ContentType {
            location,
            message: describe("Non-acceptable content type", media_type.as_deref()),
        })
    }

    fn set_allow(&mut self, allow: AllowFlags) { self.allow = allow; }

    fn allow(&self) -> AllowFlags { self.allow }
}

fn has_rnc_extension(uri: &str) -> bool {
    uri.split(['?', '#']).next().is_some_and(|path| path.ends_with(".rnc"))
}

fn describe(prefix: &str, media_type: Option<&str>) -> String {
    match media_type {
        Some(m) => format!("{prefix}: \u{201C}{m}\u{201D}."),
        None => format!("{prefix}: no Content-Type given."),
    }
}

/// Split `type/subtype; charset=x` into the lower-cased essence and charset.
pub fn parse_media_type(value: &str) -> (String, Option<String>) {
    let mut parts = value.split(';');
    let essence = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let charset = parts.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_owned())
            .filter(|v| !v.is_empty())
    });
    (essence, charset)
}
