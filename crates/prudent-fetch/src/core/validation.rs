use url::Url;

use crate::data::Reference;
use crate::error::{Error, Result};

/// Parses a system id as an absolute http(s) URI in ASCII form.
///
/// Non-ASCII hosts are IDNA-encoded and other non-ASCII characters are
/// percent-encoded, so the returned URL serialises as plain ASCII.
///
/// # Examples
///
/// ```
/// use prudent_fetch::{Reference, validate};
///
/// let url = validate(&Reference::new(None, "http://Bücher.example/ä.dtd")).unwrap();
/// assert_eq!(url.as_str(), "http://xn--bcher-kva.example/%C3%A4.dtd");
///
/// assert!(validate(&Reference::new(None, "ftp://example.org/x.dtd")).is_err());
/// assert!(validate(&Reference::new(None, "x.dtd")).is_err());
/// ```
pub fn validate(reference: &Reference) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidReference {
        location: reference.location(),
        reason,
    };

    let url = Url::parse(&reference.system_id).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => invalid("Not an absolute URI.".to_owned()),
        other => invalid(other.to_string()),
    })?;

    if !is_supported_scheme(url.scheme()) {
        return Err(invalid(format!(
            "Unsupported URI scheme: \u{201C}{}\u{201D}.",
            url.scheme()
        )));
    }

    Ok(url)
}

pub fn is_supported_scheme(scheme: &str) -> bool { matches!(scheme, "http" | "https") }
