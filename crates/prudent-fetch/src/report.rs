//! Delivery of resolution errors to a caller-supplied handler.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Severity};

/// Receives every error and warning before the resolver acts on it.
pub trait ErrorHandler: Send + Sync {
    fn warning(&self, error: &Error);

    fn fatal_error(&self, error: &Error);
}

/// Routes errors to the optional [`ErrorHandler`] and to the log.
#[derive(Clone, Default)]
pub struct Reporter {
    handler: Option<Arc<dyn ErrorHandler>>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("handler", &self.handler.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl Reporter {
    pub fn new(handler: Option<Arc<dyn ErrorHandler>>) -> Self { Self { handler } }

    /// Report `error` as fatal and hand it back for propagation.
    pub fn fatal(&self, error: Error) -> Error {
        tracing::debug!(%error, "fatal resolution error");
        if let Some(ref handler) = self.handler {
            handler.fatal_error(&error);
        }
        error
    }

    /// Report a non-fatal problem. Resolution carries on.
    pub fn warning(&self, error: &Error) {
        tracing::warn!(%error);
        if let Some(ref handler) = self.handler {
            handler.warning(error);
        }
    }

    /// Report according to the error's own severity.
    pub fn report(&self, error: Error) -> Option<Error> {
        match error.severity() {
            Severity::Warning => {
                self.warning(&error);
                None
            }
            Severity::Fatal => Some(self.fatal(error)),
        }
    }
}
