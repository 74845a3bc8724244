//! Immutable configuration and the types handed to and from the resolver.

pub mod config;
pub mod source;

pub use config::{AllowFlags, ClientConfig, ResolverOptions, DEFAULT_MAX_REDIRECTS};
pub use source::{Reference, TypedInputSource};
