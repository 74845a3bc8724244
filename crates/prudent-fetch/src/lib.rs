//! Bounded, budgeted HTTP resolution of external document references.
//!
//! A markup parser hands each external reference (public id, system id) to an
//! [`EntityResolver`], which fetches it over HTTP(S) and returns a
//! [`TypedInputSource`] whose byte stream owns the network connection.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and types
//! - [`core`] - Pure checks: URI validation and the request budget
//! - [`effects`] - I/O operations behind the [`HttpClient`] trait
//!
//! with [`transform`] layering the body decorators and [`negotiate`] deciding
//! what a Content-Type is parsed as.
//!
//! # Key Features
//!
//! - **Bounded**: declared length, wire bytes and gunzipped bytes are all held
//!   to the size limit
//! - **Budgeted**: each resolver may attempt a fixed number of requests
//! - **Leak-free**: the connection is released exactly once, on close, on a
//!   read error, or on drop
//! - **Shared pool**: one client per process, injected into every resolver

pub mod core;
pub mod data;
pub mod effects;
mod error;
pub mod negotiate;
pub mod report;
mod resolver;
pub mod transform;

pub use self::core::{RequestBudget, validate};
pub use data::{AllowFlags, ClientConfig, Reference, ResolverOptions, TypedInputSource};
pub use effects::{Connection, Exchange, Headers, HttpClient};
pub use error::{Error, Location, Result, Severity, StreamBoundError, SystemIdError};
pub use negotiate::{ContentKind, ContentNegotiator, ContentType, MediaTypeNegotiator};
pub use report::{ErrorHandler, Reporter};
pub use resolver::EntityResolver;
pub use transform::ManagedStream;

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;
