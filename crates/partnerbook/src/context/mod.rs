//! Request-scoped context module.
//!
//! Provides the `RequestContext` extractor that bundles the caller identity
//! and request id to complement application-scoped `AppState`.

mod extractor;
mod types;

pub use types::RequestContext;
