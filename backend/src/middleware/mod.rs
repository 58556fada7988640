//! Request middleware and extractors

pub mod context;

pub use context::RequestContext;
