//! Client for the OnDemand chat v1 API
//!
//! Two operations against one external HTTP service: open a chat session,
//! then submit a query against it. A query response arrives either as a
//! single JSON document (sync mode) or as a stream of `data:`-prefixed
//! event frames terminated by a `[DONE]` sentinel (stream mode); both paths
//! produce a unified result record.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
mod converter;
pub mod error;
pub mod http;
mod parser;
pub mod stream;
pub mod types;

// Re-export commonly used items
pub use client::Client;
pub use config::{ClientConfig, ResponseMode, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use stream::QueryStream;
pub use types::{
    BuildError, ContextField, ModelConfigs, ModelConfigsBuilder, QueryOutcome, QueryRequest,
    QueryRequestBuilder, StreamEvent,
};
