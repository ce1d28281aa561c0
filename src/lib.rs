//! Client-side GraphQL data layer.
//!
//! This crate converts wire-format GraphQL responses into typed results,
//! normalizes object graphs into a content-addressable cache, and
//! incrementally merges streamed multipart responses, both
//! subscriptions-over-HTTP and `@defer` payloads, into a running result
//! without re-executing completed work.
//!
//! The three load-bearing pieces are:
//!
//! * [`execution`]: a generic executor that walks a selection-set tree
//!   against any [`execution::ExecutionSource`] and reduces it through one
//!   or more [`execution::ResultAccumulator`]s in a single traversal.
//! * [`cache`]: keyed [`cache::Record`]s linked by [`cache::CacheReference`],
//!   with conflict-aware merges and changed-key reporting for invalidation.
//! * [`protocols`] and [`response_parser`]: multipart framing, sub-protocol
//!   chunk classification and path-addressed incremental merging.

#![warn(unreachable_pub)]

#[macro_use]
pub mod json_ext;

pub mod cache;
pub mod error;
pub mod execution;
pub mod graphql;
pub mod protocols;
pub mod response_parser;
pub mod spec;

pub use response_parser::ParsedResult;
pub use response_parser::ResponseParser;
