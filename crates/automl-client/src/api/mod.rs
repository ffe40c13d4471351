//! Typed wrappers for the backend endpoints.
//!
//! Each wrapper builds an [`ApiRequest`](crate::pipeline::ApiRequest) and sends
//! it through the session pipeline, so auth, retry, and error reporting apply
//! uniformly.

mod account;
mod datasets;
mod predict;
mod training;
