//! HTTP client abstraction for testability.

mod http;

pub use http::{AsyncHttpClient, HttpError, ReqwestClient};

#[cfg(test)]
pub use http::tests::MockHttpClient;
