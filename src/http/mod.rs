//! HTTP access to the application under test

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod transport;

pub use client::{ApiClient, Auth};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
