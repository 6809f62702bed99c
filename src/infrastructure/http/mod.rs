//! HTTP transport

mod client;
mod request;

pub use client::{HttpClient, HttpTransport};
pub use request::{HttpRequest, MultipartPart, RequestBody};

#[cfg(test)]
pub use client::{mock, MockHttpTransport};
