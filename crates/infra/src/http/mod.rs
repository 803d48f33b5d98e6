//! HTTP transport

pub mod client;
mod tls;

pub use client::{HttpClient, HttpClientBuilder};
