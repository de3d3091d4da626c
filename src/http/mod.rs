//! Manifest transport over HTTP.

mod client;

pub use client::{FetchManifest, HttpClient, ProxyConfig};

#[cfg(test)]
pub use client::MockFetchManifest;
