//! Zyxel router integration module
//!
//! - `tls`: pinned-thumbprint certificate verification
//! - `transport`: HTTPS form posts to the admin interface
//! - `session`: login cookie handling
//! - `scraper`: active device payload extraction and parsing
//! - `client`: login + device list retrieval

pub mod client;
pub mod scraper;
pub mod session;
pub mod tls;
pub mod transport;

pub use client::ZyxelClient;
pub use tls::PinnedThumbprint;
pub use transport::{HttpsTransport, RouterTransport};
