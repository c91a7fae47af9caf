//! Backend transport seam.
//!
//! Controllers talk to the backend only through [`ChatTransport`] and
//! [`SearchTransport`]. [`HttpTransport`] is the production implementation;
//! tests substitute scripted mocks.

pub mod http;
pub mod transport;

pub use http::{HttpTransport, health_url};
pub use transport::{ChatTransport, SearchTransport, TransportError};
