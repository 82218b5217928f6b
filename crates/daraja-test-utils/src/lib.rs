//! Shared test utilities for the Daraja client.
//!
//! - [`CertificateFixture`]: a throwaway RSA key pair and self-signed
//!   certificate written where the client looks for the gateway certificate
//! - [`MockTransport`]: a recording [`daraja::Transport`] with queued responses
//! - canned gateway responses and callback payloads

pub mod fixtures;
pub mod helpers;
pub mod mock_transport;

pub use fixtures::*;
pub use helpers::*;
pub use mock_transport::MockTransport;
