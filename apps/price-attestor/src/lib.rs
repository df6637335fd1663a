#![warn(clippy::nursery, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

//! Price Attestor Library
//!
//! Signs `(feed, maxAge, price)` observations with a secp256k1 key and verifies
//! them against a write-once trusted key registry. The service shell fetches
//! prices from Pyth Hermes and exposes attestation and verification over HTTP.

/// Signing of price observations and their wire form
pub mod attestation;
/// Domain separation of signed messages
pub mod attestation_payload;
/// Configuration structures and loading
pub mod config;
/// Canonical scalar encoding of price observations
pub mod encoding;
/// Logging and observability setup
pub mod logging;
/// Upstream price sources
pub mod price_source;
/// HTTP server and handlers
pub mod rpc;
/// Signer implementations
pub mod signer;
/// Trusted key registry and signature verification
pub mod verifier;

mod error;

pub use error::AttestorError;
