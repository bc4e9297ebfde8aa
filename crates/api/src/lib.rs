//! HTTP surface of the campaign dispatcher.
//!
//! Endpoints:
//! - POST /send-messages: run a campaign against the configured board
//! - POST /test-send    : send one message to verify provider setup
//! - GET  /test-auth    : verify provider credentials
//! - GET  /health       : liveness

pub mod routes;
pub mod state;
