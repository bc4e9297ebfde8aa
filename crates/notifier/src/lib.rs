//! Message provider adapters.
//!
//! Adapters implement [`blastline_common::ports::MessageProvider`] and are the
//! only place where provider error codes are interpreted.

pub mod twilio;

pub use twilio::{TwilioConfig, TwilioProvider};
