//! Record source adapters.
//!
//! Each adapter implements [`blastline_common::ports::RecordSource`] and turns
//! an external listing into [`blastline_common::types::RawRecord`]s.

pub mod monday;

pub use monday::{MondayBoardSource, MondayConfig};
