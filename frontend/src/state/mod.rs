//! Plain state holders driven by component messages. Nothing in here
//! touches the DOM or the network.

pub mod advisory;
pub mod prediction;

pub use advisory::{AdvisoryPhase, AdvisorySession, EntryStatus, ExchangeEntry, FollowUpTicket};
pub use prediction::{PredictionOrchestrator, PredictionPhase, PredictionTicket, StartError};
