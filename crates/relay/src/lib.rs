//! Bridges chat messages addressed to the assistant to its HTTP endpoint.

pub mod chunk;
pub mod client;
pub mod error;
pub mod relay;
pub mod transport;
pub mod trigger;

pub use error::RelayError;
pub use relay::{Relay, RelaySettings};
