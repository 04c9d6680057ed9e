//! The link to the remote operator: inbound command frames, outbound
//! delta-compressed telemetry.

pub mod boat_messages;
mod remote_link;
mod telemetry_differ;

#[cfg(test)]
mod tests;

pub use remote_link::{ConnectionState, LinkEvent, RemoteLink};
pub use telemetry_differ::TelemetryDiffer;
