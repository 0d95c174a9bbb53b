//! Shared types for the PeerPass transfer client.
//!
//! Everything that crosses the UI boundary lives here: session states,
//! progress snapshots, failure categories, invite codes, and the display
//! formatting the front ends use to render them. No I/O, no policy.

pub mod format;
mod invite;
mod types;

pub use invite::{InviteCode, InviteCodeError};
pub use types::{Direction, FailureKind, TransferSnapshot, TransferState};
