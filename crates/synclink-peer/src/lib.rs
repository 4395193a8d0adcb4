//! Connection health monitoring and link driving for state synchronization.
//!
//! This crate composes the framing and scheduling layers into a [`Link`]:
//! the synchronous, I/O-free object a host drive loop ticks to keep a
//! remote peer's view of local state eventually consistent. The host owns
//! the socket and the clock; the link owns the protocol.

pub mod error;
pub mod link;
pub mod monitor;
pub mod receive;
pub mod store;

pub use error::{LinkError, Result};
pub use link::{Link, LinkConfig};
pub use monitor::ConnectionMonitor;
pub use receive::{Receiver, StateWriter};
pub use store::SharedStateMap;

// The send-side store interface, re-exported so hosts implement both halves
// against one crate.
pub use synclink_sched::StateReader;
