//! Cooperative send scheduling for state synchronization.
//!
//! This is the decision layer of synclink: tick by tick, which state
//! segment (if any) goes on the wire next. Senders are explicit state
//! machines driven by an `advance(outcome)` call; they suspend by yielding
//! an [`Effect`] (a synchronous read of external state) and complete by
//! yielding a result (an optional tagged segment). There is no I/O and no
//! clock in here; the host resolves effects and owns all timing.
//!
//! Composition, bottom up:
//! - [`SegmentReader`]: one external read per activation.
//! - [`SequentialSender`]: round-robin over a fixed schedule.
//! - [`NotificationSender`] / [`ChangedStateSender`]: emit only what
//!   changed, with full-resync on reconnect.
//! - [`RootScheduler`]: fixed-ratio interleave of a full-sync schedule and
//!   the change-triggered schedule.

pub mod changed;
pub mod config;
pub mod notify;
pub mod root;
pub mod sender;
pub mod sequential;

pub use changed::ChangedStateSender;
pub use config::{ConfigError, ScheduleConfig};
pub use notify::{FilteredSender, NotificationSender};
pub use root::{RootScheduler, SegmentEqFn, Slot};
pub use sender::{
    run_step, Effect, IndexedSender, Outcome, SegmentReader, Sender, StateReader, Step, Tagged,
};
pub use sequential::SequentialSender;
