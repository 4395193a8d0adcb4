//! Tagged wire framing and per-index codec registry.
//!
//! Every outgoing state segment is framed as:
//! - A 1-byte wire tag identifying the segment index
//! - An index-specific binary body (opaque to this crate)
//!
//! The tag byte uniquely determines how the body is decoded. Codecs are
//! registered once at startup; the registry is immutable afterwards.

pub mod codec;
pub mod error;
pub mod registry;
pub mod wire;

pub use codec::{Index, SegmentCodec};
pub use error::{CodecError, Result};
pub use registry::CodecRegistry;
pub use wire::{decode_frame, encode_frame, Frame, HEADER_SIZE};

use std::sync::Arc;

/// Shared handle to an immutable codec registry.
///
/// The registry is built once at startup and then shared between the send
/// and receive paths.
pub type CodecRegistryHandle<I, S> = Arc<CodecRegistry<I, S>>;
