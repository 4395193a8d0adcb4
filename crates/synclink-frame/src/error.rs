/// Errors that can occur during frame encoding/decoding and codec registration.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// No codec is registered for the index being encoded.
    ///
    /// This is a programmer error: schedules should be checked against the
    /// registry at startup via [`crate::CodecRegistry::verify_schedule`].
    #[error("no codec registered for index {index}")]
    UnknownIndex { index: String },

    /// The frame's tag byte does not map to any registered index.
    #[error("no index registered for wire tag {tag}")]
    UnknownTag { tag: u8 },

    /// The frame is empty (missing the tag byte).
    #[error("empty frame (missing tag byte)")]
    EmptyFrame,

    /// The frame body was rejected by the index's codec.
    #[error("malformed message body: {0}")]
    MalformedBody(String),

    /// The segment value handed to `encode` does not belong to the index's
    /// registered codec.
    #[error("segment value does not match the registered index")]
    SegmentMismatch,

    /// A codec was already registered for this tag or index.
    #[error("duplicate registration for wire tag {tag}")]
    DuplicateTag { tag: u8 },
}

pub type Result<T> = std::result::Result<T, CodecError>;
