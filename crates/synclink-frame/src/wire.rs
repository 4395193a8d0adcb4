use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CodecError, Result};

/// Size of the frame header: a single tag byte.
pub const HEADER_SIZE: usize = 1;

/// A framed protocol message: one tag byte plus an opaque body.
///
/// The tag byte is the wire encoding of a state segment index and uniquely
/// determines how the body is decoded. Framing assumes the transport below
/// already delimits messages (datagrams, websocket frames, or a
/// length-prefixed stream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The registered wire tag of the segment index.
    pub tag: u8,
    /// The index-specific binary body.
    pub body: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: u8, body: impl Into<Bytes>) -> Self {
        Self {
            tag,
            body: body.into(),
        }
    }

    /// The total wire size of this frame (header + body).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.body.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬────────────────┐
/// │ Tag (1B)   │ Body           │
/// └────────────┴────────────────┘
/// ```
pub fn encode_frame(tag: u8, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body.len());
    buf.put_u8(tag);
    buf.put_slice(body);
    buf.freeze()
}

/// Decode a frame from a complete message buffer.
///
/// Fails with [`CodecError::EmptyFrame`] if the buffer is empty; an empty
/// body is valid.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame> {
    let (&tag, body) = bytes.split_first().ok_or(CodecError::EmptyFrame)?;
    Ok(Frame {
        tag,
        body: Bytes::copy_from_slice(body),
    })
}
