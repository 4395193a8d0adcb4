use std::fmt;
use std::hash::Hash;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, Result};

/// A stable identifier for one kind of state segment, also used as the wire
/// tag.
///
/// Indices are registered once at startup and never change for the process
/// lifetime.
pub trait Index: Copy + Eq + Hash + fmt::Debug {
    /// The one-byte wire tag for this index.
    fn tag(self) -> u8;
}

type EncodeFn<S> = Box<dyn Fn(&S) -> Result<Bytes> + Send + Sync>;
type DecodeFn<S> = Box<dyn Fn(&[u8]) -> Result<S> + Send + Sync>;
type EqualsFn<S> = Box<dyn Fn(&S, &S) -> bool + Send + Sync>;

/// Encode/decode/equality triple for one state segment index.
///
/// Equality is registered alongside the codec so change detection uses an
/// explicit per-index structural comparison rather than generic deep
/// equality or reference identity.
pub struct SegmentCodec<S> {
    encode: EncodeFn<S>,
    decode: DecodeFn<S>,
    equals: EqualsFn<S>,
}

impl<S> SegmentCodec<S> {
    /// Build a codec from explicit encode/decode/equality functions.
    pub fn new(
        encode: impl Fn(&S) -> Result<Bytes> + Send + Sync + 'static,
        decode: impl Fn(&[u8]) -> Result<S> + Send + Sync + 'static,
        equals: impl Fn(&S, &S) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode),
            equals: Box::new(equals),
        }
    }

    /// Build a codec for one variant of a segment union, carried as JSON.
    ///
    /// `project` extracts the variant's value from the union (returning
    /// `None` for any other variant) and `embed` wraps a decoded value back
    /// into the union. Equality compares projected values with the variant
    /// type's `PartialEq`.
    pub fn json<T>(project: fn(&S) -> Option<&T>, embed: fn(T) -> S) -> Self
    where
        T: Serialize + DeserializeOwned + PartialEq + 'static,
        S: 'static,
    {
        Self::new(
            move |segment| {
                let value = project(segment).ok_or(CodecError::SegmentMismatch)?;
                serde_json::to_vec(value)
                    .map(Bytes::from)
                    .map_err(|err| CodecError::MalformedBody(err.to_string()))
            },
            move |body| {
                serde_json::from_slice(body)
                    .map(embed)
                    .map_err(|err| CodecError::MalformedBody(err.to_string()))
            },
            move |a, b| match (project(a), project(b)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        )
    }

    /// Encode a segment into its wire body.
    pub fn encode(&self, segment: &S) -> Result<Bytes> {
        (self.encode)(segment)
    }

    /// Decode a wire body into a segment.
    pub fn decode(&self, body: &[u8]) -> Result<S> {
        (self.decode)(body)
    }

    /// Structural equality for this index's segments.
    pub fn equals(&self, a: &S, b: &S) -> bool {
        (self.equals)(a, b)
    }
}

impl<S> fmt::Debug for SegmentCodec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Reading {
        value: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Segment {
        Reading(Reading),
        Other(u8),
    }

    fn reading_codec() -> SegmentCodec<Segment> {
        SegmentCodec::json(
            |segment| match segment {
                Segment::Reading(reading) => Some(reading),
                _ => None,
            },
            Segment::Reading,
        )
    }

    #[test]
    fn json_codec_roundtrip() {
        let codec = reading_codec();
        let segment = Segment::Reading(Reading { value: 42 });

        let body = codec.encode(&segment).unwrap();
        let decoded = codec.decode(&body).unwrap();
        assert_eq!(decoded, segment);
    }

    #[test]
    fn json_codec_rejects_wrong_variant() {
        let codec = reading_codec();
        assert!(matches!(
            codec.encode(&Segment::Other(1)),
            Err(CodecError::SegmentMismatch)
        ));
    }

    #[test]
    fn json_codec_rejects_malformed_body() {
        let codec = reading_codec();
        assert!(matches!(
            codec.decode(b"{truncated"),
            Err(CodecError::MalformedBody(_))
        ));
    }

    #[test]
    fn equality_is_structural() {
        let codec = reading_codec();
        let a = Segment::Reading(Reading { value: 1 });
        let b = Segment::Reading(Reading { value: 1 });
        let c = Segment::Reading(Reading { value: 2 });

        assert!(codec.equals(&a, &b));
        assert!(!codec.equals(&a, &c));
        assert!(!codec.equals(&a, &Segment::Other(0)));
    }
}
