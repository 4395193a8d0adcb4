use std::collections::HashMap;

use bytes::Bytes;

use crate::codec::{Index, SegmentCodec};
use crate::error::{CodecError, Result};
use crate::wire::{decode_frame, encode_frame};

/// Index-keyed registry of segment codecs.
///
/// Populated once at startup and treated as immutable afterwards; `encode`
/// and `decode` are pure functions over the registry map.
pub struct CodecRegistry<I, S> {
    codecs: HashMap<I, SegmentCodec<S>>,
    by_tag: HashMap<u8, I>,
}

impl<I: Index, S> CodecRegistry<I, S> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
            by_tag: HashMap::new(),
        }
    }

    /// Register the codec for an index.
    ///
    /// Fails with [`CodecError::DuplicateTag`] if the index or its wire tag
    /// is already registered.
    pub fn register(&mut self, index: I, codec: SegmentCodec<S>) -> Result<()> {
        let tag = index.tag();
        if self.codecs.contains_key(&index) || self.by_tag.contains_key(&tag) {
            return Err(CodecError::DuplicateTag { tag });
        }
        self.by_tag.insert(tag, index);
        self.codecs.insert(index, codec);
        Ok(())
    }

    /// Encode a tagged segment into a complete wire frame.
    pub fn encode(&self, index: I, segment: &S) -> Result<Bytes> {
        let codec = self.codecs.get(&index).ok_or(CodecError::UnknownIndex {
            index: format!("{index:?}"),
        })?;
        let body = codec.encode(segment)?;
        Ok(encode_frame(index.tag(), &body))
    }

    /// Decode a complete wire frame into a tagged segment.
    pub fn decode(&self, bytes: &[u8]) -> Result<(I, S)> {
        let frame = decode_frame(bytes)?;
        let index = *self
            .by_tag
            .get(&frame.tag)
            .ok_or(CodecError::UnknownTag { tag: frame.tag })?;
        let codec = self.codecs.get(&index).ok_or(CodecError::UnknownIndex {
            index: format!("{index:?}"),
        })?;
        let segment = codec.decode(&frame.body)?;
        Ok((index, segment))
    }

    /// Structural equality for one index's segments.
    ///
    /// An unregistered index compares unequal, which forces a resend rather
    /// than suppressing one; [`Self::verify_schedule`] rules this out at
    /// startup.
    pub fn segment_eq(&self, index: I, a: &S, b: &S) -> bool {
        self.codecs
            .get(&index)
            .is_some_and(|codec| codec.equals(a, b))
    }

    /// Check that every index in a schedule has a registered codec.
    ///
    /// Missing send-path codecs are programmer errors; call this when the
    /// schedule is configured instead of failing on the first tick.
    pub fn verify_schedule(&self, schedule: &[I]) -> Result<()> {
        for index in schedule {
            if !self.codecs.contains_key(index) {
                return Err(CodecError::UnknownIndex {
                    index: format!("{index:?}"),
                });
            }
        }
        Ok(())
    }

    /// Whether an index has a registered codec.
    pub fn has_codec(&self, index: I) -> bool {
        self.codecs.contains_key(&index)
    }

    /// The registered indices, sorted by wire tag.
    pub fn indices(&self) -> Vec<I> {
        let mut tags: Vec<u8> = self.by_tag.keys().copied().collect();
        tags.sort_unstable();
        tags.iter().map(|tag| self.by_tag[tag]).collect()
    }
}

impl<I: Index, S> Default for CodecRegistry<I, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Index, S> std::fmt::Debug for CodecRegistry<I, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("indices", &self.indices())
            .finish()
    }
}
