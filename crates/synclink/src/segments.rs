//! Demo message set: a small ventilator-style operator/controller state
//! vocabulary. Real deployments define their own indices and segment union
//! next to their application store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use synclink_frame::{CodecRegistry, CodecRegistryHandle, Index, Result, SegmentCodec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    ParametersRequest,
    AlarmLimitsRequest,
    ScreenStatusRequest,
}

impl Index for Kind {
    fn tag(self) -> u8 {
        match self {
            Kind::ParametersRequest => 5,
            Kind::AlarmLimitsRequest => 7,
            Kind::ScreenStatusRequest => 23,
        }
    }
}

/// Requested ventilation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametersRequest {
    /// Requested oxygen concentration, percent.
    pub fio2: u32,
    /// Requested flow rate, L/min.
    pub flow: u32,
}

/// Requested alarm limits for the oxygen concentration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmLimitsRequest {
    pub fio2_min: u32,
    pub fio2_max: u32,
}

/// Requested touchscreen lock state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenStatusRequest {
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Parameters(ParametersRequest),
    AlarmLimits(AlarmLimitsRequest),
    ScreenStatus(ScreenStatusRequest),
}

/// All demo indices, in schedule order.
pub const SCHEDULE: [Kind; 3] = [
    Kind::ParametersRequest,
    Kind::AlarmLimitsRequest,
    Kind::ScreenStatusRequest,
];

/// Build the demo codec registry.
pub fn registry() -> Result<CodecRegistryHandle<Kind, Segment>> {
    let mut registry = CodecRegistry::new();
    registry.register(
        Kind::ParametersRequest,
        SegmentCodec::json(
            |segment| match segment {
                Segment::Parameters(value) => Some(value),
                _ => None,
            },
            Segment::Parameters,
        ),
    )?;
    registry.register(
        Kind::AlarmLimitsRequest,
        SegmentCodec::json(
            |segment| match segment {
                Segment::AlarmLimits(value) => Some(value),
                _ => None,
            },
            Segment::AlarmLimits,
        ),
    )?;
    registry.register(
        Kind::ScreenStatusRequest,
        SegmentCodec::json(
            |segment| match segment {
                Segment::ScreenStatus(value) => Some(value),
                _ => None,
            },
            Segment::ScreenStatus,
        ),
    )?;
    Ok(Arc::new(registry))
}
