use std::time::Duration;

/// Errors in schedule configuration, reported when a scheduler is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The index schedule is empty.
    #[error("schedule must contain at least one index")]
    EmptySchedule,

    /// `send_min_interval` is zero.
    #[error("send_min_interval must be non-zero")]
    ZeroSendInterval,

    /// `send_max_interval` is shorter than `send_min_interval`.
    #[error("send_max_interval ({max:?}) must be >= send_min_interval ({min:?})")]
    IntervalOrder { min: Duration, max: Duration },
}

/// Timing and ordering configuration for a root scheduler.
///
/// The intervals are configuration, not behavior: different links run the
/// same scheduler with different constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig<I> {
    /// Indices serviced by both the main and event schedules, in rotation
    /// order.
    pub schedule: Vec<I>,
    /// Minimum interval between outgoing frames; one external tick.
    pub send_min_interval: Duration,
    /// Maximum interval between full-sync attempts for any one index;
    /// bounds worst-case staleness at the peer.
    pub send_max_interval: Duration,
    /// Whether the event schedule emits keep-alive traffic when no segment
    /// has changed.
    pub output_idle: bool,
}

impl<I> ScheduleConfig<I> {
    pub const DEFAULT_SEND_MIN_INTERVAL: Duration = Duration::from_millis(50);
    pub const DEFAULT_SEND_MAX_INTERVAL: Duration = Duration::from_millis(100);

    /// Configuration with the default intervals and no idle output.
    pub fn new(schedule: Vec<I>) -> Self {
        Self {
            schedule,
            send_min_interval: Self::DEFAULT_SEND_MIN_INTERVAL,
            send_max_interval: Self::DEFAULT_SEND_MAX_INTERVAL,
            output_idle: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        if self.send_min_interval.is_zero() {
            return Err(ConfigError::ZeroSendInterval);
        }
        if self.send_max_interval < self.send_min_interval {
            return Err(ConfigError::IntervalOrder {
                min: self.send_min_interval,
                max: self.send_max_interval,
            });
        }
        Ok(())
    }

    /// How many external ticks make up one root rotation:
    /// `ceil(send_max_interval / send_min_interval)`.
    ///
    /// One slot per rotation is a full-sync attempt; the rest are
    /// change-driven.
    pub fn slot_ratio(&self) -> usize {
        let min = self.send_min_interval.as_nanos().max(1);
        self.send_max_interval.as_nanos().div_ceil(min) as usize
    }
}
