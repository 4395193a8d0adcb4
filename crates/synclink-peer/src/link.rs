use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use synclink_frame::{CodecRegistryHandle, Index};
use synclink_sched::{run_step, RootScheduler, ScheduleConfig, SegmentEqFn};

use crate::error::Result;
use crate::monitor::ConnectionMonitor;
use crate::receive::{Receiver, StateWriter};
use crate::StateReader;

/// Configuration for one synchronization link.
///
/// The original deployments of this protocol ran two differently-tuned
/// instances; everything that differed between them lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig<I> {
    /// Indices to synchronize, in rotation order.
    pub schedule: Vec<I>,
    /// Minimum interval between outgoing frames; the host ticks
    /// [`Link::poll_send`] at this cadence.
    pub send_min_interval: Duration,
    /// Maximum interval between full-sync attempts for any one index.
    pub send_max_interval: Duration,
    /// Silence window after which the link is declared down.
    pub connection_timeout: Duration,
    /// Whether to emit keep-alive traffic when no segment has changed.
    pub output_idle: bool,
}

impl<I> LinkConfig<I> {
    /// Configuration with the default timing constants.
    pub fn new(schedule: Vec<I>) -> Self {
        Self {
            schedule,
            send_min_interval: ScheduleConfig::<I>::DEFAULT_SEND_MIN_INTERVAL,
            send_max_interval: ScheduleConfig::<I>::DEFAULT_SEND_MAX_INTERVAL,
            connection_timeout: ConnectionMonitor::DEFAULT_TIMEOUT,
            output_idle: false,
        }
    }

    fn schedule_config(&self) -> ScheduleConfig<I>
    where
        I: Clone,
    {
        ScheduleConfig {
            schedule: self.schedule.clone(),
            send_min_interval: self.send_min_interval,
            send_max_interval: self.send_max_interval,
            output_idle: self.output_idle,
        }
    }
}

/// One end of a state-synchronization link, with the I/O left to the host.
///
/// The host's drive loop owns the socket and the clock:
/// - every `send_min_interval`, call [`Link::poll_send`] and write the
///   returned frame (if any) to the channel;
/// - for every inbound frame, call [`Link::on_frame`];
/// - periodically call [`Link::check_timeout`] from a watchdog timer.
///
/// Everything in here is synchronous and single-threaded; a host that
/// splits sending and receiving across threads wraps the link in one mutex.
pub struct Link<I, S, R, W> {
    registry: CodecRegistryHandle<I, S>,
    scheduler: RootScheduler<I, S>,
    monitor: ConnectionMonitor,
    receiver: Receiver<I, S, W>,
    reader: R,
}

impl<I, S, R, W> Link<I, S, R, W>
where
    I: Index + Ord + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
    R: StateReader<I, S>,
    W: StateWriter<I, S>,
{
    /// Build a link over a startup-populated codec registry.
    ///
    /// Fails if the schedule names an index with no registered codec or if
    /// the timing configuration is invalid; both are startup-time
    /// programmer errors, not per-tick conditions.
    pub fn new(
        registry: CodecRegistryHandle<I, S>,
        reader: R,
        writer: W,
        config: LinkConfig<I>,
    ) -> Result<Self> {
        registry.verify_schedule(&config.schedule)?;

        let equals_registry = Arc::clone(&registry);
        let equals: SegmentEqFn<I, S> =
            Box::new(move |index, a, b| equals_registry.segment_eq(*index, a, b));
        let scheduler = RootScheduler::new(&config.schedule_config(), equals)?;

        Ok(Self {
            registry: Arc::clone(&registry),
            scheduler,
            monitor: ConnectionMonitor::new(config.connection_timeout),
            receiver: Receiver::new(registry, writer),
            reader,
        })
    }

    /// Drive one scheduler tick; returns the next frame to send, if any.
    ///
    /// Call once per `send_min_interval`.
    pub fn poll_send(&mut self) -> Option<Bytes> {
        let tagged = run_step(
            &mut self.scheduler,
            &self.reader,
            self.monitor.last_connection_time(),
        )?;
        match self.registry.encode(tagged.index, &tagged.value) {
            Ok(bytes) => {
                tracing::trace!(index = ?tagged.index, len = bytes.len(), "frame scheduled");
                Some(bytes)
            }
            Err(err) => {
                // Unreachable for verified schedules; dropping the frame is
                // still safer than taking the link down.
                tracing::error!(index = ?tagged.index, error = %err, "failed to encode scheduled segment");
                None
            }
        }
    }

    /// Handle one inbound frame; returns true if it decoded and applied.
    pub fn on_frame(&mut self, bytes: &[u8], now: Instant) -> bool {
        self.receiver.on_frame(bytes, &mut self.monitor, now)
    }

    /// Watchdog check; returns true when the link just went down.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        self.monitor.check_timeout(now)
    }

    /// Queryable liveness flag for UI/alarm logic.
    pub fn connection_up(&self) -> bool {
        self.monitor.is_up()
    }

    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.monitor
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn writer(&self) -> &W {
        self.receiver.writer()
    }
}

impl<I, S, R, W> std::fmt::Debug for Link<I, S, R, W>
where
    I: Index,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("up", &self.monitor.is_up())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use synclink_frame::{CodecRegistry, SegmentCodec};

    use crate::store::SharedStateMap;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Kind {
        Parameters,
        AlarmLimits,
    }

    impl Index for Kind {
        fn tag(self) -> u8 {
            match self {
                Kind::Parameters => 5,
                Kind::AlarmLimits => 7,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Segment {
        Parameters { fio2: u32 },
        AlarmLimits { fio2_min: u32, fio2_max: u32 },
    }

    fn registry() -> CodecRegistryHandle<Kind, Segment> {
        let mut registry = CodecRegistry::new();
        registry
            .register(Kind::Parameters, SegmentCodec::json(|s| Some(s), |s| s))
            .unwrap();
        // Both kinds carry the whole enum as JSON in these tests; the
        // per-index tags still differ on the wire.
        registry
            .register(Kind::AlarmLimits, SegmentCodec::json(|s| Some(s), |s| s))
            .unwrap();
        Arc::new(registry)
    }

    fn link(
        config: LinkConfig<Kind>,
    ) -> (
        Link<Kind, Segment, SharedStateMap<Kind, Segment>, SharedStateMap<Kind, Segment>>,
        SharedStateMap<Kind, Segment>,
        SharedStateMap<Kind, Segment>,
    ) {
        let local = SharedStateMap::new();
        let remote_view = SharedStateMap::new();
        let link = Link::new(registry(), local.clone(), remote_view.clone(), config).unwrap();
        (link, local, remote_view)
    }

    #[test]
    fn unregistered_schedule_index_fails_at_startup() {
        let mut registry: CodecRegistry<Kind, Segment> = CodecRegistry::new();
        registry
            .register(Kind::Parameters, SegmentCodec::json(|s| Some(s), |s| s))
            .unwrap();

        let result = Link::new(
            Arc::new(registry),
            SharedStateMap::new(),
            SharedStateMap::new(),
            LinkConfig::new(vec![Kind::Parameters, Kind::AlarmLimits]),
        );
        assert!(matches!(
            result,
            Err(crate::LinkError::Codec(
                synclink_frame::CodecError::UnknownIndex { .. }
            ))
        ));
    }

    #[test]
    fn invalid_intervals_fail_at_startup() {
        let mut config = LinkConfig::new(vec![Kind::Parameters]);
        config.send_min_interval = Duration::ZERO;

        let result = Link::new(
            registry(),
            SharedStateMap::<Kind, Segment>::new(),
            SharedStateMap::new(),
            config,
        );
        assert!(matches!(result, Err(crate::LinkError::Config(_))));
    }

    #[test]
    fn poll_send_produces_decodable_frames() {
        let (mut link, local, _) = link(LinkConfig::new(vec![Kind::Parameters]));
        local.set(Kind::Parameters, Segment::Parameters { fio2: 60 });

        let frame = link.poll_send().expect("main slot should emit");
        assert_eq!(frame[0], Kind::Parameters.tag());

        let (index, segment) = registry().decode(&frame).unwrap();
        assert_eq!(index, Kind::Parameters);
        assert_eq!(segment, Segment::Parameters { fio2: 60 });
    }

    #[test]
    fn poll_send_skips_ticks_with_nothing_to_say() {
        let (mut link, local, _) =
            link(LinkConfig::new(vec![Kind::Parameters, Kind::AlarmLimits]));
        local.set(Kind::Parameters, Segment::Parameters { fio2: 21 });

        // Rotation [Main, Event]: the main slot hits the absent AlarmLimits
        // on its second pass and yields nothing for that tick.
        let sent: Vec<bool> = (0..4).map(|_| link.poll_send().is_some()).collect();
        assert!(sent.contains(&true));
        assert!(sent.contains(&false));
    }

    #[test]
    fn inbound_frames_update_the_store_and_liveness() {
        let (mut link, _, remote_view) = link(LinkConfig::new(vec![Kind::Parameters]));
        assert!(!link.connection_up());

        let frame = registry()
            .encode(Kind::AlarmLimits, &Segment::AlarmLimits {
                fio2_min: 21,
                fio2_max: 80,
            })
            .unwrap();
        let now = Instant::now();
        assert!(link.on_frame(&frame, now));
        assert!(link.connection_up());
        assert_eq!(
            remote_view.get(&Kind::AlarmLimits),
            Some(Segment::AlarmLimits {
                fio2_min: 21,
                fio2_max: 80,
            })
        );

        // Garbage doesn't crash the link or count as contact.
        assert!(!link.on_frame(&[9, 1, 2], now));
        assert!(link.connection_up());
    }

    #[test]
    fn watchdog_takes_the_link_down_after_silence() {
        let mut config = LinkConfig::new(vec![Kind::Parameters]);
        config.connection_timeout = Duration::from_millis(2000);
        let (mut link, _, _) = link(config);

        let start = Instant::now();
        let frame = registry()
            .encode(Kind::Parameters, &Segment::Parameters { fio2: 30 })
            .unwrap();
        link.on_frame(&frame, start);
        assert!(link.connection_up());

        assert!(!link.check_timeout(start + Duration::from_millis(1000)));
        assert!(link.check_timeout(start + Duration::from_millis(2000)));
        assert!(!link.connection_up());
    }
}
