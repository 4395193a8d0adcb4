use std::fmt;

use crate::changed::ChangedStateSender;
use crate::config::{ConfigError, ScheduleConfig};
use crate::sender::{IndexedSender, Outcome, SegmentReader, Sender, Step};
use crate::sequential::SequentialSender;

/// Which of the two child schedules a root slot activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Full round-robin sync; bounds worst-case staleness.
    Main,
    /// Change-triggered notifications; bounds reaction latency.
    Event,
}

/// The two persistent child senders, addressed as an indexed sender keyed
/// by [`Slot`].
///
/// Unlike leaf activations, the children keep their state across
/// activations; one root activation is one step of the addressed child.
struct PairedSenders<A, B> {
    main: A,
    event: B,
}

impl<I, S, A, B> IndexedSender<Slot, I, S> for PairedSenders<A, B>
where
    A: Sender<I, S>,
    B: Sender<I, S>,
{
    fn advance(&mut self, slot: Slot, outcome: Outcome<S>) -> Step<I, S> {
        match slot {
            Slot::Main => self.main.advance(outcome),
            Slot::Event => self.event.advance(outcome),
        }
    }
}

/// Per-index structural equality used for change detection.
pub type SegmentEqFn<I, S> = Box<dyn Fn(&I, &S, &S) -> bool + Send + Sync>;

/// Root scheduler: fixed-ratio interleave of a full-sync main schedule and
/// a change-triggered event schedule.
///
/// For `R = ceil(send_max_interval / send_min_interval)`, every rotation of
/// `R` external steps contains exactly one main slot and `R - 1` event
/// slots. The host drives one step per `send_min_interval`.
pub struct RootScheduler<I, S, F = SegmentEqFn<I, S>> {
    outer: SequentialSender<
        Slot,
        PairedSenders<
            SequentialSender<I, SegmentReader>,
            ChangedStateSender<I, S, SegmentReader, F>,
        >,
    >,
}

impl<I, S, F> RootScheduler<I, S, F>
where
    I: Copy + Ord + fmt::Debug,
    F: Fn(&I, &S, &S) -> bool,
{
    /// Build the scheduler, validating the configuration.
    ///
    /// `equals` is the per-index structural comparison for change
    /// detection, normally sourced from the codec registry.
    pub fn new(config: &ScheduleConfig<I>, equals: F) -> Result<Self, ConfigError> {
        config.validate()?;

        let main = SequentialSender::new(config.schedule.clone(), SegmentReader, false);
        let event = ChangedStateSender::new(
            config.schedule.clone(),
            SegmentReader,
            equals,
            config.output_idle,
        );

        let ratio = config.slot_ratio();
        let mut slots = Vec::with_capacity(ratio);
        slots.push(Slot::Main);
        slots.extend(std::iter::repeat(Slot::Event).take(ratio - 1));

        Ok(Self {
            outer: SequentialSender::new(slots, PairedSenders { main, event }, false),
        })
    }

    /// The root slot rotation, one entry per external tick.
    pub fn slots(&self) -> &[Slot] {
        self.outer.schedule()
    }
}

impl<I, S, F> Sender<I, S> for RootScheduler<I, S, F>
where
    I: Copy + Ord + fmt::Debug,
    F: Fn(&I, &S, &S) -> bool,
{
    fn advance(&mut self, outcome: Outcome<S>) -> Step<I, S> {
        self.outer.advance(outcome)
    }
}

impl<I: fmt::Debug, S, F> fmt::Debug for RootScheduler<I, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootScheduler")
            .field("slots", &self.outer.schedule())
            .finish_non_exhaustive()
    }
}
