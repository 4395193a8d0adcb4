use std::time::Instant;

/// A request to read external state, yielded by a sender activation.
///
/// Effects are synchronous reads, never I/O: the caller resolves them
/// immediately and resumes the sender with the matching [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect<I> {
    /// Read the current value of one state segment.
    ReadSegment(I),
    /// Read the time at which the link last became connected.
    ReadConnectionTime,
}

/// The outcome of the previously yielded [`Effect`], supplied on the next
/// `advance` call.
#[derive(Debug, Clone, Default)]
pub enum Outcome<S> {
    /// Nothing to report: the first call of an activation, or the previous
    /// yield was a result.
    #[default]
    Idle,
    /// Outcome of [`Effect::ReadSegment`].
    Segment(Option<S>),
    /// Outcome of [`Effect::ReadConnectionTime`].
    ConnectionTime(Option<Instant>),
}

/// A tagged state segment: the unit handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagged<I, S> {
    pub index: I,
    pub value: S,
}

/// One step of a sender: either a suspension or a completed activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<I, S> {
    /// The sender needs the outcome of this effect before it can continue.
    Effect(Effect<I>),
    /// The activation completed; `None` means nothing to send.
    Result(Option<Tagged<I, S>>),
}

/// A suspendable computation producing one optional tagged segment per
/// activation.
///
/// Callers drive a sender by calling `advance` repeatedly, answering each
/// [`Step::Effect`] with its outcome on the following call. A sender never
/// yields two results without an intervening advance.
pub trait Sender<I, S> {
    fn advance(&mut self, outcome: Outcome<S>) -> Step<I, S>;
}

/// A family of sender activations keyed by a schedule index.
///
/// `J` is the schedule's index type. It usually matches the segment index
/// `I`, but composite schedules (the root scheduler) key their children by a
/// different type.
///
/// A fresh activation begins with [`Outcome::Idle`]; the activation is over
/// once [`Step::Result`] is returned. For a given index the sequence of
/// effects is deterministic modulo external state.
pub trait IndexedSender<J, I, S> {
    fn advance(&mut self, index: J, outcome: Outcome<S>) -> Step<I, S>;
}

/// Leaf indexed sender: one read of external state per activation.
///
/// This is where external state accessors plug in; every higher layer only
/// relays the read effect outward.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentReader;

impl<I: Copy, S> IndexedSender<I, I, S> for SegmentReader {
    fn advance(&mut self, index: I, outcome: Outcome<S>) -> Step<I, S> {
        match outcome {
            Outcome::Idle => Step::Effect(Effect::ReadSegment(index)),
            Outcome::Segment(value) => Step::Result(value.map(|value| Tagged { index, value })),
            // Mismatched resume; treat the segment as absent.
            Outcome::ConnectionTime(_) => Step::Result(None),
        }
    }
}

/// Synchronous accessor into the external application store, one segment
/// per index.
pub trait StateReader<I, S> {
    /// Current value of one state segment, or `None` if unavailable.
    fn read_segment(&self, index: I) -> Option<S>;
}

/// Drive `sender` through one full activation, resolving read effects via
/// `reader`.
///
/// `connection_time` answers [`Effect::ReadConnectionTime`]; it is sampled
/// once by the caller because effects resolve synchronously within the tick.
pub fn run_step<I, S, T>(
    sender: &mut T,
    reader: &impl StateReader<I, S>,
    connection_time: Option<Instant>,
) -> Option<Tagged<I, S>>
where
    T: Sender<I, S> + ?Sized,
{
    let mut outcome = Outcome::Idle;
    loop {
        match sender.advance(outcome) {
            Step::Effect(Effect::ReadSegment(index)) => {
                outcome = Outcome::Segment(reader.read_segment(index));
            }
            Step::Effect(Effect::ReadConnectionTime) => {
                outcome = Outcome::ConnectionTime(connection_time);
            }
            Step::Result(result) => return result,
        }
    }
}
