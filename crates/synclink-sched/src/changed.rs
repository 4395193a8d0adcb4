use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use crate::notify::NotificationSender;
use crate::sender::{Effect, IndexedSender, Outcome, Sender, Step};

/// Where a changed-state step currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Next: request the last-connection time.
    ReadTime,
    /// Waiting for the connection-time outcome.
    AwaitTime,
    /// Waiting for the scan read of `tracked[pos]`.
    AwaitScan(usize),
    /// Driving the notification layer to one result.
    Drive,
}

/// Change-triggered sender: emits a segment only when its value differs
/// structurally from the last value observed for that index.
///
/// Each external step first re-reads the link's last-connection time; a
/// change there means the peer reconnected and every tracked index is
/// treated as changed, forcing a full resync. The step then scans every
/// tracked index, marks the changed ones sendable, and drives the
/// notification layer for at most one outgoing segment.
pub struct ChangedStateSender<I, S, X, F> {
    tracked: Vec<I>,
    prev: BTreeMap<I, S>,
    prev_connection_time: Option<Instant>,
    new_connection: bool,
    notify: NotificationSender<I, X>,
    equals: F,
    phase: Phase,
}

impl<I, S, X, F> ChangedStateSender<I, S, X, F>
where
    I: Copy + Ord + fmt::Debug,
    X: Clone,
    F: Fn(&I, &S, &S) -> bool,
{
    /// `equals` is the per-index structural comparison used for change
    /// detection, normally sourced from the codec registry.
    pub fn new(schedule: Vec<I>, indexed: X, equals: F, output_idle: bool) -> Self {
        Self {
            tracked: schedule.clone(),
            prev: BTreeMap::new(),
            prev_connection_time: None,
            new_connection: false,
            notify: NotificationSender::new(schedule, indexed, output_idle),
            equals,
            phase: Phase::ReadTime,
        }
    }

    fn note_connection_time(&mut self, time: Option<Instant>) {
        self.new_connection = time != self.prev_connection_time;
        if self.new_connection {
            tracing::debug!("link connection changed; forcing full resync");
        }
        self.prev_connection_time = time;
    }

    fn scan_one(&mut self, pos: usize, value: Option<S>) {
        let index = self.tracked[pos];
        let Some(value) = value else {
            // Absent segments are never marked; they surface once a value
            // appears and differs from the (missing) previous one.
            return;
        };
        let changed = match self.prev.get(&index) {
            Some(prev) => !(self.equals)(&index, prev, &value),
            None => true,
        };
        if self.new_connection || changed {
            tracing::trace!(index = ?index, "segment marked sendable");
            self.notify.mark_sendable(index);
            self.prev.insert(index, value);
        }
    }
}

impl<I, S, X, F> Sender<I, S> for ChangedStateSender<I, S, X, F>
where
    I: Copy + Ord + fmt::Debug,
    X: Clone + IndexedSender<I, I, S>,
    F: Fn(&I, &S, &S) -> bool,
{
    fn advance(&mut self, outcome: Outcome<S>) -> Step<I, S> {
        let mut outcome = outcome;
        loop {
            match self.phase {
                Phase::ReadTime => {
                    self.phase = Phase::AwaitTime;
                    return Step::Effect(Effect::ReadConnectionTime);
                }
                Phase::AwaitTime => {
                    let time = match std::mem::take(&mut outcome) {
                        Outcome::ConnectionTime(time) => time,
                        _ => None,
                    };
                    self.note_connection_time(time);
                    match self.tracked.first() {
                        Some(&first) => {
                            self.phase = Phase::AwaitScan(0);
                            return Step::Effect(Effect::ReadSegment(first));
                        }
                        None => self.phase = Phase::Drive,
                    }
                }
                Phase::AwaitScan(pos) => {
                    let value = match std::mem::take(&mut outcome) {
                        Outcome::Segment(value) => value,
                        _ => None,
                    };
                    self.scan_one(pos, value);
                    let next = pos + 1;
                    match self.tracked.get(next) {
                        Some(&index) => {
                            self.phase = Phase::AwaitScan(next);
                            return Step::Effect(Effect::ReadSegment(index));
                        }
                        None => self.phase = Phase::Drive,
                    }
                }
                Phase::Drive => {
                    let step = self.notify.advance(std::mem::take(&mut outcome));
                    if matches!(step, Step::Result(_)) {
                        self.phase = Phase::ReadTime;
                    }
                    return step;
                }
            }
        }
    }
}

impl<I, S, X, F> fmt::Debug for ChangedStateSender<I, S, X, F>
where
    I: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangedStateSender")
            .field("tracked", &self.tracked)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::sender::testing::MapReader;
    use crate::sender::{run_step, SegmentReader, Tagged};

    use super::*;

    fn sender(
        schedule: Vec<u8>,
        output_idle: bool,
    ) -> ChangedStateSender<u8, u32, SegmentReader, fn(&u8, &u32, &u32) -> bool> {
        ChangedStateSender::new(schedule, SegmentReader, |_, a, b| a == b, output_idle)
    }

    fn drain(
        sender: &mut ChangedStateSender<u8, u32, SegmentReader, fn(&u8, &u32, &u32) -> bool>,
        reader: &MapReader<u8, u32>,
        time: Option<Instant>,
    ) -> Vec<Tagged<u8, u32>> {
        let mut emitted = Vec::new();
        loop {
            match run_step(sender, reader, time) {
                Some(tagged) => emitted.push(tagged),
                None => return emitted,
            }
        }
    }

    #[test]
    fn first_observation_marks_everything() {
        let mut sender = sender(vec![1, 2], false);
        let mut reader = MapReader::default();
        reader.set(1u8, 10u32);
        reader.set(2, 20);

        let emitted = drain(&mut sender, &reader, None);
        let indices: Vec<_> = emitted.iter().map(|tagged| tagged.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn emits_exactly_the_changed_index() {
        let mut sender = sender(vec![1, 2], false);
        let mut reader = MapReader::default();
        reader.set(1u8, 1u32);
        reader.set(2, 2);
        drain(&mut sender, &reader, None);

        reader.set(2, 3);
        let emitted = drain(&mut sender, &reader, None);
        assert_eq!(
            emitted,
            vec![Tagged {
                index: 2,
                value: 3
            }]
        );
    }

    #[test]
    fn unchanged_values_stay_quiet() {
        let mut sender = sender(vec![1, 2], false);
        let mut reader = MapReader::default();
        reader.set(1u8, 1u32);
        reader.set(2, 2);
        drain(&mut sender, &reader, None);

        assert_eq!(drain(&mut sender, &reader, None), vec![]);
    }

    #[test]
    fn absent_segments_are_never_marked() {
        let mut sender = sender(vec![1, 2], false);
        let mut reader = MapReader::default();
        reader.set(2u8, 2u32);

        let emitted = drain(&mut sender, &reader, None);
        assert_eq!(
            emitted,
            vec![Tagged {
                index: 2,
                value: 2
            }]
        );

        // Once the missing segment appears it counts as changed.
        reader.set(1, 1);
        let emitted = drain(&mut sender, &reader, None);
        assert_eq!(
            emitted,
            vec![Tagged {
                index: 1,
                value: 1
            }]
        );
    }

    #[test]
    fn connection_change_forces_full_resync() {
        let mut sender = sender(vec![1, 2, 3], false);
        let mut reader = MapReader::default();
        reader.set(1u8, 1u32);
        reader.set(2, 2);
        reader.set(3, 3);

        let connected = Instant::now();
        drain(&mut sender, &reader, Some(connected));
        assert_eq!(drain(&mut sender, &reader, Some(connected)), vec![]);

        // A new connection time re-emits every tracked index even though no
        // value changed.
        let reconnected = connected + Duration::from_secs(5);
        let emitted = drain(&mut sender, &reader, Some(reconnected));
        let indices: Vec<_> = emitted.iter().map(|tagged| tagged.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn resync_respects_round_robin() {
        let mut sender = sender(vec![1, 2], false);
        let mut reader = MapReader::default();
        reader.set(1u8, 1u32);
        reader.set(2, 2);

        let connected = Instant::now();
        drain(&mut sender, &reader, Some(connected));

        let reconnected = connected + Duration::from_secs(1);
        let first = run_step(&mut sender, &reader, Some(reconnected)).unwrap();
        let second = run_step(&mut sender, &reader, Some(reconnected)).unwrap();
        assert_eq!((first.index, second.index), (1, 2));
    }

    #[test]
    fn idle_output_keeps_rotating_when_nothing_changed() {
        let mut sender = sender(vec![1, 2], true);
        let mut reader = MapReader::default();
        reader.set(1u8, 1u32);
        reader.set(2, 2);

        // First two steps drain the initial marks; afterwards the fallback
        // keeps emitting instead of going quiet.
        let _ = run_step(&mut sender, &reader, None);
        let _ = run_step(&mut sender, &reader, None);
        assert!(run_step(&mut sender, &reader, None).is_some());
        assert!(run_step(&mut sender, &reader, None).is_some());
    }
}
