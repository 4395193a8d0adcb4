use crate::sender::{IndexedSender, Outcome, Sender, Step};

/// Round-robin sender: drives an [`IndexedSender`] over a fixed cyclic
/// schedule, one completed activation per external step.
///
/// With `skip_unavailable` set, activations that complete without a value
/// are skipped silently, bounded by one full round: after `schedule.len()`
/// consecutive skips the absent result is yielded anyway, so an all-absent
/// schedule still terminates every step.
#[derive(Debug, Clone)]
pub struct SequentialSender<J, X> {
    schedule: Vec<J>,
    indexed: X,
    skip_unavailable: bool,
    cursor: usize,
    skipped: usize,
    in_flight: Option<J>,
}

impl<J: Copy, X> SequentialSender<J, X> {
    pub fn new(schedule: Vec<J>, indexed: X, skip_unavailable: bool) -> Self {
        Self {
            schedule,
            indexed,
            skip_unavailable,
            cursor: 0,
            skipped: 0,
            in_flight: None,
        }
    }

    /// The cyclic schedule this sender rotates through.
    pub fn schedule(&self) -> &[J] {
        &self.schedule
    }

    /// Borrow the underlying indexed sender.
    pub fn indexed(&self) -> &X {
        &self.indexed
    }

    /// Mutably borrow the underlying indexed sender.
    pub fn indexed_mut(&mut self) -> &mut X {
        &mut self.indexed
    }
}

impl<J, I, S, X> Sender<I, S> for SequentialSender<J, X>
where
    J: Copy,
    X: IndexedSender<J, I, S>,
{
    fn advance(&mut self, outcome: Outcome<S>) -> Step<I, S> {
        if self.schedule.is_empty() {
            return Step::Result(None);
        }

        let mut outcome = outcome;
        loop {
            let index = match self.in_flight {
                Some(index) => index,
                None => {
                    let index = self.schedule[self.cursor];
                    self.cursor = (self.cursor + 1) % self.schedule.len();
                    self.in_flight = Some(index);
                    outcome = Outcome::Idle;
                    index
                }
            };

            match self.indexed.advance(index, outcome) {
                step @ Step::Effect(_) => return step,
                Step::Result(result) => {
                    self.in_flight = None;
                    let skip = result.is_none()
                        && self.skip_unavailable
                        && self.skipped < self.schedule.len();
                    if !skip {
                        self.skipped = 0;
                        return Step::Result(result);
                    }
                    self.skipped += 1;
                    outcome = Outcome::Idle;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sender::testing::MapReader;
    use crate::sender::{run_step, SegmentReader, Tagged};

    use super::*;

    fn reader(entries: &[(u8, u32)]) -> MapReader<u8, u32> {
        let mut reader = MapReader::default();
        for &(index, value) in entries {
            reader.set(index, value);
        }
        reader
    }

    #[test]
    fn round_robin_is_fair() {
        let mut sender = SequentialSender::new(vec![1u8, 2, 3], SegmentReader, false);
        let reader = reader(&[(1, 10), (2, 20), (3, 30)]);

        let order: Vec<_> = (0..4)
            .map(|_| run_step(&mut sender, &reader, None).unwrap().index)
            .collect();
        assert_eq!(order, vec![1, 2, 3, 1]);
    }

    #[test]
    fn absent_segments_yield_absent_without_skipping() {
        let mut sender = SequentialSender::new(vec![1u8, 2], SegmentReader, false);
        let reader = reader(&[(2, 20)]);

        assert_eq!(run_step(&mut sender, &reader, None), None);
        assert_eq!(
            run_step(&mut sender, &reader, None),
            Some(Tagged {
                index: 2,
                value: 20
            })
        );
    }

    #[test]
    fn skips_unavailable_to_next_present() {
        let mut sender = SequentialSender::new(vec![1u8, 2, 3], SegmentReader, true);
        let reader = reader(&[(3, 30)]);

        // Indices 1 and 2 are absent and skipped within the same step.
        assert_eq!(
            run_step(&mut sender, &reader, None),
            Some(Tagged {
                index: 3,
                value: 30
            })
        );
    }

    #[test]
    fn all_absent_terminates_within_one_round() {
        let mut sender = SequentialSender::new(vec![1u8, 2, 3], SegmentReader, true);
        let reader = MapReader::<u8, u32>::default();

        // The skip budget is the schedule length, so a single external step
        // completes with an absent result instead of looping forever.
        assert_eq!(run_step(&mut sender, &reader, None), None);
        assert_eq!(run_step(&mut sender, &reader, None), None);
    }

    #[test]
    fn skip_budget_resets_after_yield() {
        let mut sender = SequentialSender::new(vec![1u8, 2], SegmentReader, true);
        let mut reader = reader(&[(1, 10)]);

        assert_eq!(
            run_step(&mut sender, &reader, None),
            Some(Tagged {
                index: 1,
                value: 10
            })
        );

        reader.clear(&1);
        reader.set(2, 20);
        assert_eq!(
            run_step(&mut sender, &reader, None),
            Some(Tagged {
                index: 2,
                value: 20
            })
        );
    }

    #[test]
    fn empty_schedule_completes_absent() {
        let mut sender = SequentialSender::new(Vec::<u8>::new(), SegmentReader, true);
        let reader = MapReader::<u8, u32>::default();
        assert_eq!(run_step(&mut sender, &reader, None), None);
    }
}
