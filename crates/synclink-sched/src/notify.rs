use std::collections::BTreeSet;

use crate::sender::{IndexedSender, Outcome, Sender, Step};
use crate::sequential::SequentialSender;

/// Overlay that suppresses indices missing from an allowed set.
///
/// Suppressed indices complete immediately as absent, so a skipping
/// sequential sender passes over them.
#[derive(Debug, Clone)]
pub struct FilteredSender<I, X> {
    inner: X,
    allowed: BTreeSet<I>,
}

impl<I: Ord, X> FilteredSender<I, X> {
    pub fn new(inner: X) -> Self {
        Self {
            inner,
            allowed: BTreeSet::new(),
        }
    }

    pub fn allowed(&self) -> &BTreeSet<I> {
        &self.allowed
    }

    pub fn allowed_mut(&mut self) -> &mut BTreeSet<I> {
        &mut self.allowed
    }
}

impl<I, S, X> IndexedSender<I, I, S> for FilteredSender<I, X>
where
    I: Copy + Ord,
    X: IndexedSender<I, I, S>,
{
    fn advance(&mut self, index: I, outcome: Outcome<S>) -> Step<I, S> {
        if !self.allowed.contains(&index) {
            return Step::Result(None);
        }
        self.inner.advance(index, outcome)
    }
}

/// Which inner sender currently has a suspended activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Sendable,
    Fallback,
}

/// Notification sender: round-robins over the indices currently marked
/// sendable, emitting one segment per external step and unmarking it.
///
/// When nothing is sendable, either completes absent (nothing to send) or,
/// with `output_idle` set, falls back to an unrestricted round-robin over
/// the full schedule as best-effort keep-alive traffic.
#[derive(Debug, Clone)]
pub struct NotificationSender<I, X> {
    sendable: SequentialSender<I, FilteredSender<I, X>>,
    fallback: Option<SequentialSender<I, X>>,
    driving: Option<Lane>,
}

impl<I, X> NotificationSender<I, X>
where
    I: Copy + Ord,
{
    pub fn new(schedule: Vec<I>, indexed: X, output_idle: bool) -> Self
    where
        X: Clone,
    {
        let fallback =
            output_idle.then(|| SequentialSender::new(schedule.clone(), indexed.clone(), false));
        Self {
            sendable: SequentialSender::new(schedule, FilteredSender::new(indexed), true),
            fallback,
            driving: None,
        }
    }

    /// Mark an index as changed-but-not-yet-sent.
    pub fn mark_sendable(&mut self, index: I) {
        self.sendable.indexed_mut().allowed_mut().insert(index);
    }

    /// Whether any index is currently marked sendable.
    pub fn has_sendable(&self) -> bool {
        !self.sendable.indexed().allowed().is_empty()
    }
}

impl<I, S, X> Sender<I, S> for NotificationSender<I, X>
where
    I: Copy + Ord,
    X: IndexedSender<I, I, S>,
{
    fn advance(&mut self, outcome: Outcome<S>) -> Step<I, S> {
        let lane = match self.driving {
            Some(lane) => lane,
            None if self.has_sendable() => Lane::Sendable,
            None if self.fallback.is_some() => Lane::Fallback,
            None => return Step::Result(None),
        };

        let step = match (lane, &mut self.fallback) {
            (Lane::Sendable, _) => self.sendable.advance(outcome),
            (Lane::Fallback, Some(fallback)) => fallback.advance(outcome),
            (Lane::Fallback, None) => return Step::Result(None),
        };

        match step {
            step @ Step::Effect(_) => {
                self.driving = Some(lane);
                step
            }
            Step::Result(result) => {
                self.driving = None;
                if lane == Lane::Sendable {
                    if let Some(tagged) = &result {
                        self.sendable
                            .indexed_mut()
                            .allowed_mut()
                            .remove(&tagged.index);
                    }
                }
                Step::Result(result)
            }
        }
    }
}
