//! Cancellable one-shot timers on a frame clock.
//!
//! Deadlines are absolute frame numbers on whatever clock the owner advances
//! (for a voice, its audio context). Nothing fires by itself: the owner calls
//! [`TimerQueue::pop_due`] after moving the clock forward and handles each
//! expired payload in turn.

/// Handle returned by [`TimerQueue::schedule`], used to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    deadline: u64,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    // sorted by deadline, then by scheduling order
    pending: Vec<Pending<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Arm a timer that expires once the clock reaches `deadline`.
    pub fn schedule(&mut self, deadline: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let idx = self.pending.partition_point(|p| p.deadline <= deadline);
        self.pending.insert(
            idx,
            Pending {
                id,
                deadline,
                payload,
            },
        );
        id
    }

    /// Disarm a timer. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let idx = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.remove(idx).payload)
    }

    /// Remove and return the earliest timer whose deadline is at or before
    /// `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, T)> {
        if self.pending.first()?.deadline > now {
            return None;
        }
        let expired = self.pending.remove(0);
        Some((expired.id, expired.payload))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
