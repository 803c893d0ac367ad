//! Virtual-clock timer queue. Nothing fires on its own: the dispatcher moves
//! the clock forward and delivers due timers as events, earliest first.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer was scheduled for. Components match on their own purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    NavInitialHighlight,
    NavScrollDebounce,
    NavSafety,
    NavPostScroll,
    DrawerResize,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due: u64,
    interval: Option<u64>,
    purpose: TimerPurpose,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the page loaded.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_ms: u64, purpose: TimerPurpose) -> TimerId {
        self.insert(delay_ms, None, purpose)
    }

    /// Repeating timer; an interval of 0 is treated as 1ms.
    pub fn schedule_interval(&mut self, every_ms: u64, purpose: TimerPurpose) -> TimerId {
        let every = every_ms.max(1);
        self.insert(every, Some(every), purpose)
    }

    fn insert(&mut self, delay_ms: u64, interval: Option<u64>, purpose: TimerPurpose) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer {
            id,
            due: self.now + delay_ms,
            interval,
            purpose,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Ties go to the timer scheduled first. Interval timers
    /// are re-armed.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, TimerPurpose)> {
        let pos = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let (id, due, interval, purpose) = {
            let t = &self.timers[pos];
            (t.id, t.due, t.interval, t.purpose)
        };
        self.now = self.now.max(due);
        match interval {
            Some(every) => self.timers[pos].due += every,
            None => {
                self.timers.remove(pos);
            }
        }
        Some((id, purpose))
    }

    /// Move the clock forward without firing anything.
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }
}
