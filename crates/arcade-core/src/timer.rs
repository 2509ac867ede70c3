use std::time::Duration;

/// Shortest allowed period for a repeating timer.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle for a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<K> {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    key: K,
}

/// Per-game timer set running on a virtual clock.
///
/// A game owns its `Timers`; dropping the game drops every pending timer, so
/// nothing can fire into a torn-down game. Timers deliver keys instead of
/// closures: the owner matches on the key and reads its own current state.
///
/// Drive it with [`Timers::deadline`] and [`Timers::pop_due`]:
///
/// ```
/// # use std::time::Duration;
/// # use arcade_core::timer::Timers;
/// let mut timers = Timers::new();
/// timers.after(Duration::from_millis(500), "blink");
/// let deadline = timers.deadline(Duration::from_secs(1));
/// let mut fired = Vec::new();
/// while let Some(key) = timers.pop_due(deadline) {
///     fired.push(key);
/// }
/// assert_eq!(fired, vec!["blink"]);
/// ```
#[derive(Debug)]
pub struct Timers<K> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<K>>,
}

impl<K: Clone> Timers<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Elapsed virtual time since the timer set was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `key` once, `delay` from now.
    pub fn after(&mut self, delay: Duration, key: K) -> TimerId {
        self.insert(self.now.saturating_add(delay), None, key)
    }

    /// Fire `key` every `period`, first at `now + period`.
    pub fn every(&mut self, period: Duration, key: K) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(self.now.saturating_add(period), Some(period), key)
    }

    fn insert(&mut self, due: Duration, period: Option<Duration>, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due,
            period,
            key,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every timer scheduled with `key`. Returns how many were removed.
    pub fn cancel_key(&mut self, key: &K) -> usize
    where
        K: PartialEq,
    {
        let before = self.entries.len();
        self.entries.retain(|e| &e.key != key);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// The virtual instant `dt` from now, for use with [`Timers::pop_due`].
    /// Saturates at `Duration::MAX`.
    pub fn deadline(&self, dt: Duration) -> Duration {
        self.now.saturating_add(dt)
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock to
    /// its due time. When nothing is left the clock settles on `deadline` and
    /// `None` is returned.
    ///
    /// Timers scheduled or cancelled between calls take effect immediately,
    /// so a handler can cancel a timer that would otherwise fire later in the
    /// same frame.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<K> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= deadline)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now = self.now.max(deadline);
            return None;
        };

        let (due, period, key) = {
            let entry = &self.entries[idx];
            (entry.due, entry.period, entry.key.clone())
        };
        self.now = self.now.max(due);
        // A repeating timer that would re-arm past the end of time is retired.
        match period.and_then(|p| due.checked_add(p)) {
            Some(next) => self.entries[idx].due = next,
            None => {
                self.entries.swap_remove(idx);
            },
        }
        Some(key)
    }

    /// Advance by `dt`, collecting every fired key in order.
    ///
    /// Only suitable when handlers do not schedule or cancel timers; games
    /// normally loop over [`Timers::pop_due`] instead.
    pub fn advance(&mut self, dt: Duration) -> Vec<K> {
        let deadline = self.deadline(dt);
        let mut fired = Vec::new();
        while let Some(key) = self.pop_due(deadline) {
            fired.push(key);
        }
        fired
    }
}

impl<K: Clone> Default for Timers<K> {
    fn default() -> Self {
        Self::new()
    }
}
