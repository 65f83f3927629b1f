/// What a fired deadline asks the battle to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineKind {
    /// The per-snippet countdown expired: the enemy attacks.
    EnemyAttack,
    /// The mistake penalty window is over: unlock input.
    Unlock,
    /// The snippet-complete presentation delay is over: advance a level.
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub kind: DeadlineKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    kind: DeadlineKind,
    remaining_ms: u64,
    generation: u64,
}

impl Deadline {
    fn advance(&mut self, elapsed_ms: u64) -> bool {
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        self.remaining_ms == 0
    }

    fn fired(&self) -> Fired {
        Fired {
            kind: self.kind,
            generation: self.generation,
        }
    }
}

/// Owns zero-or-one live countdown plus the fixed deferred actions. All
/// deadlines advance on event-loop ticks; wall-clock time is never read.
/// Every deadline carries the session generation it was scheduled against
/// so the battle can drop stale ones.
#[derive(Debug)]
pub struct TimerController {
    // false in practice mode: scheduling a countdown becomes a no-op
    armed: bool,
    countdown: Option<Deadline>,
    delays: Vec<Deadline>,
}

impl TimerController {
    pub fn new(armed: bool) -> Self {
        Self {
            armed,
            countdown: None,
            delays: Vec::new(),
        }
    }

    /// Installs the per-snippet countdown, cancelling any previous one
    /// first. The single-countdown invariant holds by construction. No-op
    /// when not armed (practice mode).
    pub fn schedule_countdown(&mut self, seconds: u64, generation: u64) {
        self.cancel_countdown();
        if !self.armed {
            return;
        }
        self.countdown = Some(Deadline {
            kind: DeadlineKind::EnemyAttack,
            remaining_ms: seconds * 1000,
            generation,
        });
    }

    /// Idempotent.
    pub fn cancel_countdown(&mut self) {
        self.countdown = None;
    }

    pub fn schedule_delay(&mut self, kind: DeadlineKind, ms: u64, generation: u64) {
        self.delays.push(Deadline {
            kind,
            remaining_ms: ms,
            generation,
        });
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    /// Seconds left on the live countdown, for the HUD.
    pub fn remaining_secs(&self) -> Option<f64> {
        self.countdown.map(|d| d.remaining_ms as f64 / 1000.0)
    }

    /// Drops every outstanding deadline.
    pub fn clear(&mut self) {
        self.countdown = None;
        self.delays.clear();
    }

    /// Advances all deadlines by `elapsed_ms` and returns the ones that
    /// fired, countdown first. Fired deadlines are removed.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<Fired> {
        let mut fired = Vec::new();

        if let Some(ref mut countdown) = self.countdown {
            if countdown.advance(elapsed_ms) {
                fired.push(countdown.fired());
                self.countdown = None;
            }
        }

        let mut pending = Vec::new();
        for mut delay in self.delays.drain(..) {
            if delay.advance(elapsed_ms) {
                fired.push(delay.fired());
            } else {
                pending.push(delay);
            }
        }
        self.delays = pending;

        fired
    }
}
