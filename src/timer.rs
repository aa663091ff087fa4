use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// The timer turns amber after five minutes.
pub const WARNING_AFTER_SECS: u64 = 300;
/// The session locks after six minutes.
pub const TIMEOUT_AFTER_SECS: u64 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Warning,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTransition {
    Warning,
    TimedOut,
}

/// Elapsed-time state machine for one quiz session, advanced by whole-second
/// ticks. Warning and timeout each fire exactly once per session; there is no
/// pause or rewind, only `start` which zeroes the clock.
#[derive(Debug)]
pub struct SessionTimer {
    elapsed_secs: u64,
    phase: TimerPhase,
    force_submitted: bool,
}

impl SessionTimer {
    pub fn new() -> Self {
        SessionTimer {
            elapsed_secs: 0,
            phase: TimerPhase::Idle,
            force_submitted: false,
        }
    }

    /// Begins a session, discarding any previous one.
    pub fn start(&mut self) {
        self.elapsed_secs = 0;
        self.phase = TimerPhase::Running;
        self.force_submitted = false;
    }

    /// Advances the clock by one second and reports the transition crossed,
    /// if any. Ticks in `Idle` do nothing; ticks after `TimedOut` keep the
    /// displayed time moving but can never fire a second transition.
    pub fn tick(&mut self) -> Option<TimerTransition> {
        if self.phase == TimerPhase::Idle {
            return None;
        }

        self.elapsed_secs += 1;
        match self.phase {
            TimerPhase::Running | TimerPhase::Warning
                if self.elapsed_secs >= TIMEOUT_AFTER_SECS =>
            {
                self.phase = TimerPhase::TimedOut;
                Some(TimerTransition::TimedOut)
            }
            TimerPhase::Running if self.elapsed_secs >= WARNING_AFTER_SECS => {
                self.phase = TimerPhase::Warning;
                Some(TimerTransition::Warning)
            }
            _ => None,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Elapsed time as `MM:SS`.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }

    /// Whether answer fields should reject further input.
    pub fn input_locked(&self) -> bool {
        self.phase == TimerPhase::TimedOut
    }

    /// Whether a manual submission is still allowed.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, TimerPhase::Running | TimerPhase::Warning)
    }

    /// Claims the forced-submission path after a timeout. Returns true only
    /// on the first claim, so a double-fired handler cannot submit twice.
    pub fn try_force_submit(&mut self) -> bool {
        if self.phase == TimerPhase::TimedOut && !self.force_submitted {
            self.force_submitted = true;
            true
        } else {
            false
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        SessionTimer::new()
    }
}

/// Once-per-second driver for a shared [`SessionTimer`]. Transitions are
/// forwarded over a channel to whoever owns the session; `stop` cancels the
/// tick loop and must be called on every exit path from a session.
pub struct TimerTicker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TimerTicker {
    pub fn spawn(
        timer: Arc<Mutex<SessionTimer>>,
        events: mpsc::UnboundedSender<TimerTransition>,
    ) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticks = interval(Duration::from_secs(1));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval resolves immediately.
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        let transition = timer.lock().unwrap().tick();
                        if let Some(transition) = transition {
                            if events.send(transition).is_err() {
                                break;
                            }
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        });
        TimerTicker { stop_tx, handle }
    }

    /// Cancels the tick loop and waits for the driver task to wind down.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.handle.await;
    }
}
