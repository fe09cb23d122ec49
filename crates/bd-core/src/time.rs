//! Simulation time model.
//!
//! # Design
//!
//! Time is an integer count of microseconds (`SimTime`).  A run advances it by
//! a fixed step `dt` (also in microseconds), so a million steps land on
//! exactly `1_000_000 * dt` with no floating-point drift.  Blocks that need
//! continuous-time formulas read the derived `dt_sec` constant or
//! [`SimClock::secs`].
//!
//! The coarser sync step drives `compute_sync`: the clock keeps a target
//! checkpoint that moves forward by whole sync steps, and the executor ticks
//! until `now` reaches it.

use std::fmt;

/// Sub-second resolution of [`SimTime`]: one tick is one microsecond.
pub const TICKS_PER_SEC: u64 = 1_000_000;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation time in microseconds since the start of the run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    /// Last representable instant.  Time arithmetic saturates here.
    pub const MAX: SimTime = SimTime(u64::MAX);

    /// Build from seconds, rounding to the nearest microsecond.
    pub fn from_secs(secs: f64) -> SimTime {
        SimTime((secs * TICKS_PER_SEC as f64).round() as u64)
    }

    /// The time `n` microseconds after `self`, clamped to [`SimTime::MAX`].
    #[inline]
    pub fn offset(self, n: u64) -> SimTime {
        SimTime(self.0.saturating_add(n))
    }

    /// Microseconds elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0 - earlier.0
    }

    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0 as f64 / TICKS_PER_SEC as f64
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        self.offset(rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: SimTime) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.as_secs())
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Fixed-step clock owned by a scheme.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimClock {
    /// Step length in microseconds.  Always non-zero.
    pub dt: u64,
    /// `dt` in seconds, exposed to blocks.
    pub dt_sec: f64,
    /// Sync step length in microseconds.  Always non-zero.
    pub sync_step: u64,
    /// The current time, advanced by `dt` per step.
    pub now: SimTime,
    /// Checkpoint that `compute_sync` drives `now` towards.
    pub sync_target: SimTime,
    /// Steps executed since the last reset.
    pub steps: u64,
}

impl SimClock {
    /// Create a clock at time zero.  Callers validate that both lengths are
    /// non-zero (see [`EngineConfig::make_clock`][crate::EngineConfig::make_clock]).
    pub fn new(dt: u64, sync_step: u64) -> Self {
        Self {
            dt,
            dt_sec: dt as f64 / TICKS_PER_SEC as f64,
            sync_step,
            now: SimTime::ZERO,
            sync_target: SimTime::ZERO,
            steps: 0,
        }
    }

    /// Advance by one step and return the new time.
    #[inline]
    pub fn advance(&mut self) -> SimTime {
        self.now = self.now + self.dt;
        self.steps += 1;
        self.now
    }

    /// Elapsed simulated seconds.
    #[inline]
    pub fn secs(&self) -> f64 {
        self.now.as_secs()
    }

    /// Move the sync checkpoint forward by `sync_steps` whole sync steps.
    /// A request past the end of representable time stops at
    /// [`SimTime::MAX`].
    pub fn extend_sync(&mut self, sync_steps: u64) -> SimTime {
        let span = sync_steps.saturating_mul(self.sync_step);
        self.sync_target = self.sync_target.offset(span);
        self.sync_target
    }

    /// `true` while `now` has not yet reached the sync checkpoint.
    #[inline]
    pub fn behind_sync(&self) -> bool {
        self.now < self.sync_target
    }

    /// Return to time zero, keeping the step lengths.
    pub fn reset(&mut self) {
        self.now = SimTime::ZERO;
        self.sync_target = SimTime::ZERO;
        self.steps = 0;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (step {})", self.now, self.steps)
    }
}
