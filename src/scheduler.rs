/// Host-supplied monotonic time in milliseconds. The engine never reads a wall
/// clock; every timed transition is advanced by the host (or a test) passing
/// the current time in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub fn plus(self, ms: u64) -> TimeMs {
        TimeMs(self.0.saturating_add(ms))
    }
}

/// Duration of one fade step (overlay fade in/out, room crossfade, slide
/// exit/enter). Stands in for the CSS transition the visual layer plays.
pub const FADE_STEP_MS: u64 = 150;

/// A fixed-deadline wait. Due once the host clock reaches the deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline(pub TimeMs);

impl Deadline {
    pub fn after(now: TimeMs, ms: u64) -> Self {
        Self(now.plus(ms))
    }

    pub fn is_due(self, now: TimeMs) -> bool {
        now >= self.0
    }
}

/// Counts down animation-frame ticks. Two ticks guarantee a layout pass has
/// happened before a visibility class is toggled back on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameWait {
    remaining: u8,
}

impl FrameWait {
    pub fn two() -> Self {
        Self { remaining: 2 }
    }

    /// Consume one tick; returns true once the wait has elapsed.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}
