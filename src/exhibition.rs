use crate::scene::OverlayClass;
use crate::scheduler::{Deadline, FrameWait, TimeMs, FADE_STEP_MS};

/// Horizontal travel a touch gesture must exceed to count as a swipe.
pub const SWIPE_MIN_DISTANCE_PX: f64 = 50.0;
/// A swipe must complete within this window.
pub const SWIPE_MAX_DURATION_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    /// Class tagged onto the outgoing overlay.
    pub fn exit_class(self) -> OverlayClass {
        match self {
            Direction::Prev => OverlayClass::ExitLeft,
            Direction::Next => OverlayClass::ExitRight,
        }
    }

    /// Class tagged onto the incoming overlay (opposite side).
    pub fn enter_class(self) -> OverlayClass {
        match self {
            Direction::Prev => OverlayClass::EnterRight,
            Direction::Next => OverlayClass::EnterLeft,
        }
    }
}

/// Side effects the widget applies to the stage as a slide progresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlideEffect {
    /// Tag the current overlay with a directional exit class.
    SetExitClass(OverlayClass),
    /// Index has advanced; remount the overlay for the new artwork with the
    /// directional enter class.
    Remount {
        artwork_id: String,
        enter_class: OverlayClass,
    },
    /// Strip the enter class; the overlay slides to rest.
    SetVisible,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Exiting { deadline: Deadline, dir: Direction },
    Entering { frames: FrameWait },
    Settling { deadline: Deadline },
}

/// Steps through an ordered sequence of artworks with wraparound and a
/// directional slide animation: `Idle -> Exiting -> Entering -> Settling ->
/// Idle`. Navigation requests during an animation are dropped silently.
#[derive(Debug)]
pub struct Exhibition {
    artworks: Vec<String>,
    index: usize,
    phase: Phase,
}

impl Exhibition {
    /// `artworks` is the curated order; `index` starts at the first entry.
    pub fn new(artworks: Vec<String>) -> Self {
        Self::starting_at(artworks, 0)
    }

    /// Start at a given position (wrapped into range) instead of the head.
    pub fn starting_at(artworks: Vec<String>, index: usize) -> Self {
        let index = if artworks.is_empty() {
            0
        } else {
            index % artworks.len()
        };
        Self {
            artworks,
            index,
            phase: Phase::Idle,
        }
    }

    pub fn len(&self) -> usize {
        self.artworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&str> {
        self.artworks.get(self.index).map(String::as_str)
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    fn target_index(&self, dir: Direction) -> usize {
        let n = self.artworks.len();
        match dir {
            Direction::Next => (self.index + 1) % n,
            Direction::Prev => (self.index + n - 1) % n,
        }
    }

    /// Request a step. Returns the exit effect if accepted; `None` when a
    /// slide is already in flight or there is nothing to step to.
    pub fn navigate(&mut self, dir: Direction, now: TimeMs) -> Option<SlideEffect> {
        if self.artworks.len() < 2 || self.is_animating() {
            return None;
        }
        self.phase = Phase::Exiting {
            deadline: Deadline::after(now, FADE_STEP_MS),
            dir,
        };
        Some(SlideEffect::SetExitClass(dir.exit_class()))
    }

    /// Timer tick. The index updates synchronously with the remount, never
    /// before.
    pub fn advance(&mut self, now: TimeMs) -> Option<SlideEffect> {
        match &self.phase {
            Phase::Exiting { deadline, dir } if deadline.is_due(now) => {
                let dir = *dir;
                self.index = self.target_index(dir);
                self.phase = Phase::Entering {
                    frames: FrameWait::two(),
                };
                Some(SlideEffect::Remount {
                    artwork_id: self.artworks[self.index].clone(),
                    enter_class: dir.enter_class(),
                })
            }
            Phase::Settling { deadline } if deadline.is_due(now) => {
                self.phase = Phase::Idle;
                None
            }
            _ => None,
        }
    }

    /// Animation-frame tick. Two ticks after the remount guarantee the enter
    /// class painted before it is stripped, so the slide actually animates.
    pub fn animation_frame(&mut self, now: TimeMs) -> Option<SlideEffect> {
        match &mut self.phase {
            Phase::Entering { frames } => {
                if frames.tick() {
                    self.phase = Phase::Settling {
                        deadline: Deadline::after(now, FADE_STEP_MS),
                    };
                    Some(SlideEffect::SetVisible)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Keyboard keys the exhibition responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
}

impl NavKey {
    pub fn direction(self) -> Direction {
        match self {
            NavKey::ArrowLeft => Direction::Prev,
            NavKey::ArrowRight => Direction::Next,
        }
    }
}

/// Resolves touch start/end pairs into swipe directions. A leftward swipe
/// advances (the content moves left, revealing the next artwork).
#[derive(Clone, Copy, Debug, Default)]
pub struct SwipeDetector {
    start: Option<(f64, TimeMs)>,
}

impl SwipeDetector {
    pub fn touch_start(&mut self, x: f64, now: TimeMs) {
        self.start = Some((x, now));
    }

    pub fn touch_end(&mut self, x: f64, now: TimeMs) -> Option<Direction> {
        let (start_x, start_t) = self.start.take()?;
        if now.0.saturating_sub(start_t.0) > SWIPE_MAX_DURATION_MS {
            return None;
        }
        // Travel must strictly exceed the threshold; exactly 50px is not a swipe.
        let dx = x - start_x;
        if dx < -SWIPE_MIN_DISTANCE_PX {
            Some(Direction::Next)
        } else if dx > SWIPE_MIN_DISTANCE_PX {
            Some(Direction::Prev)
        } else {
            None
        }
    }

    pub fn touch_cancel(&mut self) {
        self.start = None;
    }
}
