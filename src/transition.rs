use tracing::warn;

use crate::{
    assets::LoadOutcome,
    model::RoomScene,
    scheduler::{Deadline, FrameWait, TimeMs, FADE_STEP_MS},
};

/// Side effects the widget applies to the stage as the crossfade progresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomFadeEffect {
    /// Drop the current background to opacity 0.
    SetTransitioning,
    /// Begin loading the new background in parallel with the fade timer.
    StartImageLoad { source: String },
    /// Swap the visible background source (even if the load failed).
    SwapBackground { source: String },
    /// Fade-in may re-enable; layout is guaranteed to have run.
    ClearTransitioning,
    /// Rebuild the overlay against the new scene.
    RebuildOverlay { room_id: String },
}

#[derive(Debug)]
enum Phase {
    Idle,
    FadingOut {
        deadline: Deadline,
        load: Option<LoadOutcome>,
        room_id: String,
        source: String,
    },
    Swapping {
        frames: FrameWait,
        room_id: String,
    },
}

/// Crossfades the background when the room selection changes:
/// `Idle -> FadingOut -> Swapping -> Idle`. The fade-out completes only when
/// both the 150ms timer and the image load have settled; a failed load still
/// swaps the broken source in (tolerated degraded state).
#[derive(Debug)]
pub struct RoomTransition {
    phase: Phase,
}

impl Default for RoomTransition {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomTransition {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Start a crossfade to `room`. A transition already in flight is replaced
    /// wholesale; the old one's pending swap never lands.
    pub fn begin(&mut self, room: &RoomScene, now: TimeMs) -> Vec<RoomFadeEffect> {
        self.phase = Phase::FadingOut {
            deadline: Deadline::after(now, FADE_STEP_MS),
            load: None,
            room_id: room.id.clone(),
            source: room.background.clone(),
        };
        vec![
            RoomFadeEffect::SetTransitioning,
            RoomFadeEffect::StartImageLoad {
                source: room.background.clone(),
            },
        ]
    }

    /// The parallel image load finished (either way).
    pub fn image_settled(&mut self, outcome: LoadOutcome) {
        if let Phase::FadingOut { load, source, .. } = &mut self.phase {
            if outcome == LoadOutcome::Failed {
                warn!(source = %source, "room background failed to load; swapping anyway");
            }
            *load = Some(outcome);
        }
    }

    /// Timer tick. Call whenever the host clock advances.
    pub fn advance(&mut self, now: TimeMs) -> Vec<RoomFadeEffect> {
        match &self.phase {
            Phase::FadingOut {
                deadline,
                load,
                room_id,
                source,
            } if deadline.is_due(now) && load.is_some() => {
                let effects = vec![RoomFadeEffect::SwapBackground {
                    source: source.clone(),
                }];
                self.phase = Phase::Swapping {
                    frames: FrameWait::two(),
                    room_id: room_id.clone(),
                };
                effects
            }
            _ => Vec::new(),
        }
    }

    /// Animation-frame tick. Two ticks after the swap guarantee a layout pass
    /// before the background becomes visible again.
    pub fn animation_frame(&mut self) -> Vec<RoomFadeEffect> {
        match &mut self.phase {
            Phase::Swapping { frames, room_id } => {
                if frames.tick() {
                    let effects = vec![
                        RoomFadeEffect::ClearTransitioning,
                        RoomFadeEffect::RebuildOverlay {
                            room_id: room_id.clone(),
                        },
                    ];
                    self.phase = Phase::Idle;
                    effects
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }
}
