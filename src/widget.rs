use kurbo::{Point, Rect};
use tracing::debug;

use crate::{
    assets::{ImageStore, LoadOutcome},
    drag::{ClampPolicy, DragController, PointerKind},
    error::{RoomVibeError, RoomVibeResult},
    events::{AnalyticsEvent, EventKind, EventSink},
    exhibition::{Direction, Exhibition, NavKey, SlideEffect, SwipeDetector},
    export::{self, ExportOptions},
    geometry::{NormPoint, ScaleFactor},
    model::{Catalog, Entitlements, FrameStyle},
    scheduler::TimeMs,
    scene::{OverlayClass, Placement, Stage},
    share::SharePlacement,
    transition::{RoomFadeEffect, RoomTransition},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct WidgetConfig {
    pub scale: ScaleFactor,
    pub clamp_policy: ClampPolicy,
    pub entitlements: Entitlements,
}

/// Top-level controller: owns the catalog, the stage, the gesture and
/// transition state machines, and the host's event sink. All time comes in
/// through method arguments; the widget never reads a clock.
pub struct Widget<S: EventSink> {
    catalog: Catalog,
    config: WidgetConfig,
    stage: Stage,
    drag: DragController,
    transition: RoomTransition,
    exhibition: Option<Exhibition>,
    swipe: SwipeDetector,
    placement: Placement,
    sink: S,
}

impl<S: EventSink> Widget<S> {
    /// Build the widget with the catalog's first artwork placed centered in
    /// its first room, unframed.
    pub fn new(
        catalog: Catalog,
        config: WidgetConfig,
        container: Rect,
        sink: S,
        now: TimeMs,
    ) -> RoomVibeResult<Self> {
        catalog.validate()?;
        let placement = Placement {
            artwork_id: catalog.artworks[0].id.clone(),
            room_id: catalog.rooms[0].id.clone(),
            frame: FrameStyle::None,
            center: NormPoint::CENTER,
            scale: config.scale,
        };
        Self::with_placement(catalog, config, container, placement, sink, now)
    }

    /// Restore a view from a share link. Unknown ids are a validation error,
    /// not a silent fallback.
    pub fn from_share(
        catalog: Catalog,
        config: WidgetConfig,
        container: Rect,
        share: &SharePlacement,
        sink: S,
        now: TimeMs,
    ) -> RoomVibeResult<Self> {
        catalog.validate()?;
        catalog
            .artwork(&share.artwork_id)
            .ok_or_else(|| RoomVibeError::validation(format!("unknown artwork '{}'", share.artwork_id)))?;
        catalog
            .room(&share.room_id)
            .ok_or_else(|| RoomVibeError::validation(format!("unknown room '{}'", share.room_id)))?;
        let placement = Placement {
            artwork_id: share.artwork_id.clone(),
            room_id: share.room_id.clone(),
            frame: share.frame,
            center: share.center,
            scale: config.scale,
        };
        Self::with_placement(catalog, config, container, placement, sink, now)
    }

    fn with_placement(
        catalog: Catalog,
        config: WidgetConfig,
        container: Rect,
        placement: Placement,
        mut sink: S,
        now: TimeMs,
    ) -> RoomVibeResult<Self> {
        let mut stage = Stage::new(container)?;
        let room = catalog
            .room(&placement.room_id)
            .ok_or_else(|| RoomVibeError::validation("placement references unknown room"))?;
        stage.set_background(room);
        let artwork = catalog
            .artwork(&placement.artwork_id)
            .ok_or_else(|| RoomVibeError::validation("placement references unknown artwork"))?;
        stage.mount_overlay(artwork, &placement, OverlayClass::FadeIn)?;

        sink.emit(
            AnalyticsEvent::new(EventKind::RvView, now)
                .with("artId", placement.artwork_id.as_str())
                .with("roomId", placement.room_id.as_str()),
        );

        Ok(Self {
            catalog,
            config,
            stage,
            drag: DragController::new(config.clamp_policy),
            transition: RoomTransition::new(),
            exhibition: None,
            swipe: SwipeDetector::default(),
            placement,
            sink,
        })
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    // --- selection -------------------------------------------------------

    /// Switch artwork. The placement is replaced wholesale and the new
    /// overlay re-centers.
    pub fn select_artwork(&mut self, id: &str, now: TimeMs) -> RoomVibeResult<()> {
        let artwork = self
            .catalog
            .artwork(id)
            .ok_or_else(|| RoomVibeError::validation(format!("unknown artwork '{id}'")))?
            .clone();
        self.placement = Placement {
            artwork_id: artwork.id.clone(),
            center: NormPoint::CENTER,
            ..self.placement.clone()
        };
        self.stage
            .mount_overlay(&artwork, &self.placement, OverlayClass::FadeIn)?;
        self.sink
            .emit(AnalyticsEvent::new(EventKind::RvArtSelect, now).with("artId", id));
        Ok(())
    }

    /// Switch room: kicks off the background crossfade. The overlay rebuild
    /// happens when the transition settles, not here.
    pub fn select_room(&mut self, id: &str, now: TimeMs) -> RoomVibeResult<()> {
        let room = self
            .catalog
            .room(id)
            .ok_or_else(|| RoomVibeError::validation(format!("unknown room '{id}'")))?
            .clone();
        self.placement = Placement {
            room_id: room.id.clone(),
            ..self.placement.clone()
        };
        let effects = self.transition.begin(&room, now);
        self.apply_room_effects(effects)?;
        self.sink
            .emit(AnalyticsEvent::new(EventKind::RvRoomChange, now).with("roomId", id));
        Ok(())
    }

    pub fn select_frame(&mut self, frame: FrameStyle, now: TimeMs) -> RoomVibeResult<()> {
        self.placement = Placement {
            frame,
            ..self.placement.clone()
        };
        let artwork = self
            .catalog
            .artwork(&self.placement.artwork_id)
            .ok_or_else(|| RoomVibeError::validation("placement references unknown artwork"))?
            .clone();
        self.stage
            .mount_overlay(&artwork, &self.placement, OverlayClass::Visible)?;
        self.sink
            .emit(AnalyticsEvent::new(EventKind::RvFrameChange, now).with("frame", frame.as_str()));
        Ok(())
    }

    // --- drag ------------------------------------------------------------

    /// Pointer landed. Starts a gesture only when the hit is on the overlay.
    pub fn pointer_down(&mut self, kind: PointerKind, point: Point) {
        if let Some(overlay) = self.stage.overlay() {
            if overlay.rect.contains(point) {
                self.drag
                    .pointer_down(kind, point, overlay.rect.origin());
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point) -> RoomVibeResult<()> {
        let Some(overlay_id) = self.stage.overlay_id() else {
            return Ok(());
        };
        let size = match self.stage.overlay() {
            Some(node) => node.rect.size(),
            None => return Ok(()),
        };
        if let Some(update) = self.drag.pointer_move(point, self.stage.container(), size) {
            self.stage.move_overlay_to(overlay_id, update.left, update.top)?;
        }
        Ok(())
    }

    /// Gesture ended. A resolved drag folds the overlay's final position back
    /// into the placement as a normalized center.
    pub fn pointer_up(&mut self, now: TimeMs) -> RoomVibeResult<()> {
        if self.drag.pointer_up().is_none() {
            return Ok(());
        }
        if let Some(center) = self.stage.overlay_center()? {
            self.placement.center = center;
            self.sink.emit(
                AnalyticsEvent::new(EventKind::RvDragEnd, now)
                    .with("cx", center.x)
                    .with("cy", center.y),
            );
        }
        Ok(())
    }

    pub fn pointer_cancel(&mut self) {
        self.drag.pointer_cancel();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    // --- exhibition ------------------------------------------------------

    /// Enter slideshow mode over the whole catalog, starting from the
    /// currently selected artwork.
    pub fn enter_exhibition(&mut self) {
        let ids: Vec<String> = self.catalog.artworks.iter().map(|a| a.id.clone()).collect();
        let start = ids
            .iter()
            .position(|id| *id == self.placement.artwork_id)
            .unwrap_or(0);
        self.exhibition = Some(Exhibition::starting_at(ids, start));
    }

    pub fn exit_exhibition(&mut self) {
        self.exhibition = None;
    }

    pub fn exhibition(&self) -> Option<&Exhibition> {
        self.exhibition.as_ref()
    }

    /// Step the slideshow. Dropped silently while a slide is in flight.
    pub fn navigate(&mut self, dir: Direction, now: TimeMs) -> RoomVibeResult<()> {
        let Some(ex) = self.exhibition.as_mut() else {
            return Ok(());
        };
        let Some(effect) = ex.navigate(dir, now) else {
            debug!("navigation dropped (animating or singleton)");
            return Ok(());
        };
        let index = ex.index();
        self.apply_slide_effect(effect)?;
        self.sink.emit(
            AnalyticsEvent::new(EventKind::RvNavigate, now)
                .with("direction", match dir {
                    Direction::Prev => "prev",
                    Direction::Next => "next",
                })
                .with("index", index as u64),
        );
        Ok(())
    }

    pub fn key(&mut self, key: NavKey, now: TimeMs) -> RoomVibeResult<()> {
        self.navigate(key.direction(), now)
    }

    pub fn touch_start(&mut self, x: f64, now: TimeMs) {
        self.swipe.touch_start(x, now);
    }

    pub fn touch_end(&mut self, x: f64, now: TimeMs) -> RoomVibeResult<()> {
        if let Some(dir) = self.swipe.touch_end(x, now) {
            self.navigate(dir, now)?;
        }
        Ok(())
    }

    // --- scheduling ------------------------------------------------------

    /// The in-flight background load settled.
    pub fn background_load_settled(&mut self, outcome: LoadOutcome) {
        self.transition.image_settled(outcome);
    }

    /// Host timer tick: advances whatever state machines have due deadlines.
    pub fn advance(&mut self, now: TimeMs) -> RoomVibeResult<()> {
        let effects = self.transition.advance(now);
        self.apply_room_effects(effects)?;
        if let Some(ex) = self.exhibition.as_mut() {
            if let Some(effect) = ex.advance(now) {
                self.apply_slide_effect(effect)?;
            }
        }
        Ok(())
    }

    /// Host animation-frame tick.
    pub fn animation_frame(&mut self, now: TimeMs) -> RoomVibeResult<()> {
        let effects = self.transition.animation_frame();
        self.apply_room_effects(effects)?;
        if let Some(ex) = self.exhibition.as_mut() {
            if let Some(effect) = ex.animation_frame(now) {
                self.apply_slide_effect(effect)?;
            }
        }
        Ok(())
    }

    fn apply_room_effects(&mut self, effects: Vec<RoomFadeEffect>) -> RoomVibeResult<()> {
        for effect in effects {
            match effect {
                RoomFadeEffect::SetTransitioning => {
                    self.stage.set_background_transitioning(true);
                }
                RoomFadeEffect::StartImageLoad { .. } => {
                    // Loading is the host's side; it reports back through
                    // background_load_settled().
                }
                RoomFadeEffect::SwapBackground { source } => {
                    self.stage.swap_background_image(&source)?;
                }
                RoomFadeEffect::ClearTransitioning => {
                    self.stage.set_background_transitioning(false);
                }
                RoomFadeEffect::RebuildOverlay { .. } => {
                    let artwork = self
                        .catalog
                        .artwork(&self.placement.artwork_id)
                        .ok_or_else(|| {
                            RoomVibeError::validation("placement references unknown artwork")
                        })?
                        .clone();
                    self.stage
                        .mount_overlay(&artwork, &self.placement, OverlayClass::FadeIn)?;
                }
            }
        }
        Ok(())
    }

    fn apply_slide_effect(&mut self, effect: SlideEffect) -> RoomVibeResult<()> {
        match effect {
            SlideEffect::SetExitClass(class) => {
                if let Some(id) = self.stage.overlay_id() {
                    self.stage.set_overlay_class(id, class)?;
                }
            }
            SlideEffect::Remount {
                artwork_id,
                enter_class,
            } => {
                let artwork = self
                    .catalog
                    .artwork(&artwork_id)
                    .ok_or_else(|| {
                        RoomVibeError::validation(format!("unknown artwork '{artwork_id}'"))
                    })?
                    .clone();
                self.placement = Placement {
                    artwork_id: artwork.id.clone(),
                    center: NormPoint::CENTER,
                    ..self.placement.clone()
                };
                self.stage
                    .mount_overlay(&artwork, &self.placement, enter_class)?;
            }
            SlideEffect::SetVisible => {
                if let Some(id) = self.stage.overlay_id() {
                    self.stage.set_overlay_class(id, OverlayClass::Visible)?;
                }
            }
        }
        Ok(())
    }

    // --- export & share --------------------------------------------------

    /// Composite the current view to PNG bytes plus a download filename.
    pub fn export(
        &mut self,
        store: &mut dyn ImageStore,
        high_res: bool,
        now: TimeMs,
    ) -> RoomVibeResult<(Vec<u8>, &'static str)> {
        let opts = ExportOptions {
            high_res,
            entitlements: self.config.entitlements,
        };
        let canvas = export::compose(&self.stage, store, &opts)?;
        let bytes = export::encode_png(&canvas)?;
        let filename = export::export_filename(high_res);
        self.sink.emit(
            AnalyticsEvent::new(EventKind::RvExport, now)
                .with("highRes", high_res)
                .with("filename", filename),
        );
        Ok((bytes, filename))
    }

    /// Snapshot the current placement for a share link, using the overlay's
    /// live center when one is mounted.
    pub fn share_placement(&self) -> RoomVibeResult<SharePlacement> {
        let center = self
            .stage
            .overlay_center()?
            .unwrap_or(self.placement.center)
            .validated()?;
        Ok(SharePlacement {
            room_id: self.placement.room_id.clone(),
            artwork_id: self.placement.artwork_id.clone(),
            frame: self.placement.frame,
            center,
        })
    }

    pub fn entitlements(&self) -> Entitlements {
        self.config.entitlements
    }

    /// The host's event sink, e.g. to drain a buffering sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
