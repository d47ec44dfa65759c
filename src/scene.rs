use kurbo::{Point, Rect};

use crate::{
    error::{RoomVibeError, RoomVibeResult},
    geometry::{self, NormPoint, ScaleFactor},
    model::{Artwork, FrameStyle, RoomScene},
};

/// Handle to a live visual node. Handles are never reused within a stage's
/// lifetime, so a stale handle simply stops resolving after a remount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
    Background,
    Overlay,
}

/// Visual transition class applied to the overlay node. Stand-in for the CSS
/// classes the embedding layer maps these to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayClass {
    FadeIn,
    #[default]
    Visible,
    FadeOut,
    EnterLeft,
    EnterRight,
    ExitLeft,
    ExitRight,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameBorder {
    pub width_px: f64,
    pub rgba: [u8; 4],
}

#[derive(Clone, Debug)]
pub struct VisualNode {
    pub id: NodeId,
    pub role: NodeRole,
    pub image: String,
    /// On-screen pixel rect, in the container's coordinate space.
    pub rect: Rect,
    pub class: OverlayClass,
    pub border: Option<FrameBorder>,
}

/// Derived placement for the current (artwork, room, frame) triple. Replaced
/// wholesale whenever any of its inputs change; never patched in place.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    pub artwork_id: String,
    pub room_id: String,
    pub frame: FrameStyle,
    pub center: NormPoint,
    pub scale: ScaleFactor,
}

/// Arena of live visual elements, keyed by role: one background slot and one
/// overlay slot. Ownership of the overlay is exclusive; remounting destroys
/// the previous node and mints a fresh handle.
#[derive(Debug)]
pub struct Stage {
    container: Rect,
    next_id: u32,
    background: Option<VisualNode>,
    overlay: Option<VisualNode>,
    background_transitioning: bool,
}

impl Stage {
    pub fn new(container: Rect) -> RoomVibeResult<Self> {
        if container.width() <= 0.0 || container.height() <= 0.0 {
            return Err(RoomVibeError::geometry(
                "stage container must have positive area",
            ));
        }
        Ok(Self {
            container,
            next_id: 0,
            background: None,
            overlay: None,
            background_transitioning: false,
        })
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    fn mint(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn set_background(&mut self, room: &RoomScene) -> NodeId {
        let id = self.mint();
        self.background = Some(VisualNode {
            id,
            role: NodeRole::Background,
            image: room.background.clone(),
            rect: self.container,
            class: OverlayClass::Visible,
            border: None,
        });
        id
    }

    /// Swap the background image source in place, keeping the node handle.
    /// Used by the room transition after its fade-out settles.
    pub fn swap_background_image(&mut self, source: &str) -> RoomVibeResult<()> {
        let bg = self
            .background
            .as_mut()
            .ok_or_else(|| RoomVibeError::validation("no background mounted"))?;
        bg.image = source.to_string();
        Ok(())
    }

    pub fn background(&self) -> Option<&VisualNode> {
        self.background.as_ref()
    }

    pub fn set_background_transitioning(&mut self, on: bool) {
        self.background_transitioning = on;
    }

    pub fn background_transitioning(&self) -> bool {
        self.background_transitioning
    }

    /// Mount the single overlay for a placement, destroying any previous
    /// overlay first. The new node starts in `class` (fade-in by default for
    /// selection changes; the exhibition passes directional enter classes).
    #[tracing::instrument(skip(self, artwork), fields(artwork = %artwork.id))]
    pub fn mount_overlay(
        &mut self,
        artwork: &Artwork,
        placement: &Placement,
        class: OverlayClass,
    ) -> RoomVibeResult<NodeId> {
        let size = geometry::compute_box(artwork, placement.scale);
        let rect = geometry::centered_rect(placement.center, size, self.container)?;
        let border = placement.frame.border_rgba().map(|rgba| FrameBorder {
            width_px: geometry::frame_border_px(placement.frame),
            rgba,
        });

        self.overlay = None; // destroy-and-recreate, never patch
        let id = self.mint();
        self.overlay = Some(VisualNode {
            id,
            role: NodeRole::Overlay,
            image: artwork.image.clone(),
            rect,
            class,
            border,
        });
        Ok(id)
    }

    pub fn unmount_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&VisualNode> {
        self.overlay.as_ref()
    }

    pub fn overlay_id(&self) -> Option<NodeId> {
        self.overlay.as_ref().map(|n| n.id)
    }

    pub fn set_overlay_class(&mut self, id: NodeId, class: OverlayClass) -> RoomVibeResult<()> {
        match self.overlay.as_mut() {
            Some(node) if node.id == id => {
                node.class = class;
                Ok(())
            }
            _ => Err(RoomVibeError::validation("stale overlay handle")),
        }
    }

    /// Reposition the overlay's top-left corner (drag path). Pixel space; the
    /// normalized center is derived on demand, not stored.
    pub fn move_overlay_to(&mut self, id: NodeId, left: f64, top: f64) -> RoomVibeResult<()> {
        match self.overlay.as_mut() {
            Some(node) if node.id == id => {
                let size = node.rect.size();
                node.rect = Rect::new(left, top, left + size.width, top + size.height);
                Ok(())
            }
            _ => Err(RoomVibeError::validation("stale overlay handle")),
        }
    }

    /// Current overlay center as a normalized coordinate.
    pub fn overlay_center(&self) -> RoomVibeResult<Option<NormPoint>> {
        match &self.overlay {
            None => Ok(None),
            Some(node) => {
                let c: Point = node.rect.center();
                Ok(Some(geometry::pixel_to_normalized(c, self.container)?))
            }
        }
    }
}
