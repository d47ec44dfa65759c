use kurbo::{Point, Rect, Size};

use crate::{
    error::{RoomVibeError, RoomVibeResult},
    model::{Artwork, FrameStyle},
};

/// Flat frame border width in pixels. A behavior contract: the border is a
/// fixed visual constant and is never multiplied by the scale factor.
pub const FRAME_BORDER_PX: f64 = 8.0;

/// Constant visual scale relating physical centimeters to on-screen pixels.
/// This is not a calibrated true-to-size measurement.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> RoomVibeResult<Self> {
        if !(value.is_finite() && value > 0.0) {
            return Err(RoomVibeError::geometry(
                "scale factor must be finite and > 0",
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(1.5)
    }
}

/// Container-relative position, each axis a fraction of the container's
/// width/height. Values in `[0,1]` lie inside the container; values outside
/// are legal for live visuals and only rejected at persistence boundaries.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

impl NormPoint {
    pub const CENTER: NormPoint = NormPoint { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn in_unit_square(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Same point, checked for the `[0,1]` persistence invariant.
    pub fn validated(self) -> RoomVibeResult<Self> {
        if !self.in_unit_square() {
            return Err(RoomVibeError::geometry(format!(
                "normalized point ({}, {}) outside [0,1]",
                self.x, self.y
            )));
        }
        Ok(self)
    }
}

/// Pixel box for an artwork at a given scale: physical cm times scale factor.
pub fn compute_box(artwork: &Artwork, scale: ScaleFactor) -> Size {
    Size::new(
        artwork.width_cm() * scale.get(),
        artwork.height_cm() * scale.get(),
    )
}

/// Border width contributed by a frame choice. Zero for `FrameStyle::None`.
pub fn frame_border_px(frame: FrameStyle) -> f64 {
    match frame {
        FrameStyle::None => 0.0,
        _ => FRAME_BORDER_PX,
    }
}

fn require_nonempty(container: Rect) -> RoomVibeResult<()> {
    if container.width() <= 0.0 || container.height() <= 0.0 {
        return Err(RoomVibeError::geometry(
            "container rect must have positive width and height",
        ));
    }
    Ok(())
}

/// Strict linear map from container pixels to normalized coordinates.
/// Exact inverse of [`normalized_to_pixel`].
pub fn pixel_to_normalized(p: Point, container: Rect) -> RoomVibeResult<NormPoint> {
    require_nonempty(container)?;
    Ok(NormPoint::new(
        (p.x - container.x0) / container.width(),
        (p.y - container.y0) / container.height(),
    ))
}

/// Strict linear map from normalized coordinates back to container pixels.
pub fn normalized_to_pixel(n: NormPoint, container: Rect) -> RoomVibeResult<Point> {
    require_nonempty(container)?;
    Ok(Point::new(
        container.x0 + n.x * container.width(),
        container.y0 + n.y * container.height(),
    ))
}

/// Pixel rect of a box of `size` centered at the normalized `center`.
pub fn centered_rect(center: NormPoint, size: Size, container: Rect) -> RoomVibeResult<Rect> {
    let c = normalized_to_pixel(center, container)?;
    Ok(Rect::new(
        c.x - size.width / 2.0,
        c.y - size.height / 2.0,
        c.x + size.width / 2.0,
        c.y + size.height / 2.0,
    ))
}

/// A rect expressed as fractions of the container rect. This is what makes the
/// export resolution-independent of the on-screen zoom level.
pub fn relative_rect(rect: Rect, container: Rect) -> RoomVibeResult<Rect> {
    require_nonempty(container)?;
    Ok(Rect::new(
        (rect.x0 - container.x0) / container.width(),
        (rect.y0 - container.y0) / container.height(),
        (rect.x1 - container.x0) / container.width(),
        (rect.y1 - container.y0) / container.height(),
    ))
}
