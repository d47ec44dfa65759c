use std::io::Cursor;

use anyhow::Context as _;
use image::RgbaImage;
use kurbo::Rect;
use tracing::debug;

use crate::{
    assets::ImageStore,
    error::{RoomVibeError, RoomVibeResult},
    geometry,
    model::Entitlements,
    scene::Stage,
};

/// Logical export canvas; the on-screen container maps onto this regardless
/// of its actual pixel size.
pub const LOGICAL_WIDTH: u32 = 1200;
pub const LOGICAL_HEIGHT: u32 = 800;

/// Output-resolution multiplier for the high-res variant.
pub const HIRES_MULTIPLIER: f64 = 2.5;

/// Neutral fill behind everything, visible only if the background is missing.
const FALLBACK_FILL: [u8; 4] = [240, 239, 235, 255];

const WATERMARK_TEXT: &str = "ROOMVIBE";
const WATERMARK_BOX: [u8; 4] = [0, 0, 0, 140];
const WATERMARK_INK: [u8; 4] = [255, 255, 255, 230];

#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    pub high_res: bool,
    pub entitlements: Entitlements,
}

pub fn export_filename(high_res: bool) -> &'static str {
    if high_res {
        "roomvibe-visualization-hires.png"
    } else {
        "roomvibe-visualization.png"
    }
}

/// Rasterize the stage's current visual state into a single image.
///
/// The overlay is read back as a fraction of the container rect, so the
/// output is independent of the on-screen container size. Any asset failure
/// aborts the whole export; no partial image is produced.
#[tracing::instrument(skip(stage, store), fields(high_res = opts.high_res))]
pub fn compose(
    stage: &Stage,
    store: &mut dyn ImageStore,
    opts: &ExportOptions,
) -> RoomVibeResult<RgbaImage> {
    if opts.high_res && !opts.entitlements.hires_export {
        return Err(RoomVibeError::validation(
            "high-resolution export is not permitted on this plan",
        ));
    }

    let multiplier = if opts.high_res { HIRES_MULTIPLIER } else { 1.0 };
    let width = (f64::from(LOGICAL_WIDTH) * multiplier) as u32;
    let height = (f64::from(LOGICAL_HEIGHT) * multiplier) as u32;

    let mut canvas = RgbaImage::from_pixel(width, height, image::Rgba(FALLBACK_FILL));
    let full = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));

    if let Some(bg) = stage.background() {
        let img = store.load(&bg.image)?;
        draw_image_stretched(&mut canvas, &img, full);
    }

    if let Some(overlay) = stage.overlay() {
        let frac = geometry::relative_rect(overlay.rect, stage.container())?;
        let dest = Rect::new(
            frac.x0 * full.width(),
            frac.y0 * full.height(),
            frac.x1 * full.width(),
            frac.y1 * full.height(),
        );

        if let Some(border) = overlay.border {
            let inset = border.width_px * multiplier;
            fill_rect(&mut canvas, dest.inflate(inset, inset), border.rgba);
        }

        let art = store.load(&overlay.image)?;
        draw_image_stretched(&mut canvas, &art, dest);
    }

    if !opts.high_res && opts.entitlements.free_tier {
        debug!("stamping free-tier watermark");
        stamp_watermark(&mut canvas);
    }

    Ok(canvas)
}

/// Encode the composited canvas as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> RoomVibeResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode composite as png")
        .map_err(|e| RoomVibeError::composition(format!("{e:#}")))?;
    Ok(buf)
}

/// Nearest-neighbour stretch of `src` into `dest`, alpha-blended over the
/// canvas. Pixels outside the canvas are clipped.
fn draw_image_stretched(dst: &mut RgbaImage, src: &RgbaImage, dest: Rect) {
    if dest.width() <= 0.0 || dest.height() <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let x0 = dest.x0.max(0.0) as u32;
    let y0 = dest.y0.max(0.0) as u32;
    let x1 = (dest.x1.min(f64::from(dst.width()))).max(0.0) as u32;
    let y1 = (dest.y1.min(f64::from(dst.height()))).max(0.0) as u32;

    for y in y0..y1 {
        let v = (f64::from(y) + 0.5 - dest.y0) / dest.height();
        let sy = ((v * f64::from(src.height())) as u32).min(src.height() - 1);
        for x in x0..x1 {
            let u = (f64::from(x) + 0.5 - dest.x0) / dest.width();
            let sx = ((u * f64::from(src.width())) as u32).min(src.width() - 1);
            let px = *src.get_pixel(sx, sy);
            blend_over(dst, x, y, px.0);
        }
    }
}

fn fill_rect(dst: &mut RgbaImage, rect: Rect, rgba: [u8; 4]) {
    let x0 = rect.x0.max(0.0) as u32;
    let y0 = rect.y0.max(0.0) as u32;
    let x1 = (rect.x1.min(f64::from(dst.width()))).max(0.0) as u32;
    let y1 = (rect.y1.min(f64::from(dst.height()))).max(0.0) as u32;
    for y in y0..y1 {
        for x in x0..x1 {
            blend_over(dst, x, y, rgba);
        }
    }
}

fn blend_over(dst: &mut RgbaImage, x: u32, y: u32, src: [u8; 4]) {
    let a = u32::from(src[3]);
    if a == 0 {
        return;
    }
    if a == 255 {
        dst.put_pixel(x, y, image::Rgba(src));
        return;
    }
    let under = dst.get_pixel(x, y).0;
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = ((u32::from(src[c]) * a + u32::from(under[c]) * (255 - a)) / 255) as u8;
    }
    out[3] = (a + u32::from(under[3]) * (255 - a) / 255) as u8;
    dst.put_pixel(x, y, image::Rgba(out));
}

// 5x7 glyphs for the watermark label, one bit per column.
const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

fn glyph(c: char) -> [u8; 7] {
    match c {
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        _ => [0; 7],
    }
}

/// Semi-opaque label box in the bottom-right corner. Free tier, 1x only.
fn stamp_watermark(canvas: &mut RgbaImage) {
    let scale = 2u32;
    let pad = 10u32;
    let margin = 16u32;
    let spacing = scale; // between glyphs

    let n = WATERMARK_TEXT.chars().count() as u32;
    let text_w = n * GLYPH_W * scale + (n - 1) * spacing;
    let text_h = GLYPH_H * scale;
    let box_w = text_w + 2 * pad;
    let box_h = text_h + 2 * pad;

    let bx = canvas.width().saturating_sub(box_w + margin);
    let by = canvas.height().saturating_sub(box_h + margin);
    fill_rect(
        canvas,
        Rect::new(
            f64::from(bx),
            f64::from(by),
            f64::from(bx + box_w),
            f64::from(by + box_h),
        ),
        WATERMARK_BOX,
    );

    let mut pen_x = bx + pad;
    let pen_y = by + pad;
    for c in WATERMARK_TEXT.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits >> (GLYPH_W - 1 - col) & 1 == 1 {
                    let px = pen_x + col * scale;
                    let py = pen_y + row as u32 * scale;
                    fill_rect(
                        canvas,
                        Rect::new(
                            f64::from(px),
                            f64::from(py),
                            f64::from(px + scale),
                            f64::from(py + scale),
                        ),
                        WATERMARK_INK,
                    );
                }
            }
        }
        pen_x += GLYPH_W * scale + spacing;
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::*;
    use crate::{
        geometry::{NormPoint, ScaleFactor},
        model::{Artwork, DimensionUnit, FrameStyle, RoomScene},
        scene::{OverlayClass, Placement},
    };

    struct MemStore(HashMap<String, Arc<RgbaImage>>);

    impl MemStore {
        fn new() -> Self {
            let mut m = HashMap::new();
            m.insert(
                "rooms/living.png".to_string(),
                Arc::new(RgbaImage::from_pixel(4, 4, image::Rgba([50, 60, 70, 255]))),
            );
            m.insert(
                "art/a0.png".to_string(),
                Arc::new(RgbaImage::from_pixel(4, 4, image::Rgba([200, 30, 30, 255]))),
            );
            Self(m)
        }
    }

    impl ImageStore for MemStore {
        fn load(&mut self, source: &str) -> RoomVibeResult<Arc<RgbaImage>> {
            self.0
                .get(source)
                .cloned()
                .ok_or_else(|| RoomVibeError::asset_load(format!("missing '{source}'")))
        }
    }

    fn stage_with_overlay(frame: FrameStyle) -> Stage {
        let mut stage = Stage::new(Rect::new(0.0, 0.0, 600.0, 400.0)).unwrap();
        stage.set_background(&RoomScene {
            id: "living".to_string(),
            name: "Living".to_string(),
            background: "rooms/living.png".to_string(),
            thumbnail: "rooms/living-thumb.png".to_string(),
        });
        let art = Artwork {
            id: "a0".to_string(),
            title: "t".to_string(),
            image: "art/a0.png".to_string(),
            width: 100.0,
            height: 70.0,
            unit: DimensionUnit::Cm,
            price: None,
            buy_url: None,
        };
        let placement = Placement {
            artwork_id: "a0".to_string(),
            room_id: "living".to_string(),
            frame,
            center: NormPoint::CENTER,
            scale: ScaleFactor::new(1.5).unwrap(),
        };
        stage
            .mount_overlay(&art, &placement, OverlayClass::Visible)
            .unwrap();
        stage
    }

    fn opts(high_res: bool, free_tier: bool) -> ExportOptions {
        ExportOptions {
            high_res,
            entitlements: Entitlements {
                free_tier,
                hires_export: true,
            },
        }
    }

    #[test]
    fn standard_export_is_1200_by_800() {
        let stage = stage_with_overlay(FrameStyle::None);
        let img = compose(&stage, &mut MemStore::new(), &opts(false, false)).unwrap();
        assert_eq!(img.dimensions(), (1200, 800));
    }

    #[test]
    fn hires_export_is_3000_by_2000() {
        let stage = stage_with_overlay(FrameStyle::None);
        let img = compose(&stage, &mut MemStore::new(), &opts(true, false)).unwrap();
        assert_eq!(img.dimensions(), (3000, 2000));
    }

    #[test]
    fn hires_requires_entitlement() {
        let stage = stage_with_overlay(FrameStyle::None);
        let o = ExportOptions {
            high_res: true,
            entitlements: Entitlements {
                free_tier: true,
                hires_export: false,
            },
        };
        assert!(matches!(
            compose(&stage, &mut MemStore::new(), &o),
            Err(RoomVibeError::Validation(_))
        ));
    }

    #[test]
    fn overlay_lands_at_its_container_fraction() {
        let stage = stage_with_overlay(FrameStyle::None);
        let img = compose(&stage, &mut MemStore::new(), &opts(false, false)).unwrap();
        // Overlay center (0.5, 0.5) of the canvas shows artwork, not room.
        assert_eq!(img.get_pixel(600, 400).0, [200, 30, 30, 255]);
        // Far corner shows the background.
        assert_eq!(img.get_pixel(10, 10).0, [50, 60, 70, 255]);
    }

    #[test]
    fn frame_fills_an_inflated_border_rect() {
        let stage = stage_with_overlay(FrameStyle::Black);
        let img = compose(&stage, &mut MemStore::new(), &opts(false, false)).unwrap();
        // Overlay rect in container space is 150x105 centered in 600x400;
        // the canvas is 2x the container, so the artwork spans x in [450,750].
        // Just left of it sits the 8px (x2) frame band.
        assert_eq!(img.get_pixel(445, 400).0, [17, 17, 17, 255]);
        assert_eq!(img.get_pixel(600, 400).0, [200, 30, 30, 255]);
    }

    #[test]
    fn free_tier_standard_export_carries_watermark() {
        let stage = stage_with_overlay(FrameStyle::None);
        let plain = compose(&stage, &mut MemStore::new(), &opts(false, false)).unwrap();
        let marked = compose(&stage, &mut MemStore::new(), &opts(false, true)).unwrap();
        assert_ne!(plain.get_pixel(1150, 770), marked.get_pixel(1150, 770));
    }

    #[test]
    fn hires_never_carries_watermark() {
        let stage = stage_with_overlay(FrameStyle::None);
        let a = compose(&stage, &mut MemStore::new(), &opts(true, true)).unwrap();
        let b = compose(&stage, &mut MemStore::new(), &opts(true, false)).unwrap();
        assert_eq!(a.get_pixel(2870, 1930), b.get_pixel(2870, 1930));
    }

    #[test]
    fn background_only_scene_composes_without_overlay() {
        let mut stage = stage_with_overlay(FrameStyle::None);
        stage.unmount_overlay();
        let img = compose(&stage, &mut MemStore::new(), &opts(false, false)).unwrap();
        assert_eq!(img.dimensions(), (1200, 800));
        // The room fills the whole canvas, including where the overlay was.
        assert_eq!(img.get_pixel(600, 400).0, [50, 60, 70, 255]);
    }

    #[test]
    fn missing_asset_aborts_export() {
        let mut stage = stage_with_overlay(FrameStyle::None);
        stage.swap_background_image("rooms/missing.png").unwrap();
        assert!(matches!(
            compose(&stage, &mut MemStore::new(), &opts(false, false)),
            Err(RoomVibeError::AssetLoad(_))
        ));
    }

    #[test]
    fn filenames() {
        assert_eq!(export_filename(false), "roomvibe-visualization.png");
        assert_eq!(export_filename(true), "roomvibe-visualization-hires.png");
    }

    #[test]
    fn png_roundtrip() {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&img).unwrap();
        let back = crate::assets::decode_image(&bytes).unwrap();
        assert_eq!(back.dimensions(), (8, 8));
    }
}
