//! End-to-end scenarios driven through the public API, with real PNG assets
//! on disk and the host clock advanced by hand.

use std::path::PathBuf;

use image::RgbaImage;
use kurbo::{Point, Rect};
use roomvibe::{
    Artwork, Catalog, ClampPolicy, DimensionUnit, Direction, Entitlements, EventKind, FrameStyle,
    FsImageStore, LoadOutcome, NavKey, PointerKind, RoomScene, ScaleFactor, TimeMs, VecSink,
    Widget, WidgetConfig, FADE_STEP_MS,
};

fn init_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn write_png(path: &std::path::Path, rgba: [u8; 4]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbaImage::from_pixel(8, 8, image::Rgba(rgba));
    img.save(path).unwrap();
}

fn asset_root(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("roomvibe-scenarios-{tag}"));
    write_png(&root.join("rooms/living.png"), [50, 60, 70, 255]);
    write_png(&root.join("rooms/bedroom.png"), [80, 70, 60, 255]);
    write_png(&root.join("art/a0.png"), [200, 30, 30, 255]);
    write_png(&root.join("art/a1.png"), [30, 200, 30, 255]);
    write_png(&root.join("art/a2.png"), [30, 30, 200, 255]);
    root
}

fn art(id: &str, w: f64, h: f64) -> Artwork {
    Artwork {
        id: id.to_string(),
        title: id.to_uppercase(),
        image: format!("art/{id}.png"),
        width: w,
        height: h,
        unit: DimensionUnit::Cm,
        price: None,
        buy_url: None,
    }
}

fn catalog() -> Catalog {
    Catalog {
        artworks: vec![art("a0", 100.0, 70.0), art("a1", 60.0, 40.0), art("a2", 30.0, 30.0)],
        rooms: vec![
            RoomScene {
                id: "living".to_string(),
                name: "Living".to_string(),
                background: "rooms/living.png".to_string(),
                thumbnail: "rooms/living.png".to_string(),
            },
            RoomScene {
                id: "bedroom".to_string(),
                name: "Bedroom".to_string(),
                background: "rooms/bedroom.png".to_string(),
                thumbnail: "rooms/bedroom.png".to_string(),
            },
        ],
    }
}

fn widget(entitlements: Entitlements) -> Widget<VecSink> {
    init_tracing();
    let config = WidgetConfig {
        scale: ScaleFactor::default(),
        clamp_policy: ClampPolicy::Free,
        entitlements,
    };
    Widget::new(
        catalog(),
        config,
        Rect::new(0.0, 0.0, 1200.0, 800.0),
        VecSink::default(),
        TimeMs(0),
    )
    .unwrap()
}

/// Run one exhibition slide to completion, returning the time after settle.
fn run_slide(w: &mut Widget<VecSink>, dir: Direction, start: TimeMs) -> TimeMs {
    w.navigate(dir, start).unwrap();
    let swap = start.plus(FADE_STEP_MS);
    w.advance(swap).unwrap();
    w.animation_frame(swap).unwrap();
    w.animation_frame(swap).unwrap();
    let done = swap.plus(FADE_STEP_MS);
    w.advance(done).unwrap();
    done
}

#[test]
fn true_to_size_placement_with_black_frame() {
    let mut w = widget(Entitlements::default());
    w.select_frame(FrameStyle::Black, TimeMs(1)).unwrap();

    let overlay = w.stage().overlay().unwrap();
    assert_eq!(overlay.rect.width(), 150.0);
    assert_eq!(overlay.rect.height(), 105.0);
    assert_eq!(overlay.rect.center(), Point::new(600.0, 400.0));

    let border = overlay.border.unwrap();
    assert_eq!(border.width_px, 8.0);
    assert_eq!(border.rgba, [17, 17, 17, 255]);
}

#[test]
fn exhibition_wraps_around_and_back() {
    let mut w = widget(Entitlements::default());
    w.enter_exhibition();
    assert_eq!(w.exhibition().unwrap().index(), 0);

    let mut t = TimeMs(0);
    t = run_slide(&mut w, Direction::Next, t);
    t = run_slide(&mut w, Direction::Next, t);
    assert_eq!(w.exhibition().unwrap().index(), 2);
    assert_eq!(w.placement().artwork_id, "a2");

    t = run_slide(&mut w, Direction::Next, t);
    assert_eq!(w.exhibition().unwrap().index(), 0);

    // prev from the head wraps to the tail.
    run_slide(&mut w, Direction::Prev, t);
    assert_eq!(w.placement().artwork_id, "a2");
}

#[test]
fn navigation_mid_transition_is_a_no_op() {
    let mut w = widget(Entitlements::default());
    w.enter_exhibition();

    w.navigate(Direction::Next, TimeMs(0)).unwrap();
    let before = w.placement().artwork_id.clone();

    // Re-entrant navigate while animating: dropped, nothing emitted past the
    // first rv_navigate.
    w.navigate(Direction::Next, TimeMs(10)).unwrap();
    let navigate_events = w
        .sink()
        .events
        .iter()
        .filter(|e| e.kind == EventKind::RvNavigate)
        .count();
    assert_eq!(navigate_events, 1);
    assert_eq!(w.placement().artwork_id, before);

    w.advance(TimeMs(FADE_STEP_MS)).unwrap();
    assert_eq!(w.placement().artwork_id, "a1");
}

#[test]
fn keyboard_arrows_navigate() {
    let mut w = widget(Entitlements::default());
    w.enter_exhibition();
    w.key(NavKey::ArrowRight, TimeMs(0)).unwrap();
    w.advance(TimeMs(FADE_STEP_MS)).unwrap();
    assert_eq!(w.placement().artwork_id, "a1");
}

#[test]
fn swipe_navigates_within_the_window() {
    let mut w = widget(Entitlements::default());
    w.enter_exhibition();
    w.touch_start(400.0, TimeMs(0));
    w.touch_end(320.0, TimeMs(200)).unwrap();
    w.advance(TimeMs(200 + FADE_STEP_MS)).unwrap();
    assert_eq!(w.placement().artwork_id, "a1");
}

#[test]
fn room_change_then_export_uses_new_background() {
    let root = asset_root("roomswap");
    let mut store = FsImageStore::new(&root);
    let mut w = widget(Entitlements {
        free_tier: false,
        hires_export: true,
    });

    w.select_room("bedroom", TimeMs(0)).unwrap();
    w.background_load_settled(LoadOutcome::Loaded);
    w.advance(TimeMs(FADE_STEP_MS)).unwrap();
    w.animation_frame(TimeMs(FADE_STEP_MS)).unwrap();
    w.animation_frame(TimeMs(FADE_STEP_MS)).unwrap();

    let (bytes, filename) = w.export(&mut store, false, TimeMs(400)).unwrap();
    assert_eq!(filename, "roomvibe-visualization.png");
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (1200, 800));
    // Far corner shows the bedroom background, not the living room.
    assert_eq!(img.get_pixel(5, 5).0, [80, 70, 60, 255]);
}

#[test]
fn export_resolutions_and_watermark_gating() {
    let root = asset_root("watermark");

    // Free tier, standard: watermarked.
    let mut free = widget(Entitlements {
        free_tier: true,
        hires_export: true,
    });
    let mut paid = widget(Entitlements {
        free_tier: false,
        hires_export: true,
    });

    let (free_bytes, _) = free
        .export(&mut FsImageStore::new(&root), false, TimeMs(1))
        .unwrap();
    let (paid_bytes, _) = paid
        .export(&mut FsImageStore::new(&root), false, TimeMs(1))
        .unwrap();
    let free_img = image::load_from_memory(&free_bytes).unwrap().to_rgba8();
    let paid_img = image::load_from_memory(&paid_bytes).unwrap().to_rgba8();
    assert_ne!(free_img.get_pixel(1150, 770), paid_img.get_pixel(1150, 770));

    // High-res: 3000x2000, never watermarked even on free tier.
    let (hires_bytes, filename) = free
        .export(&mut FsImageStore::new(&root), true, TimeMs(2))
        .unwrap();
    assert_eq!(filename, "roomvibe-visualization-hires.png");
    let hires_img = image::load_from_memory(&hires_bytes).unwrap().to_rgba8();
    assert_eq!(hires_img.dimensions(), (3000, 2000));

    let (paid_hires_bytes, _) = paid
        .export(&mut FsImageStore::new(&root), true, TimeMs(2))
        .unwrap();
    let paid_hires_img = image::load_from_memory(&paid_hires_bytes)
        .unwrap()
        .to_rgba8();
    assert_eq!(
        hires_img.get_pixel(2870, 1930),
        paid_hires_img.get_pixel(2870, 1930)
    );
}

#[test]
fn drag_then_share_then_restore() {
    let mut w = widget(Entitlements::default());

    w.pointer_down(PointerKind::Mouse, Point::new(600.0, 400.0));
    w.pointer_move(Point::new(720.0, 320.0)).unwrap();
    w.pointer_up(TimeMs(50)).unwrap();

    let share = w.share_placement().unwrap();
    assert!((share.center.x - 0.6).abs() < 1e-9);
    assert!((share.center.y - 0.4).abs() < 1e-9);

    let query = share.to_query();
    let parsed = roomvibe::SharePlacement::parse(&query).unwrap();

    let restored = Widget::from_share(
        catalog(),
        WidgetConfig::default(),
        Rect::new(0.0, 0.0, 1200.0, 800.0),
        &parsed,
        VecSink::default(),
        TimeMs(100),
    )
    .unwrap();
    let center = restored.stage().overlay().unwrap().rect.center();
    assert!((center.x - 720.0).abs() < 0.2);
    assert!((center.y - 320.0).abs() < 0.2);
}

#[test]
fn every_action_emits_its_event() {
    let root = asset_root("events");
    let mut w = widget(Entitlements {
        free_tier: true,
        hires_export: false,
    });

    w.select_artwork("a1", TimeMs(1)).unwrap();
    w.select_frame(FrameStyle::Gold, TimeMs(2)).unwrap();
    w.select_room("bedroom", TimeMs(3)).unwrap();
    w.pointer_down(PointerKind::Mouse, Point::new(600.0, 400.0));
    w.pointer_move(Point::new(610.0, 410.0)).unwrap();
    w.pointer_up(TimeMs(4)).unwrap();
    w.enter_exhibition();
    w.navigate(Direction::Next, TimeMs(5)).unwrap();
    w.export(&mut FsImageStore::new(&root), false, TimeMs(6))
        .unwrap();

    let kinds: Vec<EventKind> = w.sink().events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::RvView,
            EventKind::RvArtSelect,
            EventKind::RvFrameChange,
            EventKind::RvRoomChange,
            EventKind::RvDragEnd,
            EventKind::RvNavigate,
            EventKind::RvExport,
        ]
    );
}
