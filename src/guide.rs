//! # RoomVibe engine guide (v0.1.0)
//!
//! This module is a standalone walkthrough of the engine's architecture and
//! public API. It exists so integrations (and future features) share one
//! mental model of what "placing an artwork in a room" means in this codebase.
//!
//! If you are looking for copy/paste commands, start with the repository
//! `README.md`. If you are implementing new features, start here.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Catalog`](crate::Catalog): immutable artworks + room scenes, supplied
//!   by the host and validated once at startup
//! - [`Placement`](crate::Placement): the current (artwork, room, frame)
//!   triple plus a normalized center and scale factor; replaced wholesale on
//!   any input change, never patched
//! - [`Stage`](crate::Stage): the arena of live visual nodes, keyed by role
//!   (one background slot, one overlay slot), handing out [`NodeId`](crate::NodeId)
//!   handles that are never reused
//! - [`DragController`](crate::DragController): the pointer gesture state
//!   machine repositioning the overlay
//! - [`RoomTransition`](crate::RoomTransition): the background crossfade
//!   phase machine
//! - [`Exhibition`](crate::Exhibition): the slideshow phase machine with
//!   modulo-wraparound index arithmetic
//! - [`Widget`](crate::Widget): the top-level controller wiring all of the
//!   above to a host [`EventSink`](crate::EventSink)
//!
//! ---
//!
//! ## One coordinate invariant
//!
//! Every position that crosses a boundary (render, drag, share link, export)
//! is a [`NormPoint`](crate::NormPoint): a fraction of the container rect in
//! `[0,1]²`. Pixel positions exist only transiently inside the stage, and the
//! conversions ([`geometry::pixel_to_normalized`](crate::geometry::pixel_to_normalized)
//! and its inverse) are exact inverses of each other. There is deliberately
//! no second representation: drag writes pixels into the stage, but the
//! moment a position needs to outlive the current container (drag end, share
//! link, export) it is normalized.
//!
//! Sizing is equally simple: an artwork's physical size in centimetres times
//! a constant [`ScaleFactor`](crate::ScaleFactor) gives its on-screen pixel
//! box. This is a fixed visual scale, not true-to-size calibration. Frame
//! borders are a flat [`FRAME_BORDER_PX`](crate::FRAME_BORDER_PX) regardless
//! of scale; that constant is a behavior contract, not a coincidence.
//!
//! ---
//!
//! ## "No clocks in the engine" (and why)
//!
//! Every animation in the product is a chain of 150ms fade steps and
//! double animation-frame waits. The engine never reads a wall clock or sets
//! a timer; instead the host feeds time in:
//!
//! - [`TimeMs`](crate::TimeMs) values arrive as arguments on every
//!   time-sensitive call
//! - [`Widget::advance`](crate::Widget::advance) fires whatever
//!   [`Deadline`](crate::Deadline)s are due
//! - [`Widget::animation_frame`](crate::Widget::animation_frame) ticks the
//!   [`FrameWait`](crate::FrameWait) counters standing in for layout passes
//!
//! This makes every transition a deterministic phase enum that tests can
//! step by hand. The same applies to IO: decoding happens behind the
//! [`ImageStore`](crate::ImageStore) trait, and the room transition only
//! observes a [`LoadOutcome`](crate::LoadOutcome) settle signal. A failed
//! background load still swaps the broken source in after the fade timer;
//! that is a tolerated degraded state, logged at warn, not a hard failure.
//!
//! ---
//!
//! ## Ownership of the overlay
//!
//! Exactly one overlay node is mounted at any time. Whoever needs a new one
//! (selection change, room rebuild, exhibition slide) destroys the old node
//! and mounts a fresh one through the stage, which mints a new handle; stale
//! handles simply stop resolving. No two components ever mutate the same
//! node, and the drag controller's capture is scoped to its
//! [`DragSession`](crate::drag::DragSession), released on up/cancel.
//!
//! ---
//!
//! ## Export
//!
//! [`export::compose`](crate::export::compose) rasterizes the stage offscreen
//! onto a fixed 1200×800 logical canvas (×2.5 for the high-res variant). The
//! overlay is read back as a fraction of the container, so the output is
//! independent of the on-screen container size. Free-tier standard exports
//! carry a watermark; high-res exports never do, and require the
//! [`Entitlements`](crate::Entitlements) flag. Any asset failure aborts the
//! export whole; no partial image is produced.
