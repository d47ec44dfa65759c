#![forbid(unsafe_code)]

pub mod assets;
pub mod drag;
pub mod error;
pub mod events;
pub mod exhibition;
pub mod export;
pub mod geometry;
pub mod guide;
pub mod model;
pub mod scene;
pub mod scheduler;
pub mod share;
pub mod transition;
pub mod widget;

pub use assets::{FsImageStore, ImageStore, LoadOutcome};
pub use drag::{ClampPolicy, DragController, DragUpdate, PointerKind};
pub use error::{RoomVibeError, RoomVibeResult};
pub use events::{AnalyticsEvent, EventKind, EventSink, NullSink, VecSink};
pub use exhibition::{Direction, Exhibition, NavKey, SwipeDetector};
pub use export::{export_filename, ExportOptions};
pub use geometry::{NormPoint, ScaleFactor, FRAME_BORDER_PX};
pub use model::{Artwork, Catalog, DimensionUnit, Entitlements, FrameStyle, RoomScene};
pub use scene::{NodeId, OverlayClass, Placement, Stage, VisualNode};
pub use scheduler::{Deadline, FrameWait, TimeMs, FADE_STEP_MS};
pub use share::SharePlacement;
pub use transition::RoomTransition;
pub use widget::{Widget, WidgetConfig};
