use serde_json::{Map, Value};

use crate::scheduler::TimeMs;

/// Analytics-style event delivered to the host page's callback. Schema and
/// delivery beyond this struct are the host's concern.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AnalyticsEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub ts: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RvView,
    RvArtSelect,
    RvRoomChange,
    RvFrameChange,
    RvDragEnd,
    RvNavigate,
    RvExport,
}

impl AnalyticsEvent {
    pub fn new(kind: EventKind, ts: TimeMs) -> Self {
        Self {
            kind,
            fields: Map::new(),
            ts: ts.0,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Receiver for emitted events. The host wires this to its page callback.
pub trait EventSink {
    fn emit(&mut self, event: AnalyticsEvent);
}

/// Drops every event. Default when the host does not care.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: AnalyticsEvent) {}
}

/// Buffers events in order. Used by tests and by hosts that batch-forward.
#[derive(Clone, Debug, Default)]
pub struct VecSink {
    pub events: Vec<AnalyticsEvent>,
}

impl EventSink for VecSink {
    fn emit(&mut self, event: AnalyticsEvent) {
        self.events.push(event);
    }
}

impl<F> EventSink for F
where
    F: FnMut(AnalyticsEvent),
{
    fn emit(&mut self, event: AnalyticsEvent) {
        self(event);
    }
}
