use serde::Serialize;
use std::collections::VecDeque;
use tokio::time::Instant;
use uuid::Uuid;

use super::event::SessionEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

/// Oldest events are dropped past this.
pub const MAX_EVENTS: usize = 10_000;

/// An event stamped with its offset from session start.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedEvent {
    pub at_ms: u64,
    pub event: SessionEvent,
}

/// Per-session event log, owned by one lesson session.
#[derive(Debug)]
pub struct TelemetryRecorder {
    session: Uuid,
    started: Instant,
    buffer: VecDeque<RecordedEvent>,
}

impl TelemetryRecorder {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            started: Instant::now(),
            buffer: VecDeque::new(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn record(&mut self, event: SessionEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        let at_ms = self.started.elapsed().as_millis() as u64;
        self.buffer.push_back(RecordedEvent { at_ms, event });
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let mut snapshot = compute_snapshot(self.buffer.iter().map(|r| &r.event));
        snapshot.session = self.session;
        snapshot.last_event_ms = self.buffer.back().map_or(0, |r| r.at_ms);
        snapshot
    }

    pub fn events(&self) -> impl Iterator<Item = &RecordedEvent> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
