//! Timer tick synthesis.
//!
//! Pinch and Relax keep working while the pointer is held still, so the tool
//! expects periodic timer events between pointer events. Hosts without their
//! own timer feed timestamped pointer input through a [`TickDriver`], which
//! delivers every tick that fell due before the input.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::tool::{BrushToolState, EventKind, EventResponse, SculptContext, ToolEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Press,
    Release,
    Move,
}

impl From<PointerKind> for EventKind {
    fn from(kind: PointerKind) -> Self {
        match kind {
            PointerKind::Press => EventKind::Press,
            PointerKind::Release => EventKind::Release,
            PointerKind::Move => EventKind::Move,
        }
    }
}

/// A timestamped pointer event in region coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub time_ms: u64,
    pub kind: PointerKind,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct TickDriver {
    interval_ms: u64,
    /// Next tick time; `None` until the first event seen while running
    next_tick_ms: Option<u64>,
    last_cursor: Vec2,
}

impl TickDriver {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_tick_ms: None,
            last_cursor: Vec2::ZERO,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Deliver due ticks, then the pointer event itself
    pub fn dispatch(
        &mut self,
        tool: &mut BrushToolState,
        ctx: &mut SculptContext<'_>,
        input: PointerInput,
    ) -> Vec<EventResponse> {
        let mut responses = self.advance_to(tool, ctx, input.time_ms);
        self.last_cursor = input.position;
        let event = ToolEvent::new(input.kind.into(), input.position);
        responses.push(tool.handle_event(ctx, event));
        if !tool.is_running() {
            self.next_tick_ms = None;
        }
        responses
    }

    /// Deliver every tick due at or before `now_ms`.
    ///
    /// Ticks carry the last pointer position. Nothing is delivered while the
    /// tool is stopped.
    pub fn advance_to(
        &mut self,
        tool: &mut BrushToolState,
        ctx: &mut SculptContext<'_>,
        now_ms: u64,
    ) -> Vec<EventResponse> {
        if !tool.is_running() {
            self.next_tick_ms = None;
            return Vec::new();
        }
        let Some(mut next) = self.next_tick_ms else {
            self.next_tick_ms = Some(now_ms.saturating_add(self.interval_ms));
            return Vec::new();
        };

        let mut responses = Vec::new();
        while next <= now_ms {
            let tick = ToolEvent::new(EventKind::Timer, self.last_cursor);
            responses.push(tool.handle_event(ctx, tick));
            // Pinned at the end of the clock
            let Some(after) = next.checked_add(self.interval_ms) else {
                next = u64::MAX;
                break;
            };
            next = after;
        }
        if !responses.is_empty() {
            trace!("TickDriver: {} tick(s) up to {} ms", responses.len(), now_ms);
        }
        self.next_tick_ms = Some(next);
        responses
    }
}
