//! Brush tool lifecycle and event routing.
//!
//! A host owns one [`BrushToolState`] for the lifetime of its tool registry.
//! Enabling it starts listening for pointer and timer events; disabling it
//! drops any stroke in progress without committing it.

use glam::Vec2;
use tracing::{debug, info, warn};
use uvmesh::{UvMesh, ViewProjection};
use uvsculpt_config::{BrushConfig, OverlayConfig};

use crate::cache::SculptCaches;
use crate::error::{Report, SculptError};
use crate::overlay::{OverlayVertex, brush_outline};
use crate::stroke::StrokeSession;

/// Interaction mode of the active object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Object,
    Edit,
}

/// Kind of editor area the tool was invoked from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    View3d,
    ImageEditor,
    Other,
}

/// Host state checked before the tool or a command may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorContext {
    pub mode: EditorMode,
    pub space: SpaceKind,
}

impl EditorContext {
    /// Mesh in edit mode inside a 3D viewport
    pub fn mesh_edit() -> Self {
        Self {
            mode: EditorMode::Edit,
            space: SpaceKind::View3d,
        }
    }
}

/// Everything a stroke reads or writes during one event
pub struct SculptContext<'a> {
    pub mesh: &'a mut UvMesh,
    pub view: &'a ViewProjection,
    pub config: &'a BrushConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Press,
    Release,
    Move,
    Timer,
}

/// A pointer or timer event in region coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolEvent {
    pub kind: EventKind,
    pub cursor: Vec2,
}

impl ToolEvent {
    pub fn new(kind: EventKind, cursor: Vec2) -> Self {
        Self { kind, cursor }
    }
}

/// What the host should do with an event after the tool saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Consumed; keep routing events to the tool
    RunningModal,
    /// Not for the tool; let the host handle it
    PassThrough,
    /// The tool is not running
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventResponse {
    pub status: EventStatus,
    /// UVs were written; the host should redraw
    pub mesh_changed: bool,
    pub reports: Vec<Report>,
}

impl EventResponse {
    fn status(status: EventStatus) -> Self {
        Self {
            status,
            mesh_changed: false,
            reports: Vec::new(),
        }
    }
}

/// The brush tool: running flag, current stroke, last cursor and the
/// mesh indices reused across ticks.
///
/// The caches are keyed on generation counters only, so a host that swaps
/// in a different mesh should disable and re-enable the tool.
#[derive(Debug, Default)]
pub struct BrushToolState {
    running: bool,
    session: StrokeSession,
    cursor: Vec2,
    caches: SculptCaches,
}

impl BrushToolState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the tool may run: mesh in edit mode inside a 3D viewport
    pub fn can_activate(editor: EditorContext) -> Result<(), SculptError> {
        if editor.mode != EditorMode::Edit {
            return Err(SculptError::InvalidContext(
                "UV Sculpt needs a mesh in edit mode".to_string(),
            ));
        }
        if editor.space != SpaceKind::View3d {
            return Err(SculptError::InvalidContext(
                "UV Sculpt needs a 3D viewport".to_string(),
            ));
        }
        Ok(())
    }

    pub fn enable(&mut self, editor: EditorContext) -> Result<(), SculptError> {
        Self::can_activate(editor)?;
        if self.running {
            return Err(SculptError::AlreadyRunning);
        }
        self.running = true;
        self.session = StrokeSession::new();
        self.caches.clear();
        info!("UV Sculpt enabled");
        Ok(())
    }

    /// Stop the tool; a stroke in progress is dropped without Exit
    pub fn disable(&mut self) -> Result<(), SculptError> {
        if !self.running {
            return Err(SculptError::NotRunning);
        }
        self.session.cancel();
        self.caches.clear();
        self.running = false;
        info!("UV Sculpt disabled");
        Ok(())
    }

    /// Enable when stopped, disable when running. Returns the new running state.
    pub fn toggle(&mut self, editor: EditorContext) -> Result<bool, SculptError> {
        if self.running {
            self.disable()?;
        } else {
            self.enable(editor)?;
        }
        Ok(self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_stroking(&self) -> bool {
        self.session.is_stroking()
    }

    /// Last cursor position seen inside the viewport
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn session(&self) -> &StrokeSession {
        &self.session
    }

    /// Route one event through the stroke state machine
    pub fn handle_event(&mut self, ctx: &mut SculptContext<'_>, event: ToolEvent) -> EventResponse {
        if !self.running {
            return EventResponse::status(EventStatus::Finished);
        }
        if !ctx.view.contains_region_point(event.cursor) {
            return EventResponse::status(EventStatus::PassThrough);
        }
        self.cursor = event.cursor;

        let mut response = EventResponse::status(EventStatus::RunningModal);
        match event.kind {
            EventKind::Press => {
                if !self.session.is_stroking() {
                    if let Err(err) = self.session.init(ctx, event.cursor) {
                        warn!("Stroke init failed: {}", err);
                        response.reports.push(Report::from(&err));
                    }
                }
            }
            EventKind::Release => {
                if self.session.is_stroking() {
                    let outcome = self.session.exit(ctx, event.cursor);
                    response.mesh_changed = outcome.written > 0;
                }
            }
            EventKind::Move | EventKind::Timer => {
                if self.session.is_stroking() {
                    let outcome = self.session.apply(ctx, &mut self.caches, event.cursor);
                    response.mesh_changed = outcome.written > 0;
                    if outcome.unsupported > 0 && self.session.note_unsupported() {
                        let err = SculptError::UnsupportedRelaxMethod;
                        warn!("{}", err);
                        response.reports.push(Report::from(&err));
                    }
                }
            }
        }
        debug!(
            "handle_event: {:?} at {:?}, changed={}",
            event.kind, event.cursor, response.mesh_changed
        );
        response
    }

    /// Brush outline at the last cursor, while the tool runs
    pub fn overlay(
        &self,
        brush: &BrushConfig,
        overlay: &OverlayConfig,
    ) -> Option<Vec<OverlayVertex>> {
        self.running.then(|| brush_outline(self.cursor, brush.radius, overlay))
    }
}
