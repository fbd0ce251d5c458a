//! UV sculpting for meshes in edit mode.
//!
//! This crate provides an interactive radial brush that warps the UV
//! coordinates of selected faces under the cursor, plus the commands a host
//! binds to menus and shortcuts.
//!
//! # Architecture
//!
//! The host owns a [`BrushToolState`] and a [`uvmesh::UvMesh`] and feeds
//! pointer events through a [`TickDriver`], which also synthesizes the timer
//! ticks that keep Pinch and Relax working while the pointer is held still.
//!
//! ## Key Components
//!
//! - **Brush**: linear radial falloff
//! - **Influence**: loops of selected faces inside the brush circle
//! - **Deformation**: Grab, Pinch and Relax operators on UVs
//! - **Stroke**: Idle/Stroking state machine with Init, Apply and Exit
//! - **Tool**: enable/disable lifecycle, event routing, cached mesh indices
//! - **Command**: host-facing commands with activation checks and reports
//! - **Overlay**: brush outline vertices
//! - **Driver**: timer tick synthesis

pub mod brush;
pub mod cache;
pub mod command;
pub mod deformation;
pub mod driver;
pub mod error;
pub mod influence;
pub mod overlay;
pub mod stroke;
pub mod tool;

pub use brush::falloff_strength;
pub use cache::SculptCaches;
pub use command::{
    Command, CommandContext, CommandOutcome, CommandStatus, CopyUv, DisableSculpt, EnableSculpt,
    PasteUv, SessionState, ToggleSculpt, execute,
};
pub use deformation::{
    RelaxOutcome, RelaxState, VertexRelaxState, apply_grab, apply_pinch, apply_relax,
    pinch_target_uv,
};
pub use driver::{PointerInput, PointerKind, TickDriver};
pub use error::{Report, SculptError, Severity};
pub use influence::{InfluenceRecord, select_influenced};
pub use overlay::{OverlayVertex, brush_outline};
pub use stroke::{ApplyOutcome, StrokePhase, StrokeSession};
pub use tool::{
    BrushToolState, EditorContext, EditorMode, EventKind, EventResponse, EventStatus,
    SculptContext, SpaceKind, ToolEvent,
};
