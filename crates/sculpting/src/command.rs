//! Host-facing commands.
//!
//! Each command checks whether it may run in the current editor context and
//! then runs against the session state the host keeps between invocations.
//! Failures come back as reports with a `Cancelled` status, never as panics.

use tracing::{debug, warn};
use uvmesh::{FaceSource, LayerSelection, PasteOptions, UvClipboard, UvMesh};

use crate::error::{Report, SculptError};
use crate::tool::{BrushToolState, EditorContext, EditorMode};

/// State a host keeps alive between commands
#[derive(Debug, Default)]
pub struct SessionState {
    pub brush: BrushToolState,
    pub clipboard: UvClipboard,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Editor context and the mesh a command operates on
pub struct CommandContext<'a> {
    pub editor: EditorContext,
    pub mesh: &'a mut UvMesh,
}

pub trait Command {
    /// Name shown in menus and logs
    fn name(&self) -> &'static str;

    fn can_activate(&self, ctx: &CommandContext<'_>, state: &SessionState) -> bool;

    fn run(
        &self,
        ctx: &mut CommandContext<'_>,
        state: &mut SessionState,
    ) -> Result<Report, SculptError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub status: CommandStatus,
    pub reports: Vec<Report>,
}

/// Check activation, run the command and turn any error into a report
pub fn execute(
    command: &dyn Command,
    ctx: &mut CommandContext<'_>,
    state: &mut SessionState,
) -> CommandOutcome {
    if !command.can_activate(ctx, state) {
        debug!("{}: not available in {:?}", command.name(), ctx.editor);
        return CommandOutcome {
            status: CommandStatus::Cancelled,
            reports: vec![Report::error(format!(
                "{} is not available here",
                command.name()
            ))],
        };
    }

    match command.run(ctx, state) {
        Ok(report) => {
            debug!("{}: {}", command.name(), report.message);
            CommandOutcome {
                status: CommandStatus::Finished,
                reports: vec![report],
            }
        }
        Err(err) => {
            warn!("{} failed: {}", command.name(), err);
            CommandOutcome {
                status: CommandStatus::Cancelled,
                reports: vec![Report::from(&err)],
            }
        }
    }
}

/// Start the UV sculpt brush
#[derive(Debug, Clone, Copy, Default)]
pub struct EnableSculpt;

impl Command for EnableSculpt {
    fn name(&self) -> &'static str {
        "Enable UV Sculpt"
    }

    fn can_activate(&self, ctx: &CommandContext<'_>, _state: &SessionState) -> bool {
        BrushToolState::can_activate(ctx.editor).is_ok()
    }

    fn run(
        &self,
        ctx: &mut CommandContext<'_>,
        state: &mut SessionState,
    ) -> Result<Report, SculptError> {
        state.brush.enable(ctx.editor)?;
        Ok(Report::info("UV Sculpt enabled"))
    }
}

/// Stop the UV sculpt brush
#[derive(Debug, Clone, Copy, Default)]
pub struct DisableSculpt;

impl Command for DisableSculpt {
    fn name(&self) -> &'static str {
        "Disable UV Sculpt"
    }

    fn can_activate(&self, ctx: &CommandContext<'_>, _state: &SessionState) -> bool {
        BrushToolState::can_activate(ctx.editor).is_ok()
    }

    fn run(
        &self,
        _ctx: &mut CommandContext<'_>,
        state: &mut SessionState,
    ) -> Result<Report, SculptError> {
        state.brush.disable()?;
        Ok(Report::info("UV Sculpt disabled"))
    }
}

/// Start the brush when stopped, stop it when running
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleSculpt;

impl Command for ToggleSculpt {
    fn name(&self) -> &'static str {
        "Toggle UV Sculpt"
    }

    fn can_activate(&self, ctx: &CommandContext<'_>, _state: &SessionState) -> bool {
        BrushToolState::can_activate(ctx.editor).is_ok()
    }

    fn run(
        &self,
        ctx: &mut CommandContext<'_>,
        state: &mut SessionState,
    ) -> Result<Report, SculptError> {
        let running = state.brush.toggle(ctx.editor)?;
        Ok(Report::info(if running {
            "UV Sculpt enabled"
        } else {
            "UV Sculpt disabled"
        }))
    }
}

/// Copy per-face UV, pin and seam data into the session clipboard
#[derive(Debug, Clone, Default)]
pub struct CopyUv {
    pub faces: FaceSource,
    pub layers: LayerSelection,
}

impl Command for CopyUv {
    fn name(&self) -> &'static str {
        "Copy UV"
    }

    fn can_activate(&self, ctx: &CommandContext<'_>, _state: &SessionState) -> bool {
        ctx.editor.mode == EditorMode::Edit
    }

    fn run(
        &self,
        ctx: &mut CommandContext<'_>,
        state: &mut SessionState,
    ) -> Result<Report, SculptError> {
        let copied = state.clipboard.copy(ctx.mesh, self.faces, &self.layers)?;
        Ok(Report::info(format!("{} face(s) are copied", copied)))
    }
}

/// Paste the session clipboard onto the mesh
#[derive(Debug, Clone, Default)]
pub struct PasteUv {
    pub options: PasteOptions,
}

impl Command for PasteUv {
    fn name(&self) -> &'static str {
        "Paste UV"
    }

    fn can_activate(&self, ctx: &CommandContext<'_>, _state: &SessionState) -> bool {
        ctx.editor.mode == EditorMode::Edit
    }

    fn run(
        &self,
        ctx: &mut CommandContext<'_>,
        state: &mut SessionState,
    ) -> Result<Report, SculptError> {
        let summary = state.clipboard.paste(ctx.mesh, &self.options)?;
        Ok(Report::info(format!(
            "{} face(s) are pasted to {}",
            summary.faces,
            summary.layers.join(", ")
        )))
    }
}
