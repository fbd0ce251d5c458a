//! Stroke state machine.
//!
//! ```text
//! Idle --press--> Stroking --move/timer--> Stroking --release--> Idle
//! ```
//!
//! Init snapshots the brush config and, for Grab, the influence set. Grab
//! always deforms from that snapshot, so a stroke is a pure function of the
//! cursor offset. Pinch and Relax pick a fresh set around the press position
//! on every tick and compound.

use glam::Vec2;
use tracing::{debug, trace};
use uvmesh::UvLayerId;
use uvsculpt_config::{BrushConfig, ToolKind};

use crate::cache::SculptCaches;
use crate::deformation::{RelaxState, apply_grab, apply_pinch, apply_relax, pinch_target_uv};
use crate::error::SculptError;
use crate::influence::{InfluenceRecord, select_influenced};
use crate::tool::SculptContext;

/// Whether a stroke is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokePhase {
    #[default]
    Idle,
    Stroking,
}

/// Loops touched by one Apply or Exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    pub written: usize,
    /// Loops skipped because the relax method is unsupported
    pub unsupported: usize,
}

/// State of the current stroke
#[derive(Debug, Clone, Default)]
pub struct StrokeSession {
    phase: StrokePhase,
    cursor_initial: Vec2,
    cursor: Vec2,
    /// Grab's influence set, captured at Init
    influence: Vec<InfluenceRecord>,
    config: BrushConfig,
    layer: Option<UvLayerId>,
    warned_unsupported: bool,
}

impl StrokeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> StrokePhase {
        self.phase
    }

    pub fn is_stroking(&self) -> bool {
        self.phase == StrokePhase::Stroking
    }

    pub fn cursor_initial(&self) -> Vec2 {
        self.cursor_initial
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn influence(&self) -> &[InfluenceRecord] {
        &self.influence
    }

    /// Brush config captured at Init
    pub fn config(&self) -> &BrushConfig {
        &self.config
    }

    /// Start a stroke at `cursor`.
    ///
    /// On error the session stays Idle and nothing is written.
    pub fn init(&mut self, ctx: &mut SculptContext<'_>, cursor: Vec2) -> Result<(), SculptError> {
        ctx.config.validate()?;
        let layer = ctx.mesh.require_active_uv_layer()?;

        self.config = ctx.config.clone();
        self.layer = Some(layer);
        self.cursor_initial = cursor;
        self.cursor = cursor;
        self.warned_unsupported = false;
        self.influence = match self.config.tool {
            ToolKind::Grab => select_influenced(
                ctx.mesh,
                ctx.view,
                layer,
                cursor,
                self.config.radius,
                self.config.strength,
            ),
            ToolKind::Pinch | ToolKind::Relax => Vec::new(),
        };
        self.phase = StrokePhase::Stroking;

        debug!(
            "Stroke init: {:?} at {:?}, {} loops captured",
            self.config.tool,
            cursor,
            self.influence.len()
        );
        Ok(())
    }

    /// Deform for the current cursor position
    pub fn apply(
        &mut self,
        ctx: &mut SculptContext<'_>,
        caches: &mut SculptCaches,
        cursor: Vec2,
    ) -> ApplyOutcome {
        let Some(layer) = self.layer.filter(|_| self.is_stroking()) else {
            return ApplyOutcome::default();
        };
        self.cursor = cursor;

        if self.config.tool == ToolKind::Grab {
            let written =
                apply_grab(ctx.mesh, layer, &self.influence, self.cursor_initial, cursor);
            return ApplyOutcome {
                written,
                unsupported: 0,
            };
        }

        let records = select_influenced(
            ctx.mesh,
            ctx.view,
            layer,
            self.cursor_initial,
            self.config.radius,
            self.config.strength,
        );
        if records.is_empty() {
            return ApplyOutcome::default();
        }

        match self.config.tool {
            ToolKind::Pinch => {
                let bvh = caches.bvh(ctx.mesh);
                let Some(target) = pinch_target_uv(ctx.mesh, layer, bvh, ctx.view, cursor) else {
                    trace!("Pinch: no surface under {:?}", cursor);
                    return ApplyOutcome::default();
                };
                let invert = self.config.pinch_invert;
                let written = apply_pinch(ctx.mesh, layer, &records, target, invert);
                ApplyOutcome {
                    written,
                    unsupported: 0,
                }
            }
            ToolKind::Relax => {
                let index = caches.loop_index(ctx.mesh);
                let state = RelaxState::compute(ctx.mesh, layer, index);
                let method = self.config.relax_method;
                let outcome = apply_relax(ctx.mesh, layer, &records, &state, method);
                ApplyOutcome {
                    written: outcome.written,
                    unsupported: outcome.unsupported,
                }
            }
            ToolKind::Grab => ApplyOutcome::default(),
        }
    }

    /// Finish the stroke at `cursor` and return to Idle.
    ///
    /// Grab is applied one last time so the release position is committed.
    pub fn exit(&mut self, ctx: &mut SculptContext<'_>, cursor: Vec2) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        if let Some(layer) = self.layer.filter(|_| self.is_stroking()) {
            self.cursor = cursor;
            if self.config.tool == ToolKind::Grab {
                outcome.written =
                    apply_grab(ctx.mesh, layer, &self.influence, self.cursor_initial, cursor);
            }
            debug!("Stroke exit at {:?}", cursor);
        }
        self.reset();
        outcome
    }

    /// Drop the stroke without a final apply
    pub fn cancel(&mut self) {
        if self.is_stroking() {
            debug!("Stroke cancelled");
        }
        self.reset();
    }

    /// True the first time per stroke; used to report an unsupported method once
    pub fn note_unsupported(&mut self) -> bool {
        !std::mem::replace(&mut self.warned_unsupported, true)
    }

    fn reset(&mut self) {
        self.phase = StrokePhase::Idle;
        self.influence.clear();
        self.layer = None;
    }
}
