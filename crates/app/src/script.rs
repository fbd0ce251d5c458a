//! Stroke scripts: a viewport, an object transform and a timeline of
//! pointer events and commands replayed against one mesh.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uvmesh::{FaceSource, LayerSelection, PasteOptions, UvMesh, ViewProjection};
use uvsculpt_config::SculptSettings;

use sculpting::{
    Command, CommandContext, CopyUv, DisableSculpt, EditorContext, EnableSculpt, PasteUv,
    PointerInput, PointerKind, Report, SculptContext, SessionState, Severity, TickDriver,
    ToggleSculpt, execute,
};

/// Object placement in the region: uniform scale, then offset in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectTransform {
    pub scale: f32,
    pub offset: Vec2,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ObjectTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::IDENTITY,
            self.offset.extend(0.0),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Enable,
    Disable,
    Toggle,
    Press { position: Vec2 },
    Move { position: Vec2 },
    Release { position: Vec2 },
    /// Let timer ticks run without pointer input
    Wait,
    Copy {
        #[serde(default)]
        faces: FaceSource,
        #[serde(default)]
        layers: LayerSelection,
    },
    Paste {
        #[serde(default)]
        options: PasteOptions,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub time_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeScript {
    /// Region size in pixels
    pub viewport: Vec2,
    #[serde(default)]
    pub object: ObjectTransform,
    #[serde(default)]
    pub settings: Option<SculptSettings>,
    pub events: Vec<ScriptEvent>,
}

/// Counts gathered while replaying a script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    /// Responses that wrote UVs
    pub mesh_changes: usize,
    pub warnings: usize,
}

impl StrokeScript {
    pub fn view(&self) -> ViewProjection {
        ViewProjection::orthographic_region(self.viewport.x, self.viewport.y)
            .with_object_transform(self.object.matrix())
    }

    /// Replay every event in time order
    pub fn replay(&self, mesh: &mut UvMesh, settings: &SculptSettings) -> ReplaySummary {
        let view = self.view();
        let mut state = SessionState::new();
        let mut driver = TickDriver::new(settings.timer_interval_ms);
        let mut summary = ReplaySummary::default();

        let mut events: Vec<&ScriptEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.time_ms);

        for event in events {
            summary.events += 1;
            let pointer = |kind, position| PointerInput {
                time_ms: event.time_ms,
                kind,
                position,
            };

            let reports = match &event.action {
                ScriptAction::Enable => run_command(&EnableSculpt, mesh, &mut state),
                ScriptAction::Disable => run_command(&DisableSculpt, mesh, &mut state),
                ScriptAction::Toggle => run_command(&ToggleSculpt, mesh, &mut state),
                ScriptAction::Copy { faces, layers } => {
                    let copy = CopyUv {
                        faces: *faces,
                        layers: layers.clone(),
                    };
                    run_command(&copy, mesh, &mut state)
                }
                ScriptAction::Paste { options } => {
                    let paste = PasteUv {
                        options: options.clone(),
                    };
                    run_command(&paste, mesh, &mut state)
                }
                action => {
                    let mut ctx = SculptContext {
                        mesh: &mut *mesh,
                        view: &view,
                        config: &settings.brush,
                    };
                    let responses = match action {
                        ScriptAction::Press { position } => driver.dispatch(
                            &mut state.brush,
                            &mut ctx,
                            pointer(PointerKind::Press, *position),
                        ),
                        ScriptAction::Move { position } => driver.dispatch(
                            &mut state.brush,
                            &mut ctx,
                            pointer(PointerKind::Move, *position),
                        ),
                        ScriptAction::Release { position } => driver.dispatch(
                            &mut state.brush,
                            &mut ctx,
                            pointer(PointerKind::Release, *position),
                        ),
                        _ => driver.advance_to(&mut state.brush, &mut ctx, event.time_ms),
                    };
                    summary.mesh_changes += responses.iter().filter(|r| r.mesh_changed).count();
                    responses.into_iter().flat_map(|r| r.reports).collect()
                }
            };

            for report in reports {
                log_report(event.time_ms, &report);
                if report.severity != Severity::Info {
                    summary.warnings += 1;
                }
            }
        }
        summary
    }
}

fn run_command(command: &dyn Command, mesh: &mut UvMesh, state: &mut SessionState) -> Vec<Report> {
    let mut ctx = CommandContext {
        editor: EditorContext::mesh_edit(),
        mesh,
    };
    execute(command, &mut ctx, state).reports
}

fn log_report(time_ms: u64, report: &Report) {
    match report.severity {
        Severity::Info => info!("[{} ms] {}", time_ms, report.message),
        Severity::Warning | Severity::Error => warn!("[{} ms] {}", time_ms, report.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uvmesh::{FaceId, LoopRef, primitives};
    use uvsculpt_config::{BrushConfig, ToolKind};

    const SCRIPT: &str = r#"{
        "viewport": [400, 400],
        "object": { "scale": 50.0, "offset": [100, 100] },
        "events": [
            { "time_ms": 0, "action": "enable" },
            { "time_ms": 10, "action": "press", "position": [200, 200] },
            { "time_ms": 60, "action": "move", "position": [210, 200] },
            { "time_ms": 120, "action": "release", "position": [220, 200] },
            { "time_ms": 130, "action": "disable" }
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script: StrokeScript = serde_json::from_str(SCRIPT).unwrap();
        assert_eq!(script.events.len(), 5);
        assert_eq!(script.object.scale, 50.0);
        assert_eq!(
            script.events[1].action,
            ScriptAction::Press {
                position: Vec2::new(200.0, 200.0)
            }
        );
        assert!(script.settings.is_none());
    }

    #[test]
    fn test_replay_grab_stroke() {
        let script: StrokeScript = serde_json::from_str(SCRIPT).unwrap();
        let mut mesh = primitives::grid(4, 4, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let settings = SculptSettings {
            brush: BrushConfig {
                radius: 30.0,
                strength: 1.0,
                ..BrushConfig::for_tool(ToolKind::Grab)
            },
            ..SculptSettings::default()
        };

        let summary = script.replay(&mut mesh, &settings);
        assert_eq!(summary.events, 5);
        assert!(summary.mesh_changes > 0);
        assert_eq!(summary.warnings, 0);

        // Object (2, 2) sits under the press; released 20 px to the right
        let uv = mesh.loop_uv(layer, LoopRef::new(FaceId(5), 2)).unwrap();
        assert!((uv - Vec2::new(0.7, 0.5)).length() < 1e-4);
    }

    #[test]
    fn test_paste_without_copy_warns() {
        let json = r#"{
            "viewport": [100, 100],
            "events": [{ "time_ms": 0, "action": "paste" }]
        }"#;
        let script: StrokeScript = serde_json::from_str(json).unwrap();
        let mut mesh = primitives::grid(1, 1, 1.0);
        let summary = script.replay(&mut mesh, &SculptSettings::default());
        assert_eq!(summary.warnings, 1);
    }
}
