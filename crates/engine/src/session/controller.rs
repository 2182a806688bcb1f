//! Transform session controller.
//!
//! `Idle → Dragging → (Committing → Idle) | (cancel → Idle)`. While dragging,
//! pointer events only queue; `on_frame` recomputes the preview from the
//! latest one. The scene is written exactly once, on release.

use std::collections::{BTreeMap, HashSet};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use shared::{BodyId, BodyPatch, RigidBody};

use super::drag_plane::PointerRay;
use super::frame::FrameGate;
use super::inference::{infer_axis, quantize, quantize_vec};
use super::preview::{rotate_about, PreviewEntry, PreviewFrame, PreviewMap};
use super::resize::{resize, ResizeHandle};
use crate::collision::CollisionSet;
use crate::error::{EngineError, Result};
use crate::geometry::{vec3, BoundingGeometry};
use crate::history::ActionKind;
use crate::snap::{snap_translation, Axis, SnapContext, SnapPoint};
use crate::state::scene::SceneState;
use crate::state::settings::EngineSettings;
use crate::validation::BodyValidator;

/// What a session does to its bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformKind {
    Translate,
    /// Rotation about a world axis through the pivot
    Rotate { axis: Axis },
    Resize { handle: ResizeHandle },
}

impl TransformKind {
    pub fn action(&self) -> ActionKind {
        match self {
            TransformKind::Translate => ActionKind::Translate,
            TransformKind::Rotate { .. } => ActionKind::Rotate,
            TransformKind::Resize { .. } => ActionKind::Resize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Dragging,
    Committing,
}

/// One pointer event: a world-space point, or a ray to intersect with the
/// drag plane (the ray wins when both are present)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    #[serde(default)]
    pub point: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ray: Option<PointerRay>,
    /// Constraint reported by the input device (gizmo handle, modifier)
    #[serde(default)]
    pub constraint: Option<Axis>,
    /// Precision modifier: quantize to the grid
    #[serde(default)]
    pub precision: bool,
}

impl PointerInput {
    pub fn at(point: [f64; 3]) -> Self {
        Self {
            point,
            ray: None,
            constraint: None,
            precision: false,
        }
    }

    pub fn from_ray(ray: PointerRay) -> Self {
        Self {
            ray: Some(ray),
            ..Self::at([0.0; 3])
        }
    }

    pub fn constrained(mut self, axis: Axis) -> Self {
        self.constraint = Some(axis);
        self
    }

    pub fn precise(mut self) -> Self {
        self.precision = true;
        self
    }
}

/// Result of releasing a session
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    /// False when nothing moved and no undo entry was pushed
    pub committed: bool,
    /// Bodies whose stored state changed
    pub bodies: Vec<BodyId>,
    pub collisions: CollisionSet,
}

/// Per-session scratch state, mutated in place every frame
struct TransformSession {
    kind: TransformKind,
    moving: HashSet<BodyId>,
    frozen: BTreeMap<BodyId, RigidBody>,
    /// Primary body's center, or the group pivot in multi-body mode
    reference: DVec3,
    /// Frozen centroid; only set with two or more bodies
    pivot: Option<DVec3>,
    anchor: DVec3,
    axis: Option<Axis>,
    preview: PreviewMap,
    snap_points: Vec<SnapPoint>,
}

impl TransformSession {
    fn recompute(&mut self, mut input: PointerInput, scene: &SceneState, settings: &EngineSettings) {
        if let Some(ray) = input.ray {
            // Plane through the press point, oriented by the device constraint
            let Some(point) = ray.resolve(input.constraint, self.anchor) else {
                tracing::debug!("Pointer ray misses the drag plane; keeping last preview");
                return;
            };
            input.point = point.to_array();
        }
        let raw = vec3(input.point) - self.anchor;
        match self.kind {
            TransformKind::Translate => self.translate(raw, input, scene, settings),
            TransformKind::Rotate { axis } => self.rotate(axis, input, settings),
            TransformKind::Resize { handle } => self.resize(handle, raw, input, scene, settings),
        }
    }

    fn snap_context<'a>(&'a self, scene: &'a SceneState, settings: &'a EngineSettings) -> SnapContext<'a> {
        SnapContext {
            bodies: scene.bodies(),
            room: &scene.scene.room,
            settings: &settings.snap,
            moving: &self.moving,
        }
    }

    fn translate(&mut self, raw: DVec3, input: PointerInput, scene: &SceneState, settings: &EngineSettings) {
        // The inferred axis only steers snapping; a device constraint also
        // projects the pointer motion
        self.axis = infer_axis(raw, input.constraint, self.axis, settings.session.axis_threshold);
        let mut delta = match input.constraint {
            Some(a) => a.project(raw),
            None => raw,
        };
        if input.precision {
            delta = quantize_vec(delta, settings.grid.step);
        }

        let mut points = Vec::new();
        if delta != DVec3::ZERO {
            let movers: Vec<BoundingGeometry> = self
                .frozen
                .values()
                .filter_map(BoundingGeometry::of)
                .map(|g| g.translated(delta))
                .collect();
            let ctx = self.snap_context(scene, settings);
            let result = snap_translation(&movers, self.reference + delta, self.axis, &ctx);
            if result.snapped {
                // Components outside the snap axis get an exact zero here
                delta += result.position - (self.reference + delta);
                points = result.points;
            }
        }

        for (id, body) in &self.frozen {
            let mut entry = PreviewEntry::of(body);
            if delta != DVec3::ZERO {
                entry.position = (vec3(body.position) + delta).to_array();
            }
            self.preview.insert(id.clone(), entry);
        }
        self.snap_points = points;
    }

    fn rotate(&mut self, axis: Axis, input: PointerInput, settings: &EngineSettings) {
        self.axis = Some(axis);
        let normal = axis.direction();
        let flatten = |v: DVec3| v - normal * normal.dot(v);
        let from = flatten(self.anchor - self.reference);
        let to = flatten(vec3(input.point) - self.reference);

        let mut angle = if from.length() < 1e-9 || to.length() < 1e-9 {
            0.0
        } else {
            normal.dot(from.cross(to)).atan2(from.dot(to))
        };
        if input.precision {
            angle = quantize(angle.to_degrees(), settings.grid.rotation_step_deg).to_radians();
        }

        for (id, body) in &self.frozen {
            let pivot = self.pivot.unwrap_or_else(|| vec3(body.position));
            self.preview
                .insert(id.clone(), rotate_about(body, pivot, normal, angle));
        }
        self.snap_points.clear();
    }

    fn resize(
        &mut self,
        handle: ResizeHandle,
        raw: DVec3,
        input: PointerInput,
        scene: &SceneState,
        settings: &EngineSettings,
    ) {
        self.axis = Some(handle.axis);
        let ctx = self.snap_context(scene, settings);
        let outcomes: Vec<(BodyId, PreviewEntry, Option<SnapPoint>)> = self
            .frozen
            .iter()
            .map(|(id, body)| {
                let out = resize(body, handle, raw, input.precision, settings, &ctx);
                (id.clone(), out.entry, out.snap_point)
            })
            .collect();

        self.snap_points.clear();
        for (id, entry, point) in outcomes {
            self.preview.insert(id, entry);
            self.snap_points.extend(point);
        }
    }

    fn patches(&self) -> Vec<BodyPatch> {
        self.preview
            .iter()
            .filter_map(|(id, entry)| entry.patch_against(self.frozen.get(id)?))
            .collect()
    }
}

/// Drives one transform session at a time
#[derive(Default)]
pub struct TransformController {
    phase: SessionPhase,
    session: Option<TransformSession>,
    gate: FrameGate<PointerInput>,
    frame_version: u64,
    last_frame: Option<PreviewFrame>,
}

impl TransformController {
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Live transforms of the running session
    pub fn preview(&self) -> Option<&PreviewMap> {
        self.session.as_ref().map(|s| &s.preview)
    }

    /// Most recently emitted frame
    pub fn last_frame(&self) -> Option<&PreviewFrame> {
        self.last_frame.as_ref()
    }

    /// Pointer events merged into later ones since the controller was created
    pub fn coalesced_events(&self) -> u64 {
        self.gate.coalesced()
    }

    /// Press: freeze the affected bodies and open a history batch.
    ///
    /// Translate and rotate expand the selection to whole groups; resize
    /// works on the first id only. Malformed bodies are rejected here.
    pub fn begin(
        &mut self,
        scene: &mut SceneState,
        ids: &[BodyId],
        kind: TransformKind,
        start: [f64; 3],
    ) -> Result<()> {
        if self.session.is_some() {
            tracing::warn!("Rejected {kind:?} session: another session is active");
            return Err(EngineError::SessionActive);
        }
        let Some(first) = ids.first() else {
            return Err(EngineError::EmptySelection);
        };

        let targets = match kind {
            TransformKind::Resize { .. } => vec![scene.require_body(first)?.id.clone()],
            _ => scene.expand_to_groups(ids)?,
        };

        let mut frozen = BTreeMap::new();
        let mut reference = DVec3::ZERO;
        for id in &targets {
            let body = scene.require_body(id)?;
            BodyValidator::new(body).check()?;
            if id == &targets[0] {
                reference = vec3(body.position);
            }
            frozen.insert(id.clone(), body.clone());
        }

        scene.begin_batch(kind.action(), &targets)?;

        let pivot = (frozen.len() >= 2).then(|| {
            frozen.values().map(|b| vec3(b.position)).sum::<DVec3>() / frozen.len() as f64
        });
        let preview: PreviewMap = frozen
            .iter()
            .map(|(id, b)| (id.clone(), PreviewEntry::of(b)))
            .collect();

        tracing::debug!(
            "Begin {kind:?} session on {} bodies{}",
            frozen.len(),
            if pivot.is_some() { " (rigid group)" } else { "" }
        );

        self.session = Some(TransformSession {
            kind,
            moving: targets.into_iter().collect(),
            frozen,
            reference: pivot.unwrap_or(reference),
            pivot,
            anchor: vec3(start),
            axis: None,
            preview,
            snap_points: Vec::new(),
        });
        self.gate.clear();
        self.phase = SessionPhase::Dragging;
        Ok(())
    }

    /// Move: queue the event for the next frame
    pub fn pointer_move(&mut self, input: PointerInput) -> Result<()> {
        if self.session.is_none() {
            return Err(EngineError::NoActiveSession);
        }
        self.gate.push(input);
        Ok(())
    }

    /// Frame tick: recompute from the latest queued event and emit a preview.
    /// Returns `None` when nothing was queued.
    pub fn on_frame(&mut self, scene: &SceneState, settings: &EngineSettings) -> Option<PreviewFrame> {
        let session = self.session.as_mut()?;
        let input = self.gate.take()?;
        session.recompute(input, scene, settings);
        self.emit_preview()
    }

    /// Publish the current preview with a new version
    pub fn emit_preview(&mut self) -> Option<PreviewFrame> {
        let session = self.session.as_ref()?;
        self.frame_version += 1;
        let frame = PreviewFrame {
            version: self.frame_version,
            transforms: session.preview.clone(),
            snap_points: session.snap_points.clone(),
            axis: session.axis,
        };
        self.last_frame = Some(frame.clone());
        Some(frame)
    }

    /// Release: write the final preview in one batch, refresh collisions once
    /// and seal the history batch. An unchanged preview pushes no undo entry.
    pub fn release(&mut self, scene: &mut SceneState, settings: &EngineSettings) -> Result<CommitReport> {
        if self.session.is_none() {
            return Err(EngineError::NoActiveSession);
        }
        self.on_frame(scene, settings);
        self.phase = SessionPhase::Committing;

        let Some(session) = self.session.take() else {
            self.phase = SessionPhase::Idle;
            return Err(EngineError::NoActiveSession);
        };
        let patches = session.patches();
        let result = scene.commit_batch(&patches);
        self.phase = SessionPhase::Idle;
        self.gate.clear();

        let committed = result?;
        let bodies: Vec<BodyId> = patches.into_iter().map(|p| p.id).collect();
        if committed {
            tracing::info!("Committed {:?} of {} bodies", session.kind, bodies.len());
        } else {
            tracing::debug!("Released {:?} session without changes", session.kind);
        }
        Ok(CommitReport {
            committed,
            bodies,
            collisions: scene.collisions().clone(),
        })
    }

    /// Cancel: drop the preview and the open batch. Nothing is written.
    pub fn cancel(&mut self, scene: &mut SceneState) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Err(EngineError::NoActiveSession);
        };
        self.gate.clear();
        self.phase = SessionPhase::Idle;
        self.last_frame = None;
        tracing::debug!("Cancelled {:?} session", session.kind);
        scene.discard_batch()
    }
}
