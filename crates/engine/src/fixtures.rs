//! Factory functions for creating test data.
//!
//! Provides convenient helpers to construct `RigidBody`, cabinets and `Scene`
//! values used in tests and by the command interface.

use shared::*;

// ── Body factories ──────────────────────────────────────────────

/// Create a cube body of edge `size` centered at `pos`.
pub fn cube_at(id: &str, size: f64, pos: [f64; 3]) -> RigidBody {
    RigidBody::new(id, Dimensions::new(size, size, size)).at(pos)
}

/// Create a panel body with `[width, height, depth]` centered at `pos`.
pub fn panel_at(id: &str, dims: [f64; 3], pos: [f64; 3]) -> RigidBody {
    RigidBody::new(id, Dimensions::from_array(dims)).at(pos)
}

/// Panel thickness used by [`cabinet`]
pub const CABINET_BOARD: f64 = 18.0;
/// Outer width, height and depth of a [`cabinet`]
pub const CABINET_SIZE: [f64; 3] = [600.0, 720.0, 560.0];

/// A carcass of four panels (two sides, top, bottom) grouped under `group`.
///
/// `origin` is the center of the carcass floor line; member ids are
/// `{group}_left`, `{group}_right`, `{group}_top`, `{group}_bottom`.
pub fn cabinet(group: &str, origin: [f64; 3]) -> Vec<RigidBody> {
    let [w, h, d] = CABINET_SIZE;
    let t = CABINET_BOARD;
    let [ox, oy, oz] = origin;
    let side_x = w * 0.5 - t * 0.5;
    let inner = w - 2.0 * t;

    vec![
        panel_at(&format!("{group}_left"), [t, h, d], [ox - side_x, oy + h * 0.5, oz]),
        panel_at(&format!("{group}_right"), [t, h, d], [ox + side_x, oy + h * 0.5, oz]),
        panel_at(&format!("{group}_top"), [inner, t, d], [ox, oy + h - t * 0.5, oz]),
        panel_at(&format!("{group}_bottom"), [inner, t, d], [ox, oy + t * 0.5, oz]),
    ]
    .into_iter()
    .map(|b| b.in_group(group))
    .collect()
}

// ── Scene factories ─────────────────────────────────────────────

/// Scene with the given bodies. A `Group` entry is created for every `group_id`.
pub fn scene_with(bodies: Vec<RigidBody>) -> Scene {
    let mut scene = Scene {
        bodies,
        ..Scene::default()
    };
    scene.sync_groups();
    scene
}

/// Scene inside a rectangular room
pub fn room_scene(width: f64, depth: f64, bodies: Vec<RigidBody>) -> Scene {
    Scene {
        room: Room::rectangular(width, depth),
        ..scene_with(bodies)
    }
}
