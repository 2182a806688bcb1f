//! Body CRUD operations

use std::collections::HashMap;

use shared::{BodyId, BodyTransform, Dimensions, Group, RigidBody};

use super::SceneState;
use crate::error::{EngineError, Result};
use crate::history::{ActionKind, StateMap};
use crate::validation::BodyValidator;

impl SceneState {
    /// Create a new body with a generated ID
    pub fn create_body(
        &mut self,
        name: String,
        dimensions: Dimensions,
        transform: BodyTransform,
    ) -> Result<BodyId> {
        let body_id = uuid::Uuid::new_v4().to_string();
        let mut body = RigidBody::new(body_id, dimensions).named(name);
        body.set_transform(transform);
        self.insert_body(body)
    }

    /// Add a fully specified body. The ID must be new.
    pub fn insert_body(&mut self, body: RigidBody) -> Result<BodyId> {
        BodyValidator::new(&body).check()?;
        if self.get_body(&body.id).is_some() {
            return Err(EngineError::MalformedBody {
                id: body.id,
                reason: "ID already exists".to_string(),
            });
        }

        let body_id = body.id.clone();
        let before = StateMap::from([(body_id.clone(), None)]);
        let after = StateMap::from([(body_id.clone(), Some(body.clone()))]);
        self.history
            .record(ActionKind::Create, vec![body_id.clone()], before, after)?;

        self.scene.upsert_body(body);
        self.version += 1;
        self.refresh_collisions();
        tracing::debug!("Created body {body_id}");
        Ok(body_id)
    }

    /// Copy bodies, shifted by `offset`. Copies get new IDs; copies of a
    /// group's members land together in a new group.
    pub fn duplicate(&mut self, ids: &[BodyId], offset: [f64; 3]) -> Result<Vec<BodyId>> {
        let sources: Vec<RigidBody> = ids
            .iter()
            .map(|id| self.require_body(id).cloned())
            .collect::<Result<_>>()?;

        let mut group_map: HashMap<String, String> = HashMap::new();
        let copies: Vec<RigidBody> = sources
            .into_iter()
            .map(|mut body| {
                body.id = uuid::Uuid::new_v4().to_string();
                for (p, o) in body.position.iter_mut().zip(offset) {
                    *p += o;
                }
                body.group_id = body.group_id.map(|g| {
                    group_map
                        .entry(g)
                        .or_insert_with(|| uuid::Uuid::new_v4().to_string())
                        .clone()
                });
                body
            })
            .collect();

        let new_ids: Vec<BodyId> = copies.iter().map(|b| b.id.clone()).collect();
        let before = new_ids.iter().map(|id| (id.clone(), None)).collect();
        let after = copies.iter().map(|b| (b.id.clone(), Some(b.clone()))).collect();
        self.history
            .record(ActionKind::Duplicate, new_ids.clone(), before, after)?;

        for (source, copy) in &group_map {
            let name = match self.scene.group(source) {
                Some(group) if !group.name.is_empty() => format!("{} copy", group.name),
                _ => copy.clone(),
            };
            self.scene.groups.push(Group {
                id: copy.clone(),
                name,
                members: Vec::new(),
            });
        }
        for copy in copies {
            self.scene.upsert_body(copy);
        }
        self.version += 1;
        self.refresh_collisions();
        tracing::debug!("Duplicated {} bodies", new_ids.len());
        Ok(new_ids)
    }

    /// Remove a body. Returns the removed IDs.
    pub fn remove_body(&mut self, body_id: &str) -> Result<Vec<BodyId>> {
        self.remove_bodies(&[body_id.to_string()])
    }

    /// Remove several bodies in one undoable step
    pub fn remove_bodies(&mut self, ids: &[BodyId]) -> Result<Vec<BodyId>> {
        for id in ids {
            self.require_body(id)?;
        }
        let before = self.snapshot(ids);
        let after = ids.iter().map(|id| (id.clone(), None)).collect();
        self.history
            .record(ActionKind::Delete, ids.to_vec(), before, after)?;

        for id in ids {
            self.scene.remove_body(id);
        }
        self.version += 1;
        self.refresh_collisions();
        Ok(ids.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cabinet, cube_at, scene_with};

    #[test]
    fn test_create_body_assigns_id() {
        let mut state = SceneState::default();
        let id = state
            .create_body(
                "Side".to_string(),
                Dimensions::new(18.0, 720.0, 560.0),
                BodyTransform::at([0.0, 360.0, 0.0]),
            )
            .unwrap();
        let body = state.get_body(&id).unwrap();
        assert_eq!(body.name, "Side");
        assert_eq!(body.position, [0.0, 360.0, 0.0]);
        assert!(state.history.can_undo());
    }

    #[test]
    fn test_create_rejects_zero_dimension() {
        let mut state = SceneState::default();
        let err = state
            .create_body(
                "Bad".to_string(),
                Dimensions::new(0.0, 1.0, 1.0),
                BodyTransform::default(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedBody { .. }));
        assert!(state.bodies().is_empty());
        assert!(!state.history.can_undo());
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let mut state = SceneState::default();
        state.insert_body(cube_at("a", 1.0, [0.0; 3])).unwrap();
        assert!(state.insert_body(cube_at("a", 2.0, [0.0; 3])).is_err());
        assert_eq!(state.bodies().len(), 1);
    }

    #[test]
    fn test_duplicate_remaps_groups() {
        let mut state = SceneState::default();
        state.set_scene(scene_with(vec![
            cube_at("a", 10.0, [0.0; 3]).in_group("g"),
            cube_at("b", 10.0, [20.0, 0.0, 0.0]).in_group("g"),
        ]));
        let copies = state
            .duplicate(&["a".to_string(), "b".to_string()], [0.0, 0.0, 100.0])
            .unwrap();
        assert_eq!(copies.len(), 2);

        let ca = state.get_body(&copies[0]).unwrap();
        let cb = state.get_body(&copies[1]).unwrap();
        assert_eq!(ca.position, [0.0, 0.0, 100.0]);
        assert!(ca.shares_group_with(cb));
        assert_ne!(ca.group_id.as_deref(), Some("g"));
    }

    #[test]
    fn test_group_table_tracks_duplicate_and_delete() {
        let mut state = SceneState::default();
        state.set_scene(scene_with(cabinet("cab", [0.0; 3])));
        let copies = state
            .duplicate(&["cab_left".to_string()], [2000.0, 0.0, 0.0])
            .unwrap();
        state.remove_body("cab_left").unwrap();

        let cab = state.scene.group("cab").unwrap();
        assert!(!cab.members.iter().any(|m| m == "cab_left"));
        assert_eq!(cab.members.len(), 3);

        let copy_group = state.scene.group_of(&copies[0]).unwrap();
        assert_eq!(copy_group.members, copies);
        assert_eq!(copy_group.name, "cab copy");

        // Undo brings the side back into its cabinet
        assert_eq!(state.undo(), Some(ActionKind::Delete));
        assert!(state.scene.group("cab").unwrap().members.iter().any(|m| m == "cab_left"));
        assert_eq!(state.undo(), Some(ActionKind::Duplicate));
        assert!(state.scene.group_of(&copies[0]).is_none());
        assert_eq!(state.scene.groups.len(), 1);
    }

    #[test]
    fn test_remove_unknown_body() {
        let mut state = SceneState::default();
        assert!(matches!(
            state.remove_body("ghost"),
            Err(EngineError::UnknownBody(_))
        ));
    }
}
