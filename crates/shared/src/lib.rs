use serde::{Deserialize, Serialize};

/// Уникальный идентификатор детали (панели)
pub type BodyId = String;

/// Уникальный идентификатор группы (корпуса / сборки)
pub type GroupId = String;

/// Уникальный идентификатор стены комнаты
pub type WallId = String;

/// Габариты детали: ширина (X), высота (Y), глубина (Z) в локальных осях
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.width, self.height, self.depth]
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// Половинные размеры (для построения углов)
    pub fn half_extents(&self) -> [f64; 3] {
        [self.width * 0.5, self.height * 0.5, self.depth * 0.5]
    }

    /// Все размеры конечны и строго положительны
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Положение и ориентация детали.
///
/// `rotation` — внутренние углы Эйлера в радианах, порядок X → Y → Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BodyTransform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

impl BodyTransform {
    pub fn new(position: [f64; 3], rotation: [f64; 3]) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: [f64; 3]) -> Self {
        Self::new(position, [0.0; 3])
    }
}

/// Деталь — твёрдое тело с фиксированными габаритами
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub id: BodyId,
    /// Имя детали (для отображения)
    #[serde(default)]
    pub name: String,
    pub dimensions: Dimensions,
    /// Центр детали в мировых координатах
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    /// Корпус, которому принадлежит деталь (ссылка по id, не владение)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl RigidBody {
    pub fn new(id: impl Into<BodyId>, dimensions: Dimensions) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            dimensions,
            position: [0.0; 3],
            rotation: [0.0; 3],
            group_id: None,
        }
    }

    pub fn at(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn in_group(mut self, group_id: impl Into<GroupId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn transform(&self) -> BodyTransform {
        BodyTransform::new(self.position, self.rotation)
    }

    pub fn set_transform(&mut self, transform: BodyTransform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
    }

    /// Две детали одного корпуса никогда не притягиваются и не сталкиваются
    pub fn shares_group_with(&self, other: &RigidBody) -> bool {
        matches!((&self.group_id, &other.group_id), (Some(a), Some(b)) if a == b)
    }
}

/// Корпус — набор деталей, которые двигаются как единое целое
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    /// Группа владеет списком своих деталей
    pub members: Vec<BodyId>,
}

// ============================================================================
// Комната: статические плоскости для притягивания к стенам
// ============================================================================

/// Стена — плоскость `dot(normal, p) = offset`, нормаль смотрит внутрь комнаты
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub normal: [f64; 3],
    pub offset: f64,
}

impl Wall {
    pub fn new(id: impl Into<WallId>, normal: [f64; 3], offset: f64) -> Self {
        Self {
            id: id.into(),
            normal,
            offset,
        }
    }

    /// Знаковое расстояние от точки до стены (положительное — внутри комнаты)
    pub fn signed_distance(&self, point: [f64; 3]) -> f64 {
        self.normal[0] * point[0] + self.normal[1] * point[1] + self.normal[2] * point[2]
            - self.offset
    }
}

/// Комната — набор стен (и пола)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Room {
    pub walls: Vec<Wall>,
}

impl Room {
    /// Прямоугольная комната: пол на y = 0, стены на x = 0, x = width, z = 0, z = depth
    pub fn rectangular(width: f64, depth: f64) -> Self {
        Self {
            walls: vec![
                Wall::new("floor", [0.0, 1.0, 0.0], 0.0),
                Wall::new("wall_left", [1.0, 0.0, 0.0], 0.0),
                Wall::new("wall_right", [-1.0, 0.0, 0.0], -width),
                Wall::new("wall_back", [0.0, 0.0, 1.0], 0.0),
                Wall::new("wall_front", [0.0, 0.0, -1.0], -depth),
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

// ============================================================================
// Сцена и пакетное обновление
// ============================================================================

fn default_version() -> u32 {
    1
}

/// Описание сцены — детали, корпуса и (необязательно) комната
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Версия формата
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub bodies: Vec<RigidBody>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub room: Room,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            version: 1,
            bodies: Vec::new(),
            groups: Vec::new(),
            room: Room::default(),
        }
    }
}

impl Scene {
    pub fn body(&self, id: &str) -> Option<&RigidBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Корпус детали: ищется по `group_id` в таблице групп
    pub fn group_of(&self, body_id: &str) -> Option<&Group> {
        let group_id = self.body(body_id)?.group_id.as_deref()?;
        self.group(group_id)
    }

    /// Вставить или заменить деталь; таблица групп обновляется
    pub fn upsert_body(&mut self, body: RigidBody) {
        let previous = self.body(&body.id).map(|b| b.group_id.clone());
        if previous.is_some_and(|g| g != body.group_id) {
            self.detach(&body.id);
        }
        if let Some(group_id) = body.group_id.clone() {
            self.attach(&body.id, &group_id);
        }
        match self.bodies.iter_mut().find(|b| b.id == body.id) {
            Some(existing) => *existing = body,
            None => self.bodies.push(body),
        }
    }

    /// Удалить деталь и её запись в таблице групп
    pub fn remove_body(&mut self, body_id: &str) -> Option<RigidBody> {
        let index = self.bodies.iter().position(|b| b.id == body_id)?;
        self.detach(body_id);
        Some(self.bodies.remove(index))
    }

    /// Привести таблицу групп в соответствие с `group_id` деталей
    /// (после загрузки сцены из файла)
    pub fn sync_groups(&mut self) {
        let bodies = &self.bodies;
        for group in &mut self.groups {
            group.members.retain(|m| {
                bodies
                    .iter()
                    .any(|b| &b.id == m && b.group_id.as_deref() == Some(group.id.as_str()))
            });
        }
        let memberships: Vec<(BodyId, GroupId)> = self
            .bodies
            .iter()
            .filter_map(|b| Some((b.id.clone(), b.group_id.clone()?)))
            .collect();
        for (body_id, group_id) in memberships {
            self.attach(&body_id, &group_id);
        }
        self.groups.retain(|g| !g.members.is_empty());
    }

    fn attach(&mut self, body_id: &str, group_id: &str) {
        match self.groups.iter_mut().find(|g| g.id == group_id) {
            Some(group) => {
                if !group.members.iter().any(|m| m == body_id) {
                    group.members.push(body_id.to_string());
                }
            }
            None => self.groups.push(Group {
                id: group_id.to_string(),
                name: group_id.to_string(),
                members: vec![body_id.to_string()],
            }),
        }
    }

    /// Пустые группы удаляются
    fn detach(&mut self, body_id: &str) {
        for group in &mut self.groups {
            group.members.retain(|m| m != body_id);
        }
        self.groups.retain(|g| !g.members.is_empty());
    }
}

/// Частичное обновление детали для пакетной записи `[{id, patch}]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPatch {
    pub id: BodyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

impl BodyPatch {
    /// Патч, полностью повторяющий состояние детали
    pub fn from_body(body: &RigidBody) -> Self {
        Self {
            id: body.id.clone(),
            position: Some(body.position),
            rotation: Some(body.rotation),
            dimensions: Some(body.dimensions),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.dimensions.is_none()
    }

    pub fn apply_to(&self, body: &mut RigidBody) {
        if let Some(position) = self.position {
            body.position = position;
        }
        if let Some(rotation) = self.rotation {
            body.rotation = rotation;
        }
        if let Some(dimensions) = self.dimensions {
            body.dimensions = dimensions;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(val: &T) {
        let json = serde_json::to_string(val).expect("serialize");
        let back: T = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(*val, back);
    }

    #[test]
    fn test_dimensions_validity() {
        assert!(Dimensions::new(100.0, 50.0, 18.0).is_valid());
        assert!(!Dimensions::new(0.0, 50.0, 18.0).is_valid());
        assert!(!Dimensions::new(100.0, -1.0, 18.0).is_valid());
        assert!(!Dimensions::new(f64::NAN, 1.0, 1.0).is_valid());
        assert_eq!(Dimensions::new(100.0, 50.0, 18.0).half_extents(), [50.0, 25.0, 9.0]);
    }

    #[test]
    fn test_body_serde_defaults() {
        let json = r#"{"id": "p1", "dimensions": {"width": 10, "height": 20, "depth": 2}}"#;
        let body: RigidBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.position, [0.0; 3]);
        assert_eq!(body.rotation, [0.0; 3]);
        assert!(body.group_id.is_none());

        let out = serde_json::to_string(&body).unwrap();
        assert!(!out.contains("group_id"));
    }

    #[test]
    fn test_body_roundtrip_with_group() {
        let body = RigidBody::new("side", Dimensions::new(18.0, 720.0, 560.0))
            .at([1.0, 2.0, 3.0])
            .rotated([0.0, std::f64::consts::FRAC_PI_2, 0.0])
            .in_group("cab1");
        roundtrip(&body);
    }

    #[test]
    fn test_shares_group_with() {
        let a = RigidBody::new("a", Dimensions::default()).in_group("g");
        let b = RigidBody::new("b", Dimensions::default()).in_group("g");
        let c = RigidBody::new("c", Dimensions::default());
        let d = RigidBody::new("d", Dimensions::default());
        assert!(a.shares_group_with(&b));
        assert!(!a.shares_group_with(&c));
        // Ungrouped parts are never in the same group
        assert!(!c.shares_group_with(&d));
    }

    #[test]
    fn test_rectangular_room_walls() {
        let room = Room::rectangular(3000.0, 2000.0);
        assert_eq!(room.walls.len(), 5);

        let inside = [1500.0, 100.0, 1000.0];
        for wall in &room.walls {
            assert!(wall.signed_distance(inside) > 0.0, "{} should face inward", wall.id);
        }

        let right = room.walls.iter().find(|w| w.id == "wall_right").unwrap();
        assert_eq!(right.signed_distance([2990.0, 0.0, 0.0]), 10.0);
    }

    #[test]
    fn test_scene_group_lookup() {
        let scene = Scene {
            bodies: vec![
                RigidBody::new("a", Dimensions::default()).in_group("cab"),
                RigidBody::new("b", Dimensions::default()),
            ],
            groups: vec![Group {
                id: "cab".into(),
                name: "Cabinet".into(),
                members: vec!["a".into()],
            }],
            ..Scene::default()
        };
        assert_eq!(scene.group_of("a").map(|g| g.id.as_str()), Some("cab"));
        assert!(scene.group_of("b").is_none());
        assert!(scene.group_of("missing").is_none());
    }

    #[test]
    fn test_group_table_follows_body_changes() {
        let mut scene = Scene::default();
        scene.upsert_body(RigidBody::new("a", Dimensions::default()).in_group("cab"));
        scene.upsert_body(RigidBody::new("b", Dimensions::default()).in_group("cab"));
        assert_eq!(scene.group("cab").unwrap().members, vec!["a", "b"]);

        // Regrouping moves the membership
        scene.upsert_body(RigidBody::new("b", Dimensions::default()).in_group("shelf"));
        assert_eq!(scene.group("cab").unwrap().members, vec!["a"]);
        assert_eq!(scene.group_of("b").unwrap().id, "shelf");

        assert!(scene.remove_body("a").is_some());
        assert!(scene.group("cab").is_none());
        assert!(scene.remove_body("a").is_none());
    }

    #[test]
    fn test_sync_groups_repairs_loaded_table() {
        let mut scene = Scene {
            bodies: vec![
                RigidBody::new("a", Dimensions::default()).in_group("cab"),
                RigidBody::new("b", Dimensions::default()).in_group("cab"),
            ],
            groups: vec![
                Group {
                    id: "cab".into(),
                    name: "Cabinet".into(),
                    members: vec!["a".into(), "gone".into()],
                },
                Group {
                    id: "empty".into(),
                    name: String::new(),
                    members: vec![],
                },
            ],
            ..Scene::default()
        };
        scene.sync_groups();
        assert_eq!(scene.groups.len(), 1);
        assert_eq!(scene.groups[0].name, "Cabinet");
        assert_eq!(scene.groups[0].members, vec!["a", "b"]);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut body = RigidBody::new("a", Dimensions::new(1.0, 2.0, 3.0)).at([5.0, 5.0, 5.0]);
        let patch = BodyPatch {
            id: "a".into(),
            position: Some([1.0, 0.0, 0.0]),
            rotation: None,
            dimensions: None,
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut body);
        assert_eq!(body.position, [1.0, 0.0, 0.0]);
        assert_eq!(body.dimensions, Dimensions::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_scene_json_defaults() {
        let scene: Scene = serde_json::from_str(r#"{"bodies": []}"#).unwrap();
        assert_eq!(scene.version, 1);
        assert!(scene.room.is_empty());
        roundtrip(&scene);
    }
}
