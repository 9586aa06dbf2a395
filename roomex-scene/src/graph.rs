use crate::layout::RoomLayout;
use crate::material::Material;
use glam::{Mat4, Quat, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Ground,
    Ceiling,
    BackWall,
    LeftWall,
    RightWall,
    FrontLeft,
    FrontRight,
    Lintel,
    Door,
}

impl SurfaceKind {
    pub fn is_front_wall(&self) -> bool {
        matches!(
            self,
            SurfaceKind::FrontLeft | SurfaceKind::FrontRight | SurfaceKind::Lintel
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box in local space, full extents.
    Cuboid { size: Vec3 },
    /// Quad in the local XY plane facing +Z.
    Plane { size: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: SurfaceKind,
    pub shape: Shape,
    pub position: Vec3,
    pub rotation: Quat,
    /// Geometry offset applied before rotation; moves the pivot off-centre.
    pub offset: Vec3,
    pub material: Material,
}

impl SceneNode {
    pub fn cuboid(kind: SurfaceKind, size: Vec3, position: Vec3, material: Material) -> Self {
        Self {
            kind,
            shape: Shape::Cuboid { size },
            position,
            rotation: Quat::IDENTITY,
            offset: Vec3::ZERO,
            material,
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_translation(self.offset)
    }

    /// Cuboid extents, or `None` for planes.
    pub fn size(&self) -> Option<Vec3> {
        match self.shape {
            Shape::Cuboid { size } => Some(size),
            Shape::Plane { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient { intensity: f32 },
    Point { position: Vec3, intensity: f32 },
}

/// Everything drawn for one trial
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub layout: RoomLayout,
    pub nodes: Vec<SceneNode>,
    pub lights: Vec<Light>,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub sky_color: [u8; 4],
}

impl SceneGraph {
    pub fn count(&self, kind: SurfaceKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn node(&self, kind: SurfaceKind) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.kind == kind)
    }

    pub fn door(&self) -> Option<&SceneNode> {
        self.node(SurfaceKind::Door)
    }

    pub fn door_mut(&mut self) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.kind == SurfaceKind::Door)
    }

    pub fn front_wall(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|n| n.kind.is_front_wall())
    }
}
