use crate::error::SceneError;
use crate::graph::{Light, SceneGraph, SceneNode, Shape, SurfaceKind};
use crate::layout::RoomLayout;
use crate::material::AssetCatalog;
use glam::{Quat, Vec2, Vec3};
use roomex_core::RoomConfig;
use std::f32::consts::FRAC_PI_2;

/// Side of the square ground plane, metres.
pub const GROUND_SIZE: f32 = 1000.0;

/// Distance from the doorway to where the subject starts.
pub const START_DISTANCE: f32 = 5.0;

const SKY_COLOR: [u8; 4] = [150, 190, 235, 255];

/// Builds room scene graphs from trial parameters.
#[derive(Debug, Clone)]
pub struct RoomBuilder {
    catalog: AssetCatalog,
    door_width: Option<f32>,
    wall_thickness: Option<f32>,
}

impl RoomBuilder {
    pub fn new(catalog: AssetCatalog) -> Self {
        Self {
            catalog,
            door_width: None,
            wall_thickness: None,
        }
    }

    pub fn door_width(mut self, width: f32) -> Self {
        self.door_width = Some(width);
        self
    }

    pub fn wall_thickness(mut self, thickness: f32) -> Self {
        self.wall_thickness = Some(thickness);
        self
    }

    pub fn layout(&self, config: &RoomConfig) -> Result<RoomLayout, SceneError> {
        let mut layout = RoomLayout::from_config(config)?;
        if let Some(width) = self.door_width {
            layout = layout.with_door_width(width)?;
        }
        if let Some(thickness) = self.wall_thickness {
            layout = layout.with_wall_thickness(thickness)?;
        }
        Ok(layout)
    }

    pub fn build(&self, config: &RoomConfig) -> Result<SceneGraph, SceneError> {
        let l = self.layout(config)?;
        let wall = self.catalog.wall(config.wall);
        let (w, h, d, t) = (l.width, l.wall_height, l.depth, l.wall_thickness);
        let (dw, dh) = (l.door_width, l.door_height);
        let front = l.front_z();
        let side = l.side_segment_width();

        let ground = SceneNode {
            kind: SurfaceKind::Ground,
            shape: Shape::Plane {
                size: Vec2::splat(GROUND_SIZE),
            },
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_x(-FRAC_PI_2),
            offset: Vec3::ZERO,
            material: self.catalog.ground(config.ground),
        };

        // hinge on the doorway's +x edge; the panel hangs towards -x
        let door = SceneNode {
            kind: SurfaceKind::Door,
            shape: Shape::Cuboid {
                size: Vec3::new(dw, dh, l.door_thickness),
            },
            position: Vec3::new(dw * 0.5, dh * 0.5, front),
            rotation: Quat::IDENTITY,
            offset: Vec3::new(-dw * 0.5, 0.0, 0.0),
            material: self.catalog.door(),
        };

        let nodes = vec![
            ground,
            door,
            SceneNode::cuboid(
                SurfaceKind::Ceiling,
                Vec3::new(w - t, t, d - t),
                Vec3::new(0.0, h - t * 0.5, 0.0),
                wall,
            ),
            SceneNode::cuboid(
                SurfaceKind::BackWall,
                Vec3::new(w, h, t),
                Vec3::new(0.0, h * 0.5, l.back_z()),
                wall,
            ),
            SceneNode::cuboid(
                SurfaceKind::LeftWall,
                Vec3::new(t, h, d),
                Vec3::new(-w * 0.5, h * 0.5, 0.0),
                wall,
            ),
            SceneNode::cuboid(
                SurfaceKind::RightWall,
                Vec3::new(t, h, d),
                Vec3::new(w * 0.5, h * 0.5, 0.0),
                wall,
            ),
            SceneNode::cuboid(
                SurfaceKind::FrontLeft,
                Vec3::new(side, h, t),
                Vec3::new(-(dw + side) * 0.5, h * 0.5, front),
                wall,
            ),
            SceneNode::cuboid(
                SurfaceKind::FrontRight,
                Vec3::new(side, h, t),
                Vec3::new((dw + side) * 0.5, h * 0.5, front),
                wall,
            ),
            SceneNode::cuboid(
                SurfaceKind::Lintel,
                Vec3::new(dw, l.lintel_height(), t),
                Vec3::new(0.0, (h + dh) * 0.5, front),
                wall,
            ),
        ];

        let eye = l.eye_height();
        tracing::debug!(
            width = w,
            height = h,
            depth = d,
            wall = config.wall,
            ground = config.ground,
            "room built"
        );

        Ok(SceneGraph {
            layout: l,
            nodes,
            lights: vec![
                Light::Ambient { intensity: 1.0 },
                Light::Point {
                    position: Vec3::new(0.0, dh, 0.0),
                    intensity: 3.0,
                },
            ],
            camera_position: Vec3::new(0.0, eye, front - START_DISTANCE),
            camera_target: Vec3::new(0.0, eye, 0.0),
            sky_color: SKY_COLOR,
        })
    }
}
