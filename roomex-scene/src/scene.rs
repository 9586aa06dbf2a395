use crate::builder::RoomBuilder;
use crate::camera::{CameraController, MovementStep};
use crate::door::DoorState;
use crate::error::SceneError;
use crate::graph::SceneGraph;
use crate::input::{KeyboardHub, KeyboardListener, MotionInput};
use glam::{Quat, Vec2, Vec3};
use roomex_core::{MotionIntent, RoomConfig};
use std::time::Duration;

/// A mounted room: its graph, door and camera, plus the keyboard
/// registration that lives exactly as long as the scene.
pub struct RoomScene {
    config: RoomConfig,
    graph: SceneGraph,
    door: DoorState,
    camera: CameraController,
    input: MotionInput,
    _listener: KeyboardListener,
    frames: u64,
}

impl RoomScene {
    pub fn mount(
        builder: &RoomBuilder,
        config: RoomConfig,
        keyboard: &KeyboardHub,
        step: MovementStep,
    ) -> Result<Self, SceneError> {
        let graph = builder.build(&config)?;
        let camera = CameraController::new(graph.camera_position, graph.camera_target, step);
        let input = MotionInput::new();
        let listener = keyboard.register(input.clone());
        tracing::info!(
            width = config.width,
            height = config.height,
            depth = config.depth,
            "room scene mounted"
        );
        Ok(Self {
            config,
            graph,
            door: DoorState::new(),
            camera,
            input,
            _listener: listener,
            frames: 0,
        })
    }

    /// One animation frame: door first, then camera. Frames with no elapsed
    /// time leave the door alone but still take a per-frame movement step.
    pub fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();
        if dt > 0.0 {
            self.frames += 1;
            if self.door.step(dt) {
                let rotation = Quat::from_rotation_y(self.door.rotation());
                if let Some(node) = self.graph.door_mut() {
                    node.rotation = rotation;
                }
            }
        }
        self.camera.apply_intent(self.input.intent(), dt);
    }

    /// Click at normalised device coordinates; toggles the door when the
    /// click lands on it.
    pub fn click(&mut self, ndc: Vec2) -> bool {
        let Some(door) = self.graph.door() else {
            return false;
        };
        let Some(size) = door.size() else {
            return false;
        };
        let ray = self.camera.ray_through(ndc);
        if ray.hit_box(door.world_matrix(), size).is_some() {
            self.door.toggle();
            true
        } else {
            false
        }
    }

    pub fn drag(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        self.camera.orbit(dx, dy, viewport_height);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn door(&self) -> &DoorState {
        &self.door
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position()
    }

    pub fn intent(&self) -> MotionIntent {
        self.input.intent()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Drop for RoomScene {
    fn drop(&mut self) {
        tracing::debug!(frames = self.frames, "room scene unmounted");
    }
}
