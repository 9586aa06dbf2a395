//! Parametric room scenes: geometry, materials, the animated door and the
//! first-person camera.

pub mod builder;
pub mod camera;
pub mod door;
pub mod error;
pub mod graph;
pub mod input;
pub mod layout;
pub mod material;
pub mod pick;
pub mod scene;

pub use builder::RoomBuilder;
pub use camera::{CameraController, MovementStep};
pub use door::{DoorPhase, DoorState};
pub use error::SceneError;
pub use graph::{Light, SceneGraph, SceneNode, Shape, SurfaceKind};
pub use input::{KeyInput, KeyboardHub, KeyboardListener, MotionInput};
pub use layout::RoomLayout;
pub use material::{AssetCatalog, Material, TextureSet};
pub use pick::Ray;
pub use scene::RoomScene;
