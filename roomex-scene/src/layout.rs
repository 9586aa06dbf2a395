use crate::error::SceneError;
use roomex_core::RoomConfig;

/// Derived room measurements. The room is centred on the origin with the
/// doorway in the front wall at `z = -depth / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomLayout {
    pub width: f32,
    pub depth: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    pub door_width: f32,
    pub door_height: f32,
    pub door_thickness: f32,
}

impl RoomLayout {
    pub const WALL_THICKNESS: f32 = 0.12;
    pub const DOOR_WIDTH: f32 = 1.0;
    pub const DOOR_THICKNESS: f32 = 0.1;

    pub fn from_config(config: &RoomConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let layout = Self {
            width: config.width,
            depth: config.depth,
            wall_height: config.height,
            wall_thickness: Self::WALL_THICKNESS,
            door_width: Self::DOOR_WIDTH,
            door_height: 2.0 * Self::DOOR_WIDTH,
            door_thickness: Self::DOOR_THICKNESS,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Door height always follows as twice the width.
    pub fn with_door_width(mut self, door_width: f32) -> Result<Self, SceneError> {
        self.door_width = door_width;
        self.door_height = 2.0 * door_width;
        self.validate()?;
        Ok(self)
    }

    pub fn with_wall_thickness(mut self, wall_thickness: f32) -> Result<Self, SceneError> {
        self.wall_thickness = wall_thickness;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let checks = [
            ("height", self.wall_height, self.door_height),
            (
                "width",
                self.width,
                self.door_width + 2.0 * self.wall_thickness,
            ),
            ("depth", self.depth, 2.0 * self.wall_thickness),
        ];
        for (dimension, value, minimum) in checks {
            if !(value > minimum) {
                return Err(SceneError::TooSmall {
                    dimension,
                    value,
                    minimum,
                });
            }
        }
        Ok(())
    }

    pub fn front_z(&self) -> f32 {
        -self.depth * 0.5
    }

    pub fn back_z(&self) -> f32 {
        self.depth * 0.5
    }

    /// Width of each front-wall slab beside the doorway.
    pub fn side_segment_width(&self) -> f32 {
        (self.width - self.door_width) * 0.5
    }

    pub fn lintel_height(&self) -> f32 {
        self.wall_height - self.door_height
    }

    pub fn eye_height(&self) -> f32 {
        self.door_height * 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: f32, height: f32, depth: f32) -> RoomConfig {
        RoomConfig {
            width,
            height,
            depth,
            wall: 0,
            ground: 0,
            duration: 1000,
        }
    }

    #[test]
    fn defaults_follow_the_door_ratio() {
        let layout = RoomLayout::from_config(&config(8.0, 3.0, 5.0)).unwrap();
        assert_eq!(layout.door_height, 2.0);
        assert_eq!(layout.side_segment_width(), 3.5);
        assert_eq!(layout.lintel_height(), 1.0);
        assert_eq!(layout.front_z(), -2.5);
        assert!((layout.eye_height() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn rooms_lower_than_the_door_are_rejected() {
        let err = RoomLayout::from_config(&config(8.0, 2.0, 5.0)).unwrap_err();
        assert!(matches!(err, SceneError::TooSmall { dimension: "height", .. }));
    }

    #[test]
    fn overrides_revalidate() {
        let layout = RoomLayout::from_config(&config(8.0, 3.0, 5.0)).unwrap();
        let wide = layout.with_door_width(1.2).unwrap();
        assert_eq!(wide.door_height, 2.4);
        assert!(layout.with_door_width(2.0).is_err());
        assert!(layout.with_wall_thickness(3.0).is_err());
    }

    #[test]
    fn invalid_config_is_passed_through() {
        assert!(matches!(
            RoomLayout::from_config(&config(f32::NAN, 3.0, 5.0)),
            Err(SceneError::Config(_))
        ));
    }
}
