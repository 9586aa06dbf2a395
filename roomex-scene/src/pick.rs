use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to a box of `size` centred on the local origin
    /// of `world`, if it is hit in front of the origin.
    pub fn hit_box(&self, world: Mat4, size: Vec3) -> Option<f32> {
        if self.direction == Vec3::ZERO {
            return None;
        }
        let inverse = world.inverse();
        let origin = inverse.transform_point3(self.origin);
        let direction = inverse.transform_vector3(self.direction);
        let half = size * 0.5;

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let (o, d, h) = (origin[axis], direction[axis], half[axis]);
            if d.abs() < f32::EPSILON {
                if o < -h || o > h {
                    return None;
                }
                continue;
            }
            let (t0, t1) = ((-h - o) / d, (h - o) / d);
            t_min = t_min.max(t0.min(t1));
            t_max = t_max.min(t0.max(t1));
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 {
            return None;
        }
        // world transforms here are rigid, so local and world distances agree
        Some(t_min.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn hits_a_box_in_front() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, -5.0), Vec3::Z);
        let world = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let t = ray.hit_box(world, Vec3::new(1.0, 2.0, 0.1)).unwrap();
        assert!((t - 4.95).abs() < 1e-5);
    }

    #[test]
    fn misses_boxes_behind_or_beside() {
        let world = Mat4::IDENTITY;
        let size = Vec3::ONE;
        assert!(Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).hit_box(world, size).is_none());
        assert!(Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z).hit_box(world, size).is_none());
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).hit_box(world, size).is_none());
    }

    #[test]
    fn respects_rotation() {
        // a thin panel turned 90° about Y faces +x instead of +z
        let world = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let size = Vec3::new(2.0, 2.0, 0.1);
        assert!(Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X).hit_box(world, size).is_some());
        assert!(Ray::new(Vec3::new(0.5, 0.0, -5.0), Vec3::Z).hit_box(world, size).is_none());
    }
}
