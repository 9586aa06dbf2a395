use crate::pick::Ray;
use glam::{Mat4, Vec2, Vec3};
use roomex_core::MotionIntent;
use std::f32::consts::{FRAC_PI_2, TAU};

/// How far one frame of held movement carries the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementStep {
    /// Fixed distance every frame regardless of frame time; speed depends on
    /// the display refresh rate.
    PerFrame(f32),
    /// Metres per second, scaled by the frame delta.
    PerSecond(f32),
}

impl Default for MovementStep {
    /// 3 m/s, the same speed as 0.05 m per frame at 60 Hz.
    fn default() -> Self {
        MovementStep::PerSecond(3.0)
    }
}

impl MovementStep {
    pub fn distance(&self, dt: f32) -> f32 {
        match *self {
            MovementStep::PerFrame(step) => step,
            MovementStep::PerSecond(speed) => speed * dt,
        }
    }
}

/// Orbit look plus keyboard translation.
///
/// The eye sits on a sphere around `target`; the polar angle (from +Y) is held
/// in `[0, π/2]` so the eye never drops below the target's horizontal plane.
/// Translation moves eye and target together, so walking keeps the view
/// direction.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    target: Vec3,
    yaw: f32,
    polar: f32,
    radius: f32,
    step: MovementStep,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

const MIN_POLAR: f32 = 0.0;
const MAX_POLAR: f32 = FRAC_PI_2;
// keeps look_at away from a degenerate up vector
const POLAR_EPSILON: f32 = 1e-4;

impl CameraController {
    pub fn new(position: Vec3, target: Vec3, step: MovementStep) -> Self {
        let offset = position - target;
        let radius = offset.length().max(1e-3);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let yaw = offset.x.atan2(offset.z);
        Self {
            target,
            yaw,
            polar: polar.clamp(MIN_POLAR, MAX_POLAR),
            radius,
            step,
            fov: 75f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 2000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let polar = self.polar.max(POLAR_EPSILON);
        self.target
            + self.radius
                * Vec3::new(
                    polar.sin() * self.yaw.sin(),
                    polar.cos(),
                    polar.sin() * self.yaw.cos(),
                )
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn step(&self) -> MovementStep {
        self.step
    }

    /// Local -Z of the camera in world space.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize_or_zero()
    }

    /// Local +X of the camera in world space (always horizontal).
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Drag in pixels; a drag across the full viewport height turns one full
    /// revolution.
    pub fn orbit(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !(viewport_height > 0.0) || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.yaw = (self.yaw - TAU * dx / viewport_height).rem_euclid(TAU);
        self.polar = (self.polar - TAU * dy / viewport_height).clamp(MIN_POLAR, MAX_POLAR);
    }

    /// Applies one frame of held movement. Returns the displacement.
    /// A per-frame step moves even when `dt` is zero.
    pub fn apply_intent(&mut self, intent: MotionIntent, dt: f32) -> Vec3 {
        if !intent.is_moving() || !dt.is_finite() || dt < 0.0 {
            return Vec3::ZERO;
        }
        let distance = self.step.distance(dt);
        if distance == 0.0 {
            return Vec3::ZERO;
        }
        let (forward, right) = intent.axes();
        let displacement = (self.forward() * forward + self.right() * right) * distance;
        self.target += displacement;
        displacement
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in normalised device coordinates.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(step: MovementStep) -> CameraController {
        CameraController::new(Vec3::new(0.0, 1.2, -7.5), Vec3::new(0.0, 1.2, 0.0), step)
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn reconstructs_the_start_pose() {
        let cam = camera(MovementStep::default());
        assert!(close(cam.position(), Vec3::new(0.0, 1.2, -7.5)));
        assert!((cam.polar() - FRAC_PI_2).abs() < 1e-5);
        assert!(close(cam.forward(), Vec3::Z));
        assert!(close(cam.right(), Vec3::NEG_X));
    }

    #[test]
    fn polar_is_clamped_to_upper_hemisphere() {
        let mut cam = camera(MovementStep::default());
        cam.orbit(0.0, -10_000.0, 800.0);
        assert_eq!(cam.polar(), MAX_POLAR);
        assert!(cam.position().y >= cam.target().y - 1e-4);

        cam.orbit(0.0, 10_000.0, 800.0);
        assert_eq!(cam.polar(), MIN_POLAR);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn forward_and_right_follow_intent() {
        let mut cam = camera(MovementStep::PerFrame(0.05));
        let start = cam.position();

        cam.apply_intent(MotionIntent::Forward, 1.0 / 60.0);
        assert!(close(cam.position(), start + Vec3::Z * 0.05));

        cam.apply_intent(MotionIntent::Backward, 1.0 / 60.0);
        assert!(close(cam.position(), start));

        cam.apply_intent(MotionIntent::Right, 1.0 / 60.0);
        assert!(close(cam.position(), start + Vec3::NEG_X * 0.05));

        cam.apply_intent(MotionIntent::Left, 1.0 / 60.0);
        assert!(close(cam.position(), start));
    }

    #[test]
    fn per_second_steps_scale_with_frame_time() {
        let mut fast = camera(MovementStep::PerSecond(3.0));
        let mut slow = camera(MovementStep::PerSecond(3.0));
        for _ in 0..120 {
            fast.apply_intent(MotionIntent::Forward, 1.0 / 120.0);
        }
        for _ in 0..60 {
            slow.apply_intent(MotionIntent::Forward, 1.0 / 60.0);
        }
        assert!(close(fast.position(), slow.position()));
        assert!((fast.position().z - (-7.5 + 3.0)).abs() < 1e-3);
    }

    #[test]
    fn idle_or_degenerate_frames_do_not_move() {
        let mut cam = camera(MovementStep::PerFrame(0.05));
        let start = cam.position();
        assert_eq!(cam.apply_intent(MotionIntent::None, 0.016), Vec3::ZERO);
        assert_eq!(cam.apply_intent(MotionIntent::Forward, -0.016), Vec3::ZERO);
        assert_eq!(cam.apply_intent(MotionIntent::Forward, f32::NAN), Vec3::ZERO);
        assert_eq!(cam.position(), start);

        let mut timed = camera(MovementStep::PerSecond(3.0));
        assert_eq!(timed.apply_intent(MotionIntent::Forward, 0.0), Vec3::ZERO);
        assert_eq!(timed.position(), start);
    }

    #[test]
    fn per_frame_steps_ignore_frame_time() {
        let mut cam = camera(MovementStep::PerFrame(0.05));
        let start = cam.position();
        let moved = cam.apply_intent(MotionIntent::Forward, 0.0);
        assert!(close(moved, Vec3::Z * 0.05));
        cam.apply_intent(MotionIntent::Forward, 0.5);
        assert!(close(cam.position(), start + Vec3::Z * 0.1));
    }

    #[test]
    fn centre_ray_points_forward() {
        let cam = camera(MovementStep::default());
        let ray = cam.ray_through(Vec2::ZERO);
        assert!(close(ray.direction, Vec3::Z));
    }
}
