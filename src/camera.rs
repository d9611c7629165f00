//! Free-look fly camera
//!
//! - WASD: Move forward/backward/left/right
//! - Mouse: Look around
//! - Scroll: Adjust movement speed
//!
//! Only moves while look-around is enabled. The pose is reset every time a
//! mode is entered, using that mode's [`CameraSettings`].

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::input::InputState;

/// Frame times above this are treated as a hitch and clamped
pub const MAX_CAMERA_DT: f32 = 0.03;

/// Per-mode camera tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Degrees of rotation per pixel of mouse movement
    pub look_sensitivity: f32,
    /// Maximum absolute pitch in degrees
    pub pitch_limit: f32,
    /// Start position
    pub position: Vec3,
    /// Start yaw in degrees; -90 looks down -Z
    pub yaw: f32,
    /// Vertical field of view in degrees
    pub fov_y: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            look_sensitivity: 0.2,
            pitch_limit: 75.0,
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            fov_y: 45.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    /// Degrees
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    look_around: bool,
    settings: CameraSettings,
    /// Speed change per scroll unit
    scroll_speed_factor: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            yaw: 0.0,
            pitch: 0.0,
            look_around: false,
            settings: CameraSettings::default(),
            scroll_speed_factor: 1.2,
        };
        camera.reset(CameraSettings::default());
        camera
    }
}

impl FlyCamera {
    /// Restore the start pose and apply new tuning. Look-around is turned off.
    pub fn reset(&mut self, settings: CameraSettings) {
        self.settings = settings;
        self.position = settings.position;
        self.up = Vec3::Y;
        self.yaw = settings.yaw;
        self.pitch = 0.0;
        self.look_around = false;
        self.front = self.forward_direction();
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn look_around(&self) -> bool {
        self.look_around
    }

    pub fn set_look_around(&mut self, enabled: bool) {
        self.look_around = enabled;
    }

    pub fn toggle_look_around(&mut self) -> bool {
        self.look_around = !self.look_around;
        self.look_around
    }

    fn forward_direction(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    fn right_direction(&self) -> Vec3 {
        self.front.cross(self.up).normalize()
    }

    /// Rotate by a mouse delta in pixels
    pub fn look(&mut self, dx: f32, dy: f32) {
        let limit = self.settings.pitch_limit;
        self.yaw += dx * self.settings.look_sensitivity;
        self.pitch = (self.pitch - dy * self.settings.look_sensitivity).clamp(-limit, limit);
        self.yaw %= 360.0;
        self.front = self.forward_direction();
    }

    /// Apply polled input for one frame
    pub fn update(&mut self, input: &InputState, dt: f32) {
        if !self.look_around {
            return;
        }
        let dt = dt.clamp(0.0, MAX_CAMERA_DT);

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            if scroll > 0.0 {
                self.settings.move_speed *= self.scroll_speed_factor;
            } else {
                self.settings.move_speed /= self.scroll_speed_factor;
            }
            self.settings.move_speed = self.settings.move_speed.clamp(0.25, 50.0);
        }

        let delta = input.cursor_delta();
        if delta.x != 0.0 || delta.y != 0.0 {
            self.look(delta.x, delta.y);
        }

        let forward = self.front;
        let right = self.right_direction();
        let mut velocity = Vec3::ZERO;

        if input.is_key_pressed(KeyCode::KeyW) {
            velocity += forward;
        }
        if input.is_key_pressed(KeyCode::KeyS) {
            velocity -= forward;
        }
        if input.is_key_pressed(KeyCode::KeyD) {
            velocity += right;
        }
        if input.is_key_pressed(KeyCode::KeyA) {
            velocity -= right;
        }

        // Normalize if moving diagonally
        if velocity.length_squared() > 0.0 {
            velocity = velocity.normalize();
        }

        self.position += velocity * self.settings.move_speed * dt;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.settings.fov_y.to_radians(), aspect, 0.1, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn test_default_pose_looks_down_negative_z() {
        let camera = FlyCamera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert!((camera.front - Vec3::NEG_Z).length() < 1e-5);
        assert!(!camera.look_around());
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.look(0.0, -10_000.0);
        assert_eq!(camera.pitch, 75.0);
        camera.look(0.0, 10_000.0);
        assert_eq!(camera.pitch, -75.0);
    }

    #[test]
    fn test_reset_restores_pose() {
        let mut camera = FlyCamera::default();
        camera.set_look_around(true);
        camera.look(120.0, 40.0);
        camera.position = Vec3::splat(9.0);

        camera.reset(CameraSettings::default());
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.pitch, 0.0);
        assert!(!camera.look_around());
    }

    #[test]
    fn test_update_requires_look_around() {
        let mut camera = FlyCamera::default();
        let mut input = InputState::default();
        input.apply(&EventKind::KeyPressed {
            key: KeyCode::KeyW,
            repeat: false,
        });

        camera.update(&input, 0.016);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));

        camera.set_look_around(true);
        camera.update(&input, 0.016);
        assert!(camera.position.z < 3.0);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.set_look_around(true);
        let mut input = InputState::default();
        input.apply(&EventKind::KeyPressed {
            key: KeyCode::KeyW,
            repeat: false,
        });

        camera.update(&input, 5.0);
        let travelled = 3.0 - camera.position.z;
        assert!((travelled - 2.5 * MAX_CAMERA_DT).abs() < 1e-5);
    }
}
