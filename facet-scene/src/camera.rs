use glam::{Mat4, Vec2, Vec3};

/// Camera pose representing position and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Focus point that the camera orbits around.
    pub target: Vec3,
    /// Camera position in world space.
    pub position: Vec3,
    /// Yaw angle in radians (rotation around Y axis).
    pub yaw: f32,
    /// Pitch angle in radians (rotation around X axis).
    pub pitch: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let forward = (target - position).normalize_or_zero();
        let yaw = forward.x.atan2(-forward.z);
        let pitch = forward
            .y
            .asin()
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
        Self {
            target,
            position,
            yaw,
            pitch,
        }
    }

    /// Orbit around the target by `delta` radians of (yaw, pitch).
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x;
        self.pitch = (self.pitch - delta.y).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );

        let dir = glam::Quat::from_euler(glam::EulerRot::YXZ, self.yaw, self.pitch, 0.0) * -Vec3::Z;
        let distance = (self.position - self.target).length();
        self.position = self.target - dir.normalize() * distance;
    }
}

/// Camera that manages position and view matrix.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: CameraPose,
}

impl Camera {
    /// Creates a camera at the given position looking at the target.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            pose: CameraPose::new(position, target),
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn apply_pose(&mut self, pose: &CameraPose) {
        self.pose = *pose;
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn view_matrix(&self) -> Mat4 {
        let forward = (self.pose.target - self.pose.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        Mat4::look_to_rh(self.pose.position, forward, up)
    }
}

/// Perspective projection configuration.
#[derive(Debug, Clone)]
pub struct Projection {
    width: u32,
    height: u32,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Projection {
    /// `fov_y` is the vertical field of view in radians.
    pub fn new(width: u32, height: u32, fov_y: f32, near: f32, far: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            fov_y,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Update the projection size. Zero-sized dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
    }
}

/// Orbit controls with optional damping.
///
/// Drag input accumulates a pending rotation; each [`OrbitControls::update`]
/// applies a share of it and decays the rest, so motion eases out after the
/// pointer stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    enabled: bool,
    enable_damping: bool,
    damping_factor: f32,
    rotate_speed: f32,
    pending: Vec2,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn damping(mut self, enable: bool, factor: f32) -> Self {
        self.enable_damping = enable;
        self.damping_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pending rotation in radians that has not yet been applied.
    pub fn pending(&self) -> Vec2 {
        self.pending
    }

    /// Queue a drag of `delta_pixels`. Ignored when disabled.
    pub fn rotate(&mut self, delta_pixels: Vec2) {
        if self.enabled {
            self.pending += delta_pixels * self.rotate_speed;
        }
    }

    /// Advance damping and move the camera. Returns whether the pose changed.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let step = if self.enable_damping {
            self.pending * self.damping_factor
        } else {
            self.pending
        };

        if self.enable_damping {
            self.pending *= 1.0 - self.damping_factor;
            if self.pending.length_squared() < 1e-12 {
                self.pending = Vec2::ZERO;
            }
        } else {
            self.pending = Vec2::ZERO;
        }

        if step == Vec2::ZERO {
            return false;
        }

        let mut pose = camera.pose();
        pose.orbit(step);
        camera.apply_pose(&pose);
        true
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 0.005,
            pending: Vec2::ZERO,
        }
    }
}
