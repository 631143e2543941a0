//! Pointer-driven camera for the spatial swarm.
//!
//! The camera starts on the +z axis at twice the swarm radius and always
//! looks at the origin. Pointer moves set a target offset on x/y; each frame
//! the camera covers a fraction of the remaining distance (exponential
//! smoothing), and that fraction fades out once the pointer has been idle
//! for a while.

use glam::{Mat4, Vec3};

use super::config::SpatialSettings;
use super::particle::Viewport;

/// World units the camera may shift for a pointer at the viewport edge.
pub const POINTER_REACH: f64 = 20.0;
/// Seconds of pointer idleness before the pull starts to fade.
pub const IDLE_GRACE: f64 = 2.0;
/// Seconds over which the pull fades to nothing after the grace window.
pub const IDLE_FADE: f64 = 3.0;

/// A perspective camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	/// Eye position in world units.
	pub position: Vec3,
	/// Point the camera looks at.
	pub target: Vec3,
	/// Vertical field of view in degrees
	pub fov: f32,
	/// Near clip plane distance.
	pub near: f32,
	/// Far clip plane distance.
	pub far: f32,
	/// Aspect ratio (width / height)
	pub aspect: f32,
}

impl Camera {
	/// A default camera on the +z axis at `distance`, looking at the origin.
	pub fn looking_at_origin(distance: f32, aspect: f32) -> Self {
		Self {
			position: Vec3::new(0.0, 0.0, distance),
			target: Vec3::ZERO,
			fov: 75.0,
			near: 0.1,
			far: 2000.0,
			aspect,
		}
	}

	/// World to view space.
	pub fn view_matrix(&self) -> Mat4 {
		Mat4::look_at_rh(self.position, self.target, Vec3::Y)
	}

	/// View to clip space (OpenGL depth range).
	pub fn projection_matrix(&self) -> Mat4 {
		Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
	}

	/// World to clip space.
	pub fn view_projection(&self) -> Mat4 {
		self.projection_matrix() * self.view_matrix()
	}

	/// Pixels per world unit at distance 1 for a viewport of `height` pixels.
	/// Dividing by clip-space `w` gives the on-screen size of a sprite.
	pub fn pixel_scale(&self, height: f64) -> f32 {
		height as f32 / (2.0 * (self.fov.to_radians() * 0.5).tan())
	}
}

/// Last known pointer position in normalized device coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
	/// `-1.0` at the left edge, `1.0` at the right.
	pub x: f64,
	/// `-1.0` at the bottom edge, `1.0` at the top.
	pub y: f64,
	/// Time of the last move in seconds, `None` until the pointer moves.
	pub last_move: Option<f64>,
}

/// Camera plus the pointer tracking that steers it.
#[derive(Clone, Debug)]
pub struct CameraRig {
	camera: Camera,
	home: Vec3,
	pointer: PointerState,
	distortion: bool,
	intensity: f64,
}

impl CameraRig {
	/// A rig at its home position for the given swarm settings.
	pub fn new(settings: &SpatialSettings, viewport: Viewport) -> Self {
		let camera = Camera::looking_at_origin(
			(settings.sphere_radius * 2.0) as f32,
			viewport.aspect() as f32,
		);
		Self {
			home: camera.position,
			camera,
			pointer: PointerState::default(),
			distortion: settings.camera_distortion,
			intensity: settings.distortion_intensity,
		}
	}

	/// The camera as of the last update.
	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	/// Where the camera started.
	pub fn home(&self) -> Vec3 {
		self.home
	}

	/// Last recorded pointer sample.
	pub fn pointer(&self) -> PointerState {
		self.pointer
	}

	/// Records a pointer position given in client pixels. Ignored when
	/// distortion is off.
	pub fn pointer_moved(&mut self, client_x: f64, client_y: f64, viewport: Viewport, now: f64) {
		if !self.distortion {
			return;
		}
		let (w, h) = (viewport.width.max(1.0), viewport.height.max(1.0));
		self.pointer = PointerState {
			x: ((client_x / w) * 2.0 - 1.0).clamp(-1.0, 1.0),
			y: (-((client_y / h) * 2.0 - 1.0)).clamp(-1.0, 1.0),
			last_move: Some(now),
		};
	}

	/// Tracks a new viewport aspect ratio.
	pub fn set_viewport(&mut self, viewport: Viewport) {
		self.camera.aspect = viewport.aspect() as f32;
	}

	/// Fraction of the remaining offset to cover this frame.
	pub fn pull(&self, now: f64) -> f64 {
		let Some(last_move) = self.pointer.last_move else {
			return 0.0;
		};
		let idle = (now - last_move).max(0.0);
		let fade = (1.0 - (idle - IDLE_GRACE) / IDLE_FADE).clamp(0.0, 1.0);
		self.intensity * fade
	}

	/// Moves the camera one smoothing step toward the pointer target.
	pub fn update(&mut self, now: f64) {
		if !self.distortion {
			return;
		}
		let pull = self.pull(now) as f32;
		let target_x = (self.pointer.x * POINTER_REACH) as f32;
		let target_y = (self.pointer.y * POINTER_REACH) as f32;

		self.camera.position.x += (target_x - self.camera.position.x) * pull;
		self.camera.position.y += (target_y - self.camera.position.y) * pull;
		self.camera.target = Vec3::ZERO;
	}
}
