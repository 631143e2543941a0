//! Planar and spatial swarm engines.
//!
//! An engine owns the particle store, its motion tuning and a rendering
//! [`Surface`]. Each frame runs the update step over plain particle data and
//! only then commits the result to the surface, so the simulation never
//! touches rendering state directly.

use log::warn;
use rand::Rng;

use super::camera::{Camera, CameraRig};
use super::config::{PlanarSettings, SpatialSettings};
use super::error::SurfaceError;
use super::motion::{Motion, pulse_opacity, step};
use super::particle::{Bounds, Particle, ParticleStore, Viewport};

/// Everything a surface needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a, const D: usize> {
	/// Particle state after this frame's update.
	pub particles: &'a [Particle<D>],
	/// Present for the spatial engine.
	pub camera: Option<&'a Camera>,
	/// Seconds since activation.
	pub elapsed: f64,
}

/// A rendering backend that displays particles.
pub trait Surface<const D: usize> {
	/// Allocate visuals for a freshly built swarm.
	fn populate(&mut self, particles: &[Particle<D>]) -> Result<(), SurfaceError>;

	/// Copy this frame's particle state into the rendering surface.
	fn commit(&mut self, frame: &Frame<'_, D>) -> Result<(), SurfaceError>;

	/// Follow a host size change.
	fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError>;

	/// Release every rendering resource. Must tolerate repeated calls.
	fn dispose(&mut self) -> Result<(), SurfaceError>;
}

/// The operations the lifecycle drives, independent of dimensionality.
pub trait SwarmEngine {
	/// Run one frame at `now` seconds.
	fn frame(&mut self, now: f64) -> Result<(), SurfaceError>;

	/// Refit bounds to a new host size, keeping every particle.
	fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError>;

	/// Feed a pointer position in client pixels. Ignored by default.
	fn pointer_moved(&mut self, _client_x: f64, _client_y: f64, _now: f64) {}

	/// Whether pointer events should be routed to this engine.
	fn wants_pointer(&self) -> bool {
		false
	}

	/// Release the surface.
	fn dispose(&mut self) -> Result<(), SurfaceError>;

	/// Number of live particles.
	fn particle_count(&self) -> usize;
}

fn release_after_failed_populate<const D: usize, S: Surface<D>>(surface: &mut S) {
	if let Err(e) = surface.dispose() {
		warn!("fireflies: cleanup after failed populate: {}", e);
	}
}

/// Tracks the activation's start so pulses run on elapsed time.
#[derive(Clone, Copy, Debug, Default)]
struct Epoch(Option<f64>);

impl Epoch {
	fn elapsed(&mut self, now: f64) -> f64 {
		now - *self.0.get_or_insert(now)
	}
}

/// DOM-style swarm in pixel space.
pub struct PlanarEngine<S, R> {
	settings: PlanarSettings,
	motion: Motion,
	bounds: Bounds<2>,
	store: ParticleStore<2>,
	surface: S,
	rng: R,
	epoch: Epoch,
}

impl<S: Surface<2>, R: Rng> PlanarEngine<S, R> {
	/// Seeds the swarm inside `viewport` and populates `surface`.
	pub fn new(
		settings: PlanarSettings,
		viewport: Viewport,
		mut surface: S,
		mut rng: R,
	) -> Result<Self, SurfaceError> {
		let motion = Motion::planar(settings.swarm.speed);
		let bounds = Bounds::planar(viewport);
		let store = ParticleStore::initialize(&settings.swarm, &bounds, &motion, &mut rng);

		if let Err(e) = surface.populate(store.particles()) {
			release_after_failed_populate(&mut surface);
			return Err(e);
		}

		Ok(Self {
			settings,
			motion,
			bounds,
			store,
			surface,
			rng,
			epoch: Epoch::default(),
		})
	}

	/// The particles.
	pub fn store(&self) -> &ParticleStore<2> {
		&self.store
	}

	/// Current movement bounds.
	pub fn bounds(&self) -> &Bounds<2> {
		&self.bounds
	}

	/// The rendering surface.
	pub fn surface(&self) -> &S {
		&self.surface
	}
}

impl<S: Surface<2>, R: Rng> SwarmEngine for PlanarEngine<S, R> {
	fn frame(&mut self, now: f64) -> Result<(), SurfaceError> {
		let elapsed = self.epoch.elapsed(now);
		let swarm = &self.settings.swarm;

		for p in self.store.particles_mut() {
			step(p, &self.bounds, &self.motion, &mut self.rng);
			if self.settings.twinkle {
				p.opacity =
					pulse_opacity(elapsed, p.phase, p.period, swarm.min_opacity, swarm.max_opacity);
			}
		}

		self.surface.commit(&Frame {
			particles: self.store.particles(),
			camera: None,
			elapsed,
		})
	}

	fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError> {
		self.bounds = Bounds::planar(viewport);
		self.store.clamp_into(&self.bounds);
		self.surface.resize(viewport)
	}

	fn dispose(&mut self) -> Result<(), SurfaceError> {
		self.surface.dispose()
	}

	fn particle_count(&self) -> usize {
		self.store.len()
	}
}

/// 3D swarm viewed through a pointer-steered camera.
pub struct SpatialEngine<S, R> {
	settings: SpatialSettings,
	motion: Motion,
	viewport: Viewport,
	bounds: Bounds<3>,
	store: ParticleStore<3>,
	rig: CameraRig,
	surface: S,
	rng: R,
	epoch: Epoch,
}

impl<S: Surface<3>, R: Rng> SpatialEngine<S, R> {
	/// Seeds the swarm around the origin and populates `surface`.
	pub fn new(
		settings: SpatialSettings,
		viewport: Viewport,
		mut surface: S,
		mut rng: R,
	) -> Result<Self, SurfaceError> {
		let motion = Motion::spatial(settings.swarm.speed);
		let bounds = Bounds::spatial(viewport, settings.sphere_radius);
		let store = ParticleStore::initialize(&settings.swarm, &bounds, &motion, &mut rng);
		let rig = CameraRig::new(&settings, viewport);

		if let Err(e) = surface.populate(store.particles()) {
			release_after_failed_populate(&mut surface);
			return Err(e);
		}

		Ok(Self {
			settings,
			motion,
			viewport,
			bounds,
			store,
			rig,
			surface,
			rng,
			epoch: Epoch::default(),
		})
	}

	/// The particles.
	pub fn store(&self) -> &ParticleStore<3> {
		&self.store
	}

	/// Current movement bounds.
	pub fn bounds(&self) -> &Bounds<3> {
		&self.bounds
	}

	/// The camera rig.
	pub fn rig(&self) -> &CameraRig {
		&self.rig
	}

	/// The rendering surface.
	pub fn surface(&self) -> &S {
		&self.surface
	}
}

impl<S: Surface<3>, R: Rng> SwarmEngine for SpatialEngine<S, R> {
	fn frame(&mut self, now: f64) -> Result<(), SurfaceError> {
		let elapsed = self.epoch.elapsed(now);
		let swarm = &self.settings.swarm;

		for p in self.store.particles_mut() {
			step(p, &self.bounds, &self.motion, &mut self.rng);
			p.opacity =
				pulse_opacity(elapsed, p.phase, p.period, swarm.min_opacity, swarm.max_opacity);
		}
		self.rig.update(now);

		self.surface.commit(&Frame {
			particles: self.store.particles(),
			camera: Some(self.rig.camera()),
			elapsed,
		})
	}

	fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError> {
		self.viewport = viewport;
		self.bounds = Bounds::spatial(viewport, self.settings.sphere_radius);
		self.store.clamp_into(&self.bounds);
		self.rig.set_viewport(viewport);
		self.surface.resize(viewport)
	}

	fn pointer_moved(&mut self, client_x: f64, client_y: f64, now: f64) {
		self.rig.pointer_moved(client_x, client_y, self.viewport, now);
	}

	fn wants_pointer(&self) -> bool {
		self.settings.camera_distortion
	}

	fn dispose(&mut self) -> Result<(), SurfaceError> {
		self.surface.dispose()
	}

	fn particle_count(&self) -> usize {
		self.store.len()
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	//! In-memory surfaces for exercising engines and the lifecycle natively.

	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	/// What a [`RecordingSurface`] has been asked to do.
	#[derive(Debug, Default)]
	pub struct SurfaceLog {
		pub populated: usize,
		pub commits: usize,
		pub resizes: Vec<Viewport>,
		pub disposals: usize,
		pub live_markers: usize,
		pub last_opacities: Vec<f64>,
		pub last_camera: Option<Camera>,
	}

	/// Surface that records calls into a shared log the test keeps a handle to.
	#[derive(Clone, Default)]
	pub struct RecordingSurface {
		pub log: Rc<RefCell<SurfaceLog>>,
		pub fail_populate: bool,
		pub fail_dispose: bool,
	}

	impl<const D: usize> Surface<D> for RecordingSurface {
		fn populate(&mut self, particles: &[Particle<D>]) -> Result<(), SurfaceError> {
			let mut log = self.log.borrow_mut();
			log.populated += 1;
			if self.fail_populate {
				return Err(SurfaceError::Js("append failed".into()));
			}
			log.live_markers = particles.len();
			Ok(())
		}

		fn commit(&mut self, frame: &Frame<'_, D>) -> Result<(), SurfaceError> {
			let mut log = self.log.borrow_mut();
			log.commits += 1;
			log.last_opacities = frame.particles.iter().map(|p| p.opacity).collect();
			log.last_camera = frame.camera.cloned();
			Ok(())
		}

		fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError> {
			self.log.borrow_mut().resizes.push(viewport);
			Ok(())
		}

		fn dispose(&mut self) -> Result<(), SurfaceError> {
			let mut log = self.log.borrow_mut();
			log.disposals += 1;
			log.live_markers = 0;
			if self.fail_dispose {
				return Err(SurfaceError::Js("context already lost".into()));
			}
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::test_support::RecordingSurface;
	use super::*;
	use crate::components::fireflies::config::{PlanarConfig, SpatialConfig};

	const FRAME: f64 = 1.0 / 60.0;

	fn planar(config: PlanarConfig) -> (PlanarEngine<RecordingSurface, SmallRng>, RecordingSurface) {
		let surface = RecordingSurface::default();
		let engine = PlanarEngine::new(
			config.validate().unwrap(),
			Viewport::new(800.0, 600.0),
			surface.clone(),
			SmallRng::seed_from_u64(42),
		)
		.unwrap();
		(engine, surface)
	}

	fn spatial(config: SpatialConfig) -> (SpatialEngine<RecordingSurface, SmallRng>, RecordingSurface) {
		let surface = RecordingSurface::default();
		let engine = SpatialEngine::new(
			config.validate().unwrap(),
			Viewport::new(1280.0, 720.0),
			surface.clone(),
			SmallRng::seed_from_u64(7),
		)
		.unwrap();
		(engine, surface)
	}

	#[test]
	fn failed_populate_releases_the_surface() {
		let surface = RecordingSurface {
			fail_populate: true,
			fail_dispose: true,
			..RecordingSurface::default()
		};
		let err = SpatialEngine::new(
			SpatialConfig::default().validate().unwrap(),
			Viewport::new(640.0, 480.0),
			surface.clone(),
			SmallRng::seed_from_u64(3),
		)
		.err();

		assert_eq!(err, Some(SurfaceError::Js("append failed".into())));
		assert_eq!(surface.log.borrow().disposals, 1);
		assert_eq!(surface.log.borrow().live_markers, 0);
	}

	#[test]
	fn planar_frames_keep_invariants() {
		let (mut engine, surface) = planar(PlanarConfig {
			speed: 6.0,
			..PlanarConfig::default()
		});
		let before: Vec<_> = engine.store().particles().iter().map(|p| p.color).collect();

		for i in 0..600 {
			engine.frame(i as f64 * FRAME).unwrap();
			for p in engine.store().particles() {
				assert!(engine.bounds().contains(&p.position, 1e-9));
				assert!((0.0..=1.0).contains(&p.opacity));
			}
		}

		let after: Vec<_> = engine.store().particles().iter().map(|p| p.color).collect();
		assert_eq!(before, after);
		assert_eq!(surface.log.borrow().commits, 600);
		assert_eq!(surface.log.borrow().live_markers, 50);
	}

	#[test]
	fn planar_glow_keeps_fixed_opacity() {
		let (mut engine, _) = planar(PlanarConfig::default());
		let fixed: Vec<_> = engine.store().particles().iter().map(|p| p.base_opacity).collect();
		for i in 0..30 {
			engine.frame(i as f64 * 0.1).unwrap();
		}
		let now: Vec<_> = engine.store().particles().iter().map(|p| p.opacity).collect();
		assert_eq!(fixed, now);
	}

	#[test]
	fn planar_twinkle_pulses_within_range() {
		let (mut engine, surface) = planar(PlanarConfig {
			twinkle: true,
			..PlanarConfig::default()
		});
		let mut seen_change = false;
		let mut previous: Option<Vec<f64>> = None;
		for i in 0..120 {
			engine.frame(i as f64 * 0.1).unwrap();
			let current = surface.log.borrow().last_opacities.clone();
			assert!(current.iter().all(|o| (0.3..=0.6).contains(o)));
			if previous.as_ref().is_some_and(|p| *p != current) {
				seen_change = true;
			}
			previous = Some(current);
		}
		assert!(seen_change);
	}

	#[test]
	fn resize_shrink_clamps_without_losing_particles() {
		let (mut engine, surface) = planar(PlanarConfig {
			count: 120,
			..PlanarConfig::default()
		});
		engine.frame(0.0).unwrap();

		let small = Viewport::new(300.0, 200.0);
		engine.resize(small).unwrap();
		assert_eq!(engine.particle_count(), 120);
		let bounds = Bounds::planar(small);
		assert!(engine.store().particles().iter().all(|p| bounds.contains(&p.position, 1e-9)));
		assert_eq!(surface.log.borrow().resizes, vec![small]);

		for i in 1..60 {
			engine.frame(i as f64 * FRAME).unwrap();
		}
		assert!(engine.store().particles().iter().all(|p| bounds.contains(&p.position, 1e-9)));
	}

	#[test]
	fn spatial_frames_keep_invariants_and_commit_camera() {
		let (mut engine, surface) = spatial(SpatialConfig {
			count: 80,
			..SpatialConfig::default()
		});
		for i in 0..300 {
			engine.frame(i as f64 * FRAME).unwrap();
			for p in engine.store().particles() {
				assert!(engine.bounds().contains(&p.position, 1e-9));
				assert!((0.5..=0.9).contains(&p.opacity));
			}
		}
		let log = surface.log.borrow();
		assert_eq!(log.commits, 300);
		assert_eq!(log.last_camera.as_ref(), Some(engine.rig().camera()));
	}

	#[test]
	fn spatial_camera_follows_pointer_only_when_enabled() {
		let (mut steered, _) = spatial(SpatialConfig::default());
		let (mut fixed, _) = spatial(SpatialConfig {
			camera_distortion: false,
			..SpatialConfig::default()
		});
		assert!(steered.wants_pointer());
		assert!(!fixed.wants_pointer());

		for i in 0..120 {
			let now = i as f64 * FRAME;
			steered.pointer_moved(1280.0, 0.0, now);
			fixed.pointer_moved(1280.0, 0.0, now);
			steered.frame(now).unwrap();
			fixed.frame(now).unwrap();
		}

		assert_eq!(fixed.rig().camera().position, fixed.rig().home());
		let moved = steered.rig().camera().position;
		assert!(moved.x > 1.0 && moved.y > 1.0);
	}

	#[test]
	fn spatial_resize_updates_aspect_and_bounds() {
		let (mut engine, _) = spatial(SpatialConfig::default());
		let narrow = Viewport::new(400.0, 800.0);
		engine.resize(narrow).unwrap();
		assert_eq!(engine.rig().camera().aspect, 0.5);
		assert_eq!(engine.bounds().max, [300.0, 600.0, 300.0]);
		assert_eq!(engine.particle_count(), 200);
		assert!(engine.store().particles().iter().all(|p| engine.bounds().contains(&p.position, 1e-9)));
	}

	#[test]
	fn empty_swarm_still_runs() {
		let (mut engine, surface) = spatial(SpatialConfig {
			count: 0,
			..SpatialConfig::default()
		});
		for i in 0..10 {
			engine.frame(i as f64).unwrap();
		}
		assert_eq!(engine.particle_count(), 0);
		assert_eq!(surface.log.borrow().commits, 10);
	}
}
