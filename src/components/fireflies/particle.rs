//! Swarm members and the store that owns them.
//!
//! Particles are generic over their dimensionality: the planar engine uses
//! `Particle<2>` in pixel space, the spatial engine `Particle<3>` in world
//! units centered on the origin.

use std::f64::consts::TAU;

use rand::Rng;

use super::color::Color;
use super::config::SwarmSettings;
use super::motion::Motion;
use super::random::{jitter, uniform};

/// Fraction of the viewport the spatial swarm may wander past the screen edge.
pub const SPATIAL_MARGIN: f64 = 0.75;

/// Per-particle size jitter, applied once at creation.
pub const SIZE_JITTER: (f64, f64) = (0.7, 1.3);

/// Measured size of the host region in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in CSS pixels.
	pub width: f64,
	/// Height in CSS pixels.
	pub height: f64,
}

impl Viewport {
	/// A viewport with negative dimensions clamped to zero.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width: width.max(0.0),
			height: height.max(0.0),
		}
	}

	/// Width over height, guarded against a collapsed host.
	pub fn aspect(&self) -> f64 {
		self.width.max(1.0) / self.height.max(1.0)
	}
}

/// Axis-aligned region particles must stay inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds<const D: usize> {
	/// Lower corner.
	pub min: [f64; D],
	/// Upper corner.
	pub max: [f64; D],
}

impl<const D: usize> Bounds<D> {
	/// Creates bounds, collapsing any inverted axis onto its minimum.
	pub fn new(min: [f64; D], mut max: [f64; D]) -> Self {
		for axis in 0..D {
			max[axis] = max[axis].max(min[axis]);
		}
		Self { min, max }
	}

	/// Whether `point` lies inside, allowing `tolerance` on each side.
	pub fn contains(&self, point: &[f64; D], tolerance: f64) -> bool {
		(0..D).all(|axis| {
			point[axis] >= self.min[axis] - tolerance && point[axis] <= self.max[axis] + tolerance
		})
	}

	/// Moves `point` to the nearest position inside.
	pub fn clamp(&self, point: &mut [f64; D]) {
		for axis in 0..D {
			point[axis] = point[axis].clamp(self.min[axis], self.max[axis]);
		}
	}

	/// Size along each axis.
	pub fn extent(&self) -> [f64; D] {
		std::array::from_fn(|axis| self.max[axis] - self.min[axis])
	}

	/// Uniformly random point inside the bounds.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; D] {
		std::array::from_fn(|axis| uniform(rng, self.min[axis], self.max[axis]))
	}
}

impl Bounds<2> {
	/// The host region itself, origin at the top-left corner.
	pub fn planar(viewport: Viewport) -> Self {
		Self::new([0.0, 0.0], [viewport.width, viewport.height])
	}
}

impl Bounds<3> {
	/// A box centered on the origin reaching past the visible area on x/y
	/// and `depth` in either direction on z.
	pub fn spatial(viewport: Viewport, depth: f64) -> Self {
		let (hx, hy) = (
			viewport.width * SPATIAL_MARGIN,
			viewport.height * SPATIAL_MARGIN,
		);
		Self::new([-hx, -hy, -depth], [hx, hy, depth])
	}
}

/// A single firefly.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle<const D: usize> {
	/// Current position.
	pub position: [f64; D],
	/// Velocity per frame.
	pub velocity: [f64; D],
	/// Visual size, fixed for the particle's lifetime.
	pub size: f64,
	/// Opacity drawn at creation; the fixed value when not pulsing.
	pub base_opacity: f64,
	/// Opacity for the current frame.
	pub opacity: f64,
	/// Fixed color.
	pub color: Color,
	/// Pulse phase offset in radians, so particles blink out of step.
	pub phase: f64,
	/// Pulse period in seconds.
	pub period: f64,
}

/// Every particle of one activation. Built in full, never grown or shrunk.
#[derive(Clone, Debug, Default)]
pub struct ParticleStore<const D: usize> {
	particles: Vec<Particle<D>>,
}

impl<const D: usize> ParticleStore<D> {
	/// Creates exactly `settings.count` particles inside `bounds`.
	pub fn initialize<R: Rng + ?Sized>(
		settings: &SwarmSettings,
		bounds: &Bounds<D>,
		motion: &Motion,
		rng: &mut R,
	) -> Self {
		let mut particles = Vec::with_capacity(settings.count);

		for _ in 0..settings.count {
			let base_opacity = uniform(rng, settings.min_opacity, settings.max_opacity);
			particles.push(Particle {
				position: bounds.sample(rng),
				velocity: std::array::from_fn(|_| jitter(rng, motion.initial)),
				size: settings.size * uniform(rng, SIZE_JITTER.0, SIZE_JITTER.1),
				base_opacity,
				opacity: base_opacity,
				color: settings.palette.pick(rng),
				phase: uniform(rng, 0.0, TAU),
				period: uniform(rng, settings.min_duration, settings.max_duration),
			});
		}

		Self { particles }
	}

	/// Number of particles.
	pub fn len(&self) -> usize {
		self.particles.len()
	}

	/// Whether the swarm has no particles.
	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	/// All particles.
	pub fn particles(&self) -> &[Particle<D>] {
		&self.particles
	}

	/// All particles, mutably.
	pub fn particles_mut(&mut self) -> &mut [Particle<D>] {
		&mut self.particles
	}

	/// Pulls every particle inside `bounds` without re-randomizing anything.
	pub fn clamp_into(&mut self, bounds: &Bounds<D>) {
		for p in &mut self.particles {
			bounds.clamp(&mut p.position);
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::fireflies::config::PlanarConfig;

	fn settings(count: usize, colors: &[&str]) -> SwarmSettings {
		PlanarConfig {
			count,
			colors: colors.iter().map(|c| c.to_string()).collect(),
			..PlanarConfig::default()
		}
		.validate()
		.unwrap()
		.swarm
	}

	fn planar_store(settings: &SwarmSettings, seed: u64) -> ParticleStore<2> {
		let mut rng = SmallRng::seed_from_u64(seed);
		let bounds = Bounds::planar(Viewport::new(800.0, 600.0));
		ParticleStore::initialize(settings, &bounds, &Motion::planar(1.0), &mut rng)
	}

	#[test]
	fn allocates_exactly_count() {
		for count in [0, 1, 37, 200] {
			let store = planar_store(&settings(count, &["#ffffff"]), count as u64);
			assert_eq!(store.len(), count);
		}
		assert!(planar_store(&settings(0, &["#ffffff"]), 1).is_empty());
	}

	#[test]
	fn single_color_palette_is_uniform() {
		let store = planar_store(&settings(50, &["#111111"]), 3);
		assert_eq!(store.len(), 50);
		assert!(store.particles().iter().all(|p| p.color.to_css() == "#111111"));
	}

	#[test]
	fn attributes_respect_configured_ranges() {
		let s = settings(300, &["#4F46E5", "#F8FAFC"]);
		let store = planar_store(&s, 5);
		let bounds = Bounds::planar(Viewport::new(800.0, 600.0));
		for p in store.particles() {
			assert!(bounds.contains(&p.position, 0.0));
			assert!(p.size >= s.size * SIZE_JITTER.0 && p.size <= s.size * SIZE_JITTER.1);
			assert!(p.opacity >= s.min_opacity && p.opacity <= s.max_opacity);
			assert!(p.period >= s.min_duration && p.period <= s.max_duration);
			assert!(p.velocity.iter().all(|v| v.abs() <= 0.25));
		}
	}

	#[test]
	fn structure_is_reproducible_but_trajectories_are_not() {
		let colors = ["#ff0000", "#00ff00", "#0000ff"];
		let s = settings(3000, &colors);
		let a = planar_store(&s, 100);
		let b = planar_store(&s, 200);

		assert_eq!(a.len(), b.len());
		assert_ne!(a.particles()[0].position, b.particles()[0].position);

		for color in colors {
			let share = |store: &ParticleStore<2>| {
				store
					.particles()
					.iter()
					.filter(|p| p.color.to_css() == color)
					.count() as f64
					/ store.len() as f64
			};
			assert!((share(&a) - share(&b)).abs() < 0.05);
			assert!((share(&a) - 1.0 / 3.0).abs() < 0.05);
		}
	}

	#[test]
	fn clamp_into_keeps_every_particle() {
		let mut store = planar_store(&settings(100, &["#ffffff"]), 9);
		let smaller = Bounds::planar(Viewport::new(200.0, 100.0));
		store.clamp_into(&smaller);
		assert_eq!(store.len(), 100);
		assert!(store.particles().iter().all(|p| smaller.contains(&p.position, 0.0)));
	}

	#[test]
	fn spatial_bounds_extend_past_viewport() {
		let bounds = Bounds::spatial(Viewport::new(1000.0, 500.0), 300.0);
		assert_eq!(bounds.min, [-750.0, -375.0, -300.0]);
		assert_eq!(bounds.max, [750.0, 375.0, 300.0]);
		assert_eq!(bounds.extent(), [1500.0, 750.0, 600.0]);
	}

	#[test]
	fn inverted_axes_collapse() {
		let bounds = Bounds::new([10.0], [0.0]);
		assert_eq!(bounds.max, [10.0]);
		assert_eq!(bounds.extent(), [0.0]);
		let mut p = [42.0];
		bounds.clamp(&mut p);
		assert_eq!(p, [10.0]);
	}
}
