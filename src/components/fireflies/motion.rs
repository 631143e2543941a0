//! The per-frame update step: wander, damp, integrate, bounce.

use std::f64::consts::TAU;

use rand::Rng;

use super::particle::{Bounds, Particle};
use super::random::jitter;

/// Velocity retained each frame.
pub const DAMPING: f64 = 0.99;

/// Tuning for one engine's motion. All velocities are per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
	/// Spread of the initial velocity on each axis.
	pub initial: f64,
	/// Spread of the random nudge added every frame.
	pub wander: f64,
	/// Velocity retained per frame.
	pub damping: f64,
	/// Fraction of speed kept (and reversed) when hitting a bound.
	pub restitution: f64,
}

impl Motion {
	/// Pixel-space drift for DOM markers.
	pub fn planar(speed: f64) -> Self {
		Self {
			initial: 0.5 * speed,
			wander: 0.03 * speed,
			damping: DAMPING,
			restitution: 0.5,
		}
	}

	/// World-space drift for the 3D swarm.
	pub fn spatial(speed: f64) -> Self {
		Self {
			initial: speed,
			wander: speed / 15.0,
			damping: DAMPING,
			restitution: 0.8,
		}
	}
}

/// Advances one particle by a frame.
pub fn step<const D: usize, R: Rng + ?Sized>(
	particle: &mut Particle<D>,
	bounds: &Bounds<D>,
	motion: &Motion,
	rng: &mut R,
) {
	for axis in 0..D {
		let mut v = particle.velocity[axis] + jitter(rng, motion.wander);
		v *= motion.damping;

		let mut x = particle.position[axis] + v;
		if x < bounds.min[axis] || x > bounds.max[axis] {
			v = -v * motion.restitution;
			x = x.clamp(bounds.min[axis], bounds.max[axis]);
		}

		particle.velocity[axis] = v;
		particle.position[axis] = x;
	}
}

/// Opacity of a pulsing particle at `time` seconds, inside `[min, max]`.
pub fn pulse_opacity(time: f64, phase: f64, period: f64, min: f64, max: f64) -> f64 {
	let wave = 0.5 + 0.5 * (TAU * time / period + phase).sin();
	(min + (max - min) * wave).max(min).min(max).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::fireflies::color::Color;

	fn particle<const D: usize>(position: [f64; D], velocity: [f64; D]) -> Particle<D> {
		Particle {
			position,
			velocity,
			size: 4.0,
			base_opacity: 0.5,
			opacity: 0.5,
			color: Color::rgb(255, 255, 255),
			phase: 0.0,
			period: 5.0,
		}
	}

	#[test]
	fn damping_decays_velocity_without_wander() {
		let mut rng = SmallRng::seed_from_u64(1);
		let motion = Motion {
			wander: 0.0,
			..Motion::planar(1.0)
		};
		let bounds = Bounds::new([-1e6, -1e6], [1e6, 1e6]);
		let mut p = particle([0.0, 0.0], [1.0, -2.0]);

		for _ in 0..100 {
			step(&mut p, &bounds, &motion, &mut rng);
		}
		let expected = DAMPING.powi(100);
		assert!((p.velocity[0] - expected).abs() < 1e-9);
		assert!((p.velocity[1] + 2.0 * expected).abs() < 1e-9);
	}

	#[test]
	fn bounce_clamps_and_reverses_with_loss() {
		let mut rng = SmallRng::seed_from_u64(2);
		let motion = Motion {
			wander: 0.0,
			damping: 1.0,
			..Motion::planar(1.0)
		};
		let bounds = Bounds::new([0.0, 0.0], [10.0, 10.0]);
		let mut p = particle([9.5, 0.5], [2.0, -1.0]);

		step(&mut p, &bounds, &motion, &mut rng);
		assert_eq!(p.position, [10.0, 0.0]);
		assert_eq!(p.velocity, [-1.0, 0.5]);
	}

	#[test]
	fn particles_never_leave_bounds() {
		let mut rng = SmallRng::seed_from_u64(3);
		let motion = Motion::spatial(5.0);
		let bounds = Bounds::new([-20.0, -10.0, -5.0], [20.0, 10.0, 5.0]);
		let mut swarm: Vec<Particle<3>> = (0..40)
			.map(|_| particle(bounds.sample(&mut rng), [4.0, -3.0, 2.0]))
			.collect();

		for _ in 0..2000 {
			for p in &mut swarm {
				step(p, &bounds, &motion, &mut rng);
				assert!(bounds.contains(&p.position, 1e-9));
			}
		}
	}

	#[test]
	fn zero_size_bounds_pin_particles() {
		let mut rng = SmallRng::seed_from_u64(4);
		let bounds = Bounds::new([0.0, 0.0], [0.0, 0.0]);
		let mut p = particle([0.0, 0.0], [0.3, 0.3]);
		for _ in 0..50 {
			step(&mut p, &bounds, &Motion::planar(1.0), &mut rng);
		}
		assert_eq!(p.position, [0.0, 0.0]);
	}

	#[test]
	fn pulse_stays_in_range_and_varies_with_phase() {
		let (min, max) = (0.3, 0.6);
		let mut t = 0.0;
		while t < 30.0 {
			let o = pulse_opacity(t, 1.3, 4.0, min, max);
			assert!((min - 1e-12..=max + 1e-12).contains(&o));
			t += 0.017;
		}
		assert_ne!(
			pulse_opacity(1.0, 0.0, 4.0, min, max),
			pulse_opacity(1.0, 2.0, 4.0, min, max)
		);
	}

	#[test]
	fn pulse_is_clamped_to_unit_range() {
		assert_eq!(pulse_opacity(0.0, TAU / 4.0, 1.0, 0.9, 1.4), 1.0);
		assert_eq!(pulse_opacity(0.0, -TAU / 4.0, 1.0, -0.4, 0.1), 0.0);
	}
}
