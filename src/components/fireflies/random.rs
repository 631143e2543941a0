//! Random sources for the swarm.
//!
//! Engines accept any [`rand::Rng`], so tests hand in a seeded `SmallRng`
//! while the browser build uses [`MathRandom`].

use rand::{Rng, RngCore};

/// `Math.random()` exposed as a [`RngCore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MathRandom;

impl RngCore for MathRandom {
	fn next_u32(&mut self) -> u32 {
		(js_sys::Math::random() * 4_294_967_296.0) as u32
	}

	fn next_u64(&mut self) -> u64 {
		((self.next_u32() as u64) << 32) | self.next_u32() as u64
	}

	fn fill_bytes(&mut self, dst: &mut [u8]) {
		for chunk in dst.chunks_mut(4) {
			let bytes = self.next_u32().to_le_bytes();
			chunk.copy_from_slice(&bytes[..chunk.len()]);
		}
	}
}

/// Uniform sample in `[lo, hi)`. An empty range yields `lo` instead of panicking.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
	lo + rng.random::<f64>() * (hi - lo)
}

/// Centered sample in `[-scale / 2, scale / 2)`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
	(rng.random::<f64>() - 0.5) * scale
}
