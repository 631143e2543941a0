//! Activation state machine binding an engine to its host.
//!
//! `Inactive` becomes `Active` once the host exists and the swarm is enabled:
//! the engine is built, the frame loop started and listeners attached.
//! Deactivation cancels the loop, detaches listeners and disposes the engine
//! before returning, and always lands back in `Inactive`.

use log::{debug, info, warn};

use super::engine::SwarmEngine;
use super::error::SwarmError;
use super::particle::Viewport;
use super::scheduler::{FrameClock, FrameScheduler};

/// Outcome of an activation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
	/// Engine built and frame loop running.
	Started,
	/// `enabled` was false; nothing allocated, any running swarm released.
	Disabled,
	/// Host not available yet; retry once it is mounted.
	Deferred,
	/// An engine is already running; deactivate first.
	AlreadyActive,
}

/// An event subscription owned by the active instance.
/// Detaches when dropped.
pub struct Listener {
	detach: Option<Box<dyn FnOnce()>>,
}

impl Listener {
	/// Wraps the closure that removes the subscription.
	pub fn new(detach: impl FnOnce() + 'static) -> Self {
		Self {
			detach: Some(Box::new(detach)),
		}
	}

	/// Removes the subscription now.
	pub fn detach(mut self) {
		self.run_detach();
	}

	fn run_detach(&mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		self.run_detach();
	}
}

/// Lifecycle controller for one host region. Dropping it deactivates.
pub struct Lifecycle<E: SwarmEngine, C: FrameClock> {
	scheduler: FrameScheduler<C>,
	engine: Option<E>,
	listeners: Vec<Listener>,
}

impl<E: SwarmEngine, C: FrameClock> Lifecycle<E, C> {
	/// An inactive controller driven by `clock`.
	pub fn new(clock: C) -> Self {
		Self {
			scheduler: FrameScheduler::new(clock),
			engine: None,
			listeners: Vec::new(),
		}
	}

	/// Builds the engine with `build` and starts the frame loop.
	///
	/// A missing host or a disabled swarm is not an error: nothing is
	/// allocated and the outcome says why. Disabling an active swarm
	/// tears it down.
	pub fn activate<F>(
		&mut self,
		host: Option<Viewport>,
		enabled: bool,
		build: F,
	) -> Result<Activation, SwarmError>
	where
		F: FnOnce(Viewport) -> Result<E, SwarmError>,
	{
		if !enabled {
			if self.engine.is_some() {
				debug!("fireflies: disabled while active, tearing down");
				self.deactivate();
			} else {
				debug!("fireflies: disabled, skipping activation");
			}
			return Ok(Activation::Disabled);
		}
		if self.engine.is_some() {
			return Ok(Activation::AlreadyActive);
		}
		let Some(viewport) = host else {
			debug!("fireflies: host not mounted yet, deferring activation");
			return Ok(Activation::Deferred);
		};

		let mut engine = build(viewport)?;
		if let Err(e) = self.scheduler.start() {
			if let Err(dispose) = engine.dispose() {
				warn!("fireflies: cleanup after failed start: {}", dispose);
			}
			return Err(e.into());
		}

		info!(
			"fireflies: activated {} particles in {}x{}",
			engine.particle_count(),
			viewport.width,
			viewport.height
		);
		self.engine = Some(engine);
		Ok(Activation::Started)
	}

	/// Hands a subscription to the active instance. Detached at once when inactive.
	pub fn attach_listener(&mut self, listener: Listener) {
		if self.engine.is_some() {
			self.listeners.push(listener);
		} else {
			listener.detach();
		}
	}

	/// Runs one frame if the loop is live, then requests the next.
	pub fn frame(&mut self, now: f64) {
		if !self.scheduler.begin_frame() {
			return;
		}
		let Some(engine) = self.engine.as_mut() else {
			self.scheduler.cancel();
			return;
		};
		if let Err(e) = engine.frame(now) {
			warn!("fireflies: frame failed, stopping: {}", e);
			self.deactivate();
			return;
		}
		if let Err(e) = self.scheduler.reschedule() {
			warn!("fireflies: could not schedule next frame: {}", e);
			self.deactivate();
		}
	}

	/// Fits the swarm into a new host size without rebuilding it.
	pub fn resize(&mut self, viewport: Viewport) {
		if let Some(engine) = self.engine.as_mut() {
			if let Err(e) = engine.resize(viewport) {
				warn!("fireflies: resize failed: {}", e);
			}
		}
	}

	/// Forwards a pointer sample in client pixels.
	pub fn pointer_moved(&mut self, client_x: f64, client_y: f64, now: f64) {
		if let Some(engine) = self.engine.as_mut() {
			engine.pointer_moved(client_x, client_y, now);
		}
	}

	/// Tears everything down. Idempotent; disposal failures are logged, not returned.
	pub fn deactivate(&mut self) {
		self.scheduler.cancel();
		self.listeners.clear();

		if let Some(mut engine) = self.engine.take() {
			if let Err(e) = engine.dispose() {
				warn!("fireflies: failed to release rendering resources: {}", e);
			}
			info!("fireflies: deactivated after {} frames", self.scheduler.frames());
		}
	}

	/// Whether an engine is running.
	pub fn is_active(&self) -> bool {
		self.engine.is_some()
	}

	/// Whether pointer events should be subscribed.
	pub fn wants_pointer(&self) -> bool {
		self.engine.as_ref().is_some_and(|e| e.wants_pointer())
	}

	/// The running engine, if any.
	pub fn engine(&self) -> Option<&E> {
		self.engine.as_ref()
	}

	/// The frame scheduler.
	pub fn scheduler(&self) -> &FrameScheduler<C> {
		&self.scheduler
	}

	/// Number of subscriptions held.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Frame callbacks still owed by the platform (0 or 1).
	pub fn pending_frames(&self) -> usize {
		self.scheduler.pending()
	}
}

impl<E: SwarmEngine, C: FrameClock> Drop for Lifecycle<E, C> {
	fn drop(&mut self) {
		self.deactivate();
	}
}
