//! Display-refresh scheduling for the swarm loop.
//!
//! The loop is a single self-rescheduling callback: each frame consumes its
//! pending request, runs the update, then asks the clock for the next one.
//! [`FrameScheduler::cancel`] withdraws the outstanding request synchronously,
//! so nothing fires after it returns.

use super::error::SurfaceError;

/// Opaque id of one requested frame (the `requestAnimationFrame` id in the browser).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(
	/// Id returned by `requestAnimationFrame`.
	pub i32,
);

/// Source of display-refresh callbacks.
pub trait FrameClock {
	/// Ask for one callback on the next refresh.
	fn request(&mut self) -> Result<FrameHandle, SurfaceError>;

	/// Withdraw a request that has not fired yet.
	fn cancel(&mut self, handle: FrameHandle);

	/// Notification that `handle` fired and is no longer pending.
	fn fired(&mut self, _handle: FrameHandle) {}
}

/// Drives a [`FrameClock`] with at most one outstanding request.
#[derive(Debug)]
pub struct FrameScheduler<C> {
	clock: C,
	pending: Option<FrameHandle>,
	running: bool,
	frames: u64,
}

impl<C: FrameClock> FrameScheduler<C> {
	/// A stopped scheduler over `clock`.
	pub fn new(clock: C) -> Self {
		Self {
			clock,
			pending: None,
			running: false,
			frames: 0,
		}
	}

	/// Starts the loop by requesting the first frame. No-op when already running.
	pub fn start(&mut self) -> Result<(), SurfaceError> {
		if self.running {
			return Ok(());
		}
		self.running = true;
		self.frames = 0;
		self.reschedule().inspect_err(|_| self.running = false)
	}

	/// Called when a frame fires. Returns whether the update should run.
	pub fn begin_frame(&mut self) -> bool {
		if let Some(handle) = self.pending.take() {
			self.clock.fired(handle);
		}
		if !self.running {
			return false;
		}
		self.frames += 1;
		true
	}

	/// Requests the next frame unless cancelled or already pending.
	pub fn reschedule(&mut self) -> Result<(), SurfaceError> {
		if !self.running || self.pending.is_some() {
			return Ok(());
		}
		self.pending = Some(self.clock.request()?);
		Ok(())
	}

	/// Stops the loop. Safe to call any number of times.
	pub fn cancel(&mut self) {
		self.running = false;
		if let Some(handle) = self.pending.take() {
			self.clock.cancel(handle);
		}
	}

	/// Whether the loop is live.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Number of outstanding frame requests (0 or 1).
	pub fn pending(&self) -> usize {
		usize::from(self.pending.is_some())
	}

	/// Frames run since the last `start`.
	pub fn frames(&self) -> u64 {
		self.frames
	}

	/// The underlying clock.
	pub fn clock(&self) -> &C {
		&self.clock
	}
}

/// A clock that only advances when told to. Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
	next_id: i32,
	outstanding: Vec<FrameHandle>,
	requested: usize,
	cancelled: usize,
}

impl ManualClock {
	/// A clock with nothing requested.
	pub fn new() -> Self {
		Self::default()
	}

	/// Requests that have neither fired nor been cancelled.
	pub fn outstanding(&self) -> usize {
		self.outstanding.len()
	}

	/// Total requests made.
	pub fn requested(&self) -> usize {
		self.requested
	}

	/// Total requests withdrawn.
	pub fn cancelled(&self) -> usize {
		self.cancelled
	}
}

impl FrameClock for ManualClock {
	fn request(&mut self) -> Result<FrameHandle, SurfaceError> {
		self.next_id += 1;
		let handle = FrameHandle(self.next_id);
		self.outstanding.push(handle);
		self.requested += 1;
		Ok(handle)
	}

	fn cancel(&mut self, handle: FrameHandle) {
		if let Some(pos) = self.outstanding.iter().position(|h| *h == handle) {
			self.outstanding.remove(pos);
			self.cancelled += 1;
		}
	}

	fn fired(&mut self, handle: FrameHandle) {
		self.outstanding.retain(|h| *h != handle);
	}
}
