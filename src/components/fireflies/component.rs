//! Browser adapter: mounts a swarm on a host element and drives it with
//! `requestAnimationFrame`.
//!
//! The lifecycle lives in an `Rc<RefCell<..>>` owned by the returned
//! [`DeactivateHandle`]. The frame callback and event listeners only hold
//! `Weak` references, so dropping the handle tears everything down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlElement, MouseEvent, Window};

use super::config::{PlanarConfig, SpatialConfig};
use super::dom::DomSurface;
use super::engine::{PlanarEngine, SpatialEngine, SwarmEngine};
use super::error::{SurfaceError, SwarmError};
use super::lifecycle::{Activation, Lifecycle, Listener};
use super::particle::Viewport;
use super::random::MathRandom;
use super::scheduler::{FrameClock, FrameHandle};
use super::webgl::GlSurface;

const HOST_STYLE: &str =
	"position: fixed; inset: 0; overflow: hidden; pointer-events: none; z-index: 10;";

/// [`FrameClock`] backed by `window.requestAnimationFrame`.
pub struct RafClock {
	window: Window,
	callback: Closure<dyn FnMut(f64)>,
}

impl FrameClock for RafClock {
	fn request(&mut self) -> Result<FrameHandle, SurfaceError> {
		let id = self
			.window
			.request_animation_frame(self.callback.as_ref().unchecked_ref())?;
		Ok(FrameHandle(id))
	}

	fn cancel(&mut self, handle: FrameHandle) {
		if let Err(e) = self.window.cancel_animation_frame(handle.0) {
			debug!("fireflies: cancelAnimationFrame failed: {:?}", e);
		}
	}
}

trait Controller {
	fn deactivate(&self);
	fn is_active(&self) -> bool;
}

impl<E: SwarmEngine, C: FrameClock> Controller for RefCell<Lifecycle<E, C>> {
	fn deactivate(&self) {
		match self.try_borrow_mut() {
			Ok(mut lifecycle) => lifecycle.deactivate(),
			Err(_) => warn!("fireflies: deactivation requested while a frame is running"),
		}
	}

	fn is_active(&self) -> bool {
		self.try_borrow().map_or(true, |lifecycle| lifecycle.is_active())
	}
}

/// Owner of a mounted swarm. Deactivates on [`deactivate`](Self::deactivate) or drop.
#[must_use = "dropping the handle stops the swarm"]
pub struct DeactivateHandle {
	controller: Option<Rc<dyn Controller>>,
}

impl DeactivateHandle {
	fn new(controller: Rc<dyn Controller>) -> Self {
		Self {
			controller: Some(controller),
		}
	}

	/// A handle with nothing behind it: disabled, deferred or failed mounts.
	pub fn inert() -> Self {
		Self { controller: None }
	}

	/// Stops the loop, detaches listeners and releases the surface. Idempotent.
	pub fn deactivate(&mut self) {
		if let Some(controller) = self.controller.take() {
			controller.deactivate();
		}
	}

	/// Whether the swarm is still running. Turns false after a fatal frame error too.
	pub fn is_active(&self) -> bool {
		self.controller.as_ref().is_some_and(|c| c.is_active())
	}
}

impl Drop for DeactivateHandle {
	fn drop(&mut self) {
		self.deactivate();
	}
}

/// Subscribes `handler` to `event` on `target` until the listener drops.
pub fn listen<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Listener, SurfaceError>
where
	F: FnMut(Event) + 'static,
{
	let closure = Closure::<dyn FnMut(Event)>::new(handler);
	target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
	let target = target.clone();
	Ok(Listener::new(move || {
		let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
	}))
}

/// Host size in CSS pixels, falling back to the window when the host has no layout yet.
fn measure(host: &HtmlElement, window: &Window) -> Viewport {
	let rect = host.get_bounding_client_rect();
	if rect.width() > 0.0 && rect.height() > 0.0 {
		return Viewport::new(rect.width(), rect.height());
	}
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
}

fn now_seconds(window: &Window) -> f64 {
	window.performance().map_or(0.0, |p| p.now() / 1000.0)
}

fn with_lifecycle<E, F>(state: &Weak<RefCell<Lifecycle<E, RafClock>>>, f: F)
where
	E: SwarmEngine,
	F: FnOnce(&mut Lifecycle<E, RafClock>),
{
	let Some(state) = state.upgrade() else {
		return;
	};
	if let Ok(mut lifecycle) = state.try_borrow_mut() {
		f(&mut lifecycle);
	}
}

fn activate<E, F>(host: &HtmlElement, enabled: bool, build: F) -> Result<DeactivateHandle, SwarmError>
where
	E: SwarmEngine + 'static,
	F: FnOnce(Viewport) -> Result<E, SwarmError>,
{
	let window = web_sys::window().ok_or(SurfaceError::Unsupported("window"))?;

	let state = Rc::new_cyclic(|weak: &Weak<RefCell<Lifecycle<E, RafClock>>>| {
		let weak = weak.clone();
		let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
			with_lifecycle(&weak, |lifecycle| lifecycle.frame(timestamp / 1000.0));
		});
		RefCell::new(Lifecycle::new(RafClock {
			window: window.clone(),
			callback,
		}))
	});

	let host_bounds = host.is_connected().then(|| measure(host, &window));
	let outcome = state.borrow_mut().activate(host_bounds, enabled, build)?;
	if outcome != Activation::Started {
		debug!("fireflies: mount skipped ({:?})", outcome);
		return Ok(DeactivateHandle::inert());
	}
	// From here on an early return drops the handle and tears down.
	let handle = DeactivateHandle::new(state.clone());

	let resize = {
		let weak = Rc::downgrade(&state);
		let (host, win) = (host.clone(), window.clone());
		listen(&window, "resize", move |_| {
			let viewport = measure(&host, &win);
			with_lifecycle(&weak, |lifecycle| lifecycle.resize(viewport));
		})?
	};
	state.borrow_mut().attach_listener(resize);

	if state.borrow().wants_pointer() {
		let weak = Rc::downgrade(&state);
		let win = window.clone();
		let pointer = listen(&window, "mousemove", move |event: Event| {
			let Some(event) = event.dyn_ref::<MouseEvent>() else {
				return;
			};
			let (x, y, now) = (event.client_x() as f64, event.client_y() as f64, now_seconds(&win));
			with_lifecycle(&weak, |lifecycle| lifecycle.pointer_moved(x, y, now));
		})?;
		state.borrow_mut().attach_listener(pointer);
	}

	Ok(handle)
}

/// Mounts a planar swarm of DOM markers inside `host`.
pub fn try_mount(host: &HtmlElement, config: PlanarConfig) -> Result<DeactivateHandle, SwarmError> {
	let enabled = config.enabled;
	let surface_host = host.clone();
	activate(host, enabled, move |viewport| {
		let settings = config.validate()?;
		let surface = DomSurface::new(&surface_host)?;
		Ok(PlanarEngine::new(settings, viewport, surface, MathRandom)?)
	})
}

/// Mounts a WebGL swarm inside `host`.
pub fn try_mount_spatial(host: &HtmlElement, config: SpatialConfig) -> Result<DeactivateHandle, SwarmError> {
	let enabled = config.enabled;
	let surface_host = host.clone();
	activate(host, enabled, move |viewport| {
		let settings = config.validate()?;
		let surface = GlSurface::new(&surface_host, viewport)?;
		Ok(SpatialEngine::new(settings, viewport, surface, MathRandom)?)
	})
}

/// Like [`try_mount`], but logs failures and hands back an inert handle.
pub fn mount(host: &HtmlElement, config: PlanarConfig) -> DeactivateHandle {
	try_mount(host, config).unwrap_or_else(|e| {
		warn!("fireflies: could not mount planar swarm: {}", e);
		DeactivateHandle::inert()
	})
}

/// Like [`try_mount_spatial`], but logs failures and hands back an inert handle.
pub fn mount_spatial(host: &HtmlElement, config: SpatialConfig) -> DeactivateHandle {
	try_mount_spatial(host, config).unwrap_or_else(|e| {
		warn!("fireflies: could not mount spatial swarm: {}", e);
		DeactivateHandle::inert()
	})
}

/// Decorative DOM firefly layer covering the viewport.
///
/// Remounts whenever `config` changes; the previous swarm is torn down first.
#[component]
pub fn Fireflies(
	#[prop(into, default = Signal::derive(PlanarConfig::default))] config: Signal<PlanarConfig>,
) -> impl IntoView {
	let host_ref = NodeRef::<leptos::html::Div>::new();

	Effect::new(move |previous: Option<Option<DeactivateHandle>>| {
		if let Some(Some(mut handle)) = previous {
			handle.deactivate();
		}
		let host = host_ref.get()?;
		Some(mount(&host, config.get()))
	});

	view! { <div node_ref=host_ref class="fireflies" aria-hidden="true" style=HOST_STYLE></div> }
}

/// WebGL firefly layer with the pointer-following camera.
#[component]
pub fn SpatialFireflies(
	#[prop(into, default = Signal::derive(SpatialConfig::default))] config: Signal<SpatialConfig>,
) -> impl IntoView {
	let host_ref = NodeRef::<leptos::html::Div>::new();

	Effect::new(move |previous: Option<Option<DeactivateHandle>>| {
		if let Some(Some(mut handle)) = previous {
			handle.deactivate();
		}
		let host = host_ref.get()?;
		Some(mount_spatial(&host, config.get()))
	});

	view! { <div node_ref=host_ref class="fireflies-spatial" aria-hidden="true" style=HOST_STYLE></div> }
}
