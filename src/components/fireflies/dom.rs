//! Planar surface: one absolutely positioned `div` per firefly.
//!
//! Markers glow with a box-shadow that pulses through shared CSS keyframes;
//! the frame commit only rewrites `left`, `top` and `opacity`.

use std::f64::consts::TAU;

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlStyleElement};

use super::engine::{Frame, Surface};
use super::error::SurfaceError;
use super::particle::{Particle, Viewport};
use super::stylesheet::{StyleLease, StyleNode, StyleRegistry};

/// Id of the shared `<style>` element carrying the glow keyframes.
pub const PULSE_STYLE_ID: &str = "firefly-animations";

/// Longest random start offset of a marker's glow animation, in seconds.
const MAX_PULSE_DELAY: f64 = 5.0;

const PULSE_KEYFRAMES: &str = "
@keyframes firefly-pulse {
	0%, 100% {
		box-shadow: 0 0 var(--glow-size) var(--glow-intensity) var(--glow-color);
	}
	50% {
		box-shadow: 0 0 calc(var(--glow-size) * 1.2) calc(var(--glow-intensity) * 1.2) var(--glow-color);
	}
}
";

thread_local! {
	static STYLES: StyleRegistry<HtmlStyleElement> = StyleRegistry::new();
}

impl StyleNode for HtmlStyleElement {
	fn detach(&self) {
		self.remove();
	}
}

fn install_keyframes(document: &Document) -> Result<HtmlStyleElement, SurfaceError> {
	let style: HtmlStyleElement = document
		.create_element("style")?
		.dyn_into()
		.map_err(|_| SurfaceError::Js("created <style> is not an HtmlStyleElement".into()))?;
	style.set_id(PULSE_STYLE_ID);
	style.set_text_content(Some(PULSE_KEYFRAMES));
	document
		.head()
		.ok_or(SurfaceError::Unsupported("document head"))?
		.append_child(&style)?;
	debug!("fireflies: installed {} stylesheet", PULSE_STYLE_ID);
	Ok(style)
}

/// DOM markers inside the host element.
pub struct DomSurface {
	document: Document,
	host: HtmlElement,
	markers: Vec<HtmlElement>,
	style: Option<StyleLease<HtmlStyleElement>>,
}

impl DomSurface {
	/// A surface that will place markers inside `host`.
	pub fn new(host: &HtmlElement) -> Result<Self, SurfaceError> {
		let document = host
			.owner_document()
			.ok_or(SurfaceError::Unsupported("host document"))?;
		Ok(Self {
			document,
			host: host.clone(),
			markers: Vec::new(),
			style: None,
		})
	}

	fn create_marker(&self, p: &Particle<2>) -> Result<HtmlElement, SurfaceError> {
		let marker: HtmlElement = self
			.document
			.create_element("div")?
			.dyn_into()
			.map_err(|_| SurfaceError::Js("created <div> is not an HtmlElement".into()))?;

		let color = p.color.to_css_rgb();
		let glow = p.color.with_alpha(0.5).to_css();
		let delay = p.phase / TAU * MAX_PULSE_DELAY;
		let style = marker.style();

		for (name, value) in [
			("--glow-size", format!("{}px", p.size * 2.0)),
			("--glow-intensity", format!("{}px", p.size)),
			("--glow-color", glow.clone()),
			("position", "absolute".to_string()),
			("left", format!("{}px", p.position[0])),
			("top", format!("{}px", p.position[1])),
			("width", format!("{}px", p.size)),
			("height", format!("{}px", p.size)),
			("background-color", color),
			("border-radius", "50%".to_string()),
			("opacity", p.opacity.to_string()),
			("box-shadow", format!("0 0 {}px {}px {}", p.size * 2.0, p.size, glow)),
			(
				"animation",
				format!("firefly-pulse {}s infinite ease-in-out", p.period),
			),
			("animation-delay", format!("{delay}s")),
			("pointer-events", "none".to_string()),
			("will-change", "left, top".to_string()),
			("transform", "translate3d(0, 0, 0)".to_string()),
		] {
			style.set_property(name, &value)?;
		}
		Ok(marker)
	}
}

impl Surface<2> for DomSurface {
	fn populate(&mut self, particles: &[Particle<2>]) -> Result<(), SurfaceError> {
		let document = self.document.clone();
		self.style = Some(STYLES.with(|styles| {
			styles.acquire(PULSE_STYLE_ID, || install_keyframes(&document))
		})?);

		self.markers.reserve(particles.len());
		for p in particles {
			let marker = self.create_marker(p)?;
			self.host.append_child(&marker)?;
			self.markers.push(marker);
		}
		Ok(())
	}

	fn commit(&mut self, frame: &Frame<'_, 2>) -> Result<(), SurfaceError> {
		for (marker, p) in self.markers.iter().zip(frame.particles) {
			let style = marker.style();
			style.set_property("left", &format!("{}px", p.position[0]))?;
			style.set_property("top", &format!("{}px", p.position[1]))?;
			style.set_property("opacity", &p.opacity.to_string())?;
		}
		Ok(())
	}

	fn resize(&mut self, _viewport: Viewport) -> Result<(), SurfaceError> {
		Ok(())
	}

	fn dispose(&mut self) -> Result<(), SurfaceError> {
		for marker in self.markers.drain(..) {
			marker.remove();
		}
		self.style = None;
		Ok(())
	}
}
