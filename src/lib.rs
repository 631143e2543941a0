//! firefly-swarm: ambient firefly particle backgrounds for Leptos sites.
//!
//! This crate provides a planar swarm of glowing DOM markers and a spatial
//! WebGL swarm viewed through a pointer-following camera, both mounted as
//! decorative layers behind page content.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::fireflies::{
	DeactivateHandle, Fireflies, Palette, PlanarConfig, SpatialConfig, SpatialFireflies, SwarmError,
	mount, mount_spatial, try_mount, try_mount_spatial,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("firefly-swarm: logging initialized");
}

/// Swarm overrides for the demo page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
	/// Overrides for the page-level DOM swarm.
	pub planar: PlanarConfig,
	/// Overrides for the WebGL swarm.
	pub spatial: SpatialConfig,
}

impl Default for SiteConfig {
	fn default() -> Self {
		Self {
			planar: PlanarConfig::page_swarm(),
			spatial: SpatialConfig::default(),
		}
	}
}

impl SiteConfig {
	/// Parses a config document; missing keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

/// Load swarm configuration from a script element with id="firefly-config".
/// Expected format: JSON with optional { planar: {...}, spatial: {...} }
fn load_config() -> Option<SiteConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("firefly-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match SiteConfig::from_json(&json_text) {
		Ok(config) => {
			info!(
				"firefly-swarm: loaded config ({} planar, {} spatial fireflies)",
				config.planar.count, config.spatial.count
			);
			Some(config)
		}
		Err(e) => {
			warn!("firefly-swarm: failed to parse firefly config: {}", e);
			None
		}
	}
}

/// Main application component.
/// Layers the page-level swarm over the spatial swarm.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config().unwrap_or_default();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Fireflies" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<SpatialFireflies config=config.spatial />
		<Fireflies config=config.planar />
		<main class="firefly-demo">
			<h1>"Fireflies"</h1>
			<p class="subtitle">"Move the pointer to lean the camera."</p>
		</main>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_site_config_uses_page_defaults() {
		let config = SiteConfig::from_json("{}").unwrap();
		assert_eq!(config, SiteConfig::default());
		assert_eq!(config.planar.count, 40);
		assert_eq!(config.planar.min_duration, 12.0);
		assert_eq!(config.spatial.count, 200);
	}

	#[test]
	fn site_config_overrides_each_swarm() {
		let config = SiteConfig::from_json(
			r#"{ "planar": { "count": 12, "twinkle": true }, "spatial": { "enabled": false } }"#,
		)
		.unwrap();
		assert_eq!(config.planar.count, 12);
		assert!(config.planar.twinkle);
		assert!(!config.spatial.enabled);
		assert_eq!(config.spatial.sphere_radius, 300.0);
	}

	#[test]
	fn malformed_site_config_is_rejected() {
		assert!(SiteConfig::from_json(r#"{ "planar": { "count": "many" } }"#).is_err());
	}
}
