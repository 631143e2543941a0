//! Swarm configuration as supplied by the host page, and its validated form.
//!
//! Configs deserialize from camelCase JSON with every field optional. They
//! are immutable for an activation: a changed config means a fresh mount.

use serde::Deserialize;

use super::color::Palette;
use super::error::ConfigError;

/// Configuration for the DOM-based planar swarm.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanarConfig {
	/// Number of fireflies.
	pub count: usize,
	/// Base marker diameter in pixels, jittered per particle.
	pub size: f64,
	/// Lower bound of marker opacity.
	pub min_opacity: f64,
	/// Upper bound of marker opacity.
	pub max_opacity: f64,
	/// CSS colors; each firefly picks one at random.
	pub colors: Vec<String>,
	/// Scales initial drift and wandering.
	pub speed: f64,
	/// Shortest glow pulse period in seconds.
	pub min_duration: f64,
	/// Longest glow pulse period in seconds.
	pub max_duration: f64,
	/// Pulse opacity every frame instead of keeping each marker's fixed opacity.
	pub twinkle: bool,
	/// Set to false to render nothing.
	pub enabled: bool,
}

impl Default for PlanarConfig {
	fn default() -> Self {
		Self {
			count: 50,
			size: 4.0,
			min_opacity: 0.3,
			max_opacity: 0.6,
			colors: Palette::professional().to_css_list(),
			speed: 1.0,
			min_duration: 3.0,
			max_duration: 7.0,
			twinkle: false,
			enabled: true,
		}
	}
}

impl PlanarConfig {
	/// The slow, sparse swarm that floats over the whole landing page.
	pub fn page_swarm() -> Self {
		Self {
			count: 40,
			min_duration: 12.0,
			max_duration: 20.0,
			colors: Palette::cosmic().to_css_list(),
			..Self::default()
		}
	}

	/// Checks every field and parses the palette.
	pub fn validate(&self) -> Result<PlanarSettings, ConfigError> {
		Ok(PlanarSettings {
			swarm: SwarmSettings::build(
				self.count,
				self.size,
				(self.min_opacity, self.max_opacity),
				&self.colors,
				self.speed,
				(self.min_duration, self.max_duration),
			)?,
			twinkle: self.twinkle,
		})
	}
}

/// Configuration for the WebGL spatial swarm.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpatialConfig {
	/// Number of fireflies.
	pub count: usize,
	/// Base sprite size in world units.
	pub size: f64,
	/// Lower bound of sprite opacity.
	pub min_opacity: f64,
	/// Upper bound of sprite opacity.
	pub max_opacity: f64,
	/// CSS colors; each firefly picks one at random.
	pub colors: Vec<String>,
	/// Scales initial drift and wandering.
	pub speed: f64,
	/// Shortest opacity pulse period in seconds.
	pub min_duration: f64,
	/// Longest opacity pulse period in seconds.
	pub max_duration: f64,
	/// Set to false to render nothing.
	pub enabled: bool,
	/// Half-depth of the swarm volume; the camera sits at twice this distance.
	pub sphere_radius: f64,
	/// Nudge the camera toward the pointer.
	pub camera_distortion: bool,
	/// Fraction of the remaining camera offset covered per frame.
	pub distortion_intensity: f64,
}

impl Default for SpatialConfig {
	fn default() -> Self {
		Self {
			count: 200,
			size: 20.0,
			min_opacity: 0.5,
			max_opacity: 0.9,
			colors: Palette::professional().to_css_list(),
			speed: 0.15,
			min_duration: 3.0,
			max_duration: 7.0,
			enabled: true,
			sphere_radius: 300.0,
			camera_distortion: true,
			distortion_intensity: 0.03,
		}
	}
}

impl SpatialConfig {
	/// Checks every field and parses the palette.
	pub fn validate(&self) -> Result<SpatialSettings, ConfigError> {
		let swarm = SwarmSettings::build(
			self.count,
			self.size,
			(self.min_opacity, self.max_opacity),
			&self.colors,
			self.speed,
			(self.min_duration, self.max_duration),
		)?;
		if !(self.sphere_radius.is_finite() && self.sphere_radius > 0.0) {
			return Err(ConfigError::InvalidSphereRadius(self.sphere_radius));
		}
		if !(0.0..=1.0).contains(&self.distortion_intensity) {
			return Err(ConfigError::DistortionOutOfRange(self.distortion_intensity));
		}
		Ok(SpatialSettings {
			swarm,
			sphere_radius: self.sphere_radius,
			camera_distortion: self.camera_distortion,
			distortion_intensity: self.distortion_intensity,
		})
	}
}

/// Validated settings shared by both engines.
#[derive(Clone, Debug, PartialEq)]
pub struct SwarmSettings {
	/// Number of particles.
	pub count: usize,
	/// Base particle size.
	pub size: f64,
	/// Lower bound of opacity.
	pub min_opacity: f64,
	/// Upper bound of opacity.
	pub max_opacity: f64,
	/// Parsed colors, never empty.
	pub palette: Palette,
	/// Drift scale.
	pub speed: f64,
	/// Shortest pulse period in seconds.
	pub min_duration: f64,
	/// Longest pulse period in seconds.
	pub max_duration: f64,
}

impl SwarmSettings {
	fn build(
		count: usize,
		size: f64,
		(min_opacity, max_opacity): (f64, f64),
		colors: &[String],
		speed: f64,
		(min_duration, max_duration): (f64, f64),
	) -> Result<Self, ConfigError> {
		if !(size.is_finite() && size > 0.0) {
			return Err(ConfigError::InvalidSize(size));
		}
		for (field, value) in [("minOpacity", min_opacity), ("maxOpacity", max_opacity)] {
			if !(0.0..=1.0).contains(&value) {
				return Err(ConfigError::OpacityOutOfRange { field, value });
			}
		}
		if min_opacity > max_opacity {
			return Err(ConfigError::OpacityRange {
				min: min_opacity,
				max: max_opacity,
			});
		}
		if !(speed.is_finite() && speed >= 0.0) {
			return Err(ConfigError::NegativeSpeed(speed));
		}
		let durations_ok = min_duration.is_finite()
			&& max_duration.is_finite()
			&& min_duration > 0.0
			&& min_duration <= max_duration;
		if !durations_ok {
			return Err(ConfigError::DurationRange {
				min: min_duration,
				max: max_duration,
			});
		}
		if colors.is_empty() {
			return Err(ConfigError::EmptyPalette);
		}
		let palette = Palette::parse(colors).map_err(ConfigError::InvalidColor)?;

		Ok(Self {
			count,
			size,
			min_opacity,
			max_opacity,
			palette,
			speed,
			min_duration,
			max_duration,
		})
	}
}

/// Validated planar configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarSettings {
	/// Shared swarm settings.
	pub swarm: SwarmSettings,
	/// Pulse opacity every frame.
	pub twinkle: bool,
}

/// Validated spatial configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialSettings {
	/// Shared swarm settings.
	pub swarm: SwarmSettings,
	/// Half-depth of the swarm volume.
	pub sphere_radius: f64,
	/// Whether the camera follows the pointer.
	pub camera_distortion: bool,
	/// Per-frame camera smoothing factor.
	pub distortion_intensity: f64,
}
