//! Error types for the firefly engines.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// A configuration value that would produce degenerate visuals.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
	/// No colors given.
	#[error("colors must contain at least one entry")]
	EmptyPalette,

	/// A color string that is not valid CSS.
	#[error("unrecognized color: {0:?}")]
	InvalidColor(String),

	/// Size is zero, negative or not finite.
	#[error("size must be a positive number, got {0}")]
	InvalidSize(f64),

	/// An opacity bound outside `0..=1`.
	#[error("{field} must be between 0 and 1, got {value}")]
	OpacityOutOfRange {
		/// JSON name of the offending field.
		field: &'static str,
		/// Value supplied.
		value: f64,
	},

	/// Opacity bounds in the wrong order.
	#[error("minOpacity ({min}) must not exceed maxOpacity ({max})")]
	OpacityRange {
		/// Configured minimum.
		min: f64,
		/// Configured maximum.
		max: f64,
	},

	/// Speed is negative or not finite.
	#[error("speed must be non-negative, got {0}")]
	NegativeSpeed(f64),

	/// Pulse durations non-positive or in the wrong order.
	#[error("pulse durations must be positive with minDuration <= maxDuration, got {min}..{max}")]
	DurationRange {
		/// Configured shortest period.
		min: f64,
		/// Configured longest period.
		max: f64,
	},

	/// Sphere radius is zero, negative or not finite.
	#[error("sphereRadius must be a positive number, got {0}")]
	InvalidSphereRadius(f64),

	/// Pointer pull strength outside `0..=1`.
	#[error("distortionIntensity must be between 0 and 1, got {0}")]
	DistortionOutOfRange(f64),
}

/// Failure reported by a rendering surface or the frame clock.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SurfaceError {
	/// A browser API threw.
	#[error("javascript error: {0}")]
	Js(String),

	/// A required browser feature is missing.
	#[error("{0} is not available")]
	Unsupported(&'static str),

	/// Shader compile or link failure, with the driver log.
	#[error("shader error: {0}")]
	Shader(String),
}

impl From<JsValue> for SurfaceError {
	fn from(value: JsValue) -> Self {
		SurfaceError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

/// Any failure while activating or running a swarm.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SwarmError {
	/// The config failed validation.
	#[error("invalid configuration: {0}")]
	Config(#[from] ConfigError),

	/// The surface or frame clock failed.
	#[error("surface error: {0}")]
	Surface(#[from] SurfaceError),
}
