//! Ambient firefly swarms for page backgrounds.
//!
//! Two engines share one particle model and update step:
//! - a planar swarm of glowing DOM markers drifting in pixel space
//! - a spatial swarm of WebGL point sprites seen through a perspective
//!   camera that leans toward the pointer
//!
//! Simulation is plain Rust and runs headless against any [`Surface`] and
//! [`FrameClock`]; the browser adapter in `component` binds it to
//! `requestAnimationFrame` and the DOM.
//!
//! # Example
//!
//! ```ignore
//! use firefly_swarm::{Fireflies, PlanarConfig};
//!
//! view! { <Fireflies config=PlanarConfig::page_swarm() /> }
//! ```

pub mod camera;
pub mod color;
mod component;
pub mod config;
mod dom;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod motion;
pub mod particle;
pub mod random;
pub mod scheduler;
pub mod stylesheet;
mod webgl;

pub use color::{Color, Palette};
pub use component::{
	DeactivateHandle, Fireflies, RafClock, SpatialFireflies, listen, mount, mount_spatial, try_mount,
	try_mount_spatial,
};
pub use config::{PlanarConfig, SpatialConfig};
pub use dom::DomSurface;
pub use engine::{Frame, PlanarEngine, SpatialEngine, Surface, SwarmEngine};
pub use error::{ConfigError, SurfaceError, SwarmError};
pub use lifecycle::{Activation, Lifecycle, Listener};
pub use scheduler::{FrameClock, FrameScheduler, ManualClock};
pub use webgl::GlSurface;
