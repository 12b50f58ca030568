//! Procedural drifting clouds.
//!
//! Clouds are soft blobs built from layered radial-gradient discs, rendered
//! once into an offscreen `PixelBuffer` and then blitted every frame as a
//! `CloudField` pushes them along the wind, wrapping at the surface edges.

pub mod cloud;
pub mod color;
pub mod controls;
pub mod display;
pub mod error;
pub mod gradient;
pub mod remote;
pub mod scene;
pub mod scheduler;
pub mod util;

pub use cloud::{create_cloud, draw_cloud, CloudField, CloudSprite, CloudTexture};
pub use color::Rgba;
pub use controls::Controls;
pub use display::{DrawSurface, PixelBuffer};
pub use error::{CloudError, Result};
pub use gradient::RadialGradient;
pub use scene::Scene;
pub use scheduler::{FrameHandle, FrameQueue, FrameScheduler};
