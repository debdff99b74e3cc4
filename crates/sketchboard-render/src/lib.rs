//! Sketchboard Render Library
//!
//! Preview renderer for the Sketchboard scene. Drawing goes through the
//! [`Surface`] trait so the same renderer can target a GPU scene, a canvas
//! or the [`RecordingSurface`] display list used by tests and headless tools.

mod renderer;
mod surface;

pub use renderer::{PreviewRenderer, RenderContext, Renderer};
pub use surface::{DrawCommand, RecordingSurface, Surface};
