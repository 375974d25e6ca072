//! Canvas rendering module
//!
//! Consumes `FrameSnapshot`s only; the simulation never sees it.

pub mod canvas;

pub use canvas::{CanvasRenderer, RenderError};
