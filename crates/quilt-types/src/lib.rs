//! Foundation types for quilt.
//!
//! This crate holds the rendering-agnostic types shared by every quilt crate:
//! colors, integer geometry, the draw-batch and texture contract the
//! rendering backend must satisfy, and the error type.

pub mod backend;
pub mod color;
pub mod error;
pub mod geometry;

pub use color::Color;
pub use error::{QuiltError, Result};
pub use geometry::{Margins, Padding, Region};
