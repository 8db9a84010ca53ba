//! quilt-ui: themed graphic elements built on the `Batch` contract.
//!
//! Templates describe a graphic once; elements are the per-widget instances
//! that own vertex data in a shared batch. All rendering goes through
//! `quilt_types::backend` traits -- no platform-specific code.

pub mod element;
pub mod nine_patch;
pub mod template;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use element::{ElementKind, FrameParts, GraphicElement};
pub use nine_patch::NinePatch;
pub use template::{
    FrameTemplate, GraphicTemplate, OutlineTemplate, SolidTemplate, TextureTemplate,
};
