//! Rendering core: renderer-agnostic pieces of the tutorial programs.
//!
//! # Invariants
//! - A program is built from exactly one vertex and one fragment stage.
//! - Unknown uniform names are ignored, never an error.
//! - Render state is passed explicitly into each frame; there is no global.
//!
//! The [`ShaderBackend`] trait is the seam to the GPU API. The wgpu
//! implementation lives in `hellogpu-render-wgpu`; tests use an in-memory
//! backend.

mod program;
mod scene;
mod state;
mod uniform;

pub use program::{
    ShaderBackend, ShaderError, build_program, build_program_from_sources, format_shader_error,
};
pub use scene::{
    ColorVertex, QUAD_INDICES, QUAD_VERTICES, TRIANGLE_INDICES, TRIANGLE_VERTICES, TexturedVertex,
};
pub use state::{MIX_INITIAL, MIX_MAX, MIX_MIN, RenderState};
pub use uniform::{UniformBlock, UniformKind, UniformLayout, UniformValue};

pub fn crate_info() -> &'static str {
    "hellogpu-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
