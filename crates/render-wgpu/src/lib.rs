//! wgpu render backend for the tutorial programs.
//!
//! Compiling a stage creates a shader module and linking creates a render
//! pipeline; both run inside a validation error scope so driver diagnostics
//! come back as values instead of panics.
//!
//! # Invariants
//! - Every GPU resource is owned by a wrapper and released on drop.
//! - All calls happen on the thread that owns the device.

mod backend;
mod device;
mod gpu;
mod mesh;
mod program;
pub mod shaders;
mod texture;

pub use backend::{CompiledStage, LinkedProgram, ProgramDesc, VertexLayout, WgpuShaderBackend};
pub use device::{GpuContext, GpuError, capture_validation, request_device, request_headless_device};
pub use gpu::{SceneRenderer, SceneSetup};
pub use mesh::GpuMesh;
pub use program::GpuProgram;
pub use texture::GpuTexture;
