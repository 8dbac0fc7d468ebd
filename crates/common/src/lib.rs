//! Shared vocabulary: pipeline stages, scene selection, clear color.

mod types;

pub use types::{ClearColor, ParseSceneError, SceneKind, ShaderStage};
