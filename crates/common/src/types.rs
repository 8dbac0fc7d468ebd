use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A programmable stage of the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two tutorial programs to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Per-vertex colored triangle.
    #[default]
    Triangle,
    /// Quad blending two textures.
    Textured,
}

impl SceneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneKind::Triangle => "triangle",
            SceneKind::Textured => "textured",
        }
    }

    /// Default vertex and fragment shader paths, relative to the workspace root.
    pub fn default_shader_paths(self) -> (String, String) {
        (
            format!("shaders/{}.vert.wgsl", self.as_str()),
            format!("shaders/{}.frag.wgsl", self.as_str()),
        )
    }

    /// Number of textures the scene samples.
    pub fn texture_count(self) -> usize {
        match self {
            SceneKind::Triangle => 0,
            SceneKind::Textured => 2,
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scene `{0}` (expected `triangle` or `textured`)")]
pub struct ParseSceneError(pub String);

impl FromStr for SceneKind {
    type Err = ParseSceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "triangle" => Ok(SceneKind::Triangle),
            "textured" | "quad" => Ok(SceneKind::Textured),
            _ => Err(ParseSceneError(s.to_string())),
        }
    }
}

/// Color the framebuffer is cleared to at the start of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    pub const BLACK: ClearColor = ClearColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Teal used by the textured scene.
    pub const TEAL: ClearColor = ClearColor {
        r: 0.2,
        g: 0.3,
        b: 0.3,
        a: 1.0,
    };
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::BLACK
    }
}
