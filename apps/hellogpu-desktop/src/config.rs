use clap::Parser;
use hellogpu_assets::{LoadOptions, PixelBuffer, load_image, placeholder_checkerboard};
use hellogpu_common::{ClearColor, SceneKind};
use hellogpu_render::MIX_INITIAL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Side of the checkerboard substituted for an unreadable image.
const PLACEHOLDER_SIZE: u32 = 64;

#[derive(Parser, Debug)]
#[command(name = "hellogpu-desktop", about = "Draw the hello-triangle or textured-quad scene")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scene to draw: `triangle` or `textured`
    #[arg(long)]
    pub scene: Option<SceneKind>,

    /// Vertex stage source (WGSL)
    #[arg(long)]
    pub vertex: Option<PathBuf>,

    /// Fragment stage source (WGSL)
    #[arg(long)]
    pub fragment: Option<PathBuf>,

    /// Texture image; pass twice for the textured scene
    #[arg(long = "texture")]
    pub textures: Vec<PathBuf>,

    /// Substitute a checkerboard for images that fail to load
    #[arg(long)]
    pub placeholder_textures: bool,

    /// Window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("scene `{scene}` needs {expected} textures, {actual} configured")]
    TextureCount {
        scene: SceneKind,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Asset(#[from] hellogpu_assets::AssetError),
}

/// Application settings. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub scene: SceneKind,
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    pub textures: Vec<PathBuf>,
    pub placeholder_textures: bool,
    /// Defaults to black for the triangle and teal for the textured quad.
    pub clear_color: Option<ClearColor>,
    pub initial_mix: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "HelloGPU".into(),
            width: 800,
            height: 600,
            scene: SceneKind::default(),
            vertex_shader: None,
            fragment_shader: None,
            textures: vec![
                PathBuf::from("assets/textures/container.png"),
                PathBuf::from("assets/textures/awesomeface.png"),
            ],
            placeholder_textures: false,
            clear_color: None,
            initial_mix: MIX_INITIAL,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config file (if any) with command-line overrides applied.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(scene) = cli.scene {
            self.scene = scene;
        }
        if let Some(vertex) = &cli.vertex {
            self.vertex_shader = Some(vertex.clone());
        }
        if let Some(fragment) = &cli.fragment {
            self.fragment_shader = Some(fragment.clone());
        }
        if !cli.textures.is_empty() {
            self.textures = cli.textures.clone();
        }
        if cli.placeholder_textures {
            self.placeholder_textures = true;
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
    }

    /// Explicit shader paths, or the scene's defaults under `shaders/`.
    pub fn shader_paths(&self) -> (PathBuf, PathBuf) {
        let (vs, fs) = self.scene.default_shader_paths();
        (
            self.vertex_shader.clone().unwrap_or_else(|| vs.into()),
            self.fragment_shader.clone().unwrap_or_else(|| fs.into()),
        )
    }

    pub fn clear_color(&self) -> ClearColor {
        self.clear_color.unwrap_or(match self.scene {
            SceneKind::Triangle => ClearColor::BLACK,
            SceneKind::Textured => ClearColor::TEAL,
        })
    }

    /// Decode the scene's textures.
    ///
    /// A failed load is fatal unless placeholders are enabled, in which case
    /// a checkerboard takes the image's place.
    pub fn load_images(&self) -> Result<Vec<PixelBuffer>, ConfigError> {
        let expected = self.scene.texture_count();
        if expected == 0 {
            return Ok(Vec::new());
        }
        if self.textures.len() < expected {
            return Err(ConfigError::TextureCount {
                scene: self.scene,
                expected,
                actual: self.textures.len(),
            });
        }

        if self.textures.len() > expected {
            tracing::warn!(
                scene = %self.scene,
                configured = self.textures.len(),
                used = expected,
                "ignoring extra texture paths"
            );
        }

        let mut images = Vec::with_capacity(expected);
        for path in self.textures.iter().take(expected) {
            match load_image(path, LoadOptions::texture()) {
                Ok(pixels) => images.push(pixels),
                Err(e) if self.placeholder_textures => {
                    tracing::warn!("{e}; using placeholder texture");
                    images.push(placeholder_checkerboard(PLACEHOLDER_SIZE, 8));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(images)
    }
}
