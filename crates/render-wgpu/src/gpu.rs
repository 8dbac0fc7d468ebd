use crate::backend::ProgramDesc;
use crate::device::GpuError;
use crate::mesh::GpuMesh;
use crate::program::GpuProgram;
use crate::texture::GpuTexture;
use hellogpu_assets::PixelBuffer;
use hellogpu_common::{ClearColor, SceneKind};
use hellogpu_render::{
    QUAD_INDICES, QUAD_VERTICES, RenderState, TRIANGLE_INDICES, TRIANGLE_VERTICES,
};
use std::path::PathBuf;

/// Inputs needed to build a scene's GPU resources.
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub scene: SceneKind,
    pub vertex_path: PathBuf,
    pub fragment_path: PathBuf,
    /// Decoded images, one per texture the scene samples.
    pub images: Vec<PixelBuffer>,
    pub clear_color: ClearColor,
}

/// Draws one of the tutorial scenes: a colored triangle or a quad blending
/// two textures.
pub struct SceneRenderer {
    scene: SceneKind,
    program: GpuProgram,
    mesh: GpuMesh,
    textures: Vec<GpuTexture>,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        setup: &SceneSetup,
    ) -> Result<Self, GpuError> {
        let desc = ProgramDesc::for_scene(setup.scene);

        let textures: Vec<GpuTexture> = setup
            .images
            .iter()
            .enumerate()
            .map(|(i, pixels)| {
                GpuTexture::from_pixels(device, queue, &format!("texture{}", i + 1), pixels, true)
            })
            .collect();
        let texture_refs: Vec<&GpuTexture> = textures.iter().collect();

        let program = GpuProgram::build(
            device,
            target_format,
            &desc,
            &setup.vertex_path,
            &setup.fragment_path,
            &texture_refs,
        )?;

        let mesh = match setup.scene {
            SceneKind::Triangle => {
                GpuMesh::new(device, "triangle", &TRIANGLE_VERTICES, &TRIANGLE_INDICES)
            }
            SceneKind::Textured => GpuMesh::new(device, "quad", &QUAD_VERTICES, &QUAD_INDICES),
        };

        let c = setup.clear_color;
        tracing::info!(
            scene = %setup.scene,
            textures = textures.len(),
            indices = mesh.index_count(),
            "scene ready"
        );

        Ok(Self {
            scene: setup.scene,
            program,
            mesh,
            textures,
            clear_color: wgpu::Color {
                r: c.r,
                g: c.g,
                b: c.b,
                a: c.a,
            },
        })
    }

    pub fn scene(&self) -> SceneKind {
        self.scene
    }

    pub fn program(&self) -> &GpuProgram {
        &self.program
    }

    pub fn textures(&self) -> &[GpuTexture] {
        &self.textures
    }

    /// Render one frame into `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        state: &RenderState,
    ) {
        // No-op for programs without a `mix_value` uniform.
        self.program.set_uniform("mix_value", state.mix());
        self.program.flush(queue);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });

            self.program.activate(&mut pass);
            self.mesh.draw(&mut pass);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}
