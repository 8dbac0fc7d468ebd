use crate::backend::{
    FIRST_TEXTURE_BINDING, LinkedProgram, ProgramDesc, SAMPLER_BINDING, UNIFORM_BINDING,
    WgpuShaderBackend,
};
use crate::device::GpuError;
use crate::texture::GpuTexture;
use hellogpu_render::{UniformBlock, UniformValue, build_program, build_program_from_sources};
use std::path::Path;

/// A linked shader program with its uniform storage and bound textures.
///
/// Owns the pipeline, uniform buffer and bind group; all are released on
/// drop.
pub struct GpuProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformBlock,
    uniform_buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
}

impl GpuProgram {
    /// Read, compile and link a vertex/fragment file pair.
    pub fn build(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        desc: &ProgramDesc,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        textures: &[&GpuTexture],
    ) -> Result<Self, GpuError> {
        check_texture_count(desc, textures)?;
        let mut backend = WgpuShaderBackend::new(device, target_format, desc);
        let linked = build_program(&mut backend, vertex_path, fragment_path)?;
        Ok(Self::from_linked(device, desc, linked, textures))
    }

    /// Compile and link in-memory sources.
    pub fn from_sources(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        desc: &ProgramDesc,
        vertex_src: &str,
        fragment_src: &str,
        textures: &[&GpuTexture],
    ) -> Result<Self, GpuError> {
        check_texture_count(desc, textures)?;
        let mut backend = WgpuShaderBackend::new(device, target_format, desc);
        let linked =
            build_program_from_sources(&mut backend, &desc.label, vertex_src, fragment_src)?;
        Ok(Self::from_linked(device, desc, linked, textures))
    }

    fn from_linked(
        device: &wgpu::Device,
        desc: &ProgramDesc,
        linked: LinkedProgram,
        textures: &[&GpuTexture],
    ) -> Self {
        let uniforms = UniformBlock::new(desc.uniforms.clone());
        let uniform_buffer = (!desc.uniforms.is_empty()).then(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{}_uniform_buffer", desc.label)),
                size: desc.uniforms.size() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let bind_group = linked.bind_group_layout.as_ref().map(|layout| {
            let mut entries = Vec::new();
            if let Some(buffer) = &uniform_buffer {
                entries.push(wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: buffer.as_entire_binding(),
                });
            }
            if let Some(first) = textures.first() {
                entries.push(wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(first.sampler()),
                });
            }
            for (i, texture) in textures.iter().enumerate() {
                entries.push(wgpu::BindGroupEntry {
                    binding: FIRST_TEXTURE_BINDING + i as u32,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                });
            }
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{}_bind_group", desc.label)),
                layout,
                entries: &entries,
            })
        });

        Self {
            label: desc.label.clone(),
            pipeline: linked.pipeline,
            uniforms,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set a uniform by name. Unknown names are ignored.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        self.uniforms.set(name, value)
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    /// Upload uniforms changed since the last flush. Call before the pass.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if let (Some(buffer), Some(bytes)) = (&self.uniform_buffer, self.uniforms.take_dirty()) {
            queue.write_buffer(buffer, 0, bytes);
        }
    }

    /// Make this program current for subsequent draws in `pass`.
    pub fn activate(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        if let Some(bind_group) = &self.bind_group {
            pass.set_bind_group(0, bind_group, &[]);
        }
    }
}

fn check_texture_count(desc: &ProgramDesc, textures: &[&GpuTexture]) -> Result<(), GpuError> {
    if textures.len() != desc.texture_count {
        return Err(GpuError::TextureCount {
            program: desc.label.clone(),
            expected: desc.texture_count,
            actual: textures.len(),
        });
    }
    Ok(())
}
