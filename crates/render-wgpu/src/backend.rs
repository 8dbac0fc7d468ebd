use crate::device::capture_validation;
use hellogpu_common::{SceneKind, ShaderStage};
use hellogpu_render::{ColorVertex, ShaderBackend, TexturedVertex, UniformKind, UniformLayout};

const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
];

const TEXTURED_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
];

/// Vertex buffer layouts a program can be linked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    Colored,
    Textured,
}

impl VertexLayout {
    pub fn buffer_layout(self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            VertexLayout::Colored => wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<ColorVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &COLOR_ATTRIBUTES,
            },
            VertexLayout::Textured => wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<TexturedVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &TEXTURED_ATTRIBUTES,
            },
        }
    }
}

/// Everything a program needs besides its stage sources.
///
/// Resource bindings all live in group 0: the uniform block at binding 0,
/// one sampler at binding 1, textures from binding 2 onward.
#[derive(Debug, Clone)]
pub struct ProgramDesc {
    pub label: String,
    pub vertex_layout: VertexLayout,
    pub uniforms: UniformLayout,
    pub texture_count: usize,
}

pub(crate) const UNIFORM_BINDING: u32 = 0;
pub(crate) const SAMPLER_BINDING: u32 = 1;
pub(crate) const FIRST_TEXTURE_BINDING: u32 = 2;

impl ProgramDesc {
    pub fn for_scene(scene: SceneKind) -> Self {
        match scene {
            SceneKind::Triangle => Self {
                label: scene.as_str().into(),
                vertex_layout: VertexLayout::Colored,
                uniforms: UniformLayout::new(),
                texture_count: 0,
            },
            SceneKind::Textured => Self {
                label: scene.as_str().into(),
                vertex_layout: VertexLayout::Textured,
                uniforms: UniformLayout::new().with("mix_value", UniformKind::Float),
                texture_count: scene.texture_count(),
            },
        }
    }

    fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        let mut entries = Vec::new();
        if !self.uniforms.is_empty() {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: UNIFORM_BINDING,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }
        if self.texture_count > 0 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
            for i in 0..self.texture_count as u32 {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: FIRST_TEXTURE_BINDING + i,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                });
            }
        }
        entries
    }
}

/// A compiled shader module and the stage it was compiled for.
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub module: wgpu::ShaderModule,
}

/// Output of a successful link: the pipeline and its resource layout.
pub struct LinkedProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: Option<wgpu::BindGroupLayout>,
}

/// Compiles WGSL stages into shader modules and links them into render
/// pipelines, capturing wgpu validation errors as diagnostics.
pub struct WgpuShaderBackend<'a> {
    device: &'a wgpu::Device,
    target_format: wgpu::TextureFormat,
    desc: &'a ProgramDesc,
}

impl<'a> WgpuShaderBackend<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        target_format: wgpu::TextureFormat,
        desc: &'a ProgramDesc,
    ) -> Self {
        Self {
            device,
            target_format,
            desc,
        }
    }
}

impl ShaderBackend for WgpuShaderBackend<'_> {
    type Stage = CompiledStage;
    type Program = LinkedProgram;

    fn compile(
        &mut self,
        stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<CompiledStage, String> {
        let module_label = format!("{label}_{stage}");
        let (module, error) = capture_validation(self.device, || {
            self.device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(&module_label),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                })
        });
        match error {
            Some(log) => Err(log),
            None => {
                tracing::debug!(module = %module_label, "shader stage compiled");
                Ok(CompiledStage { stage, module })
            }
        }
    }

    fn link(
        &mut self,
        label: &str,
        vertex: &CompiledStage,
        fragment: &CompiledStage,
    ) -> Result<LinkedProgram, String> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(format!(
                "expected vertex + fragment stages, got {} + {}",
                vertex.stage, fragment.stage
            ));
        }

        let entries = self.desc.layout_entries();
        let bind_group_layout = (!entries.is_empty()).then(|| {
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{label}_bind_group_layout")),
                    entries: &entries,
                })
        });
        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
            bind_group_layout.iter().collect();

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{label}_pipeline_layout")),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });

        let (pipeline, error) = capture_validation(self.device, || {
            self.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(&format!("{label}_pipeline")),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &vertex.module,
                        entry_point: None,
                        compilation_options: Default::default(),
                        buffers: &[self.desc.vertex_layout.buffer_layout()],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &fragment.module,
                        entry_point: None,
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: self.target_format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: Default::default(),
                    multiview: None,
                    cache: None,
                })
        });

        match error {
            Some(log) => Err(log),
            None => Ok(LinkedProgram {
                pipeline,
                bind_group_layout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_desc_has_no_bindings() {
        let desc = ProgramDesc::for_scene(SceneKind::Triangle);
        assert!(desc.layout_entries().is_empty());
        assert_eq!(desc.vertex_layout, VertexLayout::Colored);
    }

    #[test]
    fn textured_desc_bindings() {
        let desc = ProgramDesc::for_scene(SceneKind::Textured);
        let bindings: Vec<u32> = desc.layout_entries().iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2, 3]);
        assert_eq!(desc.uniforms.offset_of("mix_value"), Some(0));
    }

    #[test]
    fn vertex_strides_match_layouts() {
        assert_eq!(VertexLayout::Colored.buffer_layout().array_stride, 24);
        assert_eq!(VertexLayout::Textured.buffer_layout().array_stride, 32);
        assert_eq!(TEXTURED_ATTRIBUTES[2].offset, 24);
    }
}
