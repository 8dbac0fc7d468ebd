use crate::device::GpuError;
use hellogpu_assets::{LoadOptions, PixelBuffer, load_image, mip_chain};
use std::path::Path;

/// A sampled 2D texture with its view and sampler. Released on drop.
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Load an image file (flipped, RGBA) and upload it with a full mip chain.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self, GpuError> {
        let path = path.as_ref();
        let pixels = load_image(path, LoadOptions::texture())?;
        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("texture");
        Ok(Self::from_pixels(device, queue, label, &pixels, true))
    }

    /// Upload pixels as an sRGB RGBA8 texture.
    ///
    /// With `mipmaps`, every level of [`mip_chain`] is written; otherwise only
    /// the base level exists.
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        pixels: &PixelBuffer,
        mipmaps: bool,
    ) -> Self {
        let levels = if mipmaps {
            mip_chain(pixels)
        } else {
            vec![pixels.to_rgba8()]
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: pixels.width().max(1),
                height: pixels.height().max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.data(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.row_bytes()),
                    rows_per_image: Some(level.height()),
                },
                wgpu::Extent3d {
                    width: level.width(),
                    height: level.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        tracing::debug!(
            texture = label,
            width = texture.width(),
            height = texture.height(),
            mips = texture.mip_level_count(),
            "texture uploaded"
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Width of the base level.
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    /// Height of the base level.
    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
