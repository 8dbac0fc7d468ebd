use hellogpu_assets::AssetError;
use hellogpu_render::ShaderError;

/// Errors from the wgpu backend.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("program `{program}` samples {expected} textures, got {actual}")]
    TextureCount {
        program: String,
        expected: usize,
        actual: usize,
    },
}

/// Adapter, device and queue bound to one GPU.
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Request an adapter (compatible with `surface`, if given) and a device.
pub fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> Result<GpuContext, GpuError> {
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: surface,
        force_fallback_adapter: false,
    }))
    .ok_or(GpuError::NoAdapter)?;

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("hellogpu_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: Default::default(),
        },
        None,
    ))?;

    let info = adapter.get_info();
    tracing::info!(
        adapter = %info.name,
        backend = info.backend.to_str(),
        "GPU device created"
    );

    Ok(GpuContext {
        adapter,
        device,
        queue,
    })
}

/// Device without a window, for tools and tests.
pub fn request_headless_device() -> Result<GpuContext, GpuError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    request_device(&instance, None)
}

/// Run `f` inside a validation error scope and report what it raised.
pub fn capture_validation<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<String>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(device.pop_error_scope()).map(|e| e.to_string());
    (value, error)
}
