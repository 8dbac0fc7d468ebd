use anyhow::Context;
use clap::{Parser, Subcommand};
use hellogpu_assets::{LoadOptions, load_image, mip_chain, placeholder_checkerboard};
use hellogpu_common::SceneKind;
use hellogpu_render_wgpu::{
    GpuContext, GpuProgram, GpuTexture, ProgramDesc, request_headless_device, shaders,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hellogpu-cli", about = "CLI tool for hellogpu shaders and images")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Compile and link a shader pair on a headless GPU device
    Check {
        /// Scene whose layout the program is linked against; all scenes when omitted
        #[arg(short, long)]
        scene: Option<SceneKind>,
        /// Vertex stage source (defaults to the scene's file under shaders/)
        #[arg(long, requires = "scene")]
        vertex: Option<PathBuf>,
        /// Fragment stage source (defaults to the scene's file under shaders/)
        #[arg(long, requires = "scene")]
        fragment: Option<PathBuf>,
        /// Use the sources compiled into the binary instead of files
        #[arg(long, conflicts_with_all = ["vertex", "fragment"])]
        builtin: bool,
    },
    /// Decode an image and report its size, channels and mip chain
    Image {
        path: PathBuf,
        /// Flip rows vertically on load
        #[arg(long)]
        flip: bool,
        /// Convert to this many channels (1-4)
        #[arg(short, long)]
        channels: Option<u8>,
    },
}

const CHECK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn check_scene(
    ctx: &GpuContext,
    scene: SceneKind,
    vertex: Option<PathBuf>,
    fragment: Option<PathBuf>,
    builtin: bool,
) -> anyhow::Result<()> {
    tracing::debug!(%scene, builtin, "checking shader program");
    let desc = ProgramDesc::for_scene(scene);
    let placeholder = placeholder_checkerboard(4, 1);
    let textures: Vec<GpuTexture> = (0..desc.texture_count)
        .map(|i| {
            GpuTexture::from_pixels(
                &ctx.device,
                &ctx.queue,
                &format!("check_texture{i}"),
                &placeholder,
                false,
            )
        })
        .collect();
    let texture_refs: Vec<&GpuTexture> = textures.iter().collect();

    if builtin {
        let (vs, fs) = shaders::builtin_sources(scene);
        GpuProgram::from_sources(&ctx.device, CHECK_FORMAT, &desc, vs, fs, &texture_refs)?;
        println!("{scene}: built-in shaders OK");
        return Ok(());
    }

    let (default_vs, default_fs) = scene.default_shader_paths();
    let vs = vertex.unwrap_or_else(|| default_vs.into());
    let fs = fragment.unwrap_or_else(|| default_fs.into());
    GpuProgram::build(&ctx.device, CHECK_FORMAT, &desc, &vs, &fs, &texture_refs)?;
    println!("{scene}: {} + {} OK", vs.display(), fs.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("hellogpu-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", hellogpu_assets::crate_info());
            println!("render: {}", hellogpu_render::crate_info());
            match request_headless_device() {
                Ok(ctx) => {
                    let info = ctx.adapter.get_info();
                    println!("adapter: {} ({})", info.name, info.backend.to_str());
                }
                Err(e) => println!("adapter: unavailable ({e})"),
            }
        }
        Commands::Check {
            scene,
            vertex,
            fragment,
            builtin,
        } => {
            let ctx = request_headless_device().context("no GPU available for shader check")?;
            match scene {
                Some(scene) => check_scene(&ctx, scene, vertex, fragment, builtin)?,
                None => {
                    for scene in [SceneKind::Triangle, SceneKind::Textured] {
                        check_scene(&ctx, scene, None, None, builtin)?;
                    }
                }
            }
        }
        Commands::Image {
            path,
            flip,
            channels,
        } => {
            let options = LoadOptions {
                flip_vertically: flip,
                forced_channels: channels,
            };
            let pixels = load_image(&path, options)?;
            println!(
                "{}: {}x{}, {} channels, {} bytes",
                path.display(),
                pixels.width(),
                pixels.height(),
                pixels.channels(),
                pixels.data().len()
            );
            for (level, mip) in mip_chain(&pixels).iter().enumerate() {
                println!("  mip {level}: {}x{}", mip.width(), mip.height());
            }
        }
    }

    Ok(())
}
