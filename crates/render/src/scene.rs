use bytemuck::{Pod, Zeroable};

/// Position + per-vertex color, used by the triangle scene.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Position + color + texture coordinate, used by the textured quad.
///
/// `uv` has `v = 0` at the bottom edge, so images are uploaded flipped.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

#[rustfmt::skip]
pub const TRIANGLE_VERTICES: [ColorVertex; 3] = [
    ColorVertex { position: [ 0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0] }, // right
    ColorVertex { position: [-0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0] }, // left
    ColorVertex { position: [ 0.0,  0.5, 0.0], color: [0.0, 0.0, 1.0] }, // top
];

pub const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

#[rustfmt::skip]
pub const QUAD_VERTICES: [TexturedVertex; 4] = [
    TexturedVertex { position: [ 0.5,  0.5, 0.0], color: [1.0, 0.0, 0.0], uv: [1.0, 1.0] }, // top right
    TexturedVertex { position: [ 0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0], uv: [1.0, 0.0] }, // bottom right
    TexturedVertex { position: [-0.5, -0.5, 0.0], color: [0.0, 0.0, 1.0], uv: [0.0, 0.0] }, // bottom left
    TexturedVertex { position: [-0.5,  0.5, 0.0], color: [1.0, 1.0, 0.0], uv: [0.0, 1.0] }, // top left
];

#[rustfmt::skip]
pub const QUAD_INDICES: [u32; 6] = [
    0, 1, 3, // first triangle
    1, 2, 3, // second triangle
];
