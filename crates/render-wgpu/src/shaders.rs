//! Built-in copies of the WGSL stage sources shipped under `shaders/`.
//!
//! The desktop app reads the files from disk; these copies let tools and
//! tests build the programs without a working directory.

use hellogpu_common::SceneKind;

pub const TRIANGLE_VERTEX: &str = include_str!("../../../shaders/triangle.vert.wgsl");
pub const TRIANGLE_FRAGMENT: &str = include_str!("../../../shaders/triangle.frag.wgsl");
pub const TEXTURED_VERTEX: &str = include_str!("../../../shaders/textured.vert.wgsl");
pub const TEXTURED_FRAGMENT: &str = include_str!("../../../shaders/textured.frag.wgsl");

/// Vertex and fragment source for a scene.
pub fn builtin_sources(scene: SceneKind) -> (&'static str, &'static str) {
    match scene {
        SceneKind::Triangle => (TRIANGLE_VERTEX, TRIANGLE_FRAGMENT),
        SceneKind::Textured => (TEXTURED_VERTEX, TEXTURED_FRAGMENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_stage_declares_its_entry_point() {
        for scene in [SceneKind::Triangle, SceneKind::Textured] {
            let (vs, fs) = builtin_sources(scene);
            assert!(vs.contains("@vertex"));
            assert!(!vs.contains("@fragment"));
            assert!(fs.contains("@fragment"));
            assert!(!fs.contains("@vertex"));
        }
    }

    #[test]
    fn textured_fragment_reads_mix_uniform() {
        assert!(TEXTURED_FRAGMENT.contains("mix_value"));
    }
}
