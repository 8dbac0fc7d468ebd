use hellogpu_common::ShaderStage;
use std::path::{Path, PathBuf};

/// Errors from building a shader program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
}

impl ShaderError {
    /// Diagnostic text reported by the backend, if any.
    pub fn log(&self) -> Option<&str> {
        match self {
            ShaderError::FileRead { .. } => None,
            ShaderError::Compile { log, .. } | ShaderError::Link { log } => Some(log),
        }
    }
}

/// GPU API seam for compiling stages and linking them into a program.
///
/// Backends report failures as the driver's diagnostic text; the builder
/// attaches the stage and turns it into a [`ShaderError`].
pub trait ShaderBackend {
    /// One compiled pipeline stage.
    type Stage;
    /// A linked, drawable program.
    type Program;

    fn compile(
        &mut self,
        stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<Self::Stage, String>;

    fn link(
        &mut self,
        label: &str,
        vertex: &Self::Stage,
        fragment: &Self::Stage,
    ) -> Result<Self::Program, String>;
}

/// Read a vertex and a fragment source file, compile both and link them.
///
/// Nothing is compiled unless both files were read. The fragment stage is
/// only compiled after the vertex stage succeeded, and linking only happens
/// once both stages compiled.
pub fn build_program<B: ShaderBackend>(
    backend: &mut B,
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
) -> Result<B::Program, ShaderError> {
    let vertex_path = vertex_path.as_ref();
    let fragment_path = fragment_path.as_ref();
    let vertex_src = read_source(vertex_path)?;
    let fragment_src = read_source(fragment_path)?;
    let label = program_label(vertex_path);
    tracing::debug!(
        program = %label,
        vertex = %vertex_path.display(),
        fragment = %fragment_path.display(),
        "building shader program"
    );
    build_program_from_sources(backend, &label, &vertex_src, &fragment_src)
}

/// Compile and link in-memory sources.
pub fn build_program_from_sources<B: ShaderBackend>(
    backend: &mut B,
    label: &str,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<B::Program, ShaderError> {
    let vertex = compile_stage(backend, ShaderStage::Vertex, label, vertex_src)?;
    let fragment = compile_stage(backend, ShaderStage::Fragment, label, fragment_src)?;

    match backend.link(label, &vertex, &fragment) {
        Ok(program) => {
            tracing::info!(program = %label, "shader program linked");
            Ok(program)
        }
        Err(log) => {
            tracing::error!(program = %label, "shader link failed: {log}");
            Err(ShaderError::Link { log })
        }
    }
}

fn compile_stage<B: ShaderBackend>(
    backend: &mut B,
    stage: ShaderStage,
    label: &str,
    source: &str,
) -> Result<B::Stage, ShaderError> {
    backend.compile(stage, label, source).map_err(|log| {
        tracing::error!(program = %label, %stage, "shader compile failed");
        ShaderError::Compile {
            stage,
            log: format_shader_error(source, &log),
        }
    })
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// `shaders/triangle.vert.wgsl` -> `triangle`.
fn program_label(vertex_path: &Path) -> String {
    vertex_path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
        .unwrap_or("program")
        .to_string()
}

/// Prefix each source line with its right-aligned number and append the
/// diagnostic log, so line references in the log can be matched up.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let width = lines.len().max(1).to_string().len();
    let numbered = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    match (numbered.is_empty(), log.is_empty()) {
        (true, true) => String::new(),
        (true, false) => log.to_string(),
        (false, true) => numbered,
        (false, false) => format!("{numbered}\n\n{log}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory backend. A stage fails to compile when its source contains
    /// `@error`; linking fails when the fragment reads a location the vertex
    /// stage never writes (`@in(N)` vs `@out(N)`).
    #[derive(Default)]
    struct MockBackend {
        calls: Vec<String>,
    }

    struct MockStage {
        stage: ShaderStage,
        source: String,
    }

    fn markers<'a>(source: &'a str, tag: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        source
            .split(tag)
            .skip(1)
            .filter_map(|rest| rest.split(')').next())
    }

    impl ShaderBackend for MockBackend {
        type Stage = MockStage;
        type Program = String;

        fn compile(
            &mut self,
            stage: ShaderStage,
            label: &str,
            source: &str,
        ) -> Result<MockStage, String> {
            self.calls.push(format!("compile {label} {stage}"));
            if let Some(line) = source.lines().position(|l| l.contains("@error")) {
                return Err(format!("line {}: syntax error", line + 1));
            }
            Ok(MockStage {
                stage,
                source: source.to_string(),
            })
        }

        fn link(
            &mut self,
            label: &str,
            vertex: &MockStage,
            fragment: &MockStage,
        ) -> Result<String, String> {
            self.calls.push(format!("link {label}"));
            assert_eq!(vertex.stage, ShaderStage::Vertex);
            assert_eq!(fragment.stage, ShaderStage::Fragment);
            let outputs: Vec<&str> = markers(&vertex.source, "@out(").collect();
            for input in markers(&fragment.source, "@in(") {
                if !outputs.contains(&input) {
                    return Err(format!("location {input} is not provided by the vertex stage"));
                }
            }
            Ok(format!("program:{label}"))
        }
    }

    const VS: &str = "fn main() {\n  @out(0)\n}";
    const FS: &str = "fn main() {\n  @in(0)\n}";

    #[test]
    fn valid_pair_links() {
        let mut backend = MockBackend::default();
        let program = build_program_from_sources(&mut backend, "tri", VS, FS).unwrap();
        assert_eq!(program, "program:tri");
        assert_eq!(
            backend.calls,
            vec!["compile tri vertex", "compile tri fragment", "link tri"]
        );
    }

    #[test]
    fn vertex_syntax_error_stops_before_fragment() {
        let mut backend = MockBackend::default();
        let err = build_program_from_sources(&mut backend, "tri", "fn main() {\n @error\n}", FS)
            .unwrap_err();
        match &err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(*stage, ShaderStage::Vertex);
                assert!(log.contains("line 2: syntax error"));
                assert!(log.contains("2:  @error"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.calls, vec!["compile tri vertex"]);
    }

    #[test]
    fn fragment_error_reports_fragment_stage() {
        let mut backend = MockBackend::default();
        let err = build_program_from_sources(&mut backend, "tri", VS, "@error").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert!(!backend.calls.iter().any(|c| c.starts_with("link")));
    }

    #[test]
    fn interface_mismatch_fails_at_link_after_both_compile() {
        let mut backend = MockBackend::default();
        let fs = "fn main() {\n  @in(0)\n  @in(3)\n}";
        let err = build_program_from_sources(&mut backend, "tri", VS, fs).unwrap_err();
        match &err {
            ShaderError::Link { log } => assert!(log.contains("location 3")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.calls.len(), 3);
        assert!(err.log().is_some());
    }

    #[test]
    fn build_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("quad.vert.wgsl");
        let fs = dir.path().join("quad.frag.wgsl");
        std::fs::write(&vs, VS).unwrap();
        std::fs::write(&fs, FS).unwrap();

        let mut backend = MockBackend::default();
        let program = build_program(&mut backend, &vs, &fs).unwrap();
        assert_eq!(program, "program:quad");
    }

    #[test]
    fn missing_file_is_file_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("tri.vert.wgsl");
        std::fs::write(&vs, VS).unwrap();

        let mut backend = MockBackend::default();
        let err = build_program(&mut backend, &vs, dir.path().join("missing.frag.wgsl"))
            .unwrap_err();
        match err {
            ShaderError::FileRead { path, .. } => assert!(path.ends_with("missing.frag.wgsl")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn non_utf8_source_is_file_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("tri.vert.wgsl");
        let fs = dir.path().join("tri.frag.wgsl");
        std::fs::write(&vs, [0xff, 0xfe, 0x00]).unwrap();
        std::fs::write(&fs, FS).unwrap();

        let mut backend = MockBackend::default();
        let err = build_program(&mut backend, &vs, &fs).unwrap_err();
        assert!(matches!(err, ShaderError::FileRead { .. }));
    }

    #[test]
    fn label_from_path() {
        assert_eq!(program_label(Path::new("shaders/triangle.vert.wgsl")), "triangle");
        assert_eq!(program_label(Path::new("")), "program");
    }

    #[test]
    fn format_numbers_lines() {
        let out = format_shader_error("a\nb", "oops");
        assert_eq!(out, "1: a\n2: b\n\noops");
    }

    #[test]
    fn format_pads_line_numbers() {
        let src = (1..=10).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
        let out = format_shader_error(&src, "");
        assert!(out.starts_with(" 1: l1"));
        assert!(out.ends_with("10: l10"));
    }

    #[test]
    fn format_empty_inputs() {
        assert_eq!(format_shader_error("", ""), "");
        assert_eq!(format_shader_error("", "log"), "log");
        assert_eq!(format_shader_error("x", ""), "1: x");
    }
}
