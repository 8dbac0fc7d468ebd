use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for hellogpu")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every step: fmt, clippy, build + shaders, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Compile and link the shader pairs under shaders/ on a headless device
    Shaders,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the workspace, then validate shaders/ against the fresh CLI
    Build,
}

/// One cargo invocation run by a task.
struct Step {
    name: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    name: "fmt check",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    name: "clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    name: "tests",
    args: &["test", "--workspace"],
};
const BUILD: Step = Step {
    name: "workspace build",
    args: &["build", "--workspace"],
};
const SHADERS: Step = Step {
    name: "shader validation",
    args: &["run", "--quiet", "-p", "hellogpu-cli", "--", "check"],
};
const DOC: Step = Step {
    name: "rustdoc",
    args: &["doc", "--workspace", "--no-deps"],
};

impl Commands {
    fn steps(&self) -> &'static [Step] {
        match self {
            Commands::Check => &[FMT, CLIPPY, BUILD, SHADERS, TEST, DOC],
            Commands::Fmt => &[FMT],
            Commands::Clippy => &[CLIPPY],
            Commands::Test => &[TEST],
            Commands::Shaders => &[SHADERS],
            Commands::Doc => &[DOC],
            Commands::Build => &[BUILD, SHADERS],
        }
    }
}

fn run(step: &Step) -> Result<()> {
    println!("==> {}: cargo {}", step.name, step.args.join(" "));
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed ({status})", step.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    for step in cli.command.steps() {
        run(step)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(command: Commands) -> Vec<&'static str> {
        command.steps().iter().map(|s| s.name).collect()
    }

    #[test]
    fn build_validates_shaders_after_compiling() {
        assert_eq!(names(Commands::Build), ["workspace build", "shader validation"]);
    }

    #[test]
    fn check_runs_every_step_once() {
        let all = names(Commands::Check);
        assert_eq!(all.len(), 6);
        assert_eq!(all.first(), Some(&"fmt check"));
        for single in [Commands::Fmt, Commands::Clippy, Commands::Test, Commands::Doc] {
            assert!(all.contains(&names(single)[0]));
        }
    }

    #[test]
    fn shader_check_targets_the_cli() {
        assert!(SHADERS.args.contains(&"hellogpu-cli"));
        assert_eq!(SHADERS.args.last(), Some(&"check"));
    }
}
