use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rill::{Compiler, Engine};

#[derive(Parser, Debug)]
#[command(version, about = "Line-oriented scripting toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a source module into a binary module.
    Pack {
        /// Input source file.
        source: PathBuf,
        /// Output path; defaults to the source path with a .bin extension.
        output: Option<PathBuf>,
        /// Include search root; defaults to the source file's directory.
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Load and execute a binary module.
    Run {
        /// Module to execute (.bin, or .txt to pack on demand).
        module: PathBuf,
        /// Include search root; defaults to the module's directory.
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn search_root(explicit: Option<PathBuf>, input: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| {
        let parent = input.parent().unwrap_or_else(|| Path::new("."));
        if parent.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            parent.to_path_buf()
        }
    })
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Pack {
            source,
            output,
            root,
        } => {
            let output = output.unwrap_or_else(|| source.with_extension("bin"));
            let root = search_root(root, &source);
            let report = Compiler::new(root)
                .pack(&source, &output)
                .with_context(|| format!("packing {} failed", source.display()))?;

            for diagnostic in &report.diagnostics {
                eprintln!("{diagnostic}");
            }
            Ok(!report.has_errors())
        }
        Command::Run { module, root } => {
            let root = search_root(root, &module);
            let mut engine = Engine::new(root);
            engine
                .execute(&module)
                .with_context(|| format!("running {} failed", module.display()))?;
            Ok(true)
        }
    }
}
