use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use stencil_lang::codegen::GenConfig;
use stencil_lang::compiler::{Compiler, CompilerInput};
use stencil_lang::error::CompileErrorKind;

#[derive(Debug, Error)]
enum RunError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Compilation failed with {0} error(s)")]
    Compile(usize),
}

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Stencil - compile template definitions to preprocessor-only C headers")]
struct Cli {
    /// Template definition files to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory the generated tree is written under
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// Number of simultaneously live instantiations per template
    #[arg(long, default_value_t = 5)]
    max_package: usize,

    /// Maximum recursive nesting depth per template
    #[arg(long, default_value_t = 5)]
    max_depth: usize,
}

fn main() -> Result<(), RunError> {
    env_logger::init();
    let cli = Cli::parse();

    let config = GenConfig {
        max_package: cli.max_package,
        max_depth: cli.max_depth,
        ..GenConfig::default()
    };

    let compiler = Compiler::with_config(config);
    let result = compiler.compile(CompilerInput::Files(cli.files));

    if result.is_err() {
        let mut cache = ariadne::sources(
            result
                .gcx
                .sources
                .iter()
                .map(|(id, _, text)| (id, text.to_string()))
                .collect::<Vec<_>>(),
        );
        for err in result.errors.iter() {
            // I/O failures have no source text to point into.
            match &err.kind {
                CompileErrorKind::Io(_) => {
                    eprintln!("error: {}", err.message(&result.gcx.interner));
                }
                _ => err.report(&result.gcx.interner).eprint(&mut cache)?,
            }
        }
        return Err(RunError::Compile(result.errors.len()));
    }

    if let Some(output) = result.output {
        let count = output.len();
        if let Err(err) = output.write_to(&cli.output, cli.force) {
            eprintln!("error: {}", err.message(&result.gcx.interner));
            return Err(RunError::Compile(1));
        }
        log::info!("wrote {count} file(s) under {}", cli.output.display());
    }

    Ok(())
}
