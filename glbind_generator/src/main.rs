use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::Env;
use glbind_generator::{compile_registry_file, write_artifacts, GeneratorOptions};

/// Generates glbind's OpenGL binding sources from the Khronos API registry.
///
/// Writes `gl_constants.rs`, `gl_enums.rs`, `gl_bindings.rs` and `gl_wrappers.rs` to the current
/// directory.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the registry document, e.g. `gl.xml`.
    registry: PathBuf,
}

fn run(args: &Args) -> Result<(), failure::Error> {
    let compilation = compile_registry_file(&args.registry, &GeneratorOptions::default())?;
    let report = &compilation.report;

    write_artifacts(&compilation.artifacts, ".")?;

    log::info!(
        "Generated {} constants, {} enums and {} commands",
        report.constants,
        report.groups,
        report.commands
    );

    if !report.skipped.is_empty() {
        log::info!("Skipped {} registry entries", report.skipped.len());
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        log::error!("{}", err);
        eprintln!("glbind-generator: {}", err);

        process::exit(1);
    }
}
