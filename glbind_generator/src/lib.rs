//! Compiles the Khronos OpenGL API registry (`gl.xml`) into the Rust source of glbind's raw
//! binding layer.
//!
//! A single pass over the registry document produces four source units (see [ArtifactKind]):
//!
//! - constants: one typed constant per `<enum>` entry,
//! - enums: one newtype per semantic group of constants,
//! - bindings: one lazily resolved native entry point per `<command>`,
//! - wrappers: one typed method on `Gl` per `<command>`.
//!
//! Registry entries that cannot be used are skipped and listed in the [CompileReport] rather
//! than aborting the pass.
//!
//! # Example
//!
//! ```
//! use glbind_generator::{compile_registry_str, GeneratorOptions};
//!
//! let compilation = compile_registry_str(
//!     r#"<registry>
//!         <enums>
//!             <enum value="0x1406" name="GL_FLOAT"/>
//!         </enums>
//!         <commands>
//!             <command>
//!                 <proto>void <name>glFlush</name></proto>
//!             </command>
//!         </commands>
//!     </registry>"#,
//!     &GeneratorOptions::default(),
//! )
//! .unwrap();
//!
//! assert!(compilation.artifacts.constants.contains("pub const FLOAT: GLenum = 0x1406;"));
//! assert!(compilation.artifacts.wrappers.contains("pub unsafe fn Flush(&self)"));
//! assert_eq!(compilation.report.commands, 1);
//! ```

pub mod command;
pub mod document;
pub mod emit;
pub mod enum_group;
pub mod naming;
pub mod type_token;

mod error;
pub use self::error::GenerateError;

mod options;
pub use self::options::GeneratorOptions;

mod registry;
pub use self::registry::{Constant, EntryKind, Registry, SkipReason, SkippedEntry};

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::XmlElement;
use crate::emit::{emit_artifacts, ArtifactKind, Artifacts};

/// The result of a successful generation pass.
#[derive(Clone, Debug)]
pub struct Compilation {
    pub artifacts: Artifacts,
    pub report: CompileReport,
}

/// What a generation pass produced, and what it left out.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CompileReport {
    /// The number of constants emitted.
    pub constants: usize,

    /// The number of enumerations emitted.
    pub groups: usize,

    /// The number of commands emitted, each as a binding slot and a wrapper.
    pub commands: usize,

    pub skipped: Vec<SkippedEntry>,
}

/// Compiles an already parsed registry document.
pub fn compile_registry(
    root: &XmlElement,
    options: &GeneratorOptions,
) -> Result<Compilation, GenerateError> {
    let registry = Registry::from_document(root, options)?;
    let artifacts = emit_artifacts(&registry, options)?;

    log::debug!(
        "Compiled {} constants, {} groups and {} commands ({} entries skipped)",
        registry.constants.len(),
        registry.groups.len(),
        registry.commands.len(),
        registry.skipped.len()
    );

    let report = CompileReport {
        constants: registry.constants.len(),
        groups: registry.groups.len(),
        commands: registry.commands.len(),
        skipped: registry.skipped,
    };

    Ok(Compilation { artifacts, report })
}

/// Parses `source` as a registry document and compiles it.
pub fn compile_registry_str(
    source: &str,
    options: &GeneratorOptions,
) -> Result<Compilation, GenerateError> {
    let root = XmlElement::parse_str(source)?;

    compile_registry(&root, options)
}

/// Reads the registry document at `path` and compiles it.
pub fn compile_registry_file<P>(
    path: P,
    options: &GeneratorOptions,
) -> Result<Compilation, GenerateError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|source| GenerateError::Io {
        path: path.display().to_string(),
        source,
    })?;

    log::info!("Reading registry `{}`", path.display());

    let root = XmlElement::parse(std::io::BufReader::new(file))?;

    compile_registry(&root, options)
}

/// Writes each artifact to its [ArtifactKind::file_name] inside `dir`, replacing existing files.
///
/// Returns the paths written, in [ArtifactKind::ALL] order.
pub fn write_artifacts<P>(artifacts: &Artifacts, dir: P) -> Result<Vec<PathBuf>, GenerateError>
where
    P: AsRef<Path>,
{
    let mut written = Vec::with_capacity(ArtifactKind::ALL.len());

    for kind in ArtifactKind::ALL.iter() {
        let path = dir.as_ref().join(kind.file_name());

        fs::write(&path, artifacts.get(*kind)).map_err(|source| GenerateError::Io {
            path: path.display().to_string(),
            source,
        })?;

        log::debug!("Wrote `{}`", path.display());

        written.push(path);
    }

    Ok(written)
}
