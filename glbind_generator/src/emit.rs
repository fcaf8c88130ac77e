//! Rendering of a [Registry] into Rust source.
//!
//! Four self-contained source units are produced. Each starts with the same alias table for the
//! native GL types and is meant to be `include!`d into a module named after its
//! [ArtifactKind::module_name], with all four modules as siblings:
//!
//! ```ignore
//! pub mod constants { include!(concat!(env!("OUT_DIR"), "/gl_constants.rs")); }
//! pub mod enums { include!(concat!(env!("OUT_DIR"), "/gl_enums.rs")); }
//! pub mod bindings { include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs")); }
//! pub mod wrappers { include!(concat!(env!("OUT_DIR"), "/gl_wrappers.rs")); }
//! ```

use std::fmt::{self, Write};

use crate::command::{resolve_param_type, Command, Param};
use crate::enum_group::{EnumGroup, EnumGroups};
use crate::registry::Registry;
use crate::GeneratorOptions;

/// Rust spellings of the native GL typedefs.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("GLenum", "u32"),
    ("GLboolean", "u8"),
    ("GLbitfield", "u32"),
    ("GLbyte", "i8"),
    ("GLubyte", "u8"),
    ("GLshort", "i16"),
    ("GLushort", "u16"),
    ("GLint", "i32"),
    ("GLuint", "u32"),
    ("GLclampx", "i32"),
    ("GLsizei", "i32"),
    ("GLfloat", "f32"),
    ("GLclampf", "f32"),
    ("GLdouble", "f64"),
    ("GLclampd", "f64"),
    ("GLeglClientBufferEXT", "*mut c_void"),
    ("GLeglImageOES", "*mut c_void"),
    ("GLchar", "c_char"),
    ("GLcharARB", "c_char"),
    ("GLhandleARB", "u32"),
    ("GLhalf", "u16"),
    ("GLhalfARB", "u16"),
    ("GLfixed", "i32"),
    ("GLintptr", "isize"),
    ("GLintptrARB", "isize"),
    ("GLsizeiptr", "isize"),
    ("GLsizeiptrARB", "isize"),
    ("GLint64", "i64"),
    ("GLint64EXT", "i64"),
    ("GLuint64", "u64"),
    ("GLuint64EXT", "u64"),
    ("GLsync", "*const c_void"),
    ("_cl_context", "c_void"),
    ("_cl_event", "c_void"),
    ("GLDEBUGPROC", "*const c_void"),
    ("GLDEBUGPROCARB", "*const c_void"),
    ("GLDEBUGPROCKHR", "*const c_void"),
    ("GLDEBUGPROCAMD", "*const c_void"),
    ("GLhalfNV", "u16"),
    ("GLvdpauSurfaceNV", "GLintptr"),
    ("GLVULKANPROCNV", "*const c_void"),
];

/// The four source units produced from a registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ArtifactKind {
    /// One `pub const` per constant.
    Constants,
    /// One newtype per semantic group.
    Enums,
    /// The native entry points.
    Bindings,
    /// The typed `Gl` methods.
    Wrappers,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Constants,
        ArtifactKind::Enums,
        ArtifactKind::Bindings,
        ArtifactKind::Wrappers,
    ];

    pub fn module_name(&self) -> &'static str {
        match self {
            ArtifactKind::Constants => "constants",
            ArtifactKind::Enums => "enums",
            ArtifactKind::Bindings => "bindings",
            ArtifactKind::Wrappers => "wrappers",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Constants => "gl_constants.rs",
            ArtifactKind::Enums => "gl_enums.rs",
            ArtifactKind::Bindings => "gl_bindings.rs",
            ArtifactKind::Wrappers => "gl_wrappers.rs",
        }
    }
}

/// The generated source text.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Artifacts {
    pub constants: String,
    pub enums: String,
    pub bindings: String,
    pub wrappers: String,
}

impl Artifacts {
    pub fn get(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Constants => &self.constants,
            ArtifactKind::Enums => &self.enums,
            ArtifactKind::Bindings => &self.bindings,
            ArtifactKind::Wrappers => &self.wrappers,
        }
    }
}

/// Renders all four source units for `registry`.
///
/// Wrapper methods are named after their command with `options.command_prefix` removed, so
/// `glBlendFunc` becomes `Gl::BlendFunc`.
pub fn emit_artifacts(
    registry: &Registry,
    options: &GeneratorOptions,
) -> Result<Artifacts, fmt::Error> {
    let mut constants = String::new();
    let mut enums = String::new();
    let mut bindings = String::new();
    let mut wrappers = String::new();

    write_constants(&mut constants, registry)?;
    write_enums(&mut enums, &registry.groups)?;
    write_bindings(&mut bindings, &registry.commands)?;
    write_wrappers(&mut wrappers, registry, options)?;

    Ok(Artifacts {
        constants,
        enums,
        bindings,
        wrappers,
    })
}

fn write_preamble(out: &mut String, kind: ArtifactKind) -> fmt::Result {
    writeln!(
        out,
        "// Generated by glbind-generator from the Khronos API registry. Do not edit."
    )?;
    writeln!(out, "//")?;
    writeln!(
        out,
        "// Include as the `{}` module, next to its sibling modules `constants`, `enums`,",
        kind.module_name()
    )?;
    writeln!(out, "// `bindings` and `wrappers`.")?;
    writeln!(out)?;
    writeln!(out, "#[allow(unused_imports)]")?;
    writeln!(out, "use std::os::raw::{{c_char, c_void}};")?;
    writeln!(out)?;

    for (alias, target) in TYPE_ALIASES {
        if alias.starts_with('_') {
            writeln!(out, "#[allow(non_camel_case_types)]")?;
        }

        writeln!(out, "pub type {} = {};", alias, target)?;
    }

    writeln!(out)?;

    Ok(())
}

fn write_constants(out: &mut String, registry: &Registry) -> fmt::Result {
    write_preamble(out, ArtifactKind::Constants)?;

    for constant in &registry.constants {
        writeln!(
            out,
            "pub const {}: {} = {:#X};",
            constant.name,
            constant.width.type_name(),
            constant.value
        )?;
    }

    Ok(())
}

fn write_enums(out: &mut String, groups: &EnumGroups) -> fmt::Result {
    write_preamble(out, ArtifactKind::Enums)?;

    writeln!(out, "#[allow(unused_imports)]")?;
    writeln!(out, "use super::constants;")?;

    for group in groups.iter() {
        writeln!(out)?;
        write_enum_group(out, group)?;
    }

    Ok(())
}

fn write_enum_group(out: &mut String, group: &EnumGroup) -> fmt::Result {
    let name = group.name();
    let width = group.width().type_name();

    writeln!(out, "#[repr(transparent)]")?;
    writeln!(out, "#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]")?;
    writeln!(out, "pub struct {}(pub {});", name, width)?;
    writeln!(out)?;
    writeln!(out, "#[allow(non_upper_case_globals)]")?;
    writeln!(out, "impl {} {{", name)?;

    for member in group.members() {
        if member.width == group.width() {
            writeln!(
                out,
                "    pub const {}: Self = Self(constants::{});",
                member.name, member.constant
            )?;
        } else {
            writeln!(
                out,
                "    pub const {}: Self = Self(constants::{} as {});",
                member.name, member.constant, width
            )?;
        }
    }

    if group.is_bitmask() {
        if !group.members().is_empty() {
            writeln!(out)?;
        }

        writeln!(out, "    pub const fn empty() -> Self {{")?;
        writeln!(out, "        Self(0)")?;
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(out, "    pub fn contains(&self, other: Self) -> bool {{")?;
        writeln!(out, "        self.0 & other.0 == other.0")?;
        writeln!(out, "    }}")?;
    }

    writeln!(out, "}}")?;

    if group.is_bitmask() {
        writeln!(out)?;
        writeln!(out, "impl std::ops::BitOr for {} {{", name)?;
        writeln!(out, "    type Output = Self;")?;
        writeln!(out)?;
        writeln!(out, "    fn bitor(self, rhs: Self) -> Self {{")?;
        writeln!(out, "        Self(self.0 | rhs.0)")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl std::ops::BitOrAssign for {} {{", name)?;
        writeln!(out, "    fn bitor_assign(&mut self, rhs: Self) {{")?;
        writeln!(out, "        self.0 |= rhs.0;")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl std::ops::BitAnd for {} {{", name)?;
        writeln!(out, "    type Output = Self;")?;
        writeln!(out)?;
        writeln!(out, "    fn bitand(self, rhs: Self) -> Self {{")?;
        writeln!(out, "        Self(self.0 & rhs.0)")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
    }

    Ok(())
}

/// The Rust type of a binding slot for `command`.
fn slot_type(command: &Command) -> String {
    let params: Vec<String> = command
        .params
        .iter()
        .map(|p| p.raw_type.rust_type())
        .collect();

    format!(
        "Option<unsafe extern \"system\" fn({}){}>",
        params.join(", "),
        return_clause(command)
    )
}

fn return_clause(command: &Command) -> String {
    if command.return_type.is_void() {
        String::new()
    } else {
        format!(" -> {}", command.return_type.rust_type())
    }
}

fn write_bindings(out: &mut String, commands: &[Command]) -> fmt::Result {
    write_preamble(out, ArtifactKind::Bindings)?;

    writeln!(
        out,
        "/// Native entry points, each resolved once by symbol name; `None` if the symbol was not"
    )?;
    writeln!(out, "/// found.")?;
    writeln!(out, "#[allow(non_snake_case)]")?;
    writeln!(out, "pub struct BindingSlots {{")?;

    for command in commands {
        writeln!(out, "    pub {}: {},", command.name, slot_type(command))?;
    }

    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl BindingSlots {{")?;
    writeln!(
        out,
        "    /// Resolves every slot through `loader`, which maps a symbol name to its address or to"
    )?;
    writeln!(out, "    /// null.")?;
    writeln!(out, "    #[allow(unused_mut, unused_variables, unused_unsafe)]")?;
    writeln!(out, "    pub fn load_with<F>(mut loader: F) -> Self")?;
    writeln!(out, "    where")?;
    writeln!(out, "        F: FnMut(&str) -> *const c_void,")?;
    writeln!(out, "    {{")?;
    writeln!(out, "        unsafe {{")?;
    writeln!(out, "            BindingSlots {{")?;

    for command in commands {
        writeln!(
            out,
            "                {}: std::mem::transmute(loader(\"{}\")),",
            command.name, command.name
        )?;
    }

    writeln!(out, "            }}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(())
}

/// The expression passing `param` on to its binding slot, narrowing a generated enumeration back
/// to the native type.
fn call_argument(param: &Param, group: Option<&EnumGroup>) -> String {
    match group {
        Some(_) if param.raw_type.is_pointer() => {
            format!("{} as {}", param.name, param.raw_type.rust_type())
        }
        Some(_) => format!("{}.0 as {}", param.name, param.raw_type.rust_type()),
        None => param.name.clone(),
    }
}

fn write_wrappers(
    out: &mut String,
    registry: &Registry,
    options: &GeneratorOptions,
) -> fmt::Result {
    write_preamble(out, ArtifactKind::Wrappers)?;

    writeln!(out, "use super::bindings::BindingSlots;")?;
    writeln!(out, "#[allow(unused_imports)]")?;
    writeln!(out, "use super::enums::*;")?;
    writeln!(out)?;
    writeln!(out, "/// The entry points of one GL context.")?;
    writeln!(out, "pub struct Gl {{")?;
    writeln!(out, "    slots: BindingSlots,")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl Gl {{")?;
    writeln!(out, "    pub fn load_with<F>(loader: F) -> Self")?;
    writeln!(out, "    where")?;
    writeln!(out, "        F: FnMut(&str) -> *const c_void,")?;
    writeln!(out, "    {{")?;
    writeln!(out, "        Gl {{")?;
    writeln!(out, "            slots: BindingSlots::load_with(loader),")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    pub fn slots(&self) -> &BindingSlots {{")?;
    writeln!(out, "        &self.slots")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "#[cold]")?;
    writeln!(out, "#[inline(never)]")?;
    writeln!(out, "fn missing_binding(name: &str) -> ! {{")?;
    writeln!(out, "    panic!(\"`{{}}` is not loaded\", name)")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(
        out,
        "#[allow(non_snake_case, clippy::missing_safety_doc, clippy::too_many_arguments)]"
    )?;
    writeln!(out, "impl Gl {{")?;

    for (i, command) in registry.commands.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }

        write_wrapper(out, registry, options, command)?;
    }

    writeln!(out, "}}")?;

    Ok(())
}

fn write_wrapper(
    out: &mut String,
    registry: &Registry,
    options: &GeneratorOptions,
    command: &Command,
) -> fmt::Result {
    let method_name = command
        .name
        .strip_prefix(options.command_prefix.as_str())
        .unwrap_or(&command.name);
    let mut params = Vec::with_capacity(command.params.len());
    let mut arguments = Vec::with_capacity(command.params.len());

    for param in &command.params {
        let group = param.group.as_deref().and_then(|g| registry.groups.get(g));
        let param_type = resolve_param_type(group, &param.raw_type);

        params.push(format!("{}: {}", param.name, param_type.rust_type()));
        arguments.push(call_argument(param, group));
    }

    let mut signature = String::from("&self");

    for param in &params {
        signature.push_str(", ");
        signature.push_str(param);
    }

    writeln!(out, "    #[inline]")?;
    writeln!(
        out,
        "    pub unsafe fn {}({}){} {{",
        method_name,
        signature,
        return_clause(command)
    )?;
    writeln!(out, "        match self.slots.{} {{", command.name)?;
    writeln!(out, "            Some(__slot) => __slot({}),", arguments.join(", "))?;
    writeln!(out, "            None => missing_binding(\"{}\"),", command.name)?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::document::XmlElement;

    fn emit(xml: &str) -> Artifacts {
        let options = GeneratorOptions::default();
        let root = XmlElement::parse_str(xml).unwrap();
        let registry = Registry::from_document(&root, &options).unwrap();

        emit_artifacts(&registry, &options).unwrap()
    }

    /// The generated text following the shared preamble.
    fn body(artifact: &str) -> &str {
        let marker = "pub type GLVULKANPROCNV = *const c_void;\n\n";
        let start = artifact.find(marker).unwrap() + marker.len();

        &artifact[start..]
    }

    const BLEND_REGISTRY: &str = r#"<registry>
        <enums type="bitmask">
            <enum value="0x00000100" name="GL_DEPTH_BUFFER_BIT" group="ClearBufferMask"/>
            <enum value="0x00004000" name="GL_COLOR_BUFFER_BIT" group="ClearBufferMask"/>
        </enums>
        <enums>
            <enum value="0" name="GL_ZERO" group="BlendingFactor"/>
            <enum value="1" name="GL_ONE" group="BlendingFactor"/>
            <enum value="0x0DE1" name="GL_TEXTURE_2D" group="TextureTarget"/>
            <enum value="0xFFFFFFFF" name="GL_INVALID_INDEX" type="u"/>
        </enums>
        <commands>
            <command>
                <proto>void <name>glBlendFunc</name></proto>
                <param group="BlendingFactor"><ptype>GLenum</ptype> <name>sfactor</name></param>
                <param group="BlendingFactor"><ptype>GLenum</ptype> <name>dfactor</name></param>
            </command>
            <command>
                <proto>void <name>glClear</name></proto>
                <param group="ClearBufferMask"><ptype>GLbitfield</ptype> <name>mask</name></param>
            </command>
            <command>
                <proto>const <ptype>GLubyte</ptype> *<name>glGetString</name></proto>
                <param group="StringName"><ptype>GLenum</ptype> <name>name</name></param>
            </command>
            <command>
                <proto>void *<name>glMapBuffer</name></proto>
                <param><ptype>GLenum</ptype> <name>target</name></param>
                <param><ptype>GLenum</ptype> <name>access</name></param>
            </command>
        </commands>
    </registry>"#;

    #[test]
    fn test_artifact_kind_names() {
        let files: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.file_name()).collect();

        assert_eq!(
            files,
            vec!["gl_constants.rs", "gl_enums.rs", "gl_bindings.rs", "gl_wrappers.rs"]
        );
        assert_eq!(ArtifactKind::Wrappers.module_name(), "wrappers");
    }

    #[test]
    fn test_preamble_is_shared() {
        let artifacts = emit(BLEND_REGISTRY);

        for kind in ArtifactKind::ALL.iter() {
            let text = artifacts.get(*kind);

            assert!(text.starts_with("// Generated by glbind-generator"));
            assert!(text.contains("use std::os::raw::{c_char, c_void};\n"));
            assert!(text.contains("pub type GLenum = u32;\n"));
            assert!(text.contains("#[allow(non_camel_case_types)]\npub type _cl_context = c_void;\n"));
            assert!(text.contains(&format!("`{}` module", kind.module_name())));
        }
    }

    #[test]
    fn test_constants() {
        let artifacts = emit(BLEND_REGISTRY);

        assert_eq!(
            body(&artifacts.constants),
            "pub const DEPTH_BUFFER_BIT: GLbitfield = 0x100;\n\
             pub const COLOR_BUFFER_BIT: GLbitfield = 0x4000;\n\
             pub const ZERO: GLenum = 0x0;\n\
             pub const ONE: GLenum = 0x1;\n\
             pub const TEXTURE_2D: GLenum = 0xDE1;\n\
             pub const INVALID_INDEX: GLuint = 0xFFFFFFFF;\n"
        );
    }

    #[test]
    fn test_value_enum() {
        let artifacts = emit(BLEND_REGISTRY);
        let enums = body(&artifacts.enums);

        assert!(enums.contains(
            "#[repr(transparent)]\n\
             #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]\n\
             pub struct BlendingFactor(pub GLenum);\n\
             \n\
             #[allow(non_upper_case_globals)]\n\
             impl BlendingFactor {\n    \
                 pub const Zero: Self = Self(constants::ZERO);\n    \
                 pub const One: Self = Self(constants::ONE);\n\
             }\n"
        ));
        assert!(enums.contains("    pub const TextureN2D: Self = Self(constants::TEXTURE_2D);\n"));
        assert!(!enums.contains("impl std::ops::BitOr for BlendingFactor"));
    }

    #[test]
    fn test_bitmask_enum() {
        let artifacts = emit(BLEND_REGISTRY);
        let enums = body(&artifacts.enums);

        assert!(enums.contains("pub struct ClearBufferMask(pub GLbitfield);\n"));
        assert!(enums.contains("    pub const ColorBufferBit: Self = Self(constants::COLOR_BUFFER_BIT);\n"));
        assert!(enums.contains("    pub const fn empty() -> Self {\n"));
        assert!(enums.contains("impl std::ops::BitOr for ClearBufferMask {\n"));
        assert!(enums.contains("impl std::ops::BitOrAssign for ClearBufferMask {\n"));
        assert!(enums.contains("impl std::ops::BitAnd for ClearBufferMask {\n"));
    }

    #[test]
    fn test_groups_in_discovery_order() {
        let artifacts = emit(BLEND_REGISTRY);
        let enums = &artifacts.enums;

        let clear = enums.find("pub struct ClearBufferMask").unwrap();
        let blend = enums.find("pub struct BlendingFactor").unwrap();
        let texture = enums.find("pub struct TextureTarget").unwrap();

        assert!(clear < blend);
        assert!(blend < texture);
    }

    #[test]
    fn test_mixed_width_members_are_cast() {
        let artifacts = emit(
            r#"<registry>
                <enums>
                    <enum value="0x8F36" name="GL_COPY_READ_BUFFER" group="CopyBufferSubDataTarget"/>
                    <enum value="0xFFFFFFFF" name="GL_ALL_ONES" type="u" group="CopyBufferSubDataTarget"/>
                </enums>
            </registry>"#,
        );

        assert!(artifacts
            .enums
            .contains("    pub const AllOnes: Self = Self(constants::ALL_ONES as GLenum);\n"));
    }

    #[test]
    fn test_binding_slots() {
        let artifacts = emit(BLEND_REGISTRY);
        let bindings = &artifacts.bindings;

        assert!(bindings.contains(
            "    pub glBlendFunc: Option<unsafe extern \"system\" fn(GLenum, GLenum)>,\n"
        ));
        assert!(bindings.contains(
            "    pub glGetString: Option<unsafe extern \"system\" fn(GLenum) -> *const GLubyte>,\n"
        ));
        assert!(bindings.contains(
            "    pub glMapBuffer: Option<unsafe extern \"system\" fn(GLenum, GLenum) -> *mut c_void>,\n"
        ));
        assert!(bindings
            .contains("                glClear: std::mem::transmute(loader(\"glClear\")),\n"));
    }

    #[test]
    fn test_wrappers() {
        let artifacts = emit(BLEND_REGISTRY);
        let wrappers = &artifacts.wrappers;

        assert!(wrappers.contains(
            "    #[inline]\n    \
             pub unsafe fn BlendFunc(&self, r#sfactor: BlendingFactor, r#dfactor: BlendingFactor) {\n        \
                 match self.slots.glBlendFunc {\n            \
                     Some(__slot) => __slot(r#sfactor.0 as GLenum, r#dfactor.0 as GLenum),\n            \
                     None => missing_binding(\"glBlendFunc\"),\n        \
                 }\n    \
             }\n"
        ));
        assert!(wrappers.contains("    pub unsafe fn Clear(&self, r#mask: ClearBufferMask) {\n"));
    }

    #[test]
    fn test_wrapper_without_generated_group_uses_raw_type() {
        let artifacts = emit(BLEND_REGISTRY);

        // `StringName` has no members, so there is no enumeration for it.
        assert!(artifacts.wrappers.contains(
            "    pub unsafe fn GetString(&self, r#name: GLenum) -> *const GLubyte {\n"
        ));
        assert!(artifacts
            .wrappers
            .contains("            Some(__slot) => __slot(r#name),\n"));
    }

    #[test]
    fn test_empty_registry() {
        let artifacts = emit("<registry/>");

        assert_eq!(body(&artifacts.constants), "");
        assert!(artifacts.bindings.contains("pub struct BindingSlots {\n}\n"));
        assert!(artifacts.wrappers.contains("impl Gl {\n}\n"));
    }
}
