use crate::enum_group::EnumGroup;
use crate::naming::escape_param_name;
use crate::type_token::{parse_declaration, DeclarationError, TypeToken};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Param {
    /// The escaped parameter name, e.g. `r#params`.
    pub name: String,

    /// The native type of the parameter.
    pub raw_type: TypeToken,

    /// The semantic group the parameter's values are drawn from, if any.
    pub group: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Command {
    /// The native symbol name, e.g. `glBlendFunc`.
    pub name: String,

    pub return_type: TypeToken,

    pub params: Vec<Param>,
}

/// Splits a command prototype such as `const GLubyte *glGetString` into its return type and name.
pub fn parse_command_prototype(proto: &str) -> Result<(TypeToken, String), DeclarationError> {
    parse_declaration(proto)
}

/// Parses a parameter declaration such as `const void *data`.
///
/// The name is escaped with [escape_param_name], as many native parameter names (`type`, `ref`)
/// are reserved words in Rust. An empty `group` is treated as no group.
pub fn parse_parameter(text: &str, group: Option<&str>) -> Result<Param, DeclarationError> {
    let (raw_type, name) = parse_declaration(text)?;
    let group = group
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string);

    Ok(Param {
        name: escape_param_name(&name),
        raw_type,
        group,
    })
}

/// The type a wrapper function exposes for a parameter.
///
/// For a parameter drawn from a semantic group this is the generated enumeration, behind the same
/// pointer levels as the native type. Otherwise it is the native type itself.
pub fn resolve_param_type(group: Option<&EnumGroup>, raw_type: &TypeToken) -> TypeToken {
    match group {
        Some(group) => raw_type.with_base(group.name()),
        None => raw_type.clone(),
    }
}
