use std::fmt;

use fnv::FnvHashSet;

use crate::command::{parse_command_prototype, parse_parameter, Command};
use crate::document::XmlElement;
use crate::enum_group::{ConstantWidth, EnumGroups, EnumMember};
use crate::type_token::DeclarationError;
use crate::{GenerateError, GeneratorOptions};

/// A constant declared by an `<enum>` entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Constant {
    /// The generated name, e.g. `COLOR_BUFFER_BIT`.
    pub name: String,

    /// The registry name, e.g. `GL_COLOR_BUFFER_BIT`.
    pub raw_name: String,

    pub width: ConstantWidth,

    /// The value, wrapped to `width`.
    pub value: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
    Enum,
    Command,
}

/// Why a registry entry produced no output.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SkipReason {
    MissingName,
    MissingValue,
    MalformedValue(String),
    /// The entry only applies to the named API variant, e.g. `gles2`.
    ApiVariant(String),
    DuplicateName,
    MissingPrototype,
    /// The command name does not start with the command prefix.
    ForeignPrefix,
    MalformedPrototype(DeclarationError),
    MalformedParameter {
        index: usize,
        error: DeclarationError,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::MissingName => write!(f, "missing name"),
            SkipReason::MissingValue => write!(f, "missing value"),
            SkipReason::MalformedValue(value) => write!(f, "malformed value `{}`", value),
            SkipReason::ApiVariant(api) => write!(f, "only applies to API `{}`", api),
            SkipReason::DuplicateName => write!(f, "duplicate name"),
            SkipReason::MissingPrototype => write!(f, "missing prototype"),
            SkipReason::ForeignPrefix => write!(f, "name lacks the command prefix"),
            SkipReason::MalformedPrototype(error) => write!(f, "malformed prototype: {}", error),
            SkipReason::MalformedParameter { index, error } => {
                write!(f, "malformed parameter {}: {}", index, error)
            }
        }
    }
}

/// A registry entry that was left out of the generated output.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SkippedEntry {
    pub kind: EntryKind,
    pub name: Option<String>,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            EntryKind::Enum => "enum",
            EntryKind::Command => "command",
        };

        match &self.name {
            Some(name) => write!(f, "skipped {} `{}`: {}", kind, name, self.reason),
            None => write!(f, "skipped unnamed {}: {}", kind, self.reason),
        }
    }
}

/// The constants, semantic groups and commands of a registry, in document order.
#[derive(Clone, Debug)]
pub struct Registry {
    pub constants: Vec<Constant>,
    pub groups: EnumGroups,
    pub commands: Vec<Command>,
    pub skipped: Vec<SkippedEntry>,
}

impl Registry {
    /// Reads every `<enums>` and `<commands>` section of the `<registry>` root element.
    ///
    /// Entries that cannot be used are skipped and recorded in [Registry::skipped]. A command
    /// carrying an attribute other than `comment` aborts the pass, as it means the registry
    /// format has changed in a way this reader does not understand.
    pub fn from_document(
        root: &XmlElement,
        options: &GeneratorOptions,
    ) -> Result<Registry, GenerateError> {
        if root.name != "registry" {
            return Err(GenerateError::UnexpectedRoot(root.name.clone()));
        }

        let mut reader = RegistryReader {
            options,
            registry: Registry {
                constants: Vec::new(),
                groups: EnumGroups::new(),
                commands: Vec::new(),
                skipped: Vec::new(),
            },
            constant_names: FnvHashSet::default(),
            command_names: FnvHashSet::default(),
        };

        for element in root.elements() {
            match element.name.as_str() {
                "enums" => reader.read_enums(element),
                "commands" => reader.read_commands(element)?,
                _ => (),
            }
        }

        Ok(reader.registry)
    }
}

struct RegistryReader<'a> {
    options: &'a GeneratorOptions,
    registry: Registry,
    constant_names: FnvHashSet<String>,
    command_names: FnvHashSet<String>,
}

impl<'a> RegistryReader<'a> {
    fn skip(&mut self, kind: EntryKind, name: Option<&str>, reason: SkipReason) {
        let entry = SkippedEntry {
            kind,
            name: name.map(str::to_string),
            reason,
        };

        log::warn!("{}", entry);

        self.registry.skipped.push(entry);
    }

    fn read_enums(&mut self, enums: &XmlElement) {
        let bitmask = enums.attribute("type") == Some("bitmask");

        for element in enums.elements().filter(|e| e.name == "enum") {
            self.read_enum(element, bitmask);
        }
    }

    fn read_enum(&mut self, element: &XmlElement, bitmask: bool) {
        let raw_name = match element.attribute("name").map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => return self.skip(EntryKind::Enum, None, SkipReason::MissingName),
        };

        let value = match element.attribute("value") {
            Some(value) => value,
            None => return self.skip(EntryKind::Enum, Some(raw_name), SkipReason::MissingValue),
        };

        if let Some(api) = element.attribute("api") {
            return self.skip(
                EntryKind::Enum,
                Some(raw_name),
                SkipReason::ApiVariant(api.to_string()),
            );
        }

        let width = match element.attribute("type") {
            Some("u") => ConstantWidth::UInt,
            Some("ull") => ConstantWidth::UInt64,
            _ if bitmask => ConstantWidth::Bitfield,
            _ => ConstantWidth::Enum,
        };

        let value = match parse_value(value) {
            Some(parsed) => wrap_value(parsed, width),
            None => {
                return self.skip(
                    EntryKind::Enum,
                    Some(raw_name),
                    SkipReason::MalformedValue(value.to_string()),
                )
            }
        };

        let name = self.options.normalize_constant_name(raw_name);

        if name.is_empty() {
            return self.skip(EntryKind::Enum, Some(raw_name), SkipReason::MissingName);
        }

        if !self.constant_names.insert(name.clone()) {
            return self.skip(EntryKind::Enum, Some(raw_name), SkipReason::DuplicateName);
        }

        let groups = element.attribute("group").unwrap_or("");

        for group in groups.split(',').map(str::trim).filter(|g| !g.is_empty()) {
            let member = EnumMember {
                name: self.options.normalize_enum_member_name(raw_name),
                constant: name.clone(),
                width,
            };

            if member.name.is_empty() {
                continue;
            }

            let member_name = member.name.clone();

            if !self.registry.groups.add_member(group, bitmask, member) {
                log::warn!(
                    "`{}` would repeat member `{}` of group `{}`; keeping the first",
                    raw_name,
                    member_name,
                    group
                );
            }
        }

        self.registry.constants.push(Constant {
            name,
            raw_name: raw_name.to_string(),
            width,
            value,
        });
    }

    fn read_commands(&mut self, commands: &XmlElement) -> Result<(), GenerateError> {
        for element in commands.elements().filter(|e| e.name == "command") {
            self.read_command(element)?;
        }

        Ok(())
    }

    fn read_command(&mut self, element: &XmlElement) -> Result<(), GenerateError> {
        let proto = element.child("proto");
        let display_name = proto
            .and_then(|p| p.child("name"))
            .map(|n| n.text().trim().to_string());

        for (attribute, value) in &element.attributes {
            if attribute != "comment" {
                return Err(GenerateError::UnknownCommandAttribute {
                    command: display_name.unwrap_or_else(|| "<unnamed>".to_string()),
                    attribute: attribute.clone(),
                    value: value.clone(),
                });
            }
        }

        let display_name = display_name.as_deref();

        let (return_type, name) = match proto.map(|p| parse_command_prototype(&p.text())) {
            Some(Ok(parsed)) => parsed,
            Some(Err(error)) => {
                self.skip(
                    EntryKind::Command,
                    display_name,
                    SkipReason::MalformedPrototype(error),
                );

                return Ok(());
            }
            None => {
                self.skip(EntryKind::Command, display_name, SkipReason::MissingPrototype);

                return Ok(());
            }
        };

        let prefix = self.options.command_prefix.as_str();

        if !name.starts_with(prefix) || name.len() == prefix.len() {
            self.skip(EntryKind::Command, Some(&name), SkipReason::ForeignPrefix);

            return Ok(());
        }

        let mut params = Vec::new();

        for (index, param) in element.elements().filter(|e| e.name == "param").enumerate() {
            match parse_parameter(&param.text(), param.attribute("group")) {
                Ok(param) => params.push(param),
                Err(error) => {
                    self.skip(
                        EntryKind::Command,
                        Some(&name),
                        SkipReason::MalformedParameter { index, error },
                    );

                    return Ok(());
                }
            }
        }

        if !self.command_names.insert(name.clone()) {
            self.skip(EntryKind::Command, Some(&name), SkipReason::DuplicateName);

            return Ok(());
        }

        self.registry.commands.push(Command {
            name,
            return_type,
            params,
        });

        Ok(())
    }
}

/// Parses a decimal or `0x` hexadecimal registry value with an optional sign and C integer
/// suffix.
fn parse_value(text: &str) -> Option<i128> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = digits.trim_end_matches(|c| c == 'u' || c == 'U' || c == 'l' || c == 'L');

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i128>().ok()?,
    };

    if magnitude < 0 {
        return None;
    }

    Some(if negative { -magnitude } else { magnitude })
}

/// Wraps `value` to the two's complement bit pattern of `width`.
fn wrap_value(value: i128, width: ConstantWidth) -> u64 {
    let bits = value as u128 as u64;

    match width.bits() {
        64 => bits,
        _ => bits & 0xFFFF_FFFF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(xml: &str) -> Registry {
        let root = XmlElement::parse_str(xml).unwrap();

        Registry::from_document(&root, &GeneratorOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("0x4000"), Some(0x4000));
        assert_eq!(parse_value("0XFF"), Some(0xFF));
        assert_eq!(parse_value("12"), Some(12));
        assert_eq!(parse_value("-1"), Some(-1));
        assert_eq!(parse_value("0xFFFFFFFFFFFFFFFFull"), Some(0xFFFF_FFFF_FFFF_FFFF));
        assert_eq!(parse_value("((EGLint)-1)"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("--1"), None);
    }

    #[test]
    fn test_wrap_value() {
        assert_eq!(wrap_value(-1, ConstantWidth::Enum), 0xFFFF_FFFF);
        assert_eq!(wrap_value(-1, ConstantWidth::UInt64), u64::max_value());
        assert_eq!(wrap_value(0x1_0000_0001, ConstantWidth::UInt), 1);
    }

    #[test]
    fn test_constant_widths() {
        let registry = read(
            r#"<registry>
                <enums type="bitmask">
                    <enum value="0x00004000" name="GL_COLOR_BUFFER_BIT" group="ClearBufferMask"/>
                </enums>
                <enums>
                    <enum value="0x1406" name="GL_FLOAT"/>
                    <enum value="0xFFFFFFFF" name="GL_INVALID_INDEX" type="u"/>
                    <enum value="0xFFFFFFFFFFFFFFFF" name="GL_TIMEOUT_IGNORED" type="ull"/>
                </enums>
            </registry>"#,
        );

        let widths: Vec<_> = registry.constants.iter().map(|c| c.width).collect();

        assert_eq!(
            widths,
            vec![
                ConstantWidth::Bitfield,
                ConstantWidth::Enum,
                ConstantWidth::UInt,
                ConstantWidth::UInt64
            ]
        );
        assert!(registry.groups.get("ClearBufferMask").unwrap().is_bitmask());
    }

    #[test]
    fn test_groups_are_many_to_many() {
        let registry = read(
            r#"<registry>
                <enums>
                    <enum value="0" name="GL_ZERO" group="BlendingFactor,StencilOp"/>
                    <enum value="1" name="GL_ONE" group="BlendingFactor"/>
                </enums>
            </registry>"#,
        );

        let blending = registry.groups.get("BlendingFactor").unwrap();
        let stencil = registry.groups.get("StencilOp").unwrap();

        assert_eq!(blending.members().len(), 2);
        assert_eq!(stencil.members()[0].name, "Zero");
        assert_eq!(stencil.members()[0].constant, "ZERO");
    }

    #[test]
    fn test_malformed_enums_are_skipped() {
        let registry = read(
            r#"<registry>
                <enums>
                    <enum value="0x1"/>
                    <enum name="GL_NO_VALUE"/>
                    <enum value="0x2" name="GL_ES_ONLY" api="gles2"/>
                    <enum value="junk" name="GL_JUNK"/>
                    <enum value="0x3" name="GL_KEPT"/>
                    <enum value="0x4" name="GL_KEPT"/>
                    <unused start="0x5" end="0x6"/>
                </enums>
            </registry>"#,
        );

        let reasons: Vec<_> = registry.skipped.iter().map(|s| s.reason.clone()).collect();

        assert_eq!(registry.constants.len(), 1);
        assert_eq!(registry.constants[0].value, 3);
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingName,
                SkipReason::MissingValue,
                SkipReason::ApiVariant("gles2".to_string()),
                SkipReason::MalformedValue("junk".to_string()),
                SkipReason::DuplicateName,
            ]
        );
    }

    #[test]
    fn test_commands() {
        let registry = read(
            r#"<registry>
                <commands namespace="GL">
                    <command>
                        <proto>void <name>glBlendFunc</name></proto>
                        <param group="BlendingFactor"><ptype>GLenum</ptype> <name>sfactor</name></param>
                        <param group="BlendingFactor"><ptype>GLenum</ptype> <name>dfactor</name></param>
                        <glx type="render" opcode="161"/>
                    </command>
                    <command comment="returns a string">
                        <proto>const <ptype>GLubyte</ptype> *<name>glGetString</name></proto>
                        <param group="StringName"><ptype>GLenum</ptype> <name>name</name></param>
                    </command>
                </commands>
            </registry>"#,
        );

        assert_eq!(registry.commands.len(), 2);
        assert_eq!(registry.commands[0].name, "glBlendFunc");
        assert_eq!(registry.commands[0].params[1].name, "r#dfactor");
        assert_eq!(
            registry.commands[0].params[1].group.as_deref(),
            Some("BlendingFactor")
        );
        assert_eq!(registry.commands[1].return_type.to_string(), "GLubyte*");
    }

    #[test]
    fn test_malformed_commands_are_skipped() {
        let registry = read(
            r#"<registry>
                <commands>
                    <command><param><ptype>GLenum</ptype> <name>mode</name></param></command>
                    <command><proto>void <name>eglSwapBuffers</name></proto></command>
                    <command>
                        <proto>void <name>glLoadMatrixf</name></proto>
                        <param>const <ptype>GLfloat</ptype> <name>m</name>[16]</param>
                    </command>
                    <command><proto>void <name>glFinish</name></proto></command>
                    <command><proto>void <name>glFinish</name></proto></command>
                </commands>
            </registry>"#,
        );

        let reasons: Vec<_> = registry.skipped.iter().map(|s| s.reason.clone()).collect();

        assert_eq!(registry.commands.len(), 1);
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingPrototype,
                SkipReason::ForeignPrefix,
                SkipReason::MalformedParameter {
                    index: 0,
                    error: DeclarationError::UnexpectedCharacter('['),
                },
                SkipReason::DuplicateName,
            ]
        );
    }

    #[test]
    fn test_unknown_command_attribute_is_fatal() {
        let root = XmlElement::parse_str(
            r#"<registry>
                <commands>
                    <command api="gles2"><proto>void <name>glClear</name></proto></command>
                </commands>
            </registry>"#,
        )
        .unwrap();

        match Registry::from_document(&root, &GeneratorOptions::default()) {
            Err(GenerateError::UnknownCommandAttribute {
                command,
                attribute,
                value,
            }) => {
                assert_eq!(command, "glClear");
                assert_eq!(attribute, "api");
                assert_eq!(value, "gles2");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unexpected_root() {
        let root = XmlElement::parse_str("<enums/>").unwrap();

        assert!(matches!(
            Registry::from_document(&root, &GeneratorOptions::default()),
            Err(GenerateError::UnexpectedRoot(ref name)) if name == "enums"
        ));
    }
}
