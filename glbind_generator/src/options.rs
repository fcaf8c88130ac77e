/// The naming conventions of the API a registry describes.
///
/// The generator binary always runs with [GeneratorOptions::default], which describes OpenGL.
#[derive(Clone, PartialEq, Debug)]
pub struct GeneratorOptions {
    /// Prefix shared by every constant name, stripped from generated names.
    pub constant_prefix: String,

    /// Prefix every command name must start with; commands without it are skipped.
    pub command_prefix: String,

    /// Letter inserted before a generated name segment that would otherwise start with a digit.
    pub escape_letter: char,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            constant_prefix: "GL_".to_string(),
            command_prefix: "gl".to_string(),
            escape_letter: 'N',
        }
    }
}
