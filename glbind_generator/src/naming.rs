use crate::GeneratorOptions;

/// Identifiers a raw identifier (`r#name`) cannot spell.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

impl GeneratorOptions {
    fn strip_constant_prefix<'a>(&self, raw_name: &'a str) -> &'a str {
        let mut name = raw_name.trim();

        if self.constant_prefix.is_empty() {
            return name;
        }

        while let Some(rest) = name.strip_prefix(self.constant_prefix.as_str()) {
            name = rest;
        }

        name
    }

    /// Turns a registry constant name into the name of the generated constant.
    ///
    /// Strips the constant prefix and puts the escape letter in front of a name that would
    /// otherwise start with a digit: `GL_COLOR_BUFFER_BIT` becomes `COLOR_BUFFER_BIT`, `GL_2D`
    /// becomes `N2D`.
    pub fn normalize_constant_name(&self, raw_name: &str) -> String {
        let name = self.strip_constant_prefix(raw_name);
        let mut normalized = String::with_capacity(name.len() + 1);

        if starts_with_digit(name) {
            normalized.push(self.escape_letter);
        }

        normalized.push_str(name);

        normalized
    }

    /// Turns a registry constant name into the name of a member of a generated enumeration.
    ///
    /// Strips the constant prefix, splits on underscores and joins the segments in PascalCase.
    /// A segment that starts with a digit keeps its spelling and gets the escape letter in front
    /// of it: `GL_TEXTURE_2D` becomes `TextureN2D`.
    pub fn normalize_enum_member_name(&self, raw_name: &str) -> String {
        let name = self.strip_constant_prefix(raw_name);
        let mut normalized = String::with_capacity(name.len() + 4);

        for segment in name.split('_').filter(|s| !s.is_empty()) {
            if starts_with_digit(segment) {
                normalized.push(self.escape_letter);
                normalized.push_str(segment);
            } else {
                let mut chars = segment.chars();

                if let Some(first) = chars.next() {
                    normalized.extend(first.to_uppercase());
                    normalized.extend(chars.flat_map(char::to_lowercase));
                }
            }
        }

        normalized
    }
}

/// Escapes a native parameter name so that it can never collide with a Rust keyword.
///
/// Parameter names are emitted as raw identifiers (`params` becomes `r#params`). The few names a
/// raw identifier cannot hold get a trailing underscore instead.
pub fn escape_param_name(name: &str) -> String {
    if NON_RAW_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        format!("r#{}", name)
    }
}

fn starts_with_digit(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_ascii_digit())
}
