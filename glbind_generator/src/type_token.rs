//! C declarator parsing.
//!
//! Registry prototypes and parameters are C declarations such as `const GLchar *const*string`.
//! Rather than massaging these strings until they look right, the declaration is tokenized once
//! and the type is kept as a base name plus the `const` qualifier of each pointer level.

use std::fmt;

#[derive(Clone, PartialEq, Eq, Debug)]
enum Token {
    Ident(String),
    Star,
}

/// Why a C declaration could not be parsed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DeclarationError {
    /// A character that has no place in a plain declaration, e.g. `[` or `(`.
    UnexpectedCharacter(char),
    /// The declaration does not end in a name.
    MissingName,
    /// There is no base type in front of the name.
    MissingType,
    /// More than one base type identifier, e.g. `unsigned int`.
    MultipleBaseTypes,
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeclarationError::UnexpectedCharacter(c) => write!(f, "unexpected character `{}`", c),
            DeclarationError::MissingName => write!(f, "missing name"),
            DeclarationError::MissingType => write!(f, "missing type"),
            DeclarationError::MultipleBaseTypes => write!(f, "more than one base type"),
        }
    }
}

/// A normalized C type.
///
/// `struct` is dropped, `const` is tracked per pointer level. [Display] renders the canonical
/// stripped form used in diagnostics (`GLubyte*`), [TypeToken::rust_type] the Rust spelling
/// (`*const GLubyte`).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeToken {
    base: String,
    // `qualifiers[0]` is the const-ness of the base type, `qualifiers[n]` that of the pointer
    // introduced by the n-th `*`.
    qualifiers: Vec<bool>,
}

impl TypeToken {
    pub fn new<B>(base: B) -> Self
    where
        B: Into<String>,
    {
        TypeToken {
            base: base.into(),
            qualifiers: vec![false],
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn pointer_depth(&self) -> usize {
        self.qualifiers.len() - 1
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth() > 0
    }

    pub fn is_void(&self) -> bool {
        self.base == "void" && !self.is_pointer()
    }

    /// The same type with its base replaced, keeping pointer levels and qualifiers.
    pub fn with_base<B>(&self, base: B) -> Self
    where
        B: Into<String>,
    {
        TypeToken {
            base: base.into(),
            qualifiers: self.qualifiers.clone(),
        }
    }

    /// The Rust spelling of this type, with `void` mapped to `()` or `c_void` behind a pointer.
    pub fn rust_type(&self) -> String {
        let mut rust_type = match self.base.as_str() {
            "void" if self.is_pointer() => "c_void".to_string(),
            "void" => "()".to_string(),
            base => base.to_string(),
        };

        for &is_const in &self.qualifiers[..self.pointer_depth()] {
            let pointer = if is_const { "*const " } else { "*mut " };

            rust_type.insert_str(0, pointer);
        }

        rust_type
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.base)?;

        for _ in 0..self.pointer_depth() {
            f.write_str("*")?;
        }

        Ok(())
    }
}

/// Parses a C declaration of the form `<type> <name>` into its type and name.
///
/// Handles both pointer placements (`void *glMapBuffer` and `void* glMapBuffer`), any number of
/// leading `const` and `struct` keywords in either order, and `const` after a `*`.
pub fn parse_declaration(text: &str) -> Result<(TypeToken, String), DeclarationError> {
    let mut tokens = tokenize(text)?;

    let name = match tokens.pop() {
        Some(Token::Ident(ref name)) if !is_keyword(name) => name.clone(),
        _ => return Err(DeclarationError::MissingName),
    };

    let mut base = None;
    let mut qualifiers = vec![false];

    for token in tokens {
        match token {
            Token::Star => qualifiers.push(false),
            Token::Ident(ref ident) if ident == "struct" => (),
            Token::Ident(ref ident) if ident == "const" => {
                if let Some(qualifier) = qualifiers.last_mut() {
                    *qualifier = true;
                }
            }
            Token::Ident(ident) => {
                if base.is_some() || qualifiers.len() > 1 {
                    return Err(DeclarationError::MultipleBaseTypes);
                }

                base = Some(ident);
            }
        }
    }

    let base = base.ok_or(DeclarationError::MissingType)?;

    Ok((TypeToken { base, qualifiers }, name))
}

fn is_keyword(ident: &str) -> bool {
    ident == "const" || ident == "struct"
}

fn tokenize(text: &str) -> Result<Vec<Token>, DeclarationError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '*' {
            chars.next();
            tokens.push(Token::Star);
        } else if c.is_ascii_alphanumeric() || c == '_' {
            let mut ident = String::new();

            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }

            tokens.push(Token::Ident(ident));
        } else {
            return Err(DeclarationError::UnexpectedCharacter(c));
        }
    }

    Ok(tokens)
}
