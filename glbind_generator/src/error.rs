use std::fmt;
use std::io;

use failure::Fail;

/// A problem that aborts a whole generation pass.
///
/// Problems with individual registry entries are not errors; see [SkippedEntry].
///
/// [SkippedEntry]: crate::SkippedEntry
#[derive(Fail, Debug)]
pub enum GenerateError {
    #[fail(display = "Failed to access `{}`: {}", path, source)]
    Io {
        path: String,
        #[cause]
        source: io::Error,
    },
    #[fail(display = "The registry document is not well formed: {}", _0)]
    Xml(String),
    #[fail(display = "The registry document has no root element.")]
    MissingRoot,
    #[fail(display = "Expected a `<registry>` root element, found `<{}>`.", _0)]
    UnexpectedRoot(String),
    #[fail(
        display = "Command `{}` has an unrecognized attribute `{}` = `{}`.",
        command, attribute, value
    )]
    UnknownCommandAttribute {
        command: String,
        attribute: String,
        value: String,
    },
    #[fail(display = "Failed to format generated source.")]
    Format,
}

impl From<fmt::Error> for GenerateError {
    fn from(_: fmt::Error) -> Self {
        GenerateError::Format
    }
}
