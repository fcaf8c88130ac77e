/// The data type of the components of a vertex attribute, as passed to `glVertexAttribPointer`.
///
/// Every type the GL accepts for `glVertexAttribPointer` is listed here, but only the plain
/// scalar types have a known component width (see [byte_size]). The packed and fixed point types
/// exist so that a layout that names them can be rejected with a clear error instead of being
/// laid out with a guessed size.
///
/// [byte_size]: VertexAttribType::byte_size
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VertexAttribType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
    HalfFloat,
    Fixed,
    Int64Arb,
    UnsignedInt64Arb,
    UnsignedInt2101010Rev,
    UnsignedInt10f11f11fRev,
    Int2101010Rev,
}

impl VertexAttribType {
    /// The `GLenum` value that identifies this type.
    pub fn gl_enum(&self) -> u32 {
        match self {
            VertexAttribType::Byte => 0x1400,
            VertexAttribType::UnsignedByte => 0x1401,
            VertexAttribType::Short => 0x1402,
            VertexAttribType::UnsignedShort => 0x1403,
            VertexAttribType::Int => 0x1404,
            VertexAttribType::UnsignedInt => 0x1405,
            VertexAttribType::Float => 0x1406,
            VertexAttribType::Double => 0x140A,
            VertexAttribType::HalfFloat => 0x140B,
            VertexAttribType::Fixed => 0x140C,
            VertexAttribType::Int64Arb => 0x140E,
            VertexAttribType::UnsignedInt64Arb => 0x140F,
            VertexAttribType::UnsignedInt2101010Rev => 0x8368,
            VertexAttribType::UnsignedInt10f11f11fRev => 0x8C3B,
            VertexAttribType::Int2101010Rev => 0x8D9F,
        }
    }

    /// The size in bytes of a single component of this type, or `None` if this type is not a
    /// plain scalar type.
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            VertexAttribType::Byte | VertexAttribType::UnsignedByte => Some(1),
            VertexAttribType::Short | VertexAttribType::UnsignedShort => Some(2),
            VertexAttribType::Int | VertexAttribType::UnsignedInt => Some(4),
            VertexAttribType::Float => Some(4),
            VertexAttribType::Double => Some(8),
            VertexAttribType::HalfFloat
            | VertexAttribType::Fixed
            | VertexAttribType::Int64Arb
            | VertexAttribType::UnsignedInt64Arb
            | VertexAttribType::UnsignedInt2101010Rev
            | VertexAttribType::UnsignedInt10f11f11fRev
            | VertexAttribType::Int2101010Rev => None,
        }
    }
}
