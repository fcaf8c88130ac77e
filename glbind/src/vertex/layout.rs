use std::mem;

use failure::Fail;

use super::{Vertex, VertexAttribType};

/// The maximum number of components a single attribute slot can hold.
const MAX_SLOT_COMPONENTS: u32 = 4;

/// Describes how a field of a [Vertex] type is to be bound to a vertex attribute slot.
///
/// Corresponds to the `#[vertex_attribute(...)]` annotation on a field when [Vertex] is derived.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AttributeLayout {
    /// The first attribute slot (shader location) the field is bound to.
    pub location: u32,

    /// The number of components of the field.
    ///
    /// May exceed `4`, in which case the field occupies several consecutive attribute slots: a
    /// 4x4 matrix declares a size of `16` and takes up 4 slots.
    pub size: u32,

    /// The type of each component.
    pub attrib_type: VertexAttribType,

    /// Whether integer data is normalized to the `[0, 1]` (unsigned) or `[-1, 1]` (signed) range
    /// when it is read by a shader.
    pub normalized: bool,
}

/// Static metadata for one field of a [Vertex] type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VertexField {
    pub name: &'static str,

    /// The offset of the field in bytes relative to the start of the record.
    pub offset_in_bytes: usize,

    /// The attribute layout of the field; fields without one do not source attribute data.
    pub layout: Option<AttributeLayout>,

    /// The instancing divisor of the field, if one was declared.
    pub divisor: Option<u32>,
}

/// Describes a single attribute slot of a [VertexLayout].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VertexAttributeDescriptor {
    /// The attribute slot (shader location) this descriptor configures.
    pub location: u32,

    /// The number of components sourced for this slot, between `1` and `4`.
    pub size: u8,

    pub attrib_type: VertexAttribType,

    pub normalized: bool,

    /// The offset in bytes of the first component relative to the start of a record.
    pub offset_in_bytes: usize,

    /// The number of instances drawn before the attribute advances to the next record; `0` means
    /// the attribute advances for every vertex.
    pub divisor: u32,
}

/// Error returned when a [VertexLayout] cannot be resolved.
#[derive(Fail, PartialEq, Debug)]
pub enum LayoutError {
    #[fail(
        display = "Field `{}` declares attribute type `{:?}`, which is not a supported scalar type.",
        field, attrib_type
    )]
    UnsupportedAttribType {
        field: &'static str,
        attrib_type: VertexAttribType,
    },
    #[fail(display = "Field `{}` declares an attribute size of `0`.", field)]
    ZeroSize { field: &'static str },
    #[fail(
        display = "Field `{}` needs more attribute slots than remain after its location.",
        field
    )]
    LocationOverflow { field: &'static str },
    #[fail(
        display = "Field `{}` extends past the end of its {} byte record.",
        field, stride_in_bytes
    )]
    ExceedsRecord {
        field: &'static str,
        stride_in_bytes: usize,
    },
}

/// Receives the calls that configure the vertex attribute slots of the currently bound vertex
/// array object.
///
/// Implemented by a GL context; the layout never holds on to the binder beyond
/// [VertexLayout::apply].
pub trait VertexAttribBinder {
    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        size: i32,
        attrib_type: VertexAttribType,
        normalized: bool,
        stride_in_bytes: i32,
        offset_in_bytes: usize,
    );

    fn enable_vertex_attrib_array(&mut self, location: u32);

    fn vertex_attrib_divisor(&mut self, location: u32, divisor: u32);
}

/// The stride and attribute slot descriptors for a record type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VertexLayout {
    stride_in_bytes: usize,
    attributes: Vec<VertexAttributeDescriptor>,
}

impl VertexLayout {
    /// Resolves the layout for a record of `stride_in_bytes` bytes with the given `fields`.
    ///
    /// Descriptors are produced in field order. A field whose size exceeds `4` components expands
    /// into consecutive slots starting at its declared location, each holding at most `4`
    /// components; the offset advances by 4 components' worth of bytes per slot and the divisor is
    /// repeated on every slot. Fields without an [AttributeLayout] are skipped and do not affect
    /// the stride.
    ///
    /// Fails if a field's data does not lie within the record, or if its slots would run past the
    /// last representable location.
    pub fn from_fields(
        stride_in_bytes: usize,
        fields: &[VertexField],
    ) -> Result<Self, LayoutError> {
        let mut attributes = Vec::with_capacity(fields.len());

        for field in fields {
            let layout = match field.layout {
                Some(layout) => layout,
                None => continue,
            };

            if layout.size == 0 {
                return Err(LayoutError::ZeroSize { field: field.name });
            }

            let component_size = layout.attrib_type.byte_size().ok_or(
                LayoutError::UnsupportedAttribType {
                    field: field.name,
                    attrib_type: layout.attrib_type,
                },
            )?;

            let fits = (layout.size as usize)
                .checked_mul(component_size)
                .and_then(|len| len.checked_add(field.offset_in_bytes))
                .map_or(false, |end| end <= stride_in_bytes);

            if !fits {
                return Err(LayoutError::ExceedsRecord {
                    field: field.name,
                    stride_in_bytes,
                });
            }

            let slot_count = (layout.size - 1) / MAX_SLOT_COMPONENTS + 1;

            layout
                .location
                .checked_add(slot_count - 1)
                .ok_or(LayoutError::LocationOverflow { field: field.name })?;

            let divisor = field.divisor.unwrap_or(0);

            let mut remaining = layout.size;
            let mut location = layout.location;
            let mut offset_in_bytes = field.offset_in_bytes;

            for slot in 0..slot_count {
                if slot > 0 {
                    location += 1;
                    offset_in_bytes += MAX_SLOT_COMPONENTS as usize * component_size;
                }

                let size = remaining.min(MAX_SLOT_COMPONENTS);

                attributes.push(VertexAttributeDescriptor {
                    location,
                    size: size as u8,
                    attrib_type: layout.attrib_type,
                    normalized: layout.normalized,
                    offset_in_bytes,
                    divisor,
                });

                remaining -= size;
            }
        }

        Ok(VertexLayout {
            stride_in_bytes,
            attributes,
        })
    }

    /// The distance in bytes between consecutive records.
    pub fn stride_in_bytes(&self) -> usize {
        self.stride_in_bytes
    }

    pub fn attributes(&self) -> &[VertexAttributeDescriptor] {
        &self.attributes
    }

    /// Configures the attribute slots described by this layout on the `binder`.
    ///
    /// For every descriptor, in order, the attribute pointer is set, the slot is enabled and its
    /// divisor is set. The divisor is set even when it is `0` so that a slot previously used for
    /// instanced data is reset.
    pub fn apply<B>(&self, binder: &mut B)
    where
        B: VertexAttribBinder,
    {
        let stride_in_bytes = self.stride_in_bytes as i32;

        for attribute in &self.attributes {
            binder.vertex_attrib_pointer(
                attribute.location,
                attribute.size as i32,
                attribute.attrib_type,
                attribute.normalized,
                stride_in_bytes,
                attribute.offset_in_bytes,
            );
            binder.enable_vertex_attrib_array(attribute.location);
            binder.vertex_attrib_divisor(attribute.location, attribute.divisor);
        }
    }
}

/// Resolves the [VertexLayout] for `T`, using the size of `T` as the stride.
pub fn resolve_layout<T>() -> Result<VertexLayout, LayoutError>
where
    T: Vertex,
{
    let layout = VertexLayout::from_fields(mem::size_of::<T>(), &T::fields())?;

    log::debug!(
        "Resolved vertex layout for `{}`: stride {}, {} attribute slot(s)",
        std::any::type_name::<T>(),
        layout.stride_in_bytes,
        layout.attributes.len()
    );

    for attribute in &layout.attributes {
        log::trace!("{:?}", attribute);
    }

    Ok(layout)
}
