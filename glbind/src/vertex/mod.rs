//! Vertex input layouts.
//!
//! A [Vertex] type describes its fields once, and [resolve_layout] turns that description into
//! the list of attribute slot descriptors and the stride needed to configure a vertex array
//! object.

mod attrib_type;
pub use self::attrib_type::VertexAttribType;

mod layout;
pub use self::layout::{
    resolve_layout, AttributeLayout, LayoutError, VertexAttribBinder, VertexAttributeDescriptor,
    VertexField, VertexLayout,
};

mod cache;
pub use self::cache::LayoutCache;

/// Trait implemented for types that provide attribute data for a vertex buffer.
///
/// # Unsafe
///
/// The [VertexField]s returned by [fields] must describe the actual memory layout of the type:
/// every field that carries an [AttributeLayout] must hold data that can be read as `size`
/// components of `attrib_type` at `offset_in_bytes` relative to the start of an instance. The
/// type should be `#[repr(C)]` so that this layout is stable.
///
/// # Deriving
///
/// This trait may be derived for struct types. Any field that defines an attribute must be
/// marked with `#[vertex_attribute(...)]`, other fields are reported without a layout and are
/// ignored by [resolve_layout]. An attribute declares a `location`, a `size` (its number of
/// components), an `attrib_type` naming a [VertexAttribType] variant, and may be marked
/// `normalized`. A field may additionally be marked `#[vertex_divisor(n)]` to source its data
/// per instance:
///
/// ```rust
/// #[derive(glbind::derive::Vertex, Clone, Copy)]
/// #[repr(C)]
/// struct Instance {
///     #[vertex_attribute(location = 0, size = 16, attrib_type = "Float")]
///     #[vertex_divisor(1)]
///     transform: [[f32; 4]; 4],
///
///     #[vertex_attribute(location = 4, size = 4, attrib_type = "UnsignedByte", normalized)]
///     #[vertex_divisor(1)]
///     tint: [u8; 4],
/// }
/// ```
///
/// [fields]: Vertex::fields
pub unsafe trait Vertex: Sized {
    /// The fields of this type in declaration order.
    fn fields() -> Vec<VertexField>;
}
