use std::mem;

use glbind::vertex::{
    resolve_layout, LayoutCache, LayoutError, Vertex, VertexAttribType,
    VertexAttributeDescriptor,
};

#[derive(glbind::derive::Vertex, Clone, Copy)]
#[repr(C)]
struct VertexA {
    #[vertex_attribute(location = 0, size = 2, attrib_type = "Float")]
    position: [f32; 2],
    #[vertex_attribute(location = 1, size = 4, attrib_type = "Float")]
    color: [f32; 4],
    not_an_attribute: [f32; 2],
}

#[derive(glbind::derive::Vertex, Clone, Copy)]
#[repr(C)]
struct InstanceData {
    #[vertex_attribute(location = 3, size = 16, attrib_type = "Float")]
    #[vertex_divisor(1)]
    transform: [[f32; 4]; 4],
    #[vertex_attribute(location = 7, size = 4, attrib_type = "UnsignedByte", normalized)]
    #[vertex_divisor(1)]
    tint: [u8; 4],
}

#[derive(glbind::derive::Vertex, Clone, Copy)]
#[repr(C)]
struct VertexB(
    #[vertex_attribute(location = 0, size = 2, attrib_type = "Byte")] [i8; 2],
    #[vertex_attribute(location = 1, size = 3, attrib_type = "UnsignedByte")] [u8; 3],
);

#[derive(glbind::derive::Vertex, Clone, Copy)]
#[repr(C)]
struct PackedNormal {
    #[vertex_attribute(location = 0, size = 4, attrib_type = "Int2101010Rev", normalized)]
    normal: u32,
}

#[derive(glbind::derive::Vertex, Clone, Copy)]
#[repr(C)]
struct TrailingMatrix {
    #[vertex_attribute(location = 4294967294, size = 16, attrib_type = "Float")]
    transform: [[f32; 4]; 4],
}

#[derive(glbind::derive::Vertex, Clone, Copy)]
#[repr(C)]
struct NoAttributes {
    value: f64,
}

#[test]
fn test_struct_fields() {
    let fields = VertexA::fields();

    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].name, "position");
    assert_eq!(fields[1].offset_in_bytes, 8);
    assert_eq!(fields[2].name, "not_an_attribute");
    assert_eq!(fields[2].offset_in_bytes, 24);
    assert!(fields[2].layout.is_none());
}

#[test]
fn test_struct_layout() {
    let layout = resolve_layout::<VertexA>().unwrap();

    assert_eq!(layout.stride_in_bytes(), 32);
    assert_eq!(
        layout.attributes(),
        &[
            VertexAttributeDescriptor {
                location: 0,
                size: 2,
                attrib_type: VertexAttribType::Float,
                normalized: false,
                offset_in_bytes: 0,
                divisor: 0,
            },
            VertexAttributeDescriptor {
                location: 1,
                size: 4,
                attrib_type: VertexAttribType::Float,
                normalized: false,
                offset_in_bytes: 8,
                divisor: 0,
            },
        ]
    );
}

#[test]
fn test_instanced_layout() {
    let layout = resolve_layout::<InstanceData>().unwrap();
    let attributes = layout.attributes();

    assert_eq!(layout.stride_in_bytes(), mem::size_of::<InstanceData>());
    assert_eq!(attributes.len(), 5);

    for (i, attribute) in attributes[..4].iter().enumerate() {
        assert_eq!(attribute.location, 3 + i as u32);
        assert_eq!(attribute.size, 4);
        assert_eq!(attribute.offset_in_bytes, 16 * i);
        assert_eq!(attribute.divisor, 1);
    }

    assert_eq!(
        attributes[4],
        VertexAttributeDescriptor {
            location: 7,
            size: 4,
            attrib_type: VertexAttribType::UnsignedByte,
            normalized: true,
            offset_in_bytes: 64,
            divisor: 1,
        }
    );
}

#[test]
fn test_tuple_struct_layout() {
    let layout = resolve_layout::<VertexB>().unwrap();

    assert_eq!(layout.stride_in_bytes(), 5);
    assert_eq!(layout.attributes()[0].offset_in_bytes, 0);
    assert_eq!(layout.attributes()[1].offset_in_bytes, 2);
    assert_eq!(VertexB::fields()[1].name, "1");
}

#[test]
fn test_unsupported_type() {
    assert_eq!(
        resolve_layout::<PackedNormal>(),
        Err(LayoutError::UnsupportedAttribType {
            field: "normal",
            attrib_type: VertexAttribType::Int2101010Rev,
        })
    );
}

#[test]
fn test_location_overflow() {
    assert_eq!(
        resolve_layout::<TrailingMatrix>(),
        Err(LayoutError::LocationOverflow { field: "transform" })
    );
}

#[test]
fn test_no_attributes() {
    let layout = resolve_layout::<NoAttributes>().unwrap();

    assert_eq!(layout.stride_in_bytes(), 8);
    assert!(layout.attributes().is_empty());
}

#[test]
fn test_resolution_is_deterministic() {
    let cache = LayoutCache::new();
    let cached = cache.get_or_resolve::<InstanceData>().unwrap();

    assert_eq!(*cached, resolve_layout::<InstanceData>().unwrap());
    assert_eq!(
        resolve_layout::<InstanceData>().unwrap(),
        resolve_layout::<InstanceData>().unwrap()
    );
}
